//! Redirect classifier (spec component C7).

use crate::url_classifier::{base_domain, is_auth_like};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthFlow {
    SameDomainPath,
    CrossDomain,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RedirectVerdict {
    /// Landed on an auth-like page that never left the requested host —
    /// the requested page *is* the sign-in page. Auth wait loops should
    /// be bypassed.
    RequestedAuth,
    /// No meaningful redirect; proceed as normal.
    None,
    /// Landed permanently on a different host that is not itself
    /// auth-like (e.g. a canonical-domain redirect).
    Permanent { new_host: String },
    /// Landed on what looks like an authentication flow; caller should
    /// run the auth wait loops.
    Auth {
        flow: AuthFlow,
        original_base: String,
        current_base: String,
        current_url: String,
        original_host: String,
        current_host: String,
    },
}

pub struct ClassifyInput<'a> {
    pub requested_url: &'a str,
    pub requested_host: &'a str,
    pub landing_url: &'a str,
    pub landing_host: &'a str,
}

pub fn classify(input: ClassifyInput<'_>) -> RedirectVerdict {
    let req_auth = is_auth_like(input.requested_url);
    let land_auth = is_auth_like(input.landing_url);
    let diff_host = input.landing_host != input.requested_host;
    let same_host_path_change = !diff_host && land_auth && !req_auth;

    if req_auth && !diff_host {
        return RedirectVerdict::RequestedAuth;
    }
    if !diff_host && !same_host_path_change {
        return RedirectVerdict::None;
    }
    if !land_auth {
        return RedirectVerdict::Permanent {
            new_host: input.landing_host.to_string(),
        };
    }

    let flow = if same_host_path_change {
        AuthFlow::SameDomainPath
    } else {
        AuthFlow::CrossDomain
    };

    RedirectVerdict::Auth {
        flow,
        original_base: base_domain(input.requested_host),
        current_base: base_domain(input.landing_host),
        current_url: input.landing_url.to_string(),
        original_host: input.requested_host.to_string(),
        current_host: input.landing_host.to_string(),
    }
}
