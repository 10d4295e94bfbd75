//! URL classifier (spec component C1).
//!
//! Two pure predicates: `base_domain` (the registrable-ish last two
//! dot-labels of a host) and `is_auth_like` (heuristic "this looks like a
//! sign-in page" check used to gate the auth wait loops in C7/C8).

use url::Url;

/// Last two dot-labels of `host`, or the whole host when it has fewer
/// than two labels (e.g. `"localhost"`).
pub fn base_domain(host: &str) -> String {
    let labels: Vec<&str> = host.split('.').collect();
    if labels.len() < 2 {
        host.to_string()
    } else {
        labels[labels.len() - 2..].join(".")
    }
}

const AUTH_PATH_SEGMENTS: &[&str] = &[
    "login",
    "signin",
    "sign-in",
    "auth",
    "authenticate",
    "sso",
    "oauth",
    "saml",
];

/// Whole-segment match only — `/login-help` must not match `login`, so we
/// compare full `/`-delimited path segments rather than using a `\b` regex
/// (`-` is a non-word character, so `\blogin\b` matches inside `login-help`).
fn has_auth_path_segment(path: &str) -> bool {
    path.split('/').any(|seg| AUTH_PATH_SEGMENTS.contains(&seg))
}

const AUTH_HOST_PREFIXES: &[&str] = &[
    "login.",
    "auth.",
    "signin.",
    "sso.",
    "oauth.",
    "accounts.",
    "id.",
    "identity.",
    "authentication.",
    "idp.",
];

/// `true` iff `url`'s path has a segment matching a known auth keyword or
/// its host starts with a known auth-subdomain prefix. An unparseable URL
/// is not auth-like.
pub fn is_auth_like(url: &str) -> bool {
    let Ok(parsed) = Url::parse(url) else {
        return false;
    };
    let path = parsed.path().to_ascii_lowercase();
    if has_auth_path_segment(&path) {
        return true;
    }
    let Some(host) = parsed.host_str() else {
        return false;
    };
    let host = host.to_ascii_lowercase();
    AUTH_HOST_PREFIXES.iter().any(|p| host.starts_with(p))
}
