//! Auth wait loops (spec component C8): cooperative polling with explicit
//! deadlines, never busy loops (§9).

use super::page::BrowserPage;
use crate::error::BridgeError;
use crate::url_classifier::{base_domain, is_auth_like};
use std::time::{Duration, Instant};
use tracing::{debug, warn};
use url::Url;

fn root_label(domain: &str) -> &str {
    domain.split('.').next().unwrap_or(domain)
}

/// `true` when `url` counts as "back from the auth flow" relative to the
/// originally-requested host `h` and base domain `b`.
fn has_returned(url: &str, h: &str, b: &str) -> bool {
    if is_auth_like(url) {
        return false;
    }
    let Ok(parsed) = Url::parse(url) else {
        return false;
    };
    let Some(host) = parsed.host_str() else {
        return false;
    };
    if host == h {
        return true;
    }
    let current_base = base_domain(host);
    if current_base == b {
        return true;
    }
    let root_b = root_label(b);
    root_label(&current_base) == root_b && root_b.len() > 3
}

async fn poll_until_returned(
    page: &dyn BrowserPage,
    h: &str,
    b: &str,
    interval: Duration,
    deadline: Instant,
    swallow_read_errors: bool,
) -> Option<String> {
    loop {
        match page.current_url().await {
            Ok(Some(url)) => {
                if has_returned(&url, h, b) {
                    return Some(url);
                }
            }
            Ok(None) => {}
            Err(e) => {
                if swallow_read_errors {
                    debug!(error = %e, "auth loop: transient url read error, ignoring");
                } else {
                    return None;
                }
            }
        }
        if Instant::now() >= deadline {
            return None;
        }
        tokio::time::sleep(interval).await;
    }
}

/// Poll every 500ms for up to `timeout` (default 5s). Fails silently — a
/// deadline with no match is not an error, it just means the slower
/// `manual_auth` loop should take over.
pub async fn auto_auth(
    page: &dyn BrowserPage,
    h: &str,
    b: &str,
    timeout: Duration,
) -> Option<String> {
    let deadline = Instant::now() + timeout;
    poll_until_returned(page, h, b, Duration::from_millis(500), deadline, true).await
}

/// Poll every 2s for up to `timeout` (default 10 minutes), swallowing
/// transient URL-read errors. Returns the landing host on success, or an
/// [`BridgeError::AuthTimeout`] naming the page's current URL on deadline.
pub async fn manual_auth(
    page: &dyn BrowserPage,
    h: &str,
    b: &str,
    timeout: Duration,
) -> Result<String, BridgeError> {
    let deadline = Instant::now() + timeout;
    match poll_until_returned(page, h, b, Duration::from_secs(2), deadline, true).await {
        Some(url) => Ok(url),
        None => {
            let current_url = page
                .current_url()
                .await
                .ok()
                .flatten()
                .unwrap_or_else(|| "unknown".to_string());
            warn!(current_url, "manual auth wait timed out");
            Err(BridgeError::AuthTimeout { current_url })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn returned_when_back_on_original_host() {
        assert!(has_returned("https://example.com/dashboard", "example.com", "example.com"));
    }

    #[test]
    fn returned_when_back_on_original_base_domain() {
        assert!(has_returned(
            "https://app.example.com/home",
            "login.example.com",
            "example.com"
        ));
    }

    #[test]
    fn returned_via_related_root_when_long_enough() {
        // Different base domain (example.org vs example.net) but the same
        // first dot-label ("example"), which is long enough (> 3 chars)
        // to count as a related root.
        assert!(has_returned(
            "https://app.example.org/",
            "login.example.net",
            "example.net"
        ));
    }

    #[test]
    fn not_returned_while_still_on_auth_path() {
        assert!(!has_returned("https://example.com/login", "example.com", "example.com"));
    }

    #[test]
    fn not_returned_on_unrelated_host() {
        assert!(!has_returned("https://totally-different.org/", "example.com", "example.com"));
    }
}
