//! Fetch orchestrator (spec component C11).
//!
//! Split in two so the redirect/auth branching can be driven by tests
//! against a fake `BrowserPage`/`PagePool` without a real browser:
//! `fetch_webpage` acquires a page from the live `BrowserSession`, then
//! hands off to `fetch_on_page`, which holds all of the §4.7/§4.11 logic.

use crate::browser::page::BrowserPage;
use crate::browser::pool::PagePool;
use crate::browser::redirect::{self, ClassifyInput, RedirectVerdict};
use crate::browser::{auth, navigation};
use crate::error::BridgeError;
use crate::html;
use crate::session::BrowserSession;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

const AUTO_AUTH_TIMEOUT: Duration = Duration::from_secs(5);
const MANUAL_AUTH_TIMEOUT: Duration = Duration::from_secs(600);

pub struct FetchOptions {
    pub clean_html: bool,
    pub post_load_wait_ms: u64,
}

pub struct FetchOutcome {
    pub current_url: String,
    pub html: String,
}

fn host_of(url: &str) -> Result<(Url, String), BridgeError> {
    let parsed = Url::parse(url)
        .map_err(|e| BridgeError::InvalidArgument(format!("invalid url {url:?}: {e}")))?;
    let host = parsed
        .host_str()
        .ok_or_else(|| BridgeError::InvalidArgument(format!("url has no host: {url}")))?
        .to_string();
    Ok((parsed, host))
}

pub async fn fetch_webpage(
    session: &Arc<BrowserSession>,
    url: &str,
    opts: FetchOptions,
) -> Result<FetchOutcome, BridgeError> {
    let (_, host) = host_of(url)?;
    let page = session.acquire_page(&host, url, true).await?;
    fetch_on_page(page.as_ref(), session.pool(), &host, url, opts).await
}

/// The pure orchestration core: given a page already navigated to nothing
/// in particular, drive the navigate → classify → (rekey | auth-wait) →
/// extract sequence. Takes `pool` only to re-key entries on a redirect,
/// never to acquire a page itself.
pub async fn fetch_on_page(
    page: &dyn BrowserPage,
    pool: &PagePool,
    host: &str,
    url: &str,
    opts: FetchOptions,
) -> Result<FetchOutcome, BridgeError> {
    navigation::navigate(page, url).await?;

    let landing_url = page
        .current_url()
        .await
        .map_err(|e| BridgeError::Internal(e.to_string()))?
        .ok_or_else(|| BridgeError::Internal("page has no url after navigation".to_string()))?;
    let landing_host = Url::parse(&landing_url)
        .ok()
        .and_then(|u| u.host_str().map(str::to_string))
        .unwrap_or_else(|| host.to_string());

    let verdict = redirect::classify(ClassifyInput {
        requested_url: url,
        requested_host: host,
        landing_url: &landing_url,
        landing_host: &landing_host,
    });

    match verdict {
        RedirectVerdict::None => {}
        RedirectVerdict::RequestedAuth => {
            if landing_host != host {
                pool.rekey(host, &landing_host).await;
            }
        }
        RedirectVerdict::Permanent { new_host } => {
            pool.rekey(host, &new_host).await;
        }
        RedirectVerdict::Auth {
            original_host,
            original_base,
            ..
        } => {
            let landed = match auth::auto_auth(page, &original_host, &original_base, AUTO_AUTH_TIMEOUT)
                .await
            {
                Some(u) => u,
                None => {
                    auth::manual_auth(page, &original_host, &original_base, MANUAL_AUTH_TIMEOUT)
                        .await?
                }
            };

            if let Some(final_host) = Url::parse(&landed).ok().and_then(|u| u.host_str().map(str::to_string)) {
                if final_host != host {
                    pool.rekey(host, &final_host).await;
                }
            }

            navigation::wait_stable(page).await;
        }
    }

    if opts.post_load_wait_ms > 0 {
        tokio::time::sleep(Duration::from_millis(opts.post_load_wait_ms)).await;
    }

    let current_url = page
        .current_url()
        .await
        .ok()
        .flatten()
        .unwrap_or(landing_url);
    let raw = page
        .content()
        .await
        .map_err(|e| BridgeError::Internal(e.to_string()))?;
    let html = html::process(&raw, &current_url, opts.clean_html);

    Ok(FetchOutcome { current_url, html })
}

/// The fixed next-step suggestions every `fetch_webpage` success carries.
pub fn next_steps() -> Vec<&'static str> {
    vec![
        "Use click_element or type_text with this same url to interact with the page",
        "Call get_current_html to re-read the page after further changes",
        "Call close_tab with this url when you are done with the page",
    ]
}
