//! Navigation driver (spec component C6).

use super::page::BrowserPage;
use crate::error::BridgeError;
use std::time::Duration;

const NAVIGATE_TIMEOUT: Duration = Duration::from_secs(30);
const STABILITY_SLEEP: Duration = Duration::from_secs(3);
const IDLE_WAIT_TIMEOUT: Duration = Duration::from_secs(5);

/// Single-attempt, best-effort navigation: wait for `DOMContentLoaded`
/// (chromiumoxide's `goto` wait-until default) with an overall 30s
/// timeout. No retries.
pub async fn navigate(page: &dyn BrowserPage, url: &str) -> Result<(), BridgeError> {
    let result = tokio::time::timeout(NAVIGATE_TIMEOUT, async {
        page.goto(url).await?;
        page.wait_for_navigation().await
    })
    .await;

    match result {
        Ok(Ok(())) => Ok(()),
        Ok(Err(e)) => Err(BridgeError::Navigation(e.to_string())),
        Err(_) => Err(BridgeError::Navigation(format!(
            "timed out after {}s navigating to {url}",
            NAVIGATE_TIMEOUT.as_secs()
        ))),
    }
}

/// Sleep 3s, then wait up to 5s for network idle. The idle wait timing
/// out is swallowed, not propagated — this is a heuristic stability
/// delay, not a proof that the page settled (§9).
pub async fn wait_stable(page: &dyn BrowserPage) {
    tokio::time::sleep(STABILITY_SLEEP).await;
    let _ = tokio::time::timeout(IDLE_WAIT_TIMEOUT, page.wait_for_navigation_idle()).await;
}
