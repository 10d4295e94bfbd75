//! The browser-page seam. Production code talks to `chromiumoxide::Page`
//! through this trait; tests substitute a fake implementation (spec
//! ambient test-tooling note, §13) so the pool/orchestrator/auth-loop
//! logic can be exercised without a real browser.

use async_trait::async_trait;
use std::time::Duration;

#[async_trait]
pub trait BrowserPage: Send + Sync {
    /// Current top-level document URL, or `None` before any navigation.
    async fn current_url(&self) -> anyhow::Result<Option<String>>;

    /// Navigate and return once the browser reports the load event fired
    /// for `DOMContentLoaded` (chromiumoxide's default `goto` wait-until).
    async fn goto(&self, url: &str) -> anyhow::Result<()>;

    /// Block until the in-flight navigation (if any) settles.
    async fn wait_for_navigation(&self) -> anyhow::Result<()>;

    /// Best-effort network-idle wait; implementations should treat their
    /// own idle timeout as success, not failure — the caller already
    /// wraps this in an outer timeout.
    async fn wait_for_navigation_idle(&self) -> anyhow::Result<()>;

    /// Serialized `document.documentElement.outerHTML`.
    async fn content(&self) -> anyhow::Result<String>;

    /// Evaluate `script` and return its result coerced to a `bool`.
    async fn eval_bool(&self, script: &str) -> anyhow::Result<bool>;

    /// Evaluate `script` and return its result coerced to a `String`,
    /// or `None` when the script evaluates to `null`/`undefined`.
    async fn eval_string(&self, script: &str) -> anyhow::Result<Option<String>>;

    /// Click the first element matching `selector`.
    async fn click(&self, selector: &str) -> anyhow::Result<()>;

    /// Type `text` into the first element matching `selector`, with
    /// `delay` between keystrokes.
    async fn type_text(&self, selector: &str, text: &str, delay: Duration) -> anyhow::Result<()>;

    /// Press `key` (e.g. `"Backspace"`) while the element matching
    /// `selector` is focused.
    async fn press_key_on(&self, selector: &str, key: &str) -> anyhow::Result<()>;

    /// Bring the page's tab to the foreground (best-effort).
    async fn bring_to_front(&self) -> anyhow::Result<()>;

    /// Close the underlying browser tab.
    async fn close(&self) -> anyhow::Result<()>;
}
