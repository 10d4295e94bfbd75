//! Hostname-keyed page pool (spec component C5).
//!
//! Keys are raw hostnames: case-sensitive, no port normalization, `www.`
//! is never collapsed into the bare host (§9 — this is a deliberate,
//! tested contract, not an oversight to "fix").

use super::page::BrowserPage;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// Abstraction over the browser's page-creation/enumeration surface, so
/// the pool can be built and reconstructed without depending on
/// `chromiumoxide::Browser` directly.
#[async_trait::async_trait]
pub trait PageFactory: Send + Sync {
    async fn new_page(&self, url: &str) -> anyhow::Result<Arc<dyn BrowserPage>>;
    /// All currently-open tabs, in browser-reported order.
    async fn list_pages(&self) -> anyhow::Result<Vec<Arc<dyn BrowserPage>>>;
}

fn is_internal_url(url: &str) -> bool {
    let url = url.trim();
    url.is_empty()
        || url == "about:blank"
        || url.starts_with("chrome://")
        || url.starts_with("chrome-extension://")
        || url.starts_with("devtools://")
}

pub struct PagePool {
    entries: Mutex<HashMap<String, Arc<dyn BrowserPage>>>,
}

impl Default for PagePool {
    fn default() -> Self {
        Self::new()
    }
}

impl PagePool {
    pub fn new() -> Self {
        PagePool {
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// `true` when the handle still answers `current_url` — our proxy for
    /// "the underlying tab has not been closed".
    async fn is_live(page: &Arc<dyn BrowserPage>) -> bool {
        page.current_url().await.is_ok()
    }

    /// Acquire a page for `host`. Reuses a live pool entry when `reuse` is
    /// set (bringing it to front on a best-effort basis); otherwise (or
    /// when the existing entry is dead) creates a fresh page via
    /// `factory`, falling back to any existing non-internal tab if page
    /// creation itself fails. At most one live entry per host.
    pub async fn acquire(
        &self,
        host: &str,
        url: &str,
        factory: &dyn PageFactory,
        reuse: bool,
    ) -> anyhow::Result<Arc<dyn BrowserPage>> {
        {
            let mut entries = self.entries.lock().await;
            if let Some(existing) = entries.get(host).cloned() {
                if reuse && Self::is_live(&existing).await {
                    let _ = existing.bring_to_front().await;
                    debug!(host, "pool: reusing live page");
                    return Ok(existing);
                }
                debug!(host, "pool: dropping stale or non-reusable entry");
                entries.remove(host);
            }
        }

        let page = match factory.new_page(url).await {
            Ok(p) => p,
            Err(e) => {
                warn!(host, error = %e, "pool: page creation failed, scanning for fallback tab");
                let fallback = self
                    .first_non_internal(factory)
                    .await?
                    .ok_or(e)?;
                fallback
            }
        };

        let mut entries = self.entries.lock().await;
        entries.insert(host.to_string(), page.clone());
        Ok(page)
    }

    async fn first_non_internal(
        &self,
        factory: &dyn PageFactory,
    ) -> anyhow::Result<Option<Arc<dyn BrowserPage>>> {
        for page in factory.list_pages().await? {
            if let Ok(Some(url)) = page.current_url().await {
                if !is_internal_url(&url) {
                    return Ok(Some(page));
                }
            }
        }
        Ok(None)
    }

    /// Re-key the entry at `old_host` to `new_host` (used when a
    /// navigation redirects to a different host). No-op if `old_host`
    /// has no entry.
    pub async fn rekey(&self, old_host: &str, new_host: &str) {
        if old_host == new_host {
            return;
        }
        let mut entries = self.entries.lock().await;
        if let Some(page) = entries.remove(old_host) {
            info!(old_host, new_host, "pool: re-keying entry after redirect");
            entries.insert(new_host.to_string(), page);
        }
    }

    /// Live lookup: a page the user has closed is evicted here rather than
    /// handed back stale, so every caller (not just `acquire`) sees "no
    /// active page" once the underlying tab is gone.
    pub async fn get(&self, host: &str) -> Option<Arc<dyn BrowserPage>> {
        let mut entries = self.entries.lock().await;
        let page = entries.get(host).cloned()?;
        if Self::is_live(&page).await {
            Some(page)
        } else {
            debug!(host, "pool: evicting dead entry on access");
            entries.remove(host);
            None
        }
    }

    pub async fn remove(&self, host: &str) -> Option<Arc<dyn BrowserPage>> {
        self.entries.lock().await.remove(host)
    }

    /// Scan every pool entry for one whose current URL exactly equals
    /// `url`. Used by `close_tab` when a prior redirect moved the host
    /// key out from under the caller's original request URL.
    pub async fn find_by_exact_url(&self, url: &str) -> Option<(String, Arc<dyn BrowserPage>)> {
        let entries = self.entries.lock().await;
        for (host, page) in entries.iter() {
            if let Ok(Some(current)) = page.current_url().await {
                if current == url {
                    return Some((host.clone(), page.clone()));
                }
            }
        }
        None
    }

    /// Rebuild the pool by enumerating the browser's open tabs, excluding
    /// internal pages. First writer wins when two tabs share a host.
    pub async fn reconstruct(&self, factory: &dyn PageFactory) -> anyhow::Result<()> {
        let pages = factory.list_pages().await?;
        let mut entries = self.entries.lock().await;
        entries.clear();
        for page in pages {
            let Ok(Some(url)) = page.current_url().await else {
                continue;
            };
            if is_internal_url(&url) {
                continue;
            }
            let Ok(parsed) = url::Url::parse(&url) else {
                continue;
            };
            let Some(host) = parsed.host_str() else {
                continue;
            };
            entries.entry(host.to_string()).or_insert(page);
        }
        info!(count = entries.len(), "pool: reconstructed from open tabs");
        Ok(())
    }

    /// Drop every entry (used on transport disconnect).
    pub async fn clear(&self) {
        let mut entries = self.entries.lock().await;
        let n = entries.len();
        entries.clear();
        if n > 0 {
            info!(count = n, "pool: cleared");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Mutex as StdMutex;
    use tokio::sync::Mutex as AsyncMutex;

    struct FakePage {
        url: AsyncMutex<String>,
        closed: AtomicBool,
        fronted: AtomicBool,
    }

    impl FakePage {
        fn new(url: &str) -> Arc<dyn BrowserPage> {
            Arc::new(FakePage {
                url: AsyncMutex::new(url.to_string()),
                closed: AtomicBool::new(false),
                fronted: AtomicBool::new(false),
            })
        }
    }

    #[async_trait::async_trait]
    impl BrowserPage for FakePage {
        async fn current_url(&self) -> anyhow::Result<Option<String>> {
            if self.closed.load(Ordering::SeqCst) {
                anyhow::bail!("closed");
            }
            Ok(Some(self.url.lock().await.clone()))
        }
        async fn goto(&self, url: &str) -> anyhow::Result<()> {
            *self.url.lock().await = url.to_string();
            Ok(())
        }
        async fn wait_for_navigation(&self) -> anyhow::Result<()> {
            Ok(())
        }
        async fn wait_for_navigation_idle(&self) -> anyhow::Result<()> {
            Ok(())
        }
        async fn content(&self) -> anyhow::Result<String> {
            Ok(String::new())
        }
        async fn eval_bool(&self, _script: &str) -> anyhow::Result<bool> {
            Ok(false)
        }
        async fn eval_string(&self, _script: &str) -> anyhow::Result<Option<String>> {
            Ok(None)
        }
        async fn click(&self, _selector: &str) -> anyhow::Result<()> {
            Ok(())
        }
        async fn press_key_on(&self, _selector: &str, _key: &str) -> anyhow::Result<()> {
            Ok(())
        }
        async fn type_text(
            &self,
            _selector: &str,
            _text: &str,
            _delay: std::time::Duration,
        ) -> anyhow::Result<()> {
            Ok(())
        }
        async fn bring_to_front(&self) -> anyhow::Result<()> {
            self.fronted.store(true, Ordering::SeqCst);
            Ok(())
        }
        async fn close(&self) -> anyhow::Result<()> {
            self.closed.store(true, Ordering::SeqCst);
            Ok(())
        }
    }

    struct FakeFactory {
        next: StdMutex<Vec<Arc<dyn BrowserPage>>>,
        all: StdMutex<Vec<Arc<dyn BrowserPage>>>,
    }

    #[async_trait::async_trait]
    impl PageFactory for FakeFactory {
        async fn new_page(&self, url: &str) -> anyhow::Result<Arc<dyn BrowserPage>> {
            let mut next = self.next.lock().unwrap();
            if next.is_empty() {
                anyhow::bail!("no pages configured");
            }
            let page = next.remove(0);
            page.goto(url).await?;
            Ok(page)
        }
        async fn list_pages(&self) -> anyhow::Result<Vec<Arc<dyn BrowserPage>>> {
            Ok(self.all.lock().unwrap().clone())
        }
    }

    #[tokio::test]
    async fn acquire_creates_and_reuses() {
        let page = FakePage::new("https://example.com/");
        let factory = FakeFactory {
            next: StdMutex::new(vec![page.clone()]),
            all: StdMutex::new(vec![]),
        };
        let pool = PagePool::new();

        let p1 = pool
            .acquire("example.com", "https://example.com/", &factory, true)
            .await
            .unwrap();
        assert!(Arc::ptr_eq(&p1, &page));

        let p2 = pool
            .acquire("example.com", "https://example.com/", &factory, true)
            .await
            .unwrap();
        assert!(Arc::ptr_eq(&p2, &page));
    }

    #[tokio::test]
    async fn acquire_drops_closed_entry_and_creates_new() {
        let old = FakePage::new("https://example.com/old");
        let new = FakePage::new("https://example.com/new");
        old.close().await.unwrap();

        let pool = PagePool::new();
        // seed pool with the closed page directly
        pool.entries
            .lock()
            .await
            .insert("example.com".to_string(), old.clone());

        let factory = FakeFactory {
            next: StdMutex::new(vec![new.clone()]),
            all: StdMutex::new(vec![]),
        };

        let acquired = pool
            .acquire("example.com", "https://example.com/new", &factory, true)
            .await
            .unwrap();
        assert!(Arc::ptr_eq(&acquired, &new));
    }

    #[tokio::test]
    async fn get_evicts_closed_entry_instead_of_returning_it() {
        let page = FakePage::new("https://example.com/");
        let pool = PagePool::new();
        pool.entries
            .lock()
            .await
            .insert("example.com".to_string(), page.clone());

        page.close().await.unwrap();

        assert!(pool.get("example.com").await.is_none());
        assert!(pool.entries.lock().await.get("example.com").is_none());
    }

    #[tokio::test]
    async fn rekey_moves_entry() {
        let page = FakePage::new("https://old.com/");
        let pool = PagePool::new();
        pool.entries
            .lock()
            .await
            .insert("old.com".to_string(), page.clone());

        pool.rekey("old.com", "new.com").await;

        assert!(pool.get("old.com").await.is_none());
        assert!(pool.get("new.com").await.is_some());
    }

    #[tokio::test]
    async fn reconstruct_excludes_internal_pages() {
        let blank = FakePage::new("about:blank");
        let real = FakePage::new("https://example.com/");
        let factory = FakeFactory {
            next: StdMutex::new(vec![]),
            all: StdMutex::new(vec![blank, real]),
        };
        let pool = PagePool::new();
        pool.reconstruct(&factory).await.unwrap();

        assert!(pool.get("example.com").await.is_some());
        assert_eq!(pool.entries.lock().await.len(), 1);
    }

    #[tokio::test]
    async fn find_by_exact_url_scans_all_entries() {
        let page = FakePage::new("https://example.com/redirected");
        let pool = PagePool::new();
        pool.entries
            .lock()
            .await
            .insert("other-host.com".to_string(), page.clone());

        let found = pool.find_by_exact_url("https://example.com/redirected").await;
        assert!(found.is_some());
        assert_eq!(found.unwrap().0, "other-host.com");
    }

    #[tokio::test]
    async fn clear_empties_pool() {
        let page = FakePage::new("https://example.com/");
        let pool = PagePool::new();
        pool.entries
            .lock()
            .await
            .insert("example.com".to_string(), page);
        pool.clear().await;
        assert_eq!(pool.entries.lock().await.len(), 0);
    }
}
