//! The process-wide `BrowserSession` actor (§3's "global mutables become a
//! single value owned by the process actor" note): one cached browser
//! handle, one page pool, one launch-coalescing lock.

use crate::browser::cdp::CdpPage;
use crate::browser::lifecycle::{self, Connection};
use crate::browser::page::BrowserPage;
use crate::browser::pool::{PageFactory, PagePool};
use crate::config::{BrowserKind, Config};
use crate::error::BridgeError;
use anyhow::Context;
use async_trait::async_trait;
use chromiumoxide::Browser;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{info, warn};

/// Adapts `chromiumoxide::Browser` to [`PageFactory`].
pub struct BrowserFactory(Browser);

#[async_trait]
impl PageFactory for BrowserFactory {
    async fn new_page(&self, url: &str) -> anyhow::Result<Arc<dyn BrowserPage>> {
        let page = self.0.new_page(url).await.context("creating new page")?;
        Ok(Arc::new(CdpPage(page)))
    }

    async fn list_pages(&self) -> anyhow::Result<Vec<Arc<dyn BrowserPage>>> {
        let pages = self.0.pages().await.context("listing open pages")?;
        Ok(pages
            .into_iter()
            .map(|p| Arc::new(CdpPage(p)) as Arc<dyn BrowserPage>)
            .collect())
    }
}

struct Active {
    id: u64,
    kind: BrowserKind,
    factory: Arc<BrowserFactory>,
}

pub struct BrowserSession {
    config: Config,
    active: Mutex<Option<Active>>,
    pool: PagePool,
    next_id: AtomicU64,
}

impl BrowserSession {
    pub fn new(config: Config) -> Arc<Self> {
        Arc::new(BrowserSession {
            config,
            active: Mutex::new(None),
            pool: PagePool::new(),
            next_id: AtomicU64::new(0),
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn pool(&self) -> &PagePool {
        &self.pool
    }

    /// Get-or-create the active browser connection. The mutex is held for
    /// the entire discover/launch/attach duration, so concurrent callers
    /// coalesce onto one outcome and only one child process is ever
    /// spawned (§4.4).
    pub async fn ensure_browser(self: &Arc<Self>) -> Result<Arc<BrowserFactory>, BridgeError> {
        let mut guard = self.active.lock().await;
        if let Some(active) = guard.as_ref() {
            return Ok(active.factory.clone());
        }

        let (connection, kind) = self.connect_ordered().await?;
        let factory = Arc::new(BrowserFactory(connection.browser));
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);

        self.pool
            .reconstruct(factory.as_ref())
            .await
            .map_err(|e| BridgeError::Transport(format!("failed to reconstruct tab pool: {e}")))?;

        *guard = Some(Active {
            id,
            kind,
            factory: factory.clone(),
        });
        drop(guard);

        self.spawn_disconnect_observer(id, connection.handler_task);
        info!(browser = kind.label(), "attached to browser");
        Ok(factory)
    }

    /// Chrome first, then Edge, as a single ordered probe (§4.4 /
    /// SPEC_FULL.md's `BrowserKind` note) — whichever attaches or launches
    /// successfully becomes the active browser for the life of the
    /// process, or until it disconnects.
    async fn connect_ordered(&self) -> Result<(Connection, BrowserKind), BridgeError> {
        match lifecycle::connect(&self.config.chrome).await {
            Ok(conn) => return Ok((conn, BrowserKind::Chrome)),
            Err(e) => warn!(error = %e, "chrome attach/launch failed, falling back to edge"),
        }
        let conn = lifecycle::connect(&self.config.edge).await?;
        Ok((conn, BrowserKind::Edge))
    }

    /// When the CDP event stream ends, the browser went away. Clear the
    /// cached handle and pool so the next call re-triggers discovery,
    /// but only if nothing has already replaced this generation.
    fn spawn_disconnect_observer(
        self: &Arc<Self>,
        id: u64,
        handler_task: tokio::task::JoinHandle<()>,
    ) {
        let session = self.clone();
        tokio::spawn(async move {
            let _ = handler_task.await;
            let mut guard = session.active.lock().await;
            if matches!(guard.as_ref(), Some(a) if a.id == id) {
                warn!("browser connection lost, clearing session state");
                *guard = None;
                drop(guard);
                session.pool.clear().await;
            }
        });
    }

    /// Ensure a browser is attached, then acquire a pooled page for `host`.
    pub async fn acquire_page(
        self: &Arc<Self>,
        host: &str,
        url: &str,
        reuse: bool,
    ) -> Result<Arc<dyn BrowserPage>, BridgeError> {
        let factory = self.ensure_browser().await?;
        self.pool
            .acquire(host, url, factory.as_ref(), reuse)
            .await
            .map_err(|e| BridgeError::Transport(e.to_string()))
    }
}
