//! Runtime configuration — all env-var driven, resolved once at startup.

use std::path::PathBuf;

/// Which Chromium-family browser a [`BrowserTarget`] describes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BrowserKind {
    Chrome,
    Edge,
}

impl BrowserKind {
    pub fn label(&self) -> &'static str {
        match self {
            BrowserKind::Chrome => "chrome",
            BrowserKind::Edge => "edge",
        }
    }
}

/// Resolved connection parameters for one browser kind.
#[derive(Clone, Debug)]
pub struct BrowserTarget {
    pub kind: BrowserKind,
    pub host: String,
    pub port: u16,
    pub ws_endpoint: Option<String>,
    pub executable_override: Option<String>,
    pub user_data_dir: PathBuf,
}

#[derive(Clone, Debug)]
pub struct Config {
    pub chrome: BrowserTarget,
    pub edge: BrowserTarget,
    pub default_fetch_url: Option<String>,
}

fn env_nonempty(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn env_port(key: &str, default: u16) -> u16 {
    env_nonempty(key)
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

/// OS-conventional, vendor-scoped user-data directory for one browser.
///
/// `<data_dir>/browser-bridge-mcp/<browser>`, falling back to a relative
/// path under the current directory when the platform has no data dir —
/// never fail configuration over a missing home directory.
fn default_user_data_dir(browser: &str) -> PathBuf {
    let base = dirs::data_dir().unwrap_or_else(|| PathBuf::from("."));
    base.join("browser-bridge-mcp").join(browser)
}

impl Config {
    pub fn from_env() -> Self {
        let chrome = BrowserTarget {
            kind: BrowserKind::Chrome,
            host: env_nonempty("CHROME_REMOTE_DEBUG_HOST").unwrap_or_else(|| "127.0.0.1".into()),
            port: env_port("CHROME_REMOTE_DEBUG_PORT", 9222),
            ws_endpoint: env_nonempty("CHROME_WS_ENDPOINT"),
            executable_override: env_nonempty("CHROME_PATH"),
            user_data_dir: env_nonempty("CHROME_USER_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| default_user_data_dir("chrome")),
        };

        let edge = BrowserTarget {
            kind: BrowserKind::Edge,
            host: env_nonempty("EDGE_REMOTE_DEBUG_HOST").unwrap_or_else(|| "127.0.0.1".into()),
            port: env_port("EDGE_REMOTE_DEBUG_PORT", 9223),
            ws_endpoint: env_nonempty("EDGE_WS_ENDPOINT"),
            executable_override: env_nonempty("EDGE_PATH"),
            user_data_dir: env_nonempty("EDGE_USER_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| default_user_data_dir("edge")),
        };

        let default_fetch_url =
            env_nonempty("DEFAULT_FETCH_URL").or_else(|| env_nonempty("MCP_DEFAULT_FETCH_URL"));

        Config {
            chrome,
            edge,
            default_fetch_url,
        }
    }
}
