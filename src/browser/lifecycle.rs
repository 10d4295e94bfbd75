//! Browser discovery, launch and attach (spec component C4).
//!
//! Deliberately spawns the browser process ourselves (rather than calling
//! chromiumoxide's combined `Browser::launch`) so discovery-vs-attach stay
//! two distinct steps, matching §4.4's algorithm: probe/launch, then poll
//! `/json/version` until the CDP endpoint answers, then attach.

use crate::config::BrowserTarget;
use crate::error::BridgeError;
use chromiumoxide::Browser;
use futures::StreamExt;
use serde::Deserialize;
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, info, warn};

const POLL_INTERVAL: Duration = Duration::from_millis(500);
const LAUNCH_POLL_DEADLINE: Duration = Duration::from_secs(20);

#[derive(Deserialize)]
struct JsonVersion {
    #[serde(rename = "webSocketDebuggerUrl")]
    web_socket_debugger_url: String,
}

async fn probe_version(host: &str, port: u16) -> Option<String> {
    let url = format!("http://{host}:{port}/json/version");
    let client = reqwest::Client::builder()
        .timeout(Duration::from_millis(800))
        .build()
        .ok()?;
    let resp = client.get(&url).send().await.ok()?;
    if !resp.status().is_success() {
        return None;
    }
    resp.json::<JsonVersion>()
        .await
        .ok()
        .map(|v| v.web_socket_debugger_url)
}

#[cfg(target_os = "macos")]
fn platform_candidates(kind: crate::config::BrowserKind) -> &'static [&'static str] {
    use crate::config::BrowserKind::*;
    match kind {
        Chrome => &[
            "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
            "/Applications/Chromium.app/Contents/MacOS/Chromium",
        ],
        Edge => &["/Applications/Microsoft Edge.app/Contents/MacOS/Microsoft Edge"],
    }
}

#[cfg(target_os = "linux")]
fn platform_candidates(kind: crate::config::BrowserKind) -> &'static [&'static str] {
    use crate::config::BrowserKind::*;
    match kind {
        Chrome => &[
            "/usr/bin/google-chrome",
            "/usr/bin/google-chrome-stable",
            "/usr/bin/chromium",
            "/usr/bin/chromium-browser",
            "/usr/local/bin/chromium",
        ],
        Edge => &["/usr/bin/microsoft-edge", "/usr/bin/microsoft-edge-stable"],
    }
}

#[cfg(target_os = "windows")]
fn platform_candidates(kind: crate::config::BrowserKind) -> &'static [&'static str] {
    use crate::config::BrowserKind::*;
    match kind {
        Chrome => &[
            r"C:\Program Files\Google\Chrome\Application\chrome.exe",
            r"C:\Program Files (x86)\Google\Chrome\Application\chrome.exe",
        ],
        Edge => &[
            r"C:\Program Files (x86)\Microsoft\Edge\Application\msedge.exe",
            r"C:\Program Files\Microsoft\Edge\Application\msedge.exe",
        ],
    }
}

#[cfg(not(any(target_os = "macos", target_os = "linux", target_os = "windows")))]
fn platform_candidates(_kind: crate::config::BrowserKind) -> &'static [&'static str] {
    &[]
}

fn which_name(kind: crate::config::BrowserKind) -> &'static [&'static str] {
    use crate::config::BrowserKind::*;
    match kind {
        Chrome => &["google-chrome", "google-chrome-stable", "chromium", "chromium-browser"],
        Edge => &["microsoft-edge", "microsoft-edge-stable", "msedge"],
    }
}

/// Locate a usable executable for `target`. Resolution order: explicit
/// override -> `PATH` lookup -> platform-specific canonical install
/// locations. Returns the probed names/paths alongside `None` so callers
/// can build a diagnostic.
fn find_executable(target: &BrowserTarget) -> Result<String, Vec<String>> {
    let mut probed = Vec::new();

    if let Some(path) = &target.executable_override {
        if std::path::Path::new(path).exists() {
            return Ok(path.clone());
        }
        probed.push(path.clone());
    }

    for name in which_name(target.kind) {
        probed.push((*name).to_string());
        if let Ok(found) = which::which(name) {
            return Ok(found.to_string_lossy().to_string());
        }
    }

    for candidate in platform_candidates(target.kind) {
        probed.push((*candidate).to_string());
        if std::path::Path::new(candidate).exists() {
            return Ok((*candidate).to_string());
        }
    }

    Err(probed)
}

/// Detach the child from this process group so it outlives us (the user's
/// browser keeps running after the bridge exits).
#[cfg(unix)]
fn detach(cmd: &mut Command) {
    use std::os::unix::process::CommandExt;
    cmd.process_group(0);
}

#[cfg(windows)]
fn detach(cmd: &mut Command) {
    use std::os::windows::process::CommandExt;
    const DETACHED_PROCESS: u32 = 0x00000008;
    const CREATE_NEW_PROCESS_GROUP: u32 = 0x00000200;
    cmd.creation_flags(DETACHED_PROCESS | CREATE_NEW_PROCESS_GROUP);
}

/// Spawn `target`'s browser detached, with stdio ignored, and poll
/// `/json/version` every 500ms for up to 20s.
async fn spawn_and_wait(target: &BrowserTarget) -> Result<String, BridgeError> {
    let exe = find_executable(target).map_err(|probed| {
        BridgeError::BrowserLaunch(format!(
            "no {} executable found (probed: {})",
            target.kind.label(),
            probed.join(", ")
        ))
    })?;

    std::fs::create_dir_all(&target.user_data_dir).map_err(|e| {
        BridgeError::BrowserLaunch(format!(
            "could not create user-data-dir {}: {e}",
            target.user_data_dir.display()
        ))
    })?;

    info!(executable = %exe, port = target.port, "launching browser");

    let mut cmd = Command::new(&exe);
    cmd.arg(format!("--remote-debugging-port={}", target.port))
        .arg(format!(
            "--user-data-dir={}",
            target.user_data_dir.display()
        ))
        .arg("--no-first-run")
        .arg("--no-default-browser-check")
        .arg("--disable-sync")
        .arg("about:blank")
        .stdin(std::process::Stdio::null())
        .stdout(std::process::Stdio::null())
        .stderr(std::process::Stdio::null());
    detach(&mut cmd);
    cmd.spawn()
        .map_err(|e| BridgeError::BrowserLaunch(format!("failed to spawn {exe}: {e}")))?;

    let deadline = tokio::time::Instant::now() + LAUNCH_POLL_DEADLINE;
    loop {
        if let Some(ws) = probe_version(&target.host, target.port).await {
            return Ok(ws);
        }
        if tokio::time::Instant::now() >= deadline {
            return Err(BridgeError::BrowserLaunch(format!(
                "{} did not open its debug port within {}s (probed http://{}:{})",
                target.kind.label(),
                LAUNCH_POLL_DEADLINE.as_secs(),
                target.host,
                target.port
            )));
        }
        tokio::time::sleep(POLL_INTERVAL).await;
    }
}

/// Resolve a websocket debugger URL for `target`: explicit endpoint, else
/// an existing instance on its configured port, else launch one.
async fn resolve_ws_endpoint(target: &BrowserTarget) -> Result<String, BridgeError> {
    if let Some(ws) = &target.ws_endpoint {
        debug!(target = target.kind.label(), "using explicit ws endpoint");
        return Ok(ws.clone());
    }
    if let Some(ws) = probe_version(&target.host, target.port).await {
        debug!(target = target.kind.label(), "attached to already-running browser");
        return Ok(ws);
    }
    spawn_and_wait(target).await
}

/// The CDP connection plus the background task draining its event stream.
pub struct Connection {
    pub browser: Browser,
    pub handler_task: tokio::task::JoinHandle<()>,
}

/// Attach to `target`, discovering or launching it first if needed.
/// Uses "inherit window" viewport policy: no viewport/window-size is
/// forced on the connection, it just uses the real window.
pub async fn connect(target: &BrowserTarget) -> Result<Connection, BridgeError> {
    let ws = resolve_ws_endpoint(target).await?;
    let (browser, mut handler) = Browser::connect(ws)
        .await
        .map_err(|e| BridgeError::BrowserLaunch(format!("CDP connect failed: {e}")))?;

    let handler_task = tokio::spawn(async move {
        while let Some(event) = handler.next().await {
            if let Err(e) = event {
                warn!(error = %e, "CDP handler event error");
            }
        }
        debug!("CDP handler stream ended (browser disconnected)");
    });

    Ok(Connection {
        browser,
        handler_task,
    })
}
