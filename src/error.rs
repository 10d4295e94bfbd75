//! Typed error taxonomy (§7), kept separate from the `anyhow::Error`
//! glue used inside orchestration code — `thiserror` for the domain
//! enum, `anyhow` for plumbing at the edges.

use crate::envelope::McpCallResponse;

#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("no active page for {host}")]
    NoActivePage { host: String },

    #[error("failed to launch browser: {0}")]
    BrowserLaunch(String),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("navigation failed: {0}")]
    Navigation(String),

    #[error("authentication wait timed out at {current_url}")]
    AuthTimeout { current_url: String },

    #[error("element not found: {0}")]
    ElementNotFound(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl BridgeError {
    /// Construct the §4.3 error envelope for this error. Every variant
    /// names the most actionable next step a caller can take.
    pub fn into_envelope(self) -> McpCallResponse {
        match self {
            BridgeError::InvalidArgument(msg) => {
                McpCallResponse::error(msg, &["check the tool's required and optional fields"])
            }
            BridgeError::NoActivePage { host } => McpCallResponse::error(
                format!("no open tab for {host}"),
                &["call fetch_webpage for this URL first"],
            ),
            BridgeError::BrowserLaunch(detail) => McpCallResponse::error(
                format!("could not launch or attach to a browser: {detail}"),
                &[
                    "set CHROME_PATH or EDGE_PATH to an installed browser executable",
                    "or start the browser yourself with --remote-debugging-port",
                ],
            ),
            BridgeError::Transport(detail) => McpCallResponse::error(
                format!("browser connection was lost: {detail}"),
                &["retry the call; a fresh browser session will be started"],
            ),
            BridgeError::Navigation(detail) => McpCallResponse::error(
                format!("navigation did not complete: {detail}"),
                &["retry, or verify the URL is reachable"],
            ),
            BridgeError::AuthTimeout { current_url } => McpCallResponse::error(
                format!("sign-in was not completed in time; page is still at {current_url}"),
                &["finish signing in in the open browser tab, then retry the call"],
            ),
            BridgeError::ElementNotFound(detail) => McpCallResponse::error(
                format!("no matching element: {detail}"),
                &["re-check the selector or text, or call get_current_html to inspect the page"],
            ),
            BridgeError::Internal(detail) => {
                McpCallResponse::error(format!("internal error: {detail}"), &["retry the call"])
            }
        }
    }
}
