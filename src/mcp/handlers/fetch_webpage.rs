use super::{optional_bool, optional_u64, required_str};
use crate::envelope::McpCallResponse;
use crate::error::BridgeError;
use crate::mcp::fetch::{self, FetchOptions};
use crate::session::BrowserSession;
use serde_json::{json, Map, Value};
use std::sync::Arc;

pub async fn handle(session: &Arc<BrowserSession>, args: &Map<String, Value>) -> McpCallResponse {
    let url = match required_str(args, "url") {
        Ok(u) => u,
        Err(e) => return e.into_envelope(),
    };
    let clean_html = optional_bool(args, "removeUnnecessaryHTML", true);
    let post_load_wait_ms = optional_u64(args, "postLoadWait", 1000);

    let result = fetch::fetch_webpage(
        session,
        &url,
        FetchOptions {
            clean_html,
            post_load_wait_ms,
        },
    )
    .await;

    match result {
        Ok(outcome) => McpCallResponse::success(
            format!("Fetched {}", outcome.current_url),
            json!({
                "currentUrl": outcome.current_url,
                "html": outcome.html,
                "nextSteps": fetch::next_steps(),
            }),
        ),
        Err(e) => e.into_envelope(),
    }
}

/// Resolve `args`'s `url`, substituting the configured fallback when
/// absent (§4.10 — the router's one special case).
pub fn resolve_url(
    session: &BrowserSession,
    args: &mut Map<String, Value>,
) -> Result<(), BridgeError> {
    let has_url = args
        .get("url")
        .and_then(Value::as_str)
        .map(|s| !s.trim().is_empty())
        .unwrap_or(false);
    if has_url {
        return Ok(());
    }
    match &session.config().default_fetch_url {
        Some(default_url) => {
            args.insert("url".to_string(), json!(default_url));
            Ok(())
        }
        None => Err(BridgeError::InvalidArgument(
            "url is required (no DEFAULT_FETCH_URL/MCP_DEFAULT_FETCH_URL configured)".to_string(),
        )),
    }
}
