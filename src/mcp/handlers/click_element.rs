use super::{host_of, interaction_next_steps, optional_bool, optional_u64, required_str};
use crate::browser::interaction::{self, ClickOptions};
use crate::envelope::McpCallResponse;
use crate::error::BridgeError;
use crate::session::BrowserSession;
use serde_json::{json, Map, Value};
use std::sync::Arc;

pub async fn handle(session: &Arc<BrowserSession>, args: &Map<String, Value>) -> McpCallResponse {
    let url = match required_str(args, "url") {
        Ok(u) => u,
        Err(e) => return e.into_envelope(),
    };
    let selector = args
        .get("selector")
        .and_then(Value::as_str)
        .map(str::to_string);
    let text = args.get("text").and_then(Value::as_str).map(str::to_string);
    if selector.is_none() && text.is_none() {
        return BridgeError::InvalidArgument(
            "one of selector or text is required".to_string(),
        )
        .into_envelope();
    }

    let host = match host_of(&url) {
        Ok(h) => h,
        Err(e) => return e.into_envelope(),
    };
    let page = match interaction::require_page(session.pool(), &host).await {
        Ok(p) => p,
        Err(e) => return e.into_envelope(),
    };

    let opts = ClickOptions {
        selector,
        text,
        wait_ms: optional_u64(args, "waitForElementTimeout", 1000),
        return_html: optional_bool(args, "returnHtml", true),
        clean_html: optional_bool(args, "removeUnnecessaryHTML", true),
        post_wait_ms: optional_u64(args, "postClickWait", 1000),
    };

    match interaction::click(page.as_ref(), opts).await {
        Ok(outcome) => McpCallResponse::success(
            format!("Clicked element on {}", outcome.current_url),
            json!({
                "currentUrl": outcome.current_url,
                "message": "element clicked",
                "html": outcome.html,
                "nextSteps": interaction_next_steps(),
            }),
        ),
        Err(e) => e.into_envelope(),
    }
}
