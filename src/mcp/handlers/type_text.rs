use super::{host_of, interaction_next_steps, optional_bool, optional_u64, required_str};
use crate::browser::interaction::{self, TypeOptions};
use crate::envelope::McpCallResponse;
use crate::session::BrowserSession;
use serde_json::{json, Map, Value};
use std::sync::Arc;

pub async fn handle(session: &Arc<BrowserSession>, args: &Map<String, Value>) -> McpCallResponse {
    let url = match required_str(args, "url") {
        Ok(u) => u,
        Err(e) => return e.into_envelope(),
    };
    let selector = match required_str(args, "selector") {
        Ok(s) => s,
        Err(e) => return e.into_envelope(),
    };
    let text = match required_str(args, "text") {
        Ok(t) => t,
        Err(e) => return e.into_envelope(),
    };

    let host = match host_of(&url) {
        Ok(h) => h,
        Err(e) => return e.into_envelope(),
    };
    let page = match interaction::require_page(session.pool(), &host).await {
        Ok(p) => p,
        Err(e) => return e.into_envelope(),
    };

    let return_html = optional_bool(args, "returnHtml", true);
    let text_length = text.chars().count();
    let opts = TypeOptions {
        selector: selector.clone(),
        text,
        clear: optional_bool(args, "clear", true),
        delay_ms: optional_u64(args, "typeDelay", 50),
        wait_ms: optional_u64(args, "waitForElementTimeout", 5000),
        return_html,
        clean_html: optional_bool(args, "removeUnnecessaryHTML", true),
        post_wait_ms: optional_u64(args, "postTypeWait", 1000),
    };

    match interaction::type_text(page.as_ref(), opts).await {
        Ok(outcome) => {
            let mut structured = serde_json::Map::new();
            structured.insert("currentUrl".to_string(), json!(outcome.current_url));
            if let Some(html) = &outcome.html {
                structured.insert("html".to_string(), json!(html));
            }
            structured.insert("selector".to_string(), json!(selector));
            structured.insert("textLength".to_string(), json!(text_length));
            structured.insert("message".to_string(), json!("text typed"));
            structured.insert("nextSteps".to_string(), json!(interaction_next_steps()));
            McpCallResponse::success(
                format!("Typed into {selector} on {}", outcome.current_url),
                Value::Object(structured),
            )
        }
        Err(e) => e.into_envelope(),
    }
}
