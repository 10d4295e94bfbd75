use super::{host_of, optional_bool, required_str};
use crate::browser::interaction;
use crate::envelope::McpCallResponse;
use crate::session::BrowserSession;
use serde_json::{json, Map, Value};
use std::sync::Arc;

pub async fn handle(session: &Arc<BrowserSession>, args: &Map<String, Value>) -> McpCallResponse {
    let url = match required_str(args, "url") {
        Ok(u) => u,
        Err(e) => return e.into_envelope(),
    };
    let clean_html = optional_bool(args, "removeUnnecessaryHTML", true);

    let host = match host_of(&url) {
        Ok(h) => h,
        Err(e) => return e.into_envelope(),
    };
    let page = match interaction::require_page(session.pool(), &host).await {
        Ok(p) => p,
        Err(e) => return e.into_envelope(),
    };

    match interaction::get_current_html(page.as_ref(), clean_html).await {
        Ok(outcome) => McpCallResponse::success(
            format!("Read current HTML for {}", outcome.current_url),
            json!({
                "currentUrl": outcome.current_url,
                "html": outcome.html,
                "nextSteps": [
                    "Use click_element or type_text with this same url to interact with the page",
                ],
            }),
        ),
        Err(e) => e.into_envelope(),
    }
}
