use super::{host_of, required_str};
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
    let host = match host_of(&url) {
        Ok(h) => h,
        Err(e) => return e.into_envelope(),
    };

    match interaction::close_tab(session.pool(), &host, &url).await {
        Ok(true) => McpCallResponse::success(
            format!("Closed tab for {host}"),
            json!({
                "message": format!("closed tab for {host}"),
                "hostname": host,
                "nextSteps": [
                    "Call fetch_webpage to open a new page when needed",
                ],
            }),
        ),
        Ok(false) => McpCallResponse::success(
            format!("No tab found for {host}"),
            json!({
                "message": format!("no tab found for hostname {host}"),
                "hostname": host,
                "nextSteps": [
                    "Call fetch_webpage to open a new page when needed",
                ],
            }),
        ),
        Err(e) => e.into_envelope(),
    }
}
