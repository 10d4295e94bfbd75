//! Tool router (spec component C10): one dispatch point, enforcing the
//! §4.3 envelope invariants in exactly one place.

use super::handlers;
use crate::envelope::McpCallResponse;
use crate::session::BrowserSession;
use serde_json::{Map, Value};
use std::sync::Arc;

/// `Err` carries a JSON-RPC-level protocol error message (unknown tool
/// name); `Ok` is always a fully-formed tool envelope, success or error.
pub async fn dispatch(
    session: &Arc<BrowserSession>,
    name: &str,
    arguments: Value,
) -> Result<McpCallResponse, String> {
    let mut args = match arguments {
        Value::Object(map) => map,
        _ => Map::new(),
    };

    let response = match name {
        "fetch_webpage" => {
            if let Err(e) = handlers::fetch_webpage::resolve_url(session, &mut args) {
                return Ok(e.into_envelope());
            }
            handlers::fetch_webpage::handle(session, &args).await
        }
        "click_element" => handlers::click_element::handle(session, &args).await,
        "type_text" => handlers::type_text::handle(session, &args).await,
        "get_current_html" => handlers::get_current_html::handle(session, &args).await,
        "close_tab" => handlers::close_tab::handle(session, &args).await,
        other => return Err(format!("unknown tool: {other}")),
    };

    Ok(response)
}
