pub mod click_element;
pub mod close_tab;
pub mod fetch_webpage;
pub mod get_current_html;
pub mod type_text;

use crate::error::BridgeError;
use serde_json::{Map, Value};
use url::Url;

pub(crate) fn required_str(args: &Map<String, Value>, field: &str) -> Result<String, BridgeError> {
    match args.get(field).and_then(Value::as_str) {
        Some(s) if !s.trim().is_empty() => Ok(s.to_string()),
        _ => Err(BridgeError::InvalidArgument(format!(
            "{field} is required"
        ))),
    }
}

pub(crate) fn optional_bool(args: &Map<String, Value>, field: &str, default: bool) -> bool {
    args.get(field).and_then(Value::as_bool).unwrap_or(default)
}

pub(crate) fn optional_u64(args: &Map<String, Value>, field: &str, default: u64) -> u64 {
    args.get(field).and_then(Value::as_u64).unwrap_or(default)
}

pub(crate) fn host_of(url: &str) -> Result<String, BridgeError> {
    let parsed = Url::parse(url)
        .map_err(|e| BridgeError::InvalidArgument(format!("invalid url {url:?}: {e}")))?;
    parsed
        .host_str()
        .map(str::to_string)
        .ok_or_else(|| BridgeError::InvalidArgument(format!("url has no host: {url}")))
}

/// The fixed next-step suggestions carried by interaction-tool successes.
pub(crate) fn interaction_next_steps() -> Vec<&'static str> {
    vec![
        "Call get_current_html with this url to inspect the resulting page",
        "Call close_tab with this url when you are done with the page",
    ]
}
