//! The wire envelope every tool call returns (spec component C3).
//!
//! Construction-time contract, not a protocol-level one: a success envelope
//! always carries `structured_content`, an error envelope never does, and
//! `content[0].text` is always a short human summary — callers never see a
//! raw JSON dump in `text`.

use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Clone, Serialize)]
pub struct McpContent {
    #[serde(rename = "type")]
    pub content_type: String,
    pub text: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct McpCallResponse {
    pub content: Vec<McpContent>,
    #[serde(rename = "isError")]
    pub is_error: bool,
    #[serde(rename = "structuredContent", skip_serializing_if = "Option::is_none")]
    pub structured_content: Option<Value>,
}

impl McpCallResponse {
    /// Build a success envelope. `structured` must be a JSON object; the
    /// caller is responsible for including `next_steps` in it (§4.3).
    pub fn success(summary: impl Into<String>, structured: Value) -> Self {
        debug_assert!(
            structured.is_object(),
            "success structured_content must be a JSON object"
        );
        McpCallResponse {
            content: vec![McpContent {
                content_type: "text".to_string(),
                text: summary.into(),
            }],
            is_error: false,
            structured_content: Some(structured),
        }
    }

    /// Build an error envelope. `reason` becomes `"Error: {reason}"`;
    /// `suggestions` are rendered as a bulleted list beneath it.
    /// `structured_content` is always absent on error, per §4.3.
    pub fn error(reason: impl Into<String>, suggestions: &[&str]) -> Self {
        let mut text = format!("Error: {}", reason.into());
        for s in suggestions {
            text.push_str("\n- ");
            text.push_str(s);
        }
        McpCallResponse {
            content: vec![McpContent {
                content_type: "text".to_string(),
                text,
            }],
            is_error: true,
            structured_content: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_carries_structured_content() {
        let r = McpCallResponse::success("fetched example.com", serde_json::json!({"currentUrl": "https://example.com/"}));
        assert!(!r.is_error);
        assert!(r.structured_content.is_some());
        assert_eq!(r.content[0].content_type, "text");
    }

    #[test]
    fn error_has_no_structured_content_and_prefixed_text() {
        let r = McpCallResponse::error("no active page", &["call fetch_webpage first"]);
        assert!(r.is_error);
        assert!(r.structured_content.is_none());
        assert!(r.content[0].text.starts_with("Error: "));
        assert!(r.content[0].text.contains("- call fetch_webpage first"));
    }

    #[test]
    #[should_panic]
    fn success_rejects_non_object_structured_content() {
        McpCallResponse::success("oops", serde_json::json!(["not", "an", "object"]));
    }
}
