//! Fixed tool catalog (spec §6 / C10). Each tool is its own schema literal
//! rather than a templated generator — the five tools are a small, fixed
//! set (§9's "tool advertisement" design note).

use serde_json::{json, Value};

#[derive(Clone, Debug)]
pub struct ToolDef {
    pub name: &'static str,
    pub description: &'static str,
    pub input_schema: Value,
}

pub fn tool_catalog() -> Vec<ToolDef> {
    vec![
        ToolDef {
            name: "fetch_webpage",
            description: "Navigate a real, already-running Chrome or Edge browser to a URL and return its rendered HTML. Use this for pages that need authentication, JavaScript rendering, or sign-in.",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "url": {"type": "string"},
                    "removeUnnecessaryHTML": {"type": "boolean", "default": true},
                    "postLoadWait": {"type": "integer", "minimum": 0, "default": 1000}
                },
                "required": ["url"],
                "additionalProperties": false
            }),
        },
        ToolDef {
            name: "click_element",
            description: "Click an element on the page previously fetched for this URL's host, identified by a CSS selector or by its visible text.",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "url": {"type": "string"},
                    "selector": {"type": "string"},
                    "text": {"type": "string"},
                    "waitForElementTimeout": {"type": "integer", "minimum": 0, "default": 1000},
                    "returnHtml": {"type": "boolean", "default": true},
                    "removeUnnecessaryHTML": {"type": "boolean", "default": true},
                    "postClickWait": {"type": "integer", "minimum": 0, "default": 1000}
                },
                "required": ["url"],
                "additionalProperties": false
            }),
        },
        ToolDef {
            name: "type_text",
            description: "Type text into an input element on the page previously fetched for this URL's host.",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "url": {"type": "string"},
                    "selector": {"type": "string"},
                    "text": {"type": "string"},
                    "clear": {"type": "boolean", "default": true},
                    "typeDelay": {"type": "integer", "minimum": 0, "default": 50},
                    "waitForElementTimeout": {"type": "integer", "minimum": 0, "default": 5000},
                    "returnHtml": {"type": "boolean", "default": true},
                    "removeUnnecessaryHTML": {"type": "boolean", "default": true},
                    "postTypeWait": {"type": "integer", "minimum": 0, "default": 1000}
                },
                "required": ["url", "selector", "text"],
                "additionalProperties": false
            }),
        },
        ToolDef {
            name: "get_current_html",
            description: "Read the current DOM of the page previously fetched for this URL's host, without navigating or interacting.",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "url": {"type": "string"},
                    "removeUnnecessaryHTML": {"type": "boolean", "default": true}
                },
                "required": ["url"],
                "additionalProperties": false
            }),
        },
        ToolDef {
            name: "close_tab",
            description: "Close the browser tab associated with this URL's host.",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "url": {"type": "string"}
                },
                "required": ["url"],
                "additionalProperties": false
            }),
        },
    ]
}
