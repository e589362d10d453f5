//! JSON argument parsing helpers for tool implementations.
//!
//! ```rust
//! use mtooling::{optional_string, parse_json_object, required_string};
//!
//! let args = parse_json_object(r#"{"query":"dim sum","focus":"reviews"}"#)
//!     .expect("object should parse");
//! assert_eq!(required_string(&args, "query").expect("query"), "dim sum");
//! assert_eq!(optional_string(&args, "focus").as_deref(), Some("reviews"));
//! ```

use serde_json::{Map, Value};

use crate::ToolError;

pub type JsonObject = Map<String, Value>;

pub fn parse_json_value(args_json: &str) -> Result<Value, ToolError> {
    serde_json::from_str(args_json)
        .map_err(|err| ToolError::invalid_arguments(format!("invalid JSON arguments: {err}")))
}

/// Parses tool arguments; a blank payload is read as an empty object.
pub fn parse_json_object(args_json: &str) -> Result<JsonObject, ToolError> {
    if args_json.trim().is_empty() {
        return Ok(JsonObject::new());
    }

    match parse_json_value(args_json)? {
        Value::Object(object) => Ok(object),
        _ => Err(ToolError::invalid_arguments(
            "expected JSON object arguments",
        )),
    }
}

/// Non-blank string field, trimmed.
pub fn required_string(args: &JsonObject, key: &str) -> Result<String, ToolError> {
    optional_string(args, key)
        .ok_or_else(|| ToolError::invalid_arguments(format!("missing required string: '{key}'")))
}

pub fn optional_string(args: &JsonObject, key: &str) -> Option<String> {
    args.get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(ToString::to_string)
}

/// Accepts either a JSON array of strings or one comma/space separated string.
pub fn string_list(args: &JsonObject, key: &str) -> Vec<String> {
    let raw = match args.get(key) {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .map(ToString::to_string)
            .collect::<Vec<_>>(),
        Some(Value::String(joined)) => joined
            .split([',', ' '])
            .map(ToString::to_string)
            .collect(),
        _ => Vec::new(),
    };

    raw.into_iter()
        .map(|item| item.trim().trim_start_matches("r/").to_string())
        .filter(|item| !item.is_empty())
        .collect()
}
