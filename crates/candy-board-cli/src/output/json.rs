//! JSON-formatted output for CLI.

use serde::Serialize;
use serde_json::{json, Value};

use candy_board_core::protocol::ResultBody;

use super::{Message, OutputFormatter};

pub struct JsonOutput;

impl JsonOutput {
    pub fn new() -> Self {
        Self
    }

    fn to_json<T: Serialize>(value: &T) -> String {
        serde_json::to_string(value).unwrap_or_else(|_| "{}".to_string())
    }
}

impl Default for JsonOutput {
    fn default() -> Self {
        Self::new()
    }
}

impl OutputFormatter for JsonOutput {
    fn format_message(&self, message: &Message) -> String {
        let result = match &message.body {
            ResultBody::Text(s) => Value::String(s.clone()),
            ResultBody::Json(v) => v.clone(),
        };

        Self::to_json(&json!({
            "level": message.severity.as_str(),
            "result": result
        }))
    }
}
