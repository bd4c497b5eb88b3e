//! Response envelope returned by the service.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Status string the service uses for a successful call.
pub const STATUS_OK: &str = "OK";

/// Decoded `{ "status": ..., "result": ... }` response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    pub status: String,
    pub result: Value,
}

impl Envelope {
    pub fn ok(result: impl Into<Value>) -> Self {
        Self {
            status: STATUS_OK.to_string(),
            result: result.into(),
        }
    }

    pub fn error(status: &str, result: impl Into<Value>) -> Self {
        Self {
            status: status.to_string(),
            result: result.into(),
        }
    }

    /// Anything other than `"OK"` is a failure.
    pub fn is_ok(&self) -> bool {
        self.status == STATUS_OK
    }

    /// Classify the result for display.
    pub fn body(&self) -> ResultBody {
        match &self.result {
            Value::String(s) => ResultBody::Text(s.clone()),
            other => ResultBody::Json(other.clone()),
        }
    }
}

/// Result payload of an envelope
#[derive(Debug, Clone, PartialEq)]
pub enum ResultBody {
    /// Plain message
    Text(String),
    /// Structured value
    Json(Value),
}

impl ResultBody {
    pub fn as_json(&self) -> Option<&Value> {
        match self {
            ResultBody::Json(v) => Some(v),
            ResultBody::Text(_) => None,
        }
    }

    /// Text as-is, JSON indented by two spaces.
    pub fn to_pretty_string(&self) -> String {
        match self {
            ResultBody::Json(v) => serde_json::to_string_pretty(v).unwrap_or_default(),
            ResultBody::Text(s) => s.clone(),
        }
    }
}
