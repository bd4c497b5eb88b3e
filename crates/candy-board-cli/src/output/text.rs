//! Human-readable, optionally colored output.

use colored::*;

use super::{Message, OutputFormatter, Severity};

pub struct TextOutput {
    color: bool,
}

impl TextOutput {
    pub fn new(color: bool) -> Self {
        Self { color }
    }

    fn prefix(severity: Severity) -> &'static str {
        match severity {
            Severity::Notice => "",
            Severity::Warn => "[WARN] ",
            Severity::Error => "[ERROR] ",
        }
    }
}

impl Default for TextOutput {
    fn default() -> Self {
        Self::new(false)
    }
}

impl OutputFormatter for TextOutput {
    fn format_message(&self, message: &Message) -> String {
        let text = format!(
            "{}{}",
            Self::prefix(message.severity),
            message.body.to_pretty_string()
        );

        if !self.color {
            return text;
        }

        match message.severity {
            Severity::Notice => text.green().to_string(),
            Severity::Warn => text.yellow().to_string(),
            Severity::Error => text.red().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use candy_board_core::protocol::ResultBody;
    use serde_json::json;

    fn error(text: &str) -> Message {
        Message::new(Severity::Error, ResultBody::Text(text.to_string()))
    }

    #[test]
    fn test_plain_prefixes() {
        let out = TextOutput::new(false);
        assert_eq!(out.format_message(&Message::notice("done")), "done");
        assert_eq!(out.format_message(&Message::warn("careful")), "[WARN] careful");
        assert_eq!(out.format_message(&error("failed")), "[ERROR] failed");
    }

    #[test]
    fn test_structured_body_is_indented() {
        let out = TextOutput::new(false);
        let message = Message::new(
            Severity::Notice,
            ResultBody::Json(json!({"apns": [{"apn": "soracom.io"}]})),
        );
        assert_eq!(
            out.format_message(&message),
            "{\n  \"apns\": [\n    {\n      \"apn\": \"soracom.io\"\n    }\n  ]\n}"
        );
    }

    #[test]
    fn test_color_wraps_text() {
        colored::control::set_override(true);
        let out = TextOutput::new(true);
        let rendered = out.format_message(&error("failed"));
        assert!(rendered.contains("[ERROR] failed"));
        assert!(rendered.starts_with("\u{1b}["));
        colored::control::unset_override();
    }
}
