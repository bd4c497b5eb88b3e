//! Output formatting for CLI results.

pub mod json;
pub mod text;

pub use json::JsonOutput;
pub use text::TextOutput;

use candy_board_core::protocol::ResultBody;

/// Message severity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Notice,
    Warn,
    Error,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Notice => "notice",
            Severity::Warn => "warn",
            Severity::Error => "error",
        }
    }
}

/// A line (or block) of output for the user.
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    pub severity: Severity,
    pub body: ResultBody,
}

impl Message {
    pub fn new(severity: Severity, body: ResultBody) -> Self {
        Self { severity, body }
    }

    pub fn notice(text: impl Into<String>) -> Self {
        Self::new(Severity::Notice, ResultBody::Text(text.into()))
    }

    pub fn warn(text: impl Into<String>) -> Self {
        Self::new(Severity::Warn, ResultBody::Text(text.into()))
    }
}

/// Output formatter trait
pub trait OutputFormatter {
    /// Format one message for display
    fn format_message(&self, message: &Message) -> String;
}

/// Get the appropriate formatter based on JSON flag
pub fn get_formatter(json: bool, color: bool) -> Box<dyn OutputFormatter> {
    if json {
        Box::new(JsonOutput::new())
    } else {
        Box::new(TextOutput::new(color))
    }
}

/// Prints messages: notices to stdout, warnings and errors to stderr.
pub struct Presenter {
    formatter: Box<dyn OutputFormatter>,
}

impl Presenter {
    pub fn new(color: bool, json: bool) -> Self {
        Self {
            formatter: get_formatter(json, color),
        }
    }

    pub fn emit(&self, message: &Message) {
        let rendered = self.formatter.format_message(message);
        match message.severity {
            Severity::Notice => println!("{}", rendered),
            Severity::Warn | Severity::Error => eprintln!("{}", rendered),
        }
    }

    pub fn emit_all(&self, messages: &[Message]) {
        for message in messages {
            self.emit(message);
        }
    }
}
