//! Command records sent to the CANDY Board Service.
//!
//! A command is built once per invocation and serialized verbatim as a flat
//! JSON object: `category`, `action`, plus the optional fields that apply to
//! the chosen action. Unset fields and `false` flags are left out.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Top-level command groups understood by the CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Version,
    Apn,
    Network,
    Sim,
    Modem,
    Service,
    Connection,
    Gnss,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Version => "version",
            Category::Apn => "apn",
            Category::Network => "network",
            Category::Sim => "sim",
            Category::Modem => "modem",
            Category::Service => "service",
            Category::Connection => "connection",
            Category::Gnss => "gnss",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Actions across all categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Ls,
    Set,
    Del,
    Show,
    Register,
    Deregister,
    Reset,
    Version,
    Start,
    Restart,
    Stop,
    Enable,
    Disable,
    Status,
    Suspend,
    Resume,
    Locate,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Ls => "ls",
            Action::Set => "set",
            Action::Del => "del",
            Action::Show => "show",
            Action::Register => "register",
            Action::Deregister => "deregister",
            Action::Reset => "reset",
            Action::Version => "version",
            Action::Start => "start",
            Action::Restart => "restart",
            Action::Stop => "stop",
            Action::Enable => "enable",
            Action::Disable => "disable",
            Action::Status => "status",
            Action::Suspend => "suspend",
            Action::Resume => "resume",
            Action::Locate => "locate",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn is_false(flag: &bool) -> bool {
    !*flag
}

/// A single request to the service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Command {
    pub category: Category,
    pub action: Action,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operator: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,

    #[serde(default, skip_serializing_if = "is_false")]
    pub suspend: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub resume: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub auto: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub yes: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub qzss: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub all: bool,
}

impl Command {
    pub fn new(category: Category, action: Action) -> Self {
        Self {
            category,
            action,
            name: None,
            user_id: None,
            password: None,
            operator: None,
            id: None,
            format: None,
            suspend: false,
            resume: false,
            auto: false,
            yes: false,
            qzss: false,
            all: false,
        }
    }

    /// The local `version` command. Never sent on the wire.
    pub fn version() -> Self {
        Self::new(Category::Version, Action::Show)
    }

    // ==================== Optional fields ====================

    pub fn with_name(mut self, name: Option<String>) -> Self {
        self.name = name;
        self
    }

    pub fn with_user_id(mut self, user_id: Option<String>) -> Self {
        self.user_id = user_id;
        self
    }

    pub fn with_password(mut self, password: Option<String>) -> Self {
        self.password = password;
        self
    }

    pub fn with_operator(mut self, operator: Option<String>) -> Self {
        self.operator = operator;
        self
    }

    pub fn with_id(mut self, id: Option<String>) -> Self {
        self.id = id;
        self
    }

    pub fn with_format(mut self, format: Option<String>) -> Self {
        self.format = format;
        self
    }

    // ==================== Flags ====================

    /// Suspend and/or resume the modem link around the call.
    pub fn with_link_control(mut self, suspend: bool, resume: bool) -> Self {
        self.suspend = suspend;
        self.resume = resume;
        self
    }

    pub fn with_auto(mut self, auto: bool) -> Self {
        self.auto = auto;
        self
    }

    pub fn with_yes(mut self, yes: bool) -> Self {
        self.yes = yes;
        self
    }

    pub fn with_qzss(mut self, qzss: bool) -> Self {
        self.qzss = qzss;
        self
    }

    pub fn with_all(mut self, all: bool) -> Self {
        self.all = all;
        self
    }

    /// `category action`, as typed on the command line.
    pub fn label(&self) -> String {
        format!("{} {}", self.category, self.action)
    }
}
