//! Command dispatch.
//!
//! Every invocation goes through [`Dispatcher::dispatch`], which picks one of
//! three strategies for the parsed [`Command`]:
//!
//! - direct remote call over the service socket,
//! - remote call wrapped by a link suspend/resume (UART modems, GNSS),
//! - local service control through `systemctl`.
//!
//! All failures are turned into an [`Outcome`] here; nothing escapes as an
//! error.

mod link;
mod remote;
mod service;
mod version;

use candy_board_core::link::{Attachment, LinkProbe};
use candy_board_core::protocol::{Action, Category, Command, ResultBody};
use candy_board_core::transport::Transport;

use crate::error::{exit_codes, CliError, Result};
use crate::output::{Message, Severity};
use crate::process::ProcessRunner;
use crate::settings::Settings;

/// Exit code plus whatever should be shown to the user.
#[derive(Debug, Clone, PartialEq)]
pub struct Outcome {
    pub code: i32,
    pub messages: Vec<Message>,
}

impl Outcome {
    pub fn success(messages: Vec<Message>) -> Self {
        Self {
            code: exit_codes::SUCCESS,
            messages,
        }
    }
}

impl From<CliError> for Outcome {
    fn from(err: CliError) -> Self {
        let code = err.exit_code();
        let severity = if err.is_warning() {
            Severity::Warn
        } else {
            Severity::Error
        };

        if !matches!(err, CliError::RemoteFailure(_)) {
            tracing::debug!(code, "Command failed: {:?}", err);
        }

        let body = match err {
            CliError::RemoteFailure(body) => body,
            other => ResultBody::Text(other.to_string()),
        };

        Self {
            code,
            messages: vec![Message::new(severity, body)],
        }
    }
}

/// How a command is executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Answered by the CLI itself.
    Local,
    /// Sent to the service over its socket.
    Remote,
    /// Handed to the service manager.
    ServiceControl,
    /// Not a known category/action pair.
    Unsupported,
}

/// Route a command by category and action.
pub fn plan(command: &Command) -> Strategy {
    use Action::*;

    match (command.category, command.action) {
        (Category::Version, _) => Strategy::Local,
        (Category::Service, Version) => Strategy::Remote,
        (Category::Service, Start | Restart | Stop | Enable | Disable | Status) => {
            Strategy::ServiceControl
        }
        (Category::Apn, Ls | Set | Del)
        | (Category::Network, Show | Register | Deregister)
        | (Category::Sim, Show)
        | (Category::Modem, Show | Reset)
        | (Category::Connection, Status | Suspend | Resume)
        | (Category::Gnss, Start | Stop | Status | Locate) => Strategy::Remote,
        _ => Strategy::Unsupported,
    }
}

/// Whether the command cares which way the modem is attached.
pub fn is_link_relevant(command: &Command) -> bool {
    command.category == Category::Gnss || command.suspend || command.resume
}

/// Runs one command against the service.
pub struct Dispatcher<'a> {
    settings: &'a Settings,
    transport: Transport,
    probe: LinkProbe,
    runner: &'a dyn ProcessRunner,
}

impl<'a> Dispatcher<'a> {
    pub fn new(settings: &'a Settings, runner: &'a dyn ProcessRunner) -> Self {
        Self {
            settings,
            transport: Transport::new(&settings.socket_path, settings.timeout),
            probe: LinkProbe::new(&settings.link_state_file),
            runner,
        }
    }

    /// Execute `command` and normalize the result.
    pub async fn dispatch(&self, command: &Command) -> Outcome {
        match self.execute(command).await {
            Ok(outcome) => outcome,
            Err(err) => Outcome::from(err),
        }
    }

    async fn execute(&self, command: &Command) -> Result<Outcome> {
        if !self.settings.service_home.is_dir() {
            return Err(CliError::ServiceMissing {
                home: self.settings.service_home.clone(),
            });
        }

        if command.category == Category::Modem && command.action == Action::Reset && !command.yes {
            return Err(CliError::PreconditionDeclined(
                "Modem reset erases its settings. Add --yes to confirm".to_string(),
            ));
        }

        let strategy = plan(command);
        tracing::debug!(command = %command.label(), ?strategy, "Dispatching");

        match strategy {
            Strategy::Local => Ok(version::run_version(self.settings, &self.transport)),
            Strategy::ServiceControl => {
                service::run_service_control(self.settings, self.runner, command.action).await
            }
            Strategy::Remote => {
                if !self.transport.is_available() {
                    return Err(CliError::ServiceUnavailable);
                }

                if is_link_relevant(command) && self.probe.attachment() == Attachment::Uart {
                    remote::run_wrapped(&self.transport, &self.link_script(), self.settings, command)
                        .await
                } else {
                    remote::run_direct(&self.transport, command).await
                }
            }
            Strategy::Unsupported => Err(CliError::Unsupported(command.label())),
        }
    }

    fn link_script(&self) -> link::LinkScript<'_> {
        link::LinkScript::new(&self.settings.link_script, self.runner)
    }
}

#[cfg(test)]
mod tests;
