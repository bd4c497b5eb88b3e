//! Service control through the system service manager.

use candy_board_core::protocol::Action;

use super::Outcome;
use crate::error::{CliError, Result};
use crate::output::Message;
use crate::process::ProcessRunner;
use crate::settings::Settings;

/// `systemctl status` exit code for an inactive unit.
const STATUS_INACTIVE: i32 = 3;

/// Run `<manager> <action> <service>`.
pub async fn run_service_control(
    settings: &Settings,
    runner: &dyn ProcessRunner,
    action: Action,
) -> Result<Outcome> {
    let manager = settings.service_manager.as_str();
    let service = settings.service_name.as_str();
    let command = format!("{} {} {}", manager, action, service);

    let output = runner
        .run(manager, &[action.as_str(), service])
        .await
        .map_err(|e| CliError::SubprocessFailure {
            command: command.clone(),
            code: None,
            output: e.to_string(),
        })?;

    let accepted = output.success() || (action == Action::Status && output.code == STATUS_INACTIVE);
    if !accepted {
        return Err(CliError::SubprocessFailure {
            command,
            code: Some(output.code),
            output: output.combined(),
        });
    }

    let text = if output.stdout.is_empty() {
        done_message(action, service)
    } else {
        output.stdout
    };
    Ok(Outcome::success(vec![Message::notice(text)]))
}

fn done_message(action: Action, service: &str) -> String {
    match action {
        Action::Start => format!("{} started", service),
        Action::Restart => format!("{} restarted", service),
        Action::Stop => format!("{} stopped", service),
        Action::Enable => format!("{} enabled", service),
        Action::Disable => format!("{} disabled", service),
        other => format!("{} {}", service, other),
    }
}
