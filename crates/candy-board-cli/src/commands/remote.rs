//! Remote calls over the service socket.

use candy_board_core::protocol::{Category, Command};
use candy_board_core::transport::Transport;

use super::link::{LinkScript, ScriptOutcome};
use super::Outcome;
use crate::error::{CliError, Result};
use crate::output::{Message, Severity};
use crate::settings::Settings;

/// One request, one reply.
pub async fn run_direct(transport: &Transport, command: &Command) -> Result<Outcome> {
    let envelope = match transport.perform(command).await? {
        Some(envelope) => envelope,
        None => return Ok(Outcome::success(Vec::new())),
    };

    if envelope.is_ok() {
        Ok(Outcome::success(vec![Message::new(
            Severity::Notice,
            envelope.body(),
        )]))
    } else {
        tracing::debug!(status = %envelope.status, "Service reported failure");
        Err(CliError::RemoteFailure(envelope.body()))
    }
}

/// Remote call with the modem link suspended around it.
///
/// A failed suspend aborts before anything is sent. The resume result is
/// appended to the messages but never changes the exit code.
pub async fn run_wrapped(
    transport: &Transport,
    script: &LinkScript<'_>,
    settings: &Settings,
    command: &Command,
) -> Result<Outcome> {
    let always = command.category == Category::Gnss;
    let mut messages = Vec::new();

    if always || command.suspend {
        match script.suspend().await? {
            ScriptOutcome::Changed => {
                tracing::debug!(delay = ?settings.settle_delay, "Link suspended, settling");
                tokio::time::sleep(settings.settle_delay).await;
            }
            ScriptOutcome::Unchanged => tracing::debug!("Link already suspended"),
            ScriptOutcome::TimedOut(code) => messages.push(Message::warn(format!(
                "Timed out suspending the modem link (code {}), continuing",
                code
            ))),
        }
    }

    let mut outcome = match run_direct(transport, command).await {
        Ok(outcome) => outcome,
        Err(err) => Outcome::from(err),
    };

    if always || command.resume {
        let resumed = match script.resume().await {
            Ok(ScriptOutcome::Changed) => Message::notice("Modem link resumed"),
            Ok(ScriptOutcome::Unchanged) => Message::notice("Modem link already running"),
            Ok(ScriptOutcome::TimedOut(code)) => Message::warn(format!(
                "Timed out resuming the modem link (code {})",
                code
            )),
            Err(err) => Message::warn(err.to_string()),
        };
        outcome.messages.push(resumed);
    }

    messages.append(&mut outcome.messages);
    outcome.messages = messages;
    Ok(outcome)
}
