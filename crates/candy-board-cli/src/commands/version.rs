use candy_board_core::transport::Transport;

use super::Outcome;
use crate::output::Message;
use crate::settings::Settings;

/// Print the CLI version. Never connects.
pub fn run_version(settings: &Settings, transport: &Transport) -> Outcome {
    let mut messages = vec![Message::notice(settings.cli_version)];
    if !transport.is_available() {
        messages.push(Message::warn("CANDY Board Service daemon is not running"));
    }
    Outcome::success(messages)
}
