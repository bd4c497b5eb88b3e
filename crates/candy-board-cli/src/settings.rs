//! Runtime settings, built once from the parsed command line.

use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::time::Duration;

use candy_board_core::link::LINK_STATE_FILE;

use crate::cli::Cli;

/// Install root of the CANDY Board Service.
pub const DEFAULT_SERVICE_HOME: &str = "/opt/candy-line/candy-board-service";

/// Default bound on a service call, in milliseconds.
pub const DEFAULT_TIMEOUT_MS: u64 = 60_000;

/// Pause after suspending the link before talking to the modem.
pub const SETTLE_DELAY: Duration = Duration::from_millis(1500);

pub const SERVICE_MANAGER: &str = "systemctl";
pub const SERVICE_NAME: &str = "candy-board-service";

/// Link control script, relative to the install root.
pub const LINK_SCRIPT: &str = "bin/modem_link.sh";

/// Everything the dispatcher and presenter need to know about this run.
#[derive(Debug, Clone)]
pub struct Settings {
    pub cli_version: &'static str,
    pub socket_path: PathBuf,
    pub service_home: PathBuf,
    pub link_state_file: PathBuf,
    pub link_script: PathBuf,
    pub service_manager: String,
    pub service_name: String,
    pub timeout: Duration,
    pub settle_delay: Duration,
    pub color: bool,
    pub json: bool,
}

impl Settings {
    /// Defaults rooted at `service_home`.
    pub fn new(service_home: &Path, socket_path: &Path) -> Self {
        Self {
            cli_version: env!("CARGO_PKG_VERSION"),
            socket_path: socket_path.to_path_buf(),
            service_home: service_home.to_path_buf(),
            link_state_file: service_home.join(LINK_STATE_FILE),
            link_script: service_home.join(LINK_SCRIPT),
            service_manager: SERVICE_MANAGER.to_string(),
            service_name: SERVICE_NAME.to_string(),
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
            settle_delay: SETTLE_DELAY,
            color: false,
            json: false,
        }
    }

    pub fn from_cli(cli: &Cli) -> Self {
        let mut settings = Self::new(&cli.service_home, &cli.socket);
        settings.timeout = Duration::from_millis(cli.timeout);
        settings.json = cli.json;
        settings.color = !cli.no_color && !no_color_env() && std::io::stdout().is_terminal();
        settings
    }
}

/// `NO_COLOR` set to any non-empty value disables color.
fn no_color_env() -> bool {
    std::env::var_os("NO_COLOR").is_some_and(|v| !v.is_empty())
}
