//! CANDY Board CLI - command-line client for the CANDY Board Service.
//!
//! Talks to the service daemon over its Unix socket, wraps modem calls in a
//! link suspend/resume when the modem shares the UART, and drives the
//! service unit through systemctl.

mod cli;
mod commands;
mod error;
mod logging;
mod output;
mod process;
mod settings;

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use clap::Parser;
use futures::FutureExt;

use cli::Cli;
use commands::{Dispatcher, Outcome};
use error::CliError;
use output::Presenter;
use process::SystemRunner;
use settings::Settings;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = logging::init(cli.verbose) {
        eprintln!("Failed to initialize logging: {}", e);
    }
    panic::set_hook(Box::new(|info| {
        let payload = panic_message(info.payload());
        match info.location() {
            Some(at) => tracing::error!("{}:{}: {}", at.file(), at.line(), payload),
            None => tracing::error!("{}", payload),
        }
    }));

    let settings = Settings::from_cli(&cli);
    let presenter = Presenter::new(settings.color, settings.json);
    let command = cli.command.into_command();
    let runner = SystemRunner;

    let outcome = AssertUnwindSafe(Dispatcher::new(&settings, &runner).dispatch(&command))
        .catch_unwind()
        .await
        .unwrap_or_else(|payload| Outcome::from(CliError::Unexpected(panic_message(&*payload))));

    presenter.emit_all(&outcome.messages);
    std::process::exit(outcome.code);
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "panic".to_string()
    }
}
