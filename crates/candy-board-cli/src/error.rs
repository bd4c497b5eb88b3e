//! Error types for the CANDY Board CLI.
//!
//! CliError wraps the core transport errors and adds CLI-specific variants.
//! Every variant maps to a process exit code.

use std::path::PathBuf;

use candy_board_core::error::{ProtocolError, TransportError};
use candy_board_core::protocol::ResultBody;
use thiserror::Error;

/// Exit codes for the CLI
pub mod exit_codes {
    pub const SUCCESS: i32 = 0;
    /// Local precondition failed: service absent, declined, timeout, subprocess.
    pub const PRECONDITION: i32 = 1;
    /// The service answered with a non-OK status.
    pub const REMOTE_FAILURE: i32 = 2;
}

/// Main error type for the CLI
#[derive(Error, Debug)]
pub enum CliError {
    #[error("CANDY Board Service is missing ({})", home.display())]
    ServiceMissing { home: PathBuf },

    #[error("CANDY Board Service is not running")]
    ServiceUnavailable,

    #[error("Permission denied on {}. Try again with sudo", path.display())]
    PermissionDenied { path: PathBuf },

    #[error("Timed out after {0} ms waiting for CANDY Board Service")]
    Timeout(u128),

    #[error("{}", .0.to_pretty_string())]
    RemoteFailure(ResultBody),

    #[error("`{command}` failed{}", subprocess_detail(*code, output))]
    SubprocessFailure {
        command: String,
        code: Option<i32>,
        output: String,
    },

    #[error("{0}")]
    PreconditionDeclined(String),

    #[error("{}", describe_io(.0))]
    Io(std::io::Error),

    #[error("Protocol error: {0}")]
    Protocol(ProtocolError),

    #[error("Unsupported command: {0}")]
    Unsupported(String),

    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

impl CliError {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::ServiceMissing { .. } => exit_codes::PRECONDITION,
            CliError::ServiceUnavailable => exit_codes::PRECONDITION,
            CliError::PermissionDenied { .. } => exit_codes::PRECONDITION,
            CliError::Timeout(_) => exit_codes::PRECONDITION,
            CliError::RemoteFailure(_) => exit_codes::REMOTE_FAILURE,
            CliError::SubprocessFailure { .. } => exit_codes::PRECONDITION,
            CliError::PreconditionDeclined(_) => exit_codes::PRECONDITION,
            CliError::Io(e) => e.raw_os_error().unwrap_or(exit_codes::PRECONDITION),
            CliError::Protocol(ProtocolError::Io(e)) => {
                e.raw_os_error().unwrap_or(exit_codes::PRECONDITION)
            }
            CliError::Protocol(_) => exit_codes::PRECONDITION,
            CliError::Unsupported(_) => exit_codes::PRECONDITION,
            CliError::Unexpected(_) => exit_codes::PRECONDITION,
        }
    }

    /// Warnings are failures the user chose, not faults.
    pub fn is_warning(&self) -> bool {
        matches!(self, CliError::PreconditionDeclined(_))
    }
}

impl From<TransportError> for CliError {
    fn from(e: TransportError) -> Self {
        match e {
            TransportError::ServiceUnavailable { .. } => CliError::ServiceUnavailable,
            TransportError::PermissionDenied { path } => CliError::PermissionDenied { path },
            TransportError::Timeout(d) => CliError::Timeout(d.as_millis()),
            TransportError::Io(e) => CliError::Io(e),
            TransportError::Protocol(ProtocolError::Io(e)) => CliError::Io(e),
            TransportError::Protocol(e) => CliError::Protocol(e),
        }
    }
}

fn subprocess_detail(code: Option<i32>, output: &str) -> String {
    let mut detail = String::new();
    if let Some(code) = code {
        detail.push_str(&format!(" (exit {})", code));
    }
    if !output.is_empty() {
        detail.push_str(": ");
        detail.push_str(output);
    }
    detail
}

/// `ECONNRESET: Connection reset by peer (os error 104)`
fn describe_io(e: &std::io::Error) -> String {
    match e.raw_os_error().and_then(errno_name) {
        Some(name) => format!("{}: {}", name, e),
        None => format!("IO error: {}", e),
    }
}

/// Symbolic name of the errno values a socket or process call can produce.
pub fn errno_name(code: i32) -> Option<&'static str> {
    let name = match code {
        libc::EPERM => "EPERM",
        libc::ENOENT => "ENOENT",
        libc::EINTR => "EINTR",
        libc::EIO => "EIO",
        libc::EBADF => "EBADF",
        libc::EAGAIN => "EAGAIN",
        libc::ENOMEM => "ENOMEM",
        libc::EACCES => "EACCES",
        libc::EEXIST => "EEXIST",
        libc::ENOTDIR => "ENOTDIR",
        libc::EINVAL => "EINVAL",
        libc::ENFILE => "ENFILE",
        libc::EMFILE => "EMFILE",
        libc::ENOSPC => "ENOSPC",
        libc::EROFS => "EROFS",
        libc::EPIPE => "EPIPE",
        libc::ENOTSOCK => "ENOTSOCK",
        libc::EADDRINUSE => "EADDRINUSE",
        libc::ENETDOWN => "ENETDOWN",
        libc::ECONNABORTED => "ECONNABORTED",
        libc::ECONNRESET => "ECONNRESET",
        libc::ENOBUFS => "ENOBUFS",
        libc::ENOTCONN => "ENOTCONN",
        libc::ETIMEDOUT => "ETIMEDOUT",
        libc::ECONNREFUSED => "ECONNREFUSED",
        _ => return None,
    };
    Some(name)
}

/// Result type for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;
