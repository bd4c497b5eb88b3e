//! One-shot Unix socket client for the CANDY Board Service.
//!
//! Each call opens a fresh connection, writes one request frame, reads one
//! response frame and closes the connection.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};
use tokio::net::UnixStream;
use tokio::time::timeout;

use crate::error::TransportError;
use crate::protocol::codec;
use crate::protocol::{Command, Envelope};

/// Default location of the service socket.
pub const DEFAULT_SOCKET_PATH: &str = "/var/run/candy-board-service.sock";

/// Default bound on a whole request/response exchange.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Client for a single request/response exchange with the service.
#[derive(Debug, Clone)]
pub struct Transport {
    socket_path: PathBuf,
    timeout: Duration,
}

impl Transport {
    pub fn new(socket_path: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            socket_path: socket_path.into(),
            timeout,
        }
    }

    pub fn socket_path(&self) -> &Path {
        &self.socket_path
    }

    /// Whether the socket file exists. Does not connect.
    pub fn is_available(&self) -> bool {
        self.socket_path.exists()
    }

    /// Send `command` and wait for the service's reply.
    ///
    /// `Ok(None)` means the service answered with an empty frame.
    pub async fn perform(&self, command: &Command) -> Result<Option<Envelope>, TransportError> {
        tracing::debug!(
            command = %command.label(),
            socket = %self.socket_path.display(),
            "Sending request"
        );

        timeout(self.timeout, async {
            let stream = self.connect().await?;
            exchange(stream, command).await
        })
        .await
        .map_err(|_| TransportError::Timeout(self.timeout))?
    }

    async fn connect(&self) -> Result<UnixStream, TransportError> {
        UnixStream::connect(&self.socket_path)
            .await
            .map_err(|e| classify_connect_error(&self.socket_path, e))
    }
}

/// Run one exchange over an already connected stream.
///
/// Takes ownership of the stream: it is shut down once and dropped when this
/// returns, whichever step failed.
pub async fn exchange<S>(mut stream: S, command: &Command) -> Result<Option<Envelope>, TransportError>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let result = round_trip(&mut stream, command).await;

    if let Err(e) = stream.shutdown().await {
        tracing::debug!("Failed to shut down connection: {}", e);
    }

    result
}

async fn round_trip<S>(stream: &mut S, command: &Command) -> Result<Option<Envelope>, TransportError>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let frame = codec::encode(command)?;

    stream.write_all(&frame).await?;
    stream.flush().await?;
    tracing::debug!(bytes = frame.len(), "Request written");

    let reply = codec::decode(stream).await?;
    match &reply {
        Some(envelope) => tracing::debug!(status = %envelope.status, "Response received"),
        None => tracing::debug!("Empty response received"),
    }

    Ok(reply)
}

fn classify_connect_error(path: &Path, err: std::io::Error) -> TransportError {
    match err.kind() {
        ErrorKind::NotFound | ErrorKind::ConnectionRefused => {
            tracing::debug!("Connect to {} failed: {}", path.display(), err);
            TransportError::ServiceUnavailable {
                path: path.to_path_buf(),
            }
        }
        ErrorKind::PermissionDenied => TransportError::PermissionDenied {
            path: path.to_path_buf(),
        },
        _ => TransportError::Io(err),
    }
}
