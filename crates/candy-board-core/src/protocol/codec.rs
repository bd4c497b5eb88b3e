//! Length-prefixed JSON framing.
//!
//! Every frame is a `u32` little-endian byte count followed by exactly that
//! many bytes of UTF-8 JSON. A zero count carries no body.

use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::io::{AsyncRead, AsyncReadExt};

use super::command::Command;
use super::response::Envelope;
use crate::error::ProtocolError;

/// Size of the length prefix in bytes.
pub const LENGTH_PREFIX_SIZE: usize = 4;

/// Largest response body accepted from the service.
pub const MAX_FRAME_LEN: usize = 16 * 1024 * 1024;

/// Encode a command as a request frame.
pub fn encode(command: &Command) -> Result<Vec<u8>, ProtocolError> {
    encode_value(command)
}

/// Encode an envelope as a response frame.
pub fn encode_envelope(envelope: &Envelope) -> Result<Vec<u8>, ProtocolError> {
    encode_value(envelope)
}

fn encode_value<T: Serialize>(value: &T) -> Result<Vec<u8>, ProtocolError> {
    let payload =
        serde_json::to_vec(value).map_err(|e| ProtocolError::Encoding(e.to_string()))?;
    frame(&payload)
}

/// Prefix a payload with its length.
pub fn frame(payload: &[u8]) -> Result<Vec<u8>, ProtocolError> {
    let len = u32::try_from(payload.len()).map_err(|_| {
        ProtocolError::Encoding(format!("payload of {} bytes is too long", payload.len()))
    })?;

    let mut buf = Vec::with_capacity(LENGTH_PREFIX_SIZE + payload.len());
    buf.extend_from_slice(&len.to_le_bytes());
    buf.extend_from_slice(payload);
    Ok(buf)
}

/// Read one response frame from `reader`.
///
/// Returns `Ok(None)` for a zero-length frame.
pub async fn decode<R>(reader: &mut R) -> Result<Option<Envelope>, ProtocolError>
where
    R: AsyncRead + Unpin,
{
    decode_message(reader).await
}

/// Read one request frame from `reader`, as the service does.
pub async fn decode_command<R>(reader: &mut R) -> Result<Option<Command>, ProtocolError>
where
    R: AsyncRead + Unpin,
{
    decode_message(reader).await
}

async fn decode_message<R, T>(reader: &mut R) -> Result<Option<T>, ProtocolError>
where
    R: AsyncRead + Unpin,
    T: DeserializeOwned,
{
    let mut prefix = [0u8; LENGTH_PREFIX_SIZE];
    read_full(reader, &mut prefix, "length prefix").await?;

    let len = u32::from_le_bytes(prefix) as usize;
    if len == 0 {
        return Ok(None);
    }
    if len > MAX_FRAME_LEN {
        return Err(ProtocolError::TooLarge {
            len,
            max: MAX_FRAME_LEN,
        });
    }

    let mut body = vec![0u8; len];
    read_full(reader, &mut body, "body").await?;

    parse_body(&body).map(Some)
}

/// Decode a frame that is already fully buffered.
pub async fn decode_frame(bytes: &[u8]) -> Result<Option<Envelope>, ProtocolError> {
    let mut reader = bytes;
    decode(&mut reader).await
}

/// Keep reading until `buf` is full; a single read may return any prefix.
async fn read_full<R>(reader: &mut R, buf: &mut [u8], part: &'static str) -> Result<(), ProtocolError>
where
    R: AsyncRead + Unpin,
{
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]).await {
            Ok(0) => {
                return Err(ProtocolError::Framing {
                    part,
                    expected: buf.len(),
                    received: filled,
                })
            }
            Ok(n) => filled += n,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(ProtocolError::Io(e)),
        }
    }
    Ok(())
}

fn parse_body<T: DeserializeOwned>(body: &[u8]) -> Result<T, ProtocolError> {
    let text = std::str::from_utf8(body)
        .map_err(|e| ProtocolError::Malformed(format!("response is not UTF-8: {}", e)))?;

    serde_json::from_str(text)
        .map_err(|e| ProtocolError::Malformed(format!("Failed to parse JSON: {}", e)))
}
