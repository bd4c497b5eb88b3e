//! Shared core library for the CANDY Board Service CLI.
//!
//! Owns the wire protocol spoken over the service's local socket, the
//! one-shot transport client and the modem link probe.

pub mod error;
pub mod link;
pub mod protocol;
pub mod transport;
