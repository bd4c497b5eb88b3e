//! Protocol layer for service communication.
//!
//! This module handles building commands, framing them on the wire and
//! parsing the service's responses.

pub mod codec;
pub mod command;
pub mod response;

pub use command::{Action, Category, Command};
pub use response::{Envelope, ResultBody, STATUS_OK};
