//! Modem link probing.
//!
//! The service records the serial port it uses for the modem in a one-line
//! state file. USB modems show up as `/dev/QWS.*` or `/dev/ttyUSB*`; anything
//! else, including an unreadable file, is treated as a UART link.

use std::fmt;
use std::path::{Path, PathBuf};

use regex::Regex;

/// State file name under the service's install root.
pub const LINK_STATE_FILE: &str = "__modem_serial_port";

/// Device paths of USB-attached modems.
pub const USB_DEVICE_PATTERN: &str = r"^/dev/(QWS\.[A-Za-z0-9_.]+|ttyUSB\d+)$";

/// Physical modem attachment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Attachment {
    Usb,
    Uart,
}

impl fmt::Display for Attachment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Attachment::Usb => f.write_str("usb"),
            Attachment::Uart => f.write_str("uart"),
        }
    }
}

/// Reads the link state file, once per call.
pub struct LinkProbe {
    state_file: PathBuf,
    usb_regex: Regex,
}

impl LinkProbe {
    pub fn new(state_file: impl Into<PathBuf>) -> Self {
        Self {
            state_file: state_file.into(),
            usb_regex: Regex::new(USB_DEVICE_PATTERN).expect("USB device pattern is valid"),
        }
    }

    pub fn state_file(&self) -> &Path {
        &self.state_file
    }

    pub fn is_usb_attached(&self) -> bool {
        self.attachment() == Attachment::Usb
    }

    pub fn attachment(&self) -> Attachment {
        let content = match std::fs::read_to_string(&self.state_file) {
            Ok(content) => content,
            Err(e) => {
                tracing::debug!(
                    "Cannot read link state {}: {}",
                    self.state_file.display(),
                    e
                );
                return Attachment::Uart;
            }
        };

        let device = content.trim();
        let attachment = if self.usb_regex.is_match(device) {
            Attachment::Usb
        } else {
            Attachment::Uart
        };
        tracing::debug!(device, %attachment, "Probed modem link");
        attachment
    }
}
