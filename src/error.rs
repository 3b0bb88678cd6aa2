//! Error types for joyreport
//!
//! The key-event path (decode, axis, buttons, router) is total and never
//! returns these; they cover sending and the host-side helpers.

use joyreport_transport::TransportError;
use thiserror::Error;

/// Why `buffer_send` did not hand the report to the transport
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SendError {
    /// A previous report is still in flight; retry on the next tick
    #[error("Endpoint busy: previous report still in flight")]
    Busy,

    /// The transport refused the report (not configured, halted, ...)
    #[error("Transport rejected report: {0}")]
    Transport(#[from] TransportError),
}

impl SendError {
    /// Nonzero status code for C-style callers (success is 0)
    pub fn code(&self) -> i32 {
        match self {
            SendError::Busy => 1,
            SendError::Transport(TransportError::NotConfigured) => 2,
            SendError::Transport(_) => 3,
        }
    }

    /// Whether retrying on a later tick can succeed without outside help
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            SendError::Busy | SendError::Transport(TransportError::NotConfigured)
        )
    }
}

/// Error parsing a [`Keycode`](crate::keycode::Keycode) from text
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum KeycodeParseError {
    #[error("invalid hex keycode: \"{0}\"")]
    InvalidHex(String),

    #[error("invalid joystick index: \"{0}\"")]
    InvalidIndex(String),

    #[error("joystick index {0} out of range (max 31)")]
    IndexOutOfRange(u32),

    #[error("unknown axis option: \"{0}\"")]
    UnknownAxisOption(String),

    /// `Axis(n,g0)` without `inv` encodes as a button
    #[error("axis group 0 requires the invert flag")]
    GroupZeroWithoutInvert,

    #[error("unknown keycode: \"{0}\"")]
    Unknown(String),
}

/// Errors from host-side joystick operations
#[derive(Error, Debug)]
pub enum JoystickError {
    #[error("Config I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid config: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("Failed to serialize config: {0}")]
    ConfigSerialize(#[from] toml::ser::Error),

    #[error("Invalid keycode: {0}")]
    Keycode(#[from] KeycodeParseError),
}
