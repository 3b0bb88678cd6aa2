//! Transport error types

use thiserror::Error;

/// Errors a USB transport can report when a report is handed to it
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// The host has not configured the device yet (not enumerated or suspended)
    #[error("Device not configured by host")]
    NotConfigured,

    #[error("Endpoint 0x{0:02X} halted")]
    EndpointHalted(u8),

    #[error("Report too large for endpoint 0x{endpoint:02X}: {len} > {max} bytes")]
    ReportTooLarge {
        endpoint: u8,
        len: usize,
        max: usize,
    },

    #[error("Device disconnected")]
    Disconnected,

    // Generic
    #[error("Internal error: {0}")]
    Internal(String),
}
