//! USB report transport abstraction for joyreport
//!
//! This crate provides the seam between report composition and the USB device
//! stack:
//!
//! - [`ReportTransport`]: what a USB stack implements to accept a finished report
//! - [`TransmitGate`]: at-most-one in-flight transfer, with a gate-owned frame
//! - [`usb`]: endpoint numbers, packet sizes and HID report ids
//! - [`LoopbackTransport`]: recording transport for tests and host tools

pub mod error;
pub mod gate;
pub mod loopback;
pub mod usb;

pub use error::TransportError;
pub use gate::{GateState, GateStats, SendPermit, TransmitGate};
pub use loopback::{LoopbackTransport, SubmittedFrame};
pub use usb::{report_id, Endpoint};

use std::sync::Arc;

/// The core transport trait - USB device stacks implement this
///
/// `submit` hands one report to an interrupt IN endpoint. It must not block:
/// the transport copies the bytes into its endpoint buffer (or starts DMA from
/// the gate's frame) and returns. Completion is signalled separately through
/// [`TransmitGate::on_transfer_complete`].
pub trait ReportTransport: Send + Sync {
    /// Queue a report for transmission
    ///
    /// # Arguments
    /// * `endpoint` - IN endpoint to transmit on
    /// * `report` - Complete report bytes, including the report id when the
    ///   endpoint is shared
    fn submit(&self, endpoint: Endpoint, report: &[u8]) -> Result<(), TransportError>;

    /// Whether the host has configured the device
    fn is_configured(&self) -> bool {
        true
    }
}

impl<T: ReportTransport + ?Sized> ReportTransport for Arc<T> {
    fn submit(&self, endpoint: Endpoint, report: &[u8]) -> Result<(), TransportError> {
        (**self).submit(endpoint, report)
    }

    fn is_configured(&self) -> bool {
        (**self).is_configured()
    }
}
