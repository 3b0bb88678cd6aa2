//! In-memory transport that records every submitted frame
//!
//! Used by tests and by hosts that want to inspect reports without a USB
//! device controller.

use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;
use tracing::trace;

use crate::error::TransportError;
use crate::usb::Endpoint;
use crate::ReportTransport;

/// A frame accepted by a [`LoopbackTransport`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmittedFrame {
    pub endpoint: Endpoint,
    pub bytes: Vec<u8>,
}

/// Recording transport
pub struct LoopbackTransport {
    configured: AtomicBool,
    frames: Mutex<Vec<SubmittedFrame>>,
    fail_next: Mutex<Option<TransportError>>,
}

impl LoopbackTransport {
    /// Create a configured loopback transport
    pub fn new() -> Self {
        Self {
            configured: AtomicBool::new(true),
            frames: Mutex::new(Vec::new()),
            fail_next: Mutex::new(None),
        }
    }

    /// Simulate enumeration (true) or a bus reset / unconfigure (false)
    pub fn set_configured(&self, configured: bool) {
        self.configured.store(configured, Ordering::Release);
    }

    /// Make the next submit fail with `err`
    pub fn fail_next(&self, err: TransportError) {
        *self.fail_next.lock() = Some(err);
    }

    /// All frames submitted so far
    pub fn frames(&self) -> Vec<SubmittedFrame> {
        self.frames.lock().clone()
    }

    /// Drain the recorded frames
    pub fn take_frames(&self) -> Vec<SubmittedFrame> {
        std::mem::take(&mut *self.frames.lock())
    }

    pub fn last_frame(&self) -> Option<SubmittedFrame> {
        self.frames.lock().last().cloned()
    }
}

impl Default for LoopbackTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportTransport for LoopbackTransport {
    fn submit(&self, endpoint: Endpoint, report: &[u8]) -> Result<(), TransportError> {
        if let Some(err) = self.fail_next.lock().take() {
            return Err(err);
        }
        trace!("Loopback {}: {:02X?}", endpoint, report);
        self.frames.lock().push(SubmittedFrame {
            endpoint,
            bytes: report.to_vec(),
        });
        Ok(())
    }

    fn is_configured(&self) -> bool {
        self.configured.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_records_frames() {
        let transport = LoopbackTransport::new();
        transport.submit(Endpoint::shared(), &[1, 2]).unwrap();
        transport.submit(Endpoint::joystick(), &[3]).unwrap();

        let frames = transport.take_frames();
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[1].endpoint, Endpoint::joystick());
        assert!(transport.frames().is_empty());
    }

    #[test]
    fn test_fail_next_is_one_shot() {
        let transport = LoopbackTransport::new();
        transport.fail_next(TransportError::EndpointHalted(0x83));
        assert_eq!(
            transport.submit(Endpoint::shared(), &[1]),
            Err(TransportError::EndpointHalted(0x83))
        );
        assert!(transport.submit(Endpoint::shared(), &[1]).is_ok());
    }
}
