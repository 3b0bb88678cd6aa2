//! Single-flight transmit gate
//!
//! `TransmitGate` sits between the report owner and a raw `ReportTransport`
//! and enforces at most one outstanding IN transfer per endpoint:
//!
//! ```text
//!   main loop tick                    transfer-complete context
//!        |                                      |
//!  try_acquire() --IDLE--> SENDING <--- on_transfer_complete()
//!        |                    |
//!  SendPermit::submit()   frame (owned by the gate while SENDING)
//!        |
//!  [ReportTransport]
//! ```
//!
//! The gate owns the in-flight frame. A `SendPermit` is the only way to write
//! it and one exists only while the gate is IDLE, so the bytes the transport
//! is reading can never change under it. The caller's working report stays
//! writable the whole time; changes made while SENDING go out with the next
//! frame.

use std::sync::atomic::{AtomicU64, AtomicU8, Ordering};

use parking_lot::Mutex;
use tracing::{debug, trace, warn};

use crate::error::TransportError;
use crate::usb::Endpoint;
use crate::ReportTransport;

const IDLE: u8 = 0;
const SENDING: u8 = 1;

/// Transfer state of the gate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateState {
    /// No transfer outstanding; a permit can be acquired
    Idle,
    /// A frame has been handed to the transport and not yet completed
    Sending,
}

/// Counters kept by the gate (for logging and the demo binary)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GateStats {
    /// Frames accepted by the transport
    pub submitted: u64,
    /// Completion notifications that moved SENDING to IDLE
    pub completed: u64,
    /// Send attempts refused because a transfer was outstanding
    pub busy: u64,
    /// Frames the transport refused
    pub rejected: u64,
}

#[derive(Default)]
struct Counters {
    submitted: AtomicU64,
    completed: AtomicU64,
    busy: AtomicU64,
    rejected: AtomicU64,
}

/// At-most-one in-flight gate with a gate-owned frame buffer
pub struct TransmitGate {
    state: AtomicU8,
    frame: Mutex<Vec<u8>>,
    counters: Counters,
}

impl TransmitGate {
    /// Create an idle gate
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Create an idle gate with a frame buffer preallocated for `len` bytes
    pub fn with_capacity(len: usize) -> Self {
        Self {
            state: AtomicU8::new(IDLE),
            frame: Mutex::new(Vec::with_capacity(len)),
            counters: Counters::default(),
        }
    }

    /// Current transfer state
    pub fn state(&self) -> GateState {
        match self.state.load(Ordering::Acquire) {
            IDLE => GateState::Idle,
            _ => GateState::Sending,
        }
    }

    pub fn is_idle(&self) -> bool {
        self.state() == GateState::Idle
    }

    /// Try to take the gate for one send.
    ///
    /// Returns `None` without side effects on the frame when a transfer is
    /// still outstanding. Never blocks.
    pub fn try_acquire(&self) -> Option<SendPermit<'_>> {
        match self
            .state
            .compare_exchange(IDLE, SENDING, Ordering::AcqRel, Ordering::Acquire)
        {
            Ok(_) => Some(SendPermit {
                gate: self,
                committed: false,
            }),
            Err(_) => {
                self.counters.busy.fetch_add(1, Ordering::Relaxed);
                trace!("Transmit gate busy, send refused");
                None
            }
        }
    }

    /// Transfer-complete notification from the transport.
    ///
    /// Only moves SENDING to IDLE; the frame and any report data are left
    /// untouched. Returns `false` for a completion with nothing in flight.
    pub fn on_transfer_complete(&self) -> bool {
        match self
            .state
            .compare_exchange(SENDING, IDLE, Ordering::AcqRel, Ordering::Acquire)
        {
            Ok(_) => {
                self.counters.completed.fetch_add(1, Ordering::Relaxed);
                trace!("Transfer complete");
                true
            }
            Err(_) => {
                warn!("Spurious transfer-complete with no frame in flight");
                false
            }
        }
    }

    /// Force the gate back to IDLE (endpoint reset / bus reset by the transport)
    pub fn reset(&self) {
        if self.state.swap(IDLE, Ordering::AcqRel) == SENDING {
            debug!("Transmit gate reset with a frame in flight");
        }
    }

    /// Copy of the frame currently owned by the transport, if any
    pub fn in_flight(&self) -> Option<Vec<u8>> {
        if self.state() == GateState::Sending {
            Some(self.frame.lock().clone())
        } else {
            None
        }
    }

    /// Copy of the most recently submitted frame (empty before the first send)
    pub fn last_frame(&self) -> Vec<u8> {
        self.frame.lock().clone()
    }

    /// Snapshot of the gate counters
    pub fn stats(&self) -> GateStats {
        GateStats {
            submitted: self.counters.submitted.load(Ordering::Relaxed),
            completed: self.counters.completed.load(Ordering::Relaxed),
            busy: self.counters.busy.load(Ordering::Relaxed),
            rejected: self.counters.rejected.load(Ordering::Relaxed),
        }
    }
}

impl Default for TransmitGate {
    fn default() -> Self {
        Self::new()
    }
}

/// Exclusive right to fill and submit the gate's frame.
///
/// Obtained from [`TransmitGate::try_acquire`]. Dropping a permit without a
/// successful submit returns the gate to IDLE.
pub struct SendPermit<'a> {
    gate: &'a TransmitGate,
    committed: bool,
}

impl SendPermit<'_> {
    /// Copy `report` into the gate's frame and hand it to the transport.
    ///
    /// On error the gate goes back to IDLE so the caller can retry on the next
    /// tick.
    pub fn submit<T>(
        mut self,
        transport: &T,
        endpoint: Endpoint,
        report: &[u8],
    ) -> Result<(), TransportError>
    where
        T: ReportTransport + ?Sized,
    {
        if let Err(e) = self.submit_inner(transport, endpoint, report) {
            self.gate.counters.rejected.fetch_add(1, Ordering::Relaxed);
            debug!("Transport rejected {} byte frame on {}: {}", report.len(), endpoint, e);
            return Err(e);
        }

        self.committed = true;
        self.gate.counters.submitted.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    fn submit_inner<T>(
        &self,
        transport: &T,
        endpoint: Endpoint,
        report: &[u8],
    ) -> Result<(), TransportError>
    where
        T: ReportTransport + ?Sized,
    {
        if !endpoint.fits(report.len()) {
            return Err(TransportError::ReportTooLarge {
                endpoint: endpoint.address(),
                len: report.len(),
                max: endpoint.max_packet_size() as usize,
            });
        }
        if !transport.is_configured() {
            return Err(TransportError::NotConfigured);
        }

        // The transport may read the gate back while submitting
        let frame = {
            let mut frame = self.gate.frame.lock();
            frame.clear();
            frame.extend_from_slice(report);
            frame.clone()
        };
        transport.submit(endpoint, &frame)
    }
}

impl Drop for SendPermit<'_> {
    fn drop(&mut self) {
        if !self.committed {
            self.gate.state.store(IDLE, Ordering::Release);
        }
    }
}
