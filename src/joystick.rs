//! Joystick report device
//!
//! Ties the event router to a USB transport through a [`TransmitGate`]. The
//! router's report is the working copy; `buffer_send` snapshots it into the
//! gate's in-flight frame, so key events keep landing while a transfer is
//! outstanding and go out with the next send.

use std::sync::Arc;

use joyreport_transport::{Endpoint, GateStats, ReportTransport, TransmitGate};
use tracing::{debug, trace};

use crate::axis::AnalogValue;
use crate::calibration::AxisCalibration;
use crate::error::SendError;
use crate::keycode::Keycode;
use crate::layout::JOYSTICK_ENDPOINT;
use crate::report::JoystickReport;
use crate::router::{Dispatch, EventRouter, KeyInput, KeyboardEvent};

/// Joystick report source bound to a transport
pub struct Joystick<T, const AXES: usize, const BUTTONS: usize, const BUTTON_BYTES: usize>
where
    T: ReportTransport,
{
    router: EventRouter<AXES, BUTTONS, BUTTON_BYTES>,
    gate: Arc<TransmitGate>,
    transport: T,
    endpoint: Endpoint,
}

impl<T, const AXES: usize, const BUTTONS: usize, const BUTTON_BYTES: usize>
    Joystick<T, AXES, BUTTONS, BUTTON_BYTES>
where
    T: ReportTransport,
{
    /// Create a joystick sending on the build's joystick endpoint
    pub fn new(transport: T) -> Self {
        Self::with_router(transport, EventRouter::new())
    }

    /// Create a joystick with a preconfigured router
    ///
    /// # Arguments
    /// * `transport` - USB stack accepting finished reports
    /// * `router` - Router owning the working report and calibration
    pub fn with_router(transport: T, router: EventRouter<AXES, BUTTONS, BUTTON_BYTES>) -> Self {
        Self {
            router,
            gate: Arc::new(TransmitGate::with_capacity(
                JoystickReport::<AXES, BUTTONS, BUTTON_BYTES>::LEN,
            )),
            transport,
            endpoint: JOYSTICK_ENDPOINT,
        }
    }

    /// Send on a different endpoint (e.g. a board with its own numbering)
    pub fn with_endpoint(mut self, endpoint: Endpoint) -> Self {
        self.endpoint = endpoint;
        self
    }

    pub fn endpoint(&self) -> Endpoint {
        self.endpoint
    }

    /// Gate handle for the transfer-complete context
    pub fn gate(&self) -> Arc<TransmitGate> {
        Arc::clone(&self.gate)
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn router(&self) -> &EventRouter<AXES, BUTTONS, BUTTON_BYTES> {
        &self.router
    }

    pub fn router_mut(&mut self) -> &mut EventRouter<AXES, BUTTONS, BUTTON_BYTES> {
        &mut self.router
    }

    /// Working report
    pub fn report(&self) -> &JoystickReport<AXES, BUTTONS, BUTTON_BYTES> {
        self.router.report()
    }

    pub fn set_calibration(&mut self, calibration: AxisCalibration) {
        self.router.set_calibration(calibration);
    }

    pub fn event_handler(&mut self, event: KeyboardEvent) -> Dispatch {
        self.router.event_handler(event)
    }

    pub fn add_buffer(&mut self, input: impl Into<KeyInput>) -> Dispatch {
        self.router.add_buffer(input)
    }

    pub fn buffer_clear(&mut self) {
        self.router.buffer_clear();
    }

    pub fn set_axis(&mut self, keycode: Keycode, value: AnalogValue) -> bool {
        self.router.set_axis(keycode, value)
    }

    pub fn analog_sample(&mut self, keycode: Keycode, raw: u16) -> bool {
        self.router.analog_sample(keycode, raw)
    }

    /// Submit the working report.
    ///
    /// Returns `SendError::Busy` while the previous frame is in flight; the
    /// in-flight bytes are not touched. Never blocks.
    pub fn buffer_send(&mut self) -> Result<(), SendError> {
        let Some(permit) = self.gate.try_acquire() else {
            debug!("Joystick report not sent: {} busy", self.endpoint);
            return Err(SendError::Busy);
        };

        permit.submit(&self.transport, self.endpoint, self.router.report().as_wire())?;
        self.router.mark_clean();
        trace!("Joystick report sent on {}: {:02X?}", self.endpoint, self.router.report().as_wire());
        Ok(())
    }

    /// Send only when the report changed since the last send.
    ///
    /// Returns whether a frame was submitted.
    pub fn send_if_dirty(&mut self) -> Result<bool, SendError> {
        if !self.router.is_dirty() {
            return Ok(false);
        }
        self.buffer_send()?;
        Ok(true)
    }

    /// Transfer-complete notification (same as `gate().on_transfer_complete()`)
    pub fn on_transfer_complete(&self) -> bool {
        self.gate.on_transfer_complete()
    }

    pub fn stats(&self) -> GateStats {
        self.gate.stats()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keycode::AxisGroup;
    use crate::layout::REPORT_ID_LEN;
    use joyreport_transport::{GateState, LoopbackTransport, TransportError};

    type TestJoystick = Joystick<Arc<LoopbackTransport>, 2, 8, 1>;

    fn joystick() -> (TestJoystick, Arc<LoopbackTransport>) {
        let transport = Arc::new(LoopbackTransport::new());
        (Joystick::new(Arc::clone(&transport)), transport)
    }

    #[test]
    fn test_send_then_complete() {
        let (mut js, transport) = joystick();
        js.add_buffer(Keycode::joystick_button(0));

        js.buffer_send().unwrap();
        assert_eq!(js.gate().state(), GateState::Sending);
        let frame = transport.last_frame().unwrap();
        assert_eq!(frame.endpoint, JOYSTICK_ENDPOINT);
        assert_eq!(frame.bytes[REPORT_ID_LEN + 2], 0x01);

        assert!(js.on_transfer_complete());
        assert!(js.gate().is_idle());
    }

    #[test]
    fn test_busy_keeps_in_flight_frame() {
        let (mut js, transport) = joystick();
        js.buffer_send().unwrap();
        let in_flight = js.gate().in_flight().unwrap();

        js.add_buffer(Keycode::joystick_button(4));
        let err = js.buffer_send().unwrap_err();
        assert_eq!(err, SendError::Busy);
        assert_ne!(err.code(), 0);
        assert_eq!(js.gate().in_flight().unwrap(), in_flight);
        assert_eq!(transport.frames().len(), 1);
        assert!(js.router().is_dirty());
    }

    #[test]
    fn test_changes_during_send_go_out_next() {
        let (mut js, transport) = joystick();
        js.buffer_send().unwrap();

        js.set_axis(Keycode::joystick_axis(AxisGroup::G2, true, 1), 50);
        js.on_transfer_complete();

        assert!(js.send_if_dirty().unwrap());
        let frame = transport.last_frame().unwrap();
        assert_eq!(frame.bytes[REPORT_ID_LEN + 1], (-50i8) as u8);
        assert!(!js.router().is_dirty());
    }

    #[test]
    fn test_send_if_dirty_skips_clean_report() {
        let (mut js, transport) = joystick();
        assert!(!js.send_if_dirty().unwrap());
        assert!(transport.frames().is_empty());
    }

    #[test]
    fn test_unconfigured_transport() {
        let (mut js, transport) = joystick();
        transport.set_configured(false);
        js.add_buffer(Keycode::joystick_button(1));

        let err = js.buffer_send().unwrap_err();
        assert_eq!(err, SendError::Transport(TransportError::NotConfigured));
        assert!(err.is_retryable());
        assert!(js.gate().is_idle());
        assert!(js.router().is_dirty());
    }

    #[test]
    fn test_custom_endpoint() {
        let transport = Arc::new(LoopbackTransport::new());
        let mut js: TestJoystick =
            Joystick::new(Arc::clone(&transport)).with_endpoint(Endpoint::joystick());
        js.buffer_send().unwrap();
        assert_eq!(transport.last_frame().unwrap().endpoint, Endpoint::joystick());
    }
}
