//! Key event routing into the joystick report
//!
//! The router owns the working [`JoystickReport`]. Every key event is
//! classified once with [`decode`]: buttons update the bitset immediately,
//! axis terminals are left to the analog sampler, everything else belongs to
//! the keyboard report and is handed back as [`Dispatch::Ordinary`].

use tracing::{debug, trace};

use crate::axis::{self, AnalogValue, ANALOG_VALUE_MAX};
use crate::buttons;
use crate::calibration::AxisCalibration;
use crate::keycode::{decode, JoystickCode, Keycode};
use crate::report::JoystickReport;

/// Transition or level carried by a key event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KeyEventKind {
    /// Placeholder event; ignored
    #[default]
    NoEvent,
    /// Key went down
    Down,
    /// Key went up
    Up,
    /// Key is held (level, used when recomposing a frame)
    True,
    /// Key is not held (level)
    False,
}

impl KeyEventKind {
    /// Pressed state this kind asserts, `None` for `NoEvent`
    pub const fn pressed(self) -> Option<bool> {
        match self {
            KeyEventKind::NoEvent => None,
            KeyEventKind::Down | KeyEventKind::True => Some(true),
            KeyEventKind::Up | KeyEventKind::False => Some(false),
        }
    }
}

/// A key transition from the matrix scanner
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyboardEvent {
    pub keycode: Keycode,
    pub kind: KeyEventKind,
}

impl KeyboardEvent {
    pub const fn new(keycode: Keycode, kind: KeyEventKind) -> Self {
        Self { keycode, kind }
    }

    pub const fn down(keycode: Keycode) -> Self {
        Self::new(keycode, KeyEventKind::Down)
    }

    pub const fn up(keycode: Keycode) -> Self {
        Self::new(keycode, KeyEventKind::Up)
    }
}

/// Input accepted by [`EventRouter::add_buffer`]: a full event, or a bare
/// keycode meaning "held"
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyInput {
    pub keycode: Keycode,
    pub kind: KeyEventKind,
}

impl From<KeyboardEvent> for KeyInput {
    fn from(event: KeyboardEvent) -> Self {
        Self {
            keycode: event.keycode,
            kind: event.kind,
        }
    }
}

impl From<Keycode> for KeyInput {
    fn from(keycode: Keycode) -> Self {
        Self {
            keycode,
            kind: KeyEventKind::True,
        }
    }
}

/// What the router did with an event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    /// Not a joystick control; belongs to the keyboard report
    Ordinary,
    /// Joystick control with a `NoEvent` kind; nothing written
    Ignored,
    /// Button bit written
    Button { index: u8, pressed: bool, changed: bool },
    /// Axis terminal; its value comes from the analog sampler
    AnalogDeferred { index: u8 },
}

/// Owns the working report and routes key events and analog samples into it
#[derive(Debug, Clone)]
pub struct EventRouter<const AXES: usize, const BUTTONS: usize, const BUTTON_BYTES: usize> {
    report: JoystickReport<AXES, BUTTONS, BUTTON_BYTES>,
    calibration: AxisCalibration,
    dirty: bool,
}

impl<const AXES: usize, const BUTTONS: usize, const BUTTON_BYTES: usize>
    EventRouter<AXES, BUTTONS, BUTTON_BYTES>
{
    pub fn new() -> Self {
        Self::with_calibration(AxisCalibration::default())
    }

    pub fn with_calibration(calibration: AxisCalibration) -> Self {
        Self {
            report: JoystickReport::new(),
            calibration,
            dirty: false,
        }
    }

    /// Working report (what the next send will carry)
    pub fn report(&self) -> &JoystickReport<AXES, BUTTONS, BUTTON_BYTES> {
        &self.report
    }

    pub fn calibration(&self) -> &AxisCalibration {
        &self.calibration
    }

    pub fn set_calibration(&mut self, calibration: AxisCalibration) {
        self.calibration = calibration;
    }

    /// Whether the report changed since the last successful send
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub(crate) fn mark_clean(&mut self) {
        self.dirty = false;
    }

    /// Handle one key transition from the scanner
    pub fn event_handler(&mut self, event: KeyboardEvent) -> Dispatch {
        let dispatch = self.dispatch(event.into());
        if let Dispatch::Button {
            index,
            pressed,
            changed: true,
        } = dispatch
        {
            debug!(
                "Button {} {}",
                index,
                if pressed { "pressed" } else { "released" }
            );
        }
        dispatch
    }

    /// Add a key to the report being composed.
    ///
    /// Accepts a [`KeyboardEvent`] or a bare [`Keycode`] (held). Adding the
    /// same input twice leaves the report as after the first.
    pub fn add_buffer(&mut self, input: impl Into<KeyInput>) -> Dispatch {
        self.dispatch(input.into())
    }

    /// Zero every axis and button, keeping the report id
    pub fn buffer_clear(&mut self) {
        if !self.report.is_neutral() {
            self.dirty = true;
        }
        self.report.clear();
        trace!("Joystick report cleared");
    }

    /// Set an axis from a magnitude already in axis units.
    /// Returns whether the slot changed.
    pub fn set_axis(&mut self, keycode: Keycode, value: AnalogValue) -> bool {
        let changed = axis::set_axis(&mut self.report, keycode, value);
        self.dirty |= changed;
        changed
    }

    /// Calibrate a raw ADC reading for `keycode`, then set its axis.
    /// Returns whether the slot changed.
    pub fn analog_sample(&mut self, keycode: Keycode, raw: u16) -> bool {
        let JoystickCode::Axis(axis_ref) = decode::<AXES, BUTTONS>(keycode) else {
            return false;
        };
        let value = self.calibration.apply(raw, ANALOG_VALUE_MAX);
        let changed = axis::apply(&mut self.report, axis_ref, value);
        if changed {
            trace!("Axis {} <- raw {} ({})", axis_ref.index, raw, value);
        }
        self.dirty |= changed;
        changed
    }

    fn dispatch(&mut self, input: KeyInput) -> Dispatch {
        let code = decode::<AXES, BUTTONS>(input.keycode);
        if code.is_ordinary() {
            return Dispatch::Ordinary;
        }
        let Some(pressed) = input.kind.pressed() else {
            return Dispatch::Ignored;
        };

        match code {
            JoystickCode::Button(button) => {
                let changed = buttons::apply(&mut self.report, button, pressed);
                self.dirty |= changed;
                Dispatch::Button {
                    index: button.index,
                    pressed,
                    changed,
                }
            }
            JoystickCode::Axis(axis_ref) => Dispatch::AnalogDeferred {
                index: axis_ref.index,
            },
            JoystickCode::Ordinary => Dispatch::Ordinary,
        }
    }
}

impl<const AXES: usize, const BUTTONS: usize, const BUTTON_BYTES: usize> Default
    for EventRouter<AXES, BUTTONS, BUTTON_BYTES>
{
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keycode::AxisGroup;

    type Router = EventRouter<2, 8, 1>;

    #[test]
    fn test_button_press_release() {
        let mut router = Router::new();
        let b3 = Keycode::joystick_button(3);

        assert_eq!(
            router.event_handler(KeyboardEvent::down(b3)),
            Dispatch::Button { index: 3, pressed: true, changed: true }
        );
        assert!(router.report().button(3));
        assert!(router.is_dirty());

        router.event_handler(KeyboardEvent::up(b3));
        assert!(!router.report().button(3));
    }

    #[test]
    fn test_ordinary_keys_pass_through() {
        let mut router = Router::new();
        let before = *router.report();

        assert_eq!(router.event_handler(KeyboardEvent::down(Keycode(0x0004))), Dispatch::Ordinary);
        // Button past the layout is ordinary too
        assert_eq!(
            router.event_handler(KeyboardEvent::down(Keycode::joystick_button(8))),
            Dispatch::Ordinary
        );
        assert_eq!(*router.report(), before);
        assert!(!router.is_dirty());
    }

    #[test]
    fn test_axis_event_is_deferred() {
        let mut router = Router::new();
        let code = Keycode::joystick_axis(AxisGroup::G2, false, 1);

        assert_eq!(
            router.event_handler(KeyboardEvent::down(code)),
            Dispatch::AnalogDeferred { index: 1 }
        );
        assert_eq!(router.report().axis(1), Some(0));
        assert!(!router.is_dirty());
    }

    #[test]
    fn test_no_event_is_ignored() {
        let mut router = Router::new();
        let event = KeyboardEvent::new(Keycode::joystick_button(0), KeyEventKind::NoEvent);
        assert_eq!(router.event_handler(event), Dispatch::Ignored);
        assert!(!router.report().button(0));
    }

    #[test]
    fn test_level_kinds() {
        let mut router = Router::new();
        let b1 = Keycode::joystick_button(1);

        router.add_buffer(KeyboardEvent::new(b1, KeyEventKind::True));
        assert!(router.report().button(1));
        router.add_buffer(KeyboardEvent::new(b1, KeyEventKind::False));
        assert!(!router.report().button(1));
    }

    #[test]
    fn test_add_buffer_call_shapes_agree() {
        let b5 = Keycode::joystick_button(5);

        let mut by_event = Router::new();
        by_event.add_buffer(KeyboardEvent::down(b5));

        let mut by_code = Router::new();
        by_code.add_buffer(b5);

        assert_eq!(by_event.report(), by_code.report());
    }

    #[test]
    fn test_add_buffer_idempotent() {
        let mut router = Router::new();
        let b2 = Keycode::joystick_button(2);

        router.add_buffer(b2);
        let once = *router.report();
        assert_eq!(
            router.add_buffer(b2),
            Dispatch::Button { index: 2, pressed: true, changed: false }
        );
        assert_eq!(*router.report(), once);
    }

    #[test]
    fn test_buffer_clear() {
        let mut router = Router::new();
        router.add_buffer(Keycode::joystick_button(0));
        router.set_axis(Keycode::joystick_axis(AxisGroup::G1, false, 0), 90);
        router.mark_clean();

        router.buffer_clear();
        assert!(router.report().is_neutral());
        assert!(router.is_dirty());

        router.mark_clean();
        router.buffer_clear();
        assert!(!router.is_dirty());
    }

    #[test]
    fn test_analog_sample_uses_calibration() {
        let mut router = Router::with_calibration(AxisCalibration::linear(0, 1000));
        let pos = Keycode::joystick_axis(AxisGroup::G1, false, 0);
        let neg = Keycode::joystick_axis(AxisGroup::G3, true, 1);

        assert!(router.analog_sample(pos, 1000));
        assert_eq!(router.report().axis(0), Some(127));

        assert!(router.analog_sample(neg, 1000));
        assert_eq!(router.report().axis(1), Some(-127));
        assert!(router.analog_sample(neg, 0));
        assert_eq!(router.report().axis(1), Some(0));

        assert!(!router.analog_sample(Keycode::joystick_button(0), 1000));
    }
}
