//! Joystick report buffer
//!
//! [`JoystickReport`] is the wire layout of the joystick input report, byte for
//! byte: an optional report id (feature `shared-ep`), one signed byte per axis,
//! then the button bitset LSB first. Every field is a byte array, so `repr(C)`
//! leaves no padding and the struct and the HID report descriptor can be
//! checked against each other at compile time.
//!
//! Slots are written only through the axis aggregator ([`crate::axis`]) and the
//! button bitset ([`crate::buttons`]); everything else reads.

use std::fmt;

use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

use crate::keycode::MAX_JOYSTICK_INDEX;
use crate::layout::{button_bytes, report_len, JOYSTICK_ENDPOINT};

/// Largest axis magnitude; the HID logical range is `-MAX..=MAX`
pub const JOYSTICK_MAX_VALUE: JoystickAxis = ((1i16 << 7) - 1) as i8;

/// One signed axis slot
pub type JoystickAxis = i8;

/// Report id carried in byte 0 on the shared endpoint
#[cfg(feature = "shared-ep")]
pub const JOYSTICK_REPORT_ID: u8 = joyreport_transport::report_id::JOYSTICK;

/// Joystick input report in wire layout.
///
/// `BUTTON_BYTES` must equal `ceil(BUTTONS / 8)`; this and the endpoint size
/// are checked when the type is instantiated.
#[derive(Clone, Copy, IntoBytes, FromBytes, KnownLayout, Immutable)]
#[repr(C)]
pub struct JoystickReport<const AXES: usize, const BUTTONS: usize, const BUTTON_BYTES: usize> {
    #[cfg(feature = "shared-ep")]
    report_id: u8,
    axes: [JoystickAxis; AXES],
    buttons: [u8; BUTTON_BYTES],
}

impl<const AXES: usize, const BUTTONS: usize, const BUTTON_BYTES: usize>
    JoystickReport<AXES, BUTTONS, BUTTON_BYTES>
{
    /// Report length in bytes, report id included
    pub const LEN: usize = report_len(AXES, BUTTONS);

    const LAYOUT_CHECK: () = {
        assert!(
            BUTTON_BYTES == button_bytes(BUTTONS),
            "BUTTON_BYTES must be ceil(BUTTONS / 8)"
        );
        assert!(
            AXES <= MAX_JOYSTICK_INDEX as usize + 1,
            "axis count exceeds the 5-bit keycode index"
        );
        assert!(
            BUTTONS <= MAX_JOYSTICK_INDEX as usize + 1,
            "button count exceeds the 5-bit keycode index"
        );
        assert!(
            std::mem::size_of::<Self>() == report_len(AXES, BUTTONS),
            "joystick report must have no padding"
        );
        assert!(
            JOYSTICK_ENDPOINT.fits(report_len(AXES, BUTTONS)),
            "joystick report does not fit in one endpoint packet"
        );
    };

    /// All-zero report (report id set when sharing the endpoint)
    pub const fn new() -> Self {
        let () = Self::LAYOUT_CHECK;
        Self {
            #[cfg(feature = "shared-ep")]
            report_id: JOYSTICK_REPORT_ID,
            axes: [0; AXES],
            buttons: [0; BUTTON_BYTES],
        }
    }

    /// Parse a report from wire bytes (exact length required)
    pub fn from_wire(bytes: &[u8]) -> Option<Self> {
        Self::read_from_bytes(bytes).ok()
    }

    /// Wire bytes, exactly as handed to the transport
    pub fn as_wire(&self) -> &[u8] {
        self.as_bytes()
    }

    /// Leading report id, `None` on a dedicated endpoint
    pub fn report_id(&self) -> Option<u8> {
        #[cfg(feature = "shared-ep")]
        {
            Some(self.report_id)
        }
        #[cfg(not(feature = "shared-ep"))]
        {
            None
        }
    }

    pub fn axes(&self) -> &[JoystickAxis; AXES] {
        &self.axes
    }

    /// Value of one axis slot
    pub fn axis(&self, index: usize) -> Option<JoystickAxis> {
        self.axes.get(index).copied()
    }

    pub fn buttons(&self) -> &[u8; BUTTON_BYTES] {
        &self.buttons
    }

    /// State of one button (false for indices past `BUTTONS`)
    pub fn button(&self, index: usize) -> bool {
        if index >= BUTTONS {
            return false;
        }
        self.buttons[index / 8] & (1 << (index % 8)) != 0
    }

    /// Whether every axis and button slot is zero
    pub fn is_neutral(&self) -> bool {
        self.axes.iter().all(|&a| a == 0) && self.buttons.iter().all(|&b| b == 0)
    }

    /// Store one axis value. Returns whether the slot changed.
    pub(crate) fn write_axis(&mut self, index: usize, value: JoystickAxis) -> bool {
        let Some(slot) = self.axes.get_mut(index) else {
            return false;
        };
        let value = value.clamp(-JOYSTICK_MAX_VALUE, JOYSTICK_MAX_VALUE);
        let changed = *slot != value;
        *slot = value;
        changed
    }

    /// Set or clear one button bit. Returns whether the bit changed.
    pub(crate) fn write_button(&mut self, index: usize, pressed: bool) -> bool {
        if index >= BUTTONS {
            return false;
        }
        let Some(byte) = self.buttons.get_mut(index / 8) else {
            return false;
        };
        let mask = 1u8 << (index % 8);
        let before = *byte;
        if pressed {
            *byte |= mask;
        } else {
            *byte &= !mask;
        }
        *byte != before
    }

    /// Zero axes and buttons, keeping the report id
    pub(crate) fn clear(&mut self) {
        self.axes = [0; AXES];
        self.buttons = [0; BUTTON_BYTES];
    }
}

impl<const AXES: usize, const BUTTONS: usize, const BUTTON_BYTES: usize> Default
    for JoystickReport<AXES, BUTTONS, BUTTON_BYTES>
{
    fn default() -> Self {
        Self::new()
    }
}

impl<const AXES: usize, const BUTTONS: usize, const BUTTON_BYTES: usize> PartialEq
    for JoystickReport<AXES, BUTTONS, BUTTON_BYTES>
{
    fn eq(&self, other: &Self) -> bool {
        self.as_bytes() == other.as_bytes()
    }
}

impl<const AXES: usize, const BUTTONS: usize, const BUTTON_BYTES: usize> Eq
    for JoystickReport<AXES, BUTTONS, BUTTON_BYTES>
{
}

impl<const AXES: usize, const BUTTONS: usize, const BUTTON_BYTES: usize> fmt::Debug
    for JoystickReport<AXES, BUTTONS, BUTTON_BYTES>
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JoystickReport")
            .field("report_id", &self.report_id())
            .field("axes", self.axes())
            .field("buttons", self.buttons())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::REPORT_ID_LEN;

    type Small = JoystickReport<2, 12, 2>;

    #[test]
    fn test_layout_has_no_padding() {
        assert_eq!(std::mem::size_of::<Small>(), REPORT_ID_LEN + 2 + 2);
        assert_eq!(Small::LEN, REPORT_ID_LEN + 4);
        assert_eq!(Small::new().as_wire().len(), Small::LEN);
        assert_eq!(std::mem::align_of::<Small>(), 1);
    }

    #[test]
    fn test_slot_borrows() {
        let mut report = Small::new();
        report.write_axis(1, 3);
        report.write_button(10, true);
        assert_eq!(report.axes(), &[0, 3]);
        assert_eq!(report.buttons(), &[0, 0b0000_0100]);
        assert!(!report.is_neutral());
    }

    #[test]
    fn test_new_is_zeroed() {
        let report = Small::new();
        assert!(report.is_neutral());
        let wire = report.as_wire();
        assert!(wire[REPORT_ID_LEN..].iter().all(|&b| b == 0));
        #[cfg(feature = "shared-ep")]
        assert_eq!(wire[0], JOYSTICK_REPORT_ID);
    }

    #[test]
    fn test_wire_order() {
        let mut report = Small::new();
        report.write_axis(0, -5);
        report.write_axis(1, 9);
        report.write_button(0, true);
        report.write_button(9, true);

        let wire = report.as_wire();
        assert_eq!(&wire[REPORT_ID_LEN..], &[(-5i8) as u8, 9, 0b0000_0001, 0b0000_0010]);
    }

    #[test]
    fn test_write_axis_clamps_to_symmetric_range() {
        let mut report = Small::new();
        report.write_axis(0, i8::MIN);
        assert_eq!(report.axis(0), Some(-JOYSTICK_MAX_VALUE));
    }

    #[test]
    fn test_write_out_of_range_is_noop() {
        let mut report = Small::new();
        let before = report;
        assert!(!report.write_axis(2, 10));
        assert!(!report.write_button(12, true));
        assert!(!report.write_button(31, true));
        assert_eq!(report, before);
        assert!(!report.button(12));
    }

    #[test]
    fn test_clear_keeps_report_id() {
        let mut report = Small::new();
        report.write_axis(1, 100);
        report.write_button(3, true);
        report.clear();
        assert!(report.is_neutral());
        #[cfg(feature = "shared-ep")]
        assert_eq!(report.report_id(), Some(JOYSTICK_REPORT_ID));
    }

    #[test]
    fn test_from_wire() {
        let mut report = Small::new();
        report.write_axis(1, -42);
        report.write_button(11, true);

        let parsed = Small::from_wire(report.as_wire()).unwrap();
        assert_eq!(parsed, report);
        assert_eq!(parsed.axis(1), Some(-42));
        assert!(parsed.button(11));
        assert!(Small::from_wire(&[0u8; 1]).is_none());
    }

    #[test]
    fn test_zero_button_layout() {
        type AxesOnly = JoystickReport<3, 0, 0>;
        let report = AxesOnly::new();
        assert_eq!(report.as_wire().len(), REPORT_ID_LEN + 3);
        assert!(!report.button(0));
    }
}
