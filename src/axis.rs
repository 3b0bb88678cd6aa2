//! Axis aggregator
//!
//! Turns an unsigned analog magnitude into the signed axis value for one slot.
//! The magnitude is clamped to `0..=JOYSTICK_MAX_VALUE` and negated for an
//! inverted terminal. The axis group picks a bank and does not change the value.

use crate::keycode::{decode, AxisRef, JoystickCode, Keycode};
use crate::report::{JoystickAxis, JoystickReport, JOYSTICK_MAX_VALUE};

/// Unsigned analog magnitude, already in axis units
pub type AnalogValue = u16;

/// Magnitude that takes an axis from rest to full deflection
pub const ANALOG_VALUE_MAX: AnalogValue = JOYSTICK_MAX_VALUE as AnalogValue;

/// Clamp `value` to the axis range, then apply `invert`.
///
/// The result always lies in `-JOYSTICK_MAX_VALUE..=JOYSTICK_MAX_VALUE`.
pub fn map_analog(invert: bool, value: AnalogValue) -> JoystickAxis {
    let magnitude = value.min(ANALOG_VALUE_MAX) as JoystickAxis;
    if invert {
        -magnitude
    } else {
        magnitude
    }
}

/// Write the mapped value of `value` into the slot named by `axis`.
/// Returns whether the slot changed.
pub fn apply<const AXES: usize, const BUTTONS: usize, const BUTTON_BYTES: usize>(
    report: &mut JoystickReport<AXES, BUTTONS, BUTTON_BYTES>,
    axis: AxisRef,
    value: AnalogValue,
) -> bool {
    report.write_axis(axis.index as usize, map_analog(axis.invert, value))
}

/// Set the axis named by `keycode` from an analog magnitude.
///
/// Keycodes that are not an axis terminal within the layout leave the report
/// untouched. Returns whether the slot changed.
pub fn set_axis<const AXES: usize, const BUTTONS: usize, const BUTTON_BYTES: usize>(
    report: &mut JoystickReport<AXES, BUTTONS, BUTTON_BYTES>,
    keycode: Keycode,
    value: AnalogValue,
) -> bool {
    match decode::<AXES, BUTTONS>(keycode) {
        JoystickCode::Axis(axis) => apply(report, axis, value),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keycode::AxisGroup;

    type Report = JoystickReport<4, 8, 1>;

    #[test]
    fn test_map_analog_clamps() {
        assert_eq!(map_analog(false, 0), 0);
        assert_eq!(map_analog(false, 100), 100);
        assert_eq!(map_analog(false, 127), 127);
        assert_eq!(map_analog(false, 128), 127);
        assert_eq!(map_analog(false, u16::MAX), 127);
    }

    #[test]
    fn test_invert_negates() {
        for value in [0, 1, 50, 127, 200, 1000, u16::MAX] {
            assert_eq!(map_analog(true, value), -map_analog(false, value), "{value}");
        }
    }

    #[test]
    fn test_always_in_range() {
        for invert in [false, true] {
            for value in (0..=u16::MAX).step_by(97) {
                let out = map_analog(invert, value);
                assert!((-JOYSTICK_MAX_VALUE..=JOYSTICK_MAX_VALUE).contains(&out));
            }
        }
    }

    #[test]
    fn test_group_does_not_change_value() {
        for index in 0..4u8 {
            for value in [0u16, 1, 27, 100, 127, 128, 254, 1000] {
                let expected = value.min(127) as i8;
                for bits in 0..4 {
                    let group = AxisGroup::from_bits(bits);
                    let mut report = Report::new();

                    // Group 0 needs the invert flag to be an axis at all
                    if bits != 0 {
                        set_axis(&mut report, Keycode::joystick_axis(group, false, index), value);
                        assert_eq!(report.axis(index as usize), Some(expected), "g{bits} {value}");
                    }

                    set_axis(&mut report, Keycode::joystick_axis(group, true, index), value);
                    assert_eq!(report.axis(index as usize), Some(-expected), "g{bits} inv {value}");
                }
            }
        }
    }

    #[test]
    fn test_set_axis_is_idempotent() {
        let mut report = Report::new();
        let code = Keycode::joystick_axis(AxisGroup::G1, true, 2);

        assert!(set_axis(&mut report, code, 100));
        let once = report;
        assert!(!set_axis(&mut report, code, 100));
        assert_eq!(report, once);
        assert_eq!(report.axis(2), Some(-100));
    }

    #[test]
    fn test_set_axis_ignores_non_axis_codes() {
        let mut report = Report::new();
        let before = report;

        assert!(!set_axis(&mut report, Keycode::joystick_button(0), 100));
        assert!(!set_axis(&mut report, Keycode(0x0004), 100));
        // Index past the axis count
        assert!(!set_axis(&mut report, Keycode::joystick_axis(AxisGroup::G1, false, 4), 100));
        assert_eq!(report, before);
    }
}
