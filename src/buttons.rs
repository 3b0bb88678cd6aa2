//! Button bitset
//!
//! Button `n` is bit `n % 8` of button byte `n / 8`. Indices at or past the
//! configured button count are ignored.

use crate::keycode::ButtonRef;
use crate::report::JoystickReport;

/// Set (`pressed`) or clear one button bit. Returns whether the bit changed.
pub fn set_button<const AXES: usize, const BUTTONS: usize, const BUTTON_BYTES: usize>(
    report: &mut JoystickReport<AXES, BUTTONS, BUTTON_BYTES>,
    index: u8,
    pressed: bool,
) -> bool {
    report.write_button(index as usize, pressed)
}

pub fn apply<const AXES: usize, const BUTTONS: usize, const BUTTON_BYTES: usize>(
    report: &mut JoystickReport<AXES, BUTTONS, BUTTON_BYTES>,
    button: ButtonRef,
    pressed: bool,
) -> bool {
    set_button(report, button.index, pressed)
}
