//! Build-time report layout
//!
//! Axis and button counts come from `build.rs` (`JOYSTICK_AXIS_COUNT`,
//! `JOYSTICK_BUTTON_COUNT` environment variables at build time). Everything
//! sized by them is checked here so a bad layout fails the build.

use joyreport_transport::Endpoint;

use crate::descriptor::ReportDescriptor;
use crate::joystick::Joystick;
use crate::report::JoystickReport;
use crate::router::EventRouter;

include!(concat!(env!("OUT_DIR"), "/layout.rs"));

/// Bytes of report id prefix (1 when sharing the endpoint)
pub const REPORT_ID_LEN: usize = if cfg!(feature = "shared-ep") { 1 } else { 0 };

/// Endpoint the joystick report goes out on
pub const JOYSTICK_ENDPOINT: Endpoint = if cfg!(feature = "shared-ep") {
    Endpoint::shared()
} else {
    Endpoint::joystick()
};

/// Bytes needed for `buttons` bits
pub const fn button_bytes(buttons: usize) -> usize {
    buttons.div_ceil(8)
}

/// Total report length for a layout
pub const fn report_len(axes: usize, buttons: usize) -> usize {
    REPORT_ID_LEN + axes + button_bytes(buttons)
}

pub const JOYSTICK_BUTTON_BYTES: usize = button_bytes(JOYSTICK_BUTTON_COUNT);

/// Report with the build-time layout
pub type Report = JoystickReport<JOYSTICK_AXIS_COUNT, JOYSTICK_BUTTON_COUNT, JOYSTICK_BUTTON_BYTES>;

/// Router with the build-time layout
pub type Router = EventRouter<JOYSTICK_AXIS_COUNT, JOYSTICK_BUTTON_COUNT, JOYSTICK_BUTTON_BYTES>;

/// Joystick facade with the build-time layout
pub type DefaultJoystick<T> =
    Joystick<T, JOYSTICK_AXIS_COUNT, JOYSTICK_BUTTON_COUNT, JOYSTICK_BUTTON_BYTES>;

/// HID report descriptor matching [`Report`]
pub const JOYSTICK_DESCRIPTOR: ReportDescriptor = ReportDescriptor::joystick(
    JOYSTICK_AXIS_COUNT,
    JOYSTICK_BUTTON_COUNT,
    if cfg!(feature = "shared-ep") {
        Some(joyreport_transport::report_id::JOYSTICK)
    } else {
        None
    },
);

const _: () = assert!(
    JOYSTICK_AXIS_COUNT <= 32 && JOYSTICK_BUTTON_COUNT <= 32,
    "joystick axis and button counts are limited to 32"
);
const _: () = assert!(
    JOYSTICK_ENDPOINT.fits(report_len(JOYSTICK_AXIS_COUNT, JOYSTICK_BUTTON_COUNT)),
    "joystick report does not fit in one endpoint packet"
);
const _: () = assert!(
    JOYSTICK_DESCRIPTOR.input_report_len() == std::mem::size_of::<Report>(),
    "report descriptor and report struct disagree on length"
);
