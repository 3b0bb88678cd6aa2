//! Joystick HID reports for analog keyboard firmware
//!
//! Keys can be bound to joystick controls through the `JOYSTICK_COLLECTION`
//! keycodes. This crate composes the joystick input report from key events
//! and analog samples and hands it to the USB stack:
//!
//! - [`keycode`]: keycode layout and the pure joystick decoder
//! - [`axis`] / [`buttons`]: the only writers of report slots
//! - [`router`]: classifies key events and owns the working report
//! - [`joystick`]: binds a router to a transport through a single-flight gate
//! - [`descriptor`] / [`layout`]: HID descriptor and build-time report layout
//! - [`calibration`] / [`config`]: raw ADC calibration and runtime config
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use joyreport::{DefaultJoystick, Keycode, KeyboardEvent};
//! use joyreport_transport::LoopbackTransport;
//!
//! let transport = Arc::new(LoopbackTransport::new());
//! let mut joystick = DefaultJoystick::new(Arc::clone(&transport));
//!
//! joystick.event_handler(KeyboardEvent::down(Keycode::joystick_button(0)));
//! joystick.buffer_send().unwrap();
//! assert_eq!(transport.frames().len(), 1);
//! ```

pub mod axis;
pub mod buttons;
pub mod calibration;
pub mod config;
pub mod descriptor;
pub mod error;
pub mod joystick;
pub mod keycode;
pub mod layout;
pub mod report;
pub mod router;

pub use axis::{AnalogValue, ANALOG_VALUE_MAX};
pub use calibration::AxisCalibration;
pub use config::{JoystickConfig, KeyBinding};
pub use descriptor::ReportDescriptor;
pub use error::{JoystickError, KeycodeParseError, SendError};
pub use joystick::Joystick;
pub use keycode::{decode, AxisGroup, AxisRef, ButtonRef, JoystickCode, Keycode};
pub use layout::{
    DefaultJoystick, Report, Router, JOYSTICK_AXIS_COUNT, JOYSTICK_BUTTON_COUNT,
    JOYSTICK_DESCRIPTOR, JOYSTICK_ENDPOINT,
};
pub use report::{JoystickAxis, JoystickReport, JOYSTICK_MAX_VALUE};
pub use router::{Dispatch, EventRouter, KeyEventKind, KeyInput, KeyboardEvent};
