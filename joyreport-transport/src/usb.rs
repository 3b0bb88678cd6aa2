//! USB constants for the composite keyboard device
//!
//! Endpoint numbering, packet sizes and HID report ids. These must agree with
//! the configuration descriptor the USB stack publishes; nothing here is
//! negotiated at runtime.

use std::fmt;

/// Direction bit of an endpoint address (device to host)
pub const ENDPOINT_DIR_IN: u8 = 0x80;

/// Endpoints available on the device controller, including EP0
pub const MAX_ENDPOINTS: u8 = 8;

/// Endpoint numbers (EP0 is control)
pub mod epnum {
    pub const KEYBOARD: u8 = 1;
    pub const RAW: u8 = 2;
    /// Mouse, joystick, system, consumer and NKRO reports, told apart by report id
    pub const SHARED: u8 = 3;
    /// Dedicated joystick endpoint when the shared endpoint is not used
    pub const JOYSTICK: u8 = 4;
}

/// Max packet sizes (full speed interrupt endpoints)
pub mod epsize {
    pub const SHARED: u16 = 32;
    pub const JOYSTICK: u16 = 32;
}

/// HID report ids used on the shared endpoint
pub mod report_id {
    pub const ALL: u8 = 0;
    pub const KEYBOARD: u8 = 1;
    pub const MOUSE: u8 = 2;
    pub const SYSTEM: u8 = 3;
    pub const CONSUMER: u8 = 4;
    pub const PROGRAMMABLE_BUTTON: u8 = 5;
    pub const NKRO: u8 = 6;
    pub const JOYSTICK: u8 = 7;
    pub const DIGITIZER: u8 = 8;

    /// Get human-readable name for a report id
    pub fn name(id: u8) -> &'static str {
        match id {
            ALL => "ALL",
            KEYBOARD => "KEYBOARD",
            MOUSE => "MOUSE",
            SYSTEM => "SYSTEM",
            CONSUMER => "CONSUMER",
            PROGRAMMABLE_BUTTON => "PROGRAMMABLE_BUTTON",
            NKRO => "NKRO",
            JOYSTICK => "JOYSTICK",
            DIGITIZER => "DIGITIZER",
            _ => "UNKNOWN",
        }
    }
}

const _: () = assert!(epnum::JOYSTICK < MAX_ENDPOINTS, "too many endpoints");

/// An interrupt IN endpoint a report can be submitted on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Endpoint {
    number: u8,
    max_packet_size: u16,
}

impl Endpoint {
    /// Create an IN endpoint descriptor
    pub const fn new_in(number: u8, max_packet_size: u16) -> Self {
        Self {
            number,
            max_packet_size,
        }
    }

    /// The shared HID endpoint (mouse/joystick/system/consumer/NKRO)
    pub const fn shared() -> Self {
        Self::new_in(epnum::SHARED, epsize::SHARED)
    }

    /// The dedicated joystick endpoint
    pub const fn joystick() -> Self {
        Self::new_in(epnum::JOYSTICK, epsize::JOYSTICK)
    }

    pub const fn number(&self) -> u8 {
        self.number
    }

    /// Endpoint address as it appears in the endpoint descriptor
    pub const fn address(&self) -> u8 {
        ENDPOINT_DIR_IN | self.number
    }

    pub const fn max_packet_size(&self) -> u16 {
        self.max_packet_size
    }

    /// Check whether a report of `len` bytes fits in one packet
    pub const fn fits(&self, len: usize) -> bool {
        len <= self.max_packet_size as usize
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EP{} IN (0x{:02X})", self.number, self.address())
    }
}
