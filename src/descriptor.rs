//! HID report descriptor for the joystick collection
//!
//! The descriptor is built by a `const fn` from the axis and button counts, so
//! it can be compared against the report struct at compile time (see
//! [`crate::layout`]). [`ReportDescriptor::input_report_len`] walks the items
//! the way a host parser does and returns the input report size in bytes.

use std::fmt;

use crate::report::JOYSTICK_MAX_VALUE;

/// Capacity of the descriptor buffer
pub const MAX_DESCRIPTOR_LEN: usize = 96;

/// Generic Desktop usages for axis slots, in slot order
const AXIS_USAGES: [u8; 8] = [
    0x30, // X
    0x31, // Y
    0x32, // Z
    0x33, // Rx
    0x34, // Ry
    0x35, // Rz
    0x36, // Slider
    0x37, // Dial
];

mod item {
    pub const USAGE_PAGE: u8 = 0x05;
    pub const USAGE: u8 = 0x09;
    pub const USAGE_MINIMUM: u8 = 0x19;
    pub const USAGE_MAXIMUM: u8 = 0x29;
    pub const LOGICAL_MINIMUM: u8 = 0x15;
    pub const LOGICAL_MAXIMUM: u8 = 0x25;
    pub const REPORT_SIZE: u8 = 0x75;
    pub const REPORT_ID: u8 = 0x85;
    pub const REPORT_COUNT: u8 = 0x95;
    pub const INPUT: u8 = 0x81;
    pub const COLLECTION: u8 = 0xA1;
    pub const END_COLLECTION: u8 = 0xC0;
    pub const LONG_ITEM: u8 = 0xFE;

    pub const PAGE_GENERIC_DESKTOP: u8 = 0x01;
    pub const PAGE_BUTTON: u8 = 0x09;
    pub const USAGE_JOYSTICK: u8 = 0x04;

    pub const COLLECTION_PHYSICAL: u8 = 0x00;
    pub const COLLECTION_APPLICATION: u8 = 0x01;

    pub const INPUT_DATA_VAR_ABS: u8 = 0x02;
    pub const INPUT_CONSTANT: u8 = 0x01;
}

/// A report descriptor in a fixed buffer
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct ReportDescriptor {
    bytes: [u8; MAX_DESCRIPTOR_LEN],
    len: usize,
}

impl ReportDescriptor {
    const fn empty() -> Self {
        Self {
            bytes: [0; MAX_DESCRIPTOR_LEN],
            len: 0,
        }
    }

    const fn push(mut self, prefix: u8, data: u8) -> Self {
        self.bytes[self.len] = prefix;
        self.bytes[self.len + 1] = data;
        self.len += 2;
        self
    }

    const fn push_bare(mut self, prefix: u8) -> Self {
        self.bytes[self.len] = prefix;
        self.len += 1;
        self
    }

    /// Descriptor for a joystick with `axes` 8-bit axes and `buttons` 1-bit
    /// buttons, padded to a whole byte. `report_id` adds a Report ID item.
    pub const fn joystick(axes: usize, buttons: usize, report_id: Option<u8>) -> Self {
        let mut d = Self::empty()
            .push(item::USAGE_PAGE, item::PAGE_GENERIC_DESKTOP)
            .push(item::USAGE, item::USAGE_JOYSTICK)
            .push(item::COLLECTION, item::COLLECTION_APPLICATION);

        if let Some(id) = report_id {
            d = d.push(item::REPORT_ID, id);
        }

        d = d.push(item::COLLECTION, item::COLLECTION_PHYSICAL);

        if axes > 0 {
            d = d.push(item::USAGE_PAGE, item::PAGE_GENERIC_DESKTOP);
            // Slots past the usage table reuse the last usage
            let named = if axes < AXIS_USAGES.len() { axes } else { AXIS_USAGES.len() };
            let mut i = 0;
            while i < named {
                d = d.push(item::USAGE, AXIS_USAGES[i]);
                i += 1;
            }
            d = d
                .push(item::LOGICAL_MINIMUM, (-JOYSTICK_MAX_VALUE) as u8)
                .push(item::LOGICAL_MAXIMUM, JOYSTICK_MAX_VALUE as u8)
                .push(item::REPORT_COUNT, axes as u8)
                .push(item::REPORT_SIZE, 8)
                .push(item::INPUT, item::INPUT_DATA_VAR_ABS);
        }

        if buttons > 0 {
            d = d
                .push(item::USAGE_PAGE, item::PAGE_BUTTON)
                .push(item::USAGE_MINIMUM, 1)
                .push(item::USAGE_MAXIMUM, buttons as u8)
                .push(item::LOGICAL_MINIMUM, 0)
                .push(item::LOGICAL_MAXIMUM, 1)
                .push(item::REPORT_COUNT, buttons as u8)
                .push(item::REPORT_SIZE, 1)
                .push(item::INPUT, item::INPUT_DATA_VAR_ABS);

            let rem = buttons % 8;
            if rem != 0 {
                d = d
                    .push(item::REPORT_COUNT, 1)
                    .push(item::REPORT_SIZE, (8 - rem) as u8)
                    .push(item::INPUT, item::INPUT_CONSTANT);
            }
        }

        d.push_bare(item::END_COLLECTION)
            .push_bare(item::END_COLLECTION)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..self.len]
    }

    pub const fn len(&self) -> usize {
        self.len
    }

    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Total Input bits declared, walking items like a host parser.
    ///
    /// Report Size and Report Count are global state; every Input main item
    /// adds `size * count` bits. A truncated trailing item ends the walk.
    pub const fn input_report_bits(&self) -> usize {
        let mut report_size = 0usize;
        let mut report_count = 0usize;
        let mut bits = 0usize;
        let mut i = 0;

        while i < self.len {
            let prefix = self.bytes[i];
            if prefix == item::LONG_ITEM {
                if i + 1 >= self.len {
                    break;
                }
                i += 3 + self.bytes[i + 1] as usize;
                continue;
            }

            let size = match prefix & 0x03 {
                3 => 4,
                n => n as usize,
            };
            if i + 1 + size > self.len {
                break;
            }
            let value = self.item_data(i + 1, size);

            match prefix & 0xFC {
                0x74 => report_size = value as usize,
                0x94 => report_count = value as usize,
                0x80 => bits += report_size * report_count,
                _ => {}
            }
            i += 1 + size;
        }
        bits
    }

    /// Input report length in bytes, including the report id byte if declared
    pub const fn input_report_len(&self) -> usize {
        let id = if self.report_id().is_some() { 1 } else { 0 };
        self.input_report_bits().div_ceil(8) + id
    }

    /// First Report ID declared, if any
    pub const fn report_id(&self) -> Option<u8> {
        let mut i = 0;
        while i + 1 < self.len {
            let prefix = self.bytes[i];
            if prefix == item::REPORT_ID {
                return Some(self.bytes[i + 1]);
            }
            if prefix == item::LONG_ITEM {
                i += 3 + self.bytes[i + 1] as usize;
                continue;
            }
            i += 1 + match prefix & 0x03 {
                3 => 4,
                n => n as usize,
            };
        }
        None
    }

    const fn item_data(&self, start: usize, size: usize) -> u32 {
        let mut value = 0u32;
        let mut k = 0;
        while k < size {
            value |= (self.bytes[start + k] as u32) << (8 * k);
            k += 1;
        }
        value
    }
}

impl fmt::Debug for ReportDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ReportDescriptor({:02X?})", self.as_bytes())
    }
}
