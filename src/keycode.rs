//! Keycode namespace and joystick decoding
//!
//! A [`Keycode`] is 16 bits: the low byte is the base code, the high byte a
//! sub field whose meaning depends on the base code. Base codes up to
//! `0xE7` are HID keyboard usages; `0xE8..=0xFF` is the extended range used for
//! collections (mouse, consumer, joystick, ...).
//!
//! For `JOYSTICK_COLLECTION` the sub field is:
//!
//! ```text
//!   bit   7      6   5      4 3 2 1 0
//!       invert  axis group  index (0-31)
//! ```
//!
//! Any of bits 7..5 set makes it an axis terminal, otherwise a button. The
//! group selects one of four axis banks and never changes the value written;
//! only the invert flag does.
//!
//! # Parsing syntax
//!
//! ```text
//! Button(3)         → joystick button 3
//! Axis(0)           → axis 0, group 1
//! Axis(1,-)         → axis 1, inverted            (also: neg, inv)
//! Axis(2,g3)        → axis 2, group 3
//! Axis(3,g0,inv)    → axis 3, group bits zero, inverted
//! 0x21F3            → raw keycode
//! ```

use std::fmt;
use std::str::FromStr;

use crate::error::KeycodeParseError;

/// Base codes of the extended range
pub mod codes {
    /// First base code of the extended range
    pub const EXTENDED_BASE: u8 = 0xE8;

    pub const MOUSE_COLLECTION: u8 = 0xF0;
    pub const CONSUMER_COLLECTION: u8 = 0xF1;
    pub const SYSTEM_COLLECTION: u8 = 0xF2;
    pub const JOYSTICK_COLLECTION: u8 = 0xF3;
    pub const MIDI_COLLECTION: u8 = 0xF4;
    pub const LAYER_CONTROL: u8 = 0xFE;
    pub const KEYBOARD_OPERATION: u8 = 0xFF;
}

const SUB_INVERT: u8 = 0x80;
const SUB_AXIS_MASK: u8 = 0xE0;
const SUB_GROUP_SHIFT: u8 = 5;
const SUB_INDEX_MASK: u8 = 0x1F;

/// Largest index the 5-bit sub field can carry
pub const MAX_JOYSTICK_INDEX: u8 = SUB_INDEX_MASK;

/// Opaque 16-bit keycode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Keycode(pub u16);

impl Keycode {
    /// Build a keycode from base code and sub field
    pub const fn new(base: u8, sub: u8) -> Self {
        Self(((sub as u16) << 8) | base as u16)
    }

    pub const fn raw(self) -> u16 {
        self.0
    }

    pub const fn base(self) -> u8 {
        (self.0 & 0xFF) as u8
    }

    pub const fn sub(self) -> u8 {
        (self.0 >> 8) as u8
    }

    /// Whether the base code is in the extended (non-HID-usage) range
    pub const fn is_extended(self) -> bool {
        self.base() >= codes::EXTENDED_BASE
    }

    pub const fn is_joystick(self) -> bool {
        self.base() == codes::JOYSTICK_COLLECTION
    }

    /// Raw 2-bit axis group selector
    pub const fn axis_group_bits(self) -> u8 {
        (self.sub() >> SUB_GROUP_SHIFT) & 0x03
    }

    pub const fn is_axis_invert(self) -> bool {
        self.sub() & SUB_INVERT != 0
    }

    /// Axis terminal flag (invert or any group bit set)
    pub const fn is_axis(self) -> bool {
        self.sub() & SUB_AXIS_MASK != 0
    }

    /// Raw 5-bit axis or button index
    pub const fn index(self) -> u8 {
        self.sub() & SUB_INDEX_MASK
    }

    /// Joystick axis terminal keycode. `index` is truncated to 5 bits.
    pub const fn joystick_axis(group: AxisGroup, invert: bool, index: u8) -> Self {
        let mut sub = (group.bits() << SUB_GROUP_SHIFT) | (index & SUB_INDEX_MASK);
        if invert {
            sub |= SUB_INVERT;
        }
        Self::new(codes::JOYSTICK_COLLECTION, sub)
    }

    /// Joystick button keycode. `index` is truncated to 5 bits.
    pub const fn joystick_button(index: u8) -> Self {
        Self::new(codes::JOYSTICK_COLLECTION, index & SUB_INDEX_MASK)
    }
}

impl From<u16> for Keycode {
    fn from(raw: u16) -> Self {
        Self(raw)
    }
}

/// Axis bank selected by the 2-bit group field.
///
/// Group 0 is only encodable together with the invert flag; without it the
/// keycode is a button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AxisGroup(u8);

impl AxisGroup {
    pub const G0: Self = Self(0);
    pub const G1: Self = Self(1);
    pub const G2: Self = Self(2);
    pub const G3: Self = Self(3);

    pub const fn from_bits(bits: u8) -> Self {
        Self(bits & 0x03)
    }

    pub const fn bits(self) -> u8 {
        self.0
    }
}

impl Default for AxisGroup {
    fn default() -> Self {
        Self::G1
    }
}

/// Decoded axis terminal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AxisRef {
    pub group: AxisGroup,
    pub invert: bool,
    pub index: u8,
}

/// Decoded joystick button
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ButtonRef {
    pub index: u8,
}

/// What a keycode means to the joystick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoystickCode {
    /// Not a joystick control, or an index the layout has no slot for
    Ordinary,
    Axis(AxisRef),
    Button(ButtonRef),
}

impl JoystickCode {
    pub const fn is_ordinary(&self) -> bool {
        matches!(self, JoystickCode::Ordinary)
    }
}

/// Classify `keycode` for a layout with `AXES` axes and `BUTTONS` buttons.
///
/// Indices past the configured counts decode as `Ordinary`. With a zero count
/// the corresponding arm is a constant-false branch after monomorphization.
pub const fn decode<const AXES: usize, const BUTTONS: usize>(keycode: Keycode) -> JoystickCode {
    if !keycode.is_joystick() {
        return JoystickCode::Ordinary;
    }

    let index = keycode.index();
    if keycode.is_axis() {
        if AXES == 0 || index as usize >= AXES {
            return JoystickCode::Ordinary;
        }
        JoystickCode::Axis(AxisRef {
            group: AxisGroup::from_bits(keycode.axis_group_bits()),
            invert: keycode.is_axis_invert(),
            index,
        })
    } else {
        if BUTTONS == 0 || index as usize >= BUTTONS {
            return JoystickCode::Ordinary;
        }
        JoystickCode::Button(ButtonRef { index })
    }
}

impl fmt::Display for Keycode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.is_joystick() {
            return write!(f, "0x{:04X}", self.0);
        }
        if !self.is_axis() {
            return write!(f, "Button({})", self.index());
        }

        write!(f, "Axis({}", self.index())?;
        let group = self.axis_group_bits();
        if group != AxisGroup::default().bits() {
            write!(f, ",g{group}")?;
        }
        if self.is_axis_invert() {
            write!(f, ",inv")?;
        }
        write!(f, ")")
    }
}

fn parse_index(s: &str) -> Result<u8, KeycodeParseError> {
    let s = s.trim();
    let index: u32 = s
        .parse()
        .map_err(|_| KeycodeParseError::InvalidIndex(s.to_string()))?;
    if index > MAX_JOYSTICK_INDEX as u32 {
        return Err(KeycodeParseError::IndexOutOfRange(index));
    }
    Ok(index as u8)
}

/// Strip `Name(` ... `)` case-insensitively, returning the inner text
fn call_args<'a>(s: &'a str, name: &str) -> Option<&'a str> {
    let head = s.get(..name.len())?;
    if !head.eq_ignore_ascii_case(name) {
        return None;
    }
    s[name.len()..]
        .trim()
        .strip_prefix('(')?
        .strip_suffix(')')
}

impl FromStr for Keycode {
    type Err = KeycodeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();

        // Hex literal: "0x21F3"
        if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
            let raw = u16::from_str_radix(hex, 16)
                .map_err(|_| KeycodeParseError::InvalidHex(s.to_string()))?;
            return Ok(Keycode(raw));
        }

        // Button: "Button(3)"
        if let Some(inner) = call_args(s, "Button") {
            return Ok(Keycode::joystick_button(parse_index(inner)?));
        }

        // Axis: "Axis(0)", "Axis(1,-)", "Axis(2,g3,inv)"
        if let Some(inner) = call_args(s, "Axis") {
            let mut parts = inner.split(',');
            let index = parse_index(parts.next().unwrap_or_default())?;

            let mut group = AxisGroup::default();
            let mut invert = false;
            for opt in parts {
                match opt.trim().to_ascii_lowercase().as_str() {
                    "+" | "pos" | "positive" => invert = false,
                    "-" | "neg" | "negative" | "inv" | "invert" => invert = true,
                    "g0" => group = AxisGroup::G0,
                    "g1" => group = AxisGroup::G1,
                    "g2" => group = AxisGroup::G2,
                    "g3" => group = AxisGroup::G3,
                    other => return Err(KeycodeParseError::UnknownAxisOption(other.to_string())),
                }
            }
            if group == AxisGroup::G0 && !invert {
                return Err(KeycodeParseError::GroupZeroWithoutInvert);
            }
            return Ok(Keycode::joystick_axis(group, invert, index));
        }

        Err(KeycodeParseError::Unknown(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_accessors() {
        // sub = 1_01_00011: invert, group 1, index 3
        let k = Keycode::new(codes::JOYSTICK_COLLECTION, 0b1010_0011);
        assert!(k.is_joystick());
        assert!(k.is_extended());
        assert!(k.is_axis());
        assert!(k.is_axis_invert());
        assert_eq!(k.axis_group_bits(), 0b01);
        assert_eq!(k.index(), 3);
        assert_eq!(k.raw(), 0xA3F3);
    }

    #[test]
    fn test_decode_button() {
        let k = Keycode::joystick_button(5);
        assert_eq!(
            decode::<6, 16>(k),
            JoystickCode::Button(ButtonRef { index: 5 })
        );
    }

    #[test]
    fn test_decode_axis() {
        let k = Keycode::joystick_axis(AxisGroup::G2, true, 2);
        assert_eq!(
            decode::<6, 16>(k),
            JoystickCode::Axis(AxisRef {
                group: AxisGroup::G2,
                invert: true,
                index: 2
            })
        );
    }

    #[test]
    fn test_decode_invert_only_is_axis() {
        let k = Keycode::joystick_axis(AxisGroup::G0, true, 0);
        assert!(matches!(decode::<1, 8>(k), JoystickCode::Axis(_)));
        // Same index with no flags is a button
        assert!(matches!(
            decode::<1, 8>(Keycode::joystick_button(0)),
            JoystickCode::Button(_)
        ));
    }

    #[test]
    fn test_decode_every_group_is_axis() {
        for bits in 1..4 {
            let k = Keycode::joystick_axis(AxisGroup::from_bits(bits), false, 1);
            assert_eq!(
                decode::<2, 8>(k),
                JoystickCode::Axis(AxisRef {
                    group: AxisGroup::from_bits(bits),
                    invert: false,
                    index: 1
                })
            );
        }
    }

    #[test]
    fn test_decode_out_of_range_is_ordinary() {
        assert!(decode::<6, 8>(Keycode::joystick_button(31)).is_ordinary());
        assert!(decode::<6, 8>(Keycode::joystick_button(8)).is_ordinary());
        assert!(decode::<6, 8>(Keycode::joystick_axis(AxisGroup::G1, false, 6)).is_ordinary());
    }

    #[test]
    fn test_decode_zero_counts_disable_classes() {
        assert!(decode::<0, 8>(Keycode::joystick_axis(AxisGroup::G3, false, 0)).is_ordinary());
        assert!(decode::<6, 0>(Keycode::joystick_button(0)).is_ordinary());
    }

    #[test]
    fn test_decode_non_joystick_is_ordinary() {
        // HID 'A' and a mouse collection code with a button-looking sub field
        assert!(decode::<6, 16>(Keycode(0x0004)).is_ordinary());
        assert!(decode::<6, 16>(Keycode::new(codes::MOUSE_COLLECTION, 1)).is_ordinary());
    }

    #[test]
    fn test_decode_is_total() {
        for raw in 0..=u16::MAX {
            let k = Keycode(raw);
            match decode::<6, 16>(k) {
                JoystickCode::Axis(a) => {
                    assert!(k.is_joystick() && k.is_axis());
                    assert!((a.index as usize) < 6);
                }
                JoystickCode::Button(b) => {
                    assert!(k.is_joystick() && !k.is_axis());
                    assert!((b.index as usize) < 16);
                }
                JoystickCode::Ordinary => {}
            }
        }
    }

    #[test]
    fn test_axis_group_bits_roundtrip() {
        for bits in 0..4 {
            assert_eq!(AxisGroup::from_bits(bits).bits(), bits);
        }
        assert_eq!(AxisGroup::from_bits(0b110).bits(), 0b10);
    }

    #[test]
    fn test_parse_button() {
        assert_eq!("Button(3)".parse::<Keycode>().unwrap(), Keycode::joystick_button(3));
        assert_eq!("button( 0 )".parse::<Keycode>().unwrap(), Keycode::joystick_button(0));
    }

    #[test]
    fn test_parse_axis() {
        assert_eq!(
            "Axis(0)".parse::<Keycode>().unwrap(),
            Keycode::joystick_axis(AxisGroup::G1, false, 0)
        );
        assert_eq!(
            "Axis(0,+)".parse::<Keycode>().unwrap(),
            Keycode::joystick_axis(AxisGroup::G1, false, 0)
        );
        assert_eq!(
            "Axis(1,-)".parse::<Keycode>().unwrap(),
            Keycode::joystick_axis(AxisGroup::G1, true, 1)
        );
        assert_eq!(
            "axis(2, G3, inv)".parse::<Keycode>().unwrap(),
            Keycode::joystick_axis(AxisGroup::G3, true, 2)
        );
        assert_eq!(
            "Axis(3,g0,inv)".parse::<Keycode>().unwrap(),
            Keycode::joystick_axis(AxisGroup::G0, true, 3)
        );
    }

    #[test]
    fn test_parse_hex() {
        assert_eq!("0x0004".parse::<Keycode>().unwrap(), Keycode(0x0004));
        assert_eq!("0X21F3".parse::<Keycode>().unwrap(), Keycode(0x21F3));
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(
            "Button(32)".parse::<Keycode>(),
            Err(KeycodeParseError::IndexOutOfRange(32))
        );
        assert_eq!(
            "Axis(0,g0)".parse::<Keycode>(),
            Err(KeycodeParseError::GroupZeroWithoutInvert)
        );
        assert!(matches!(
            "Axis(0,g4)".parse::<Keycode>(),
            Err(KeycodeParseError::UnknownAxisOption(_))
        ));
        assert!(matches!(
            "Axis(0,sideways)".parse::<Keycode>(),
            Err(KeycodeParseError::UnknownAxisOption(_))
        ));
        assert!(matches!("0xZZ".parse::<Keycode>(), Err(KeycodeParseError::InvalidHex(_))));
        assert!(matches!("Jump".parse::<Keycode>(), Err(KeycodeParseError::Unknown(_))));
    }

    #[test]
    fn test_display_roundtrips_through_parse() {
        let codes = [
            Keycode::joystick_button(7),
            Keycode::joystick_axis(AxisGroup::G1, false, 0),
            Keycode::joystick_axis(AxisGroup::G2, true, 4),
            Keycode::joystick_axis(AxisGroup::G3, false, 1),
            Keycode::joystick_axis(AxisGroup::G0, true, 2),
            Keycode(0x0004),
        ];
        for k in codes {
            assert_eq!(k.to_string().parse::<Keycode>().unwrap(), k, "{k}");
        }
        assert_eq!(Keycode::joystick_axis(AxisGroup::G1, true, 5).to_string(), "Axis(5,inv)");
        assert_eq!(Keycode::joystick_axis(AxisGroup::G3, false, 1).to_string(), "Axis(1,g3)");
    }
}
