//! Runtime configuration for host-side tools
//!
//! Stored as TOML. Keycodes are written in their text form (`"Button(3)"`,
//! `"Axis(0,inv)"`) and also accepted as raw integers.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::calibration::AxisCalibration;
use crate::error::JoystickError;
use crate::keycode::{AxisGroup, Keycode};

/// Serialize a `Keycode` as its text form
fn serialize_keycode<S: Serializer>(keycode: &Keycode, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(&keycode.to_string())
}

/// Deserialize a `Keycode` from text (`"Button(3)"`, `"0x21F3"`) or a raw integer
fn deserialize_keycode<'de, D: Deserializer<'de>>(d: D) -> Result<Keycode, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum KeycodeRepr {
        Text(String),
        Raw(u16),
    }

    match KeycodeRepr::deserialize(d)? {
        KeycodeRepr::Text(text) => text.parse().map_err(serde::de::Error::custom),
        KeycodeRepr::Raw(raw) => Ok(Keycode(raw)),
    }
}

/// A named key bound to a keycode
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyBinding {
    /// Key name as used in scripts (e.g. `"W"`)
    pub key: String,
    #[serde(
        serialize_with = "serialize_keycode",
        deserialize_with = "deserialize_keycode"
    )]
    pub keycode: Keycode,
}

impl KeyBinding {
    pub fn new(key: impl Into<String>, keycode: Keycode) -> Self {
        Self {
            key: key.into(),
            keycode,
        }
    }
}

/// Complete joystick configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JoystickConfig {
    /// Frame tick interval in milliseconds
    #[serde(default = "default_frame_interval")]
    pub frame_interval_ms: u64,
    /// Raw ADC calibration for analog samples
    #[serde(default)]
    pub calibration: AxisCalibration,
    /// Key name bindings
    #[serde(default)]
    pub bindings: Vec<KeyBinding>,
}

fn default_frame_interval() -> u64 {
    8
}

impl Default for JoystickConfig {
    fn default() -> Self {
        Self {
            frame_interval_ms: default_frame_interval(),
            calibration: AxisCalibration::default(),
            // WASD on the left stick, space and E as buttons
            bindings: vec![
                KeyBinding::new("D", Keycode::joystick_axis(AxisGroup::G1, false, 0)),
                KeyBinding::new("A", Keycode::joystick_axis(AxisGroup::G1, true, 0)),
                KeyBinding::new("S", Keycode::joystick_axis(AxisGroup::G1, false, 1)),
                KeyBinding::new("W", Keycode::joystick_axis(AxisGroup::G1, true, 1)),
                KeyBinding::new("Space", Keycode::joystick_button(0)),
                KeyBinding::new("E", Keycode::joystick_button(1)),
            ],
        }
    }
}

impl JoystickConfig {
    /// Get the default config file path
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("joyreport")
            .join("joystick.toml")
    }

    /// Load config from a file, or return default if not found
    pub fn load(path: &Path) -> Result<Self, JoystickError> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: JoystickConfig = toml::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    /// Save config to a file
    pub fn save(&self, path: &Path) -> Result<(), JoystickError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Look up a binding by key name (case-insensitive)
    pub fn binding(&self, key: &str) -> Option<Keycode> {
        self.bindings
            .iter()
            .find(|b| b.key.eq_ignore_ascii_case(key))
            .map(|b| b.keycode)
    }

    /// Resolve a key name, falling back to keycode syntax
    pub fn resolve(&self, key: &str) -> Result<Keycode, JoystickError> {
        match self.binding(key) {
            Some(keycode) => Ok(keycode),
            None => Ok(key.parse()?),
        }
    }
}
