//! Raw ADC to analog magnitude conversion
//!
//! Hall-effect switches report a raw reading that grows with key travel. The
//! calibration normalizes that reading to 0.0-1.0, applies a deadzone and a
//! response curve, then scales it to the axis magnitude the aggregator expects.

use serde::{Deserialize, Serialize};

use crate::axis::AnalogValue;

/// Per-sampler calibration, stored in the runtime config
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AxisCalibration {
    /// Raw reading with the key at rest
    #[serde(default)]
    pub min_raw: u16,
    /// Raw reading with the key bottomed out
    #[serde(default = "default_max_raw")]
    pub max_raw: u16,
    /// Deadzone as percentage of travel (0-100)
    #[serde(default = "default_deadzone")]
    pub deadzone_percent: f32,
    /// Response curve exponent (1.0 = linear, >1 = less sensitive near rest)
    #[serde(default = "default_curve")]
    pub curve_exponent: f32,
}

fn default_max_raw() -> u16 {
    4095
}
fn default_deadzone() -> f32 {
    5.0
}
fn default_curve() -> f32 {
    1.0
}

impl Default for AxisCalibration {
    fn default() -> Self {
        Self {
            min_raw: 0,
            max_raw: default_max_raw(),
            deadzone_percent: default_deadzone(),
            curve_exponent: default_curve(),
        }
    }
}

impl AxisCalibration {
    /// Linear calibration with no deadzone
    pub fn linear(min_raw: u16, max_raw: u16) -> Self {
        Self {
            min_raw,
            max_raw,
            deadzone_percent: 0.0,
            curve_exponent: 1.0,
        }
    }

    /// Raw reading to 0.0-1.0 of travel. A degenerate range yields 0.0.
    pub fn normalize(&self, raw: u16) -> f32 {
        if self.max_raw <= self.min_raw {
            return 0.0;
        }
        let range = (self.max_raw - self.min_raw) as f32;
        ((raw as f32 - self.min_raw as f32) / range).clamp(0.0, 1.0)
    }

    /// Convert a raw reading to a magnitude in `0..=full_scale`
    pub fn apply(&self, raw: u16, full_scale: AnalogValue) -> AnalogValue {
        let norm = self.normalize(raw);

        let deadzone = (self.deadzone_percent / 100.0).clamp(0.0, 0.99);
        let with_deadzone = if norm < deadzone {
            0.0
        } else {
            (norm - deadzone) / (1.0 - deadzone)
        };

        let curved = apply_curve(with_deadzone, self.curve_exponent);
        (curved * full_scale as f32)
            .round()
            .clamp(0.0, full_scale as f32) as AnalogValue
    }
}

/// Apply response curve (exponent)
///
/// Exponent > 1.0 makes the start of travel less sensitive.
/// Non-positive or non-finite exponents fall back to linear.
fn apply_curve(value: f32, exponent: f32) -> f32 {
    if !exponent.is_finite() || exponent <= 0.0 {
        return value;
    }
    value.powf(exponent)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn linear_cal() -> AxisCalibration {
        AxisCalibration::linear(100, 4100)
    }

    #[test]
    fn test_rest_and_bottom_out() {
        let cal = linear_cal();
        assert_eq!(cal.apply(100, 127), 0);
        assert_eq!(cal.apply(4100, 127), 127);
        assert_eq!(cal.apply(4100, 254), 254);
    }

    #[test]
    fn test_out_of_range_readings_clamp() {
        let cal = linear_cal();
        assert_eq!(cal.apply(0, 127), 0);
        assert_eq!(cal.apply(u16::MAX, 127), 127);
    }

    #[test]
    fn test_midpoint() {
        let cal = linear_cal();
        assert_eq!(cal.apply(2100, 254), 127);
    }

    #[test]
    fn test_deadzone() {
        let mut cal = linear_cal();
        cal.deadzone_percent = 10.0;

        // 5% travel is absorbed by the deadzone
        assert_eq!(cal.apply(300, 127), 0);
        // Full travel still reaches full scale
        assert_eq!(cal.apply(4100, 127), 127);
    }

    #[test]
    fn test_curve_softens_start() {
        let mut cal = linear_cal();
        cal.curve_exponent = 2.0;
        // Half travel squared is a quarter of full scale
        assert_eq!(cal.apply(2100, 100), 25);
        assert_eq!(cal.apply(4100, 100), 100);
    }

    #[test]
    fn test_degenerate_range() {
        let cal = AxisCalibration::linear(500, 500);
        assert_eq!(cal.apply(600, 127), 0);
        let cal = AxisCalibration::linear(900, 100);
        assert_eq!(cal.apply(600, 127), 0);
    }

    #[test]
    fn test_bad_exponent_is_linear() {
        let mut cal = linear_cal();
        cal.curve_exponent = 0.0;
        assert_eq!(cal.apply(2100, 254), 127);
        cal.curve_exponent = f32::NAN;
        assert_eq!(cal.apply(2100, 254), 127);
    }
}
