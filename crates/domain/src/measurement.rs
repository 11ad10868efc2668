//! Sensor readings and the measurements forwarded to the control service.
//!
//! A [`Reading`] is what a sensor driver returns: a named floating-point
//! scalar. A [`Measurement`] is the same value rendered in the wire format the
//! control service expects — decimal text with exactly one fractional digit.

use serde::{Deserialize, Serialize};

/// Raw scalar produced by a sensor driver.
#[derive(Debug, Clone, PartialEq)]
pub struct Reading {
    pub variable: String,
    pub value: f64,
}

impl Reading {
    pub fn new(variable: impl Into<String>, value: f64) -> Self {
        Self {
            variable: variable.into(),
            value,
        }
    }
}

/// A reading in wire format, ready to be published.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Measurement {
    pub variable: String,
    pub value: String,
}

impl Measurement {
    /// Build a measurement with an already formatted value.
    pub fn new(variable: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            variable: variable.into(),
            value: value.into(),
        }
    }

    /// Render a reading, or `None` when its value is NaN or infinite.
    #[must_use]
    pub fn from_reading(reading: &Reading) -> Option<Self> {
        reading
            .value
            .is_finite()
            .then(|| Self::new(reading.variable.clone(), format_value(reading.value)))
    }

    /// Encode as the `{"variable": …, "value": …}` JSON payload.
    #[must_use]
    pub fn to_payload(&self) -> String {
        serde_json::json!({
            "variable": self.variable,
            "value": self.value,
        })
        .to_string()
    }
}

/// Format a value with one fractional digit.
///
/// Exact ties round away from zero and negative zero renders as `0.0`.
/// Values too large to scale have no fractional digit to round.
#[must_use]
pub fn format_value(value: f64) -> String {
    let scaled = value * 10.0;
    let rounded = if scaled.is_finite() {
        scaled.round() / 10.0
    } else {
        value
    };
    if rounded == 0.0 {
        return "0.0".to_string();
    }
    format!("{rounded:.1}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_format_with_one_fractional_digit() {
        assert_eq!(format_value(21.0), "21.0");
        assert_eq!(format_value(21.34), "21.3");
        assert_eq!(format_value(1013.25), "1013.3");
        assert_eq!(format_value(45.06), "45.1");
    }

    #[test]
    fn should_round_ties_away_from_zero() {
        assert_eq!(format_value(21.25), "21.3");
        assert_eq!(format_value(-21.25), "-21.3");
    }

    #[test]
    fn should_not_render_negative_zero() {
        assert_eq!(format_value(-0.04), "0.0");
        assert_eq!(format_value(-0.0), "0.0");
    }

    #[test]
    fn should_format_values_near_the_float_limit() {
        let max = format_value(f64::MAX);
        assert!(max.starts_with("179769313"));
        assert!(max.ends_with(".0"));

        let min = format_value(f64::MIN);
        assert!(min.starts_with("-179769313"));
        assert!(min.ends_with(".0"));
    }

    #[test]
    fn should_render_negative_values() {
        assert_eq!(format_value(-3.46), "-3.5");
    }

    #[test]
    fn should_build_measurement_from_reading() {
        let reading = Reading::new("temperature", 21.3);
        let measurement = Measurement::from_reading(&reading).unwrap();
        assert_eq!(measurement, Measurement::new("temperature", "21.3"));
    }

    #[test]
    fn should_skip_non_finite_readings() {
        assert!(Measurement::from_reading(&Reading::new("humidity", f64::NAN)).is_none());
        assert!(Measurement::from_reading(&Reading::new("humidity", f64::INFINITY)).is_none());
    }

    #[test]
    fn should_encode_payload_with_string_value() {
        let payload = Measurement::new("temperature", "21.3").to_payload();
        let json: serde_json::Value = serde_json::from_str(&payload).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"variable": "temperature", "value": "21.3"})
        );
    }
}
