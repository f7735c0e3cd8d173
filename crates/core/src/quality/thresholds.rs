//! Threshold evaluation for water quality readings.
//!
//! Pure logic, no state. The breach tracker calls [`evaluate`] once per
//! reading and applies its own time-windowing on top.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::reading::Reading;

/// Default lower pH bound.
pub const DEFAULT_PH_MIN: f64 = 6.0;
/// Default upper pH bound.
pub const DEFAULT_PH_MAX: f64 = 9.0;
/// Default turbidity limit in NTU.
pub const DEFAULT_TURBIDITY_MAX_NTU: f64 = 100.0;
/// Default total dissolved solids limit in ppm.
pub const DEFAULT_TDS_MAX_PPM: f64 = 500.0;

/// A monitored water quality parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Parameter {
    Ph,
    Turbidity,
    Tds,
}

impl Parameter {
    /// Every parameter, in evaluation order.
    pub const ALL: [Parameter; 3] = [Parameter::Ph, Parameter::Turbidity, Parameter::Tds];

    /// Stable slot index, matching the order of [`Parameter::ALL`].
    pub fn index(self) -> usize {
        match self {
            Parameter::Ph => 0,
            Parameter::Turbidity => 1,
            Parameter::Tds => 2,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Parameter::Ph => "ph",
            Parameter::Turbidity => "turbidity",
            Parameter::Tds => "tds",
        }
    }

    /// Measured value of this parameter in a reading.
    pub fn value_of(self, reading: &Reading) -> f64 {
        match self {
            Parameter::Ph => reading.ph,
            Parameter::Turbidity => reading.turbidity,
            Parameter::Tds => reading.tds,
        }
    }
}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Parameter {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Parameter::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| CoreError::Validation(format!("Unknown parameter: {s}")))
    }
}

/// Which side of the safe range a value fell on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BreachDirection {
    TooLow,
    TooHigh,
}

impl BreachDirection {
    pub fn as_str(self) -> &'static str {
        match self {
            BreachDirection::TooLow => "too low",
            BreachDirection::TooHigh => "too high",
        }
    }
}

impl fmt::Display for BreachDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Safe operating range for all monitored parameters.
///
/// Process-wide and read-only after startup.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SafeRange {
    pub ph_min: f64,
    pub ph_max: f64,
    pub turbidity_max: f64,
    pub tds_max: f64,
}

impl Default for SafeRange {
    fn default() -> Self {
        Self {
            ph_min: DEFAULT_PH_MIN,
            ph_max: DEFAULT_PH_MAX,
            turbidity_max: DEFAULT_TURBIDITY_MAX_NTU,
            tds_max: DEFAULT_TDS_MAX_PPM,
        }
    }
}

impl SafeRange {
    /// Reject ranges that could never be satisfied or contain non-finite bounds.
    pub fn validate(&self) -> Result<(), CoreError> {
        let bounds = [
            ("ph_min", self.ph_min),
            ("ph_max", self.ph_max),
            ("turbidity_max", self.turbidity_max),
            ("tds_max", self.tds_max),
        ];
        for (name, value) in bounds {
            if !value.is_finite() {
                return Err(CoreError::Validation(format!(
                    "{name} must be a finite number, got {value}"
                )));
            }
        }
        if self.ph_min >= self.ph_max {
            return Err(CoreError::Validation(format!(
                "ph_min ({}) must be less than ph_max ({})",
                self.ph_min, self.ph_max
            )));
        }
        if self.turbidity_max < 0.0 || self.tds_max < 0.0 {
            return Err(CoreError::Validation(
                "turbidity_max and tds_max must be non-negative".to_string(),
            ));
        }
        Ok(())
    }

    /// Human-readable description of the safe bound for a parameter.
    pub fn describe(&self, parameter: Parameter) -> String {
        match parameter {
            Parameter::Ph => format!("Safe range: {:.1}-{:.1}", self.ph_min, self.ph_max),
            Parameter::Turbidity => format!("Safe limit: {:.1} NTU", self.turbidity_max),
            Parameter::Tds => format!("Safe limit: {:.1} ppm", self.tds_max),
        }
    }
}

/// Result of checking one parameter of a reading.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParameterCheck {
    pub parameter: Parameter,
    /// The measured value.
    pub value: f64,
    /// `Some` when the value is outside the safe range.
    pub breach: Option<BreachDirection>,
}

impl ParameterCheck {
    pub fn is_breached(&self) -> bool {
        self.breach.is_some()
    }
}

/// Check every parameter of a reading against the safe range.
///
/// Bounds are inclusive: a value equal to a limit is in range. The result is
/// indexed by [`Parameter::index`].
pub fn evaluate(reading: &Reading, range: &SafeRange) -> [ParameterCheck; 3] {
    Parameter::ALL.map(|parameter| {
        let value = parameter.value_of(reading);
        let breach = match parameter {
            Parameter::Ph if value < range.ph_min => Some(BreachDirection::TooLow),
            Parameter::Ph if value > range.ph_max => Some(BreachDirection::TooHigh),
            Parameter::Turbidity if value > range.turbidity_max => Some(BreachDirection::TooHigh),
            Parameter::Tds if value > range.tds_max => Some(BreachDirection::TooHigh),
            _ => None,
        };
        ParameterCheck {
            parameter,
            value,
            breach,
        }
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn reading(ph: f64, turbidity: f64, tds: f64) -> Reading {
        Reading {
            timestamp: Utc::now(),
            device_id: "d1".to_string(),
            ph,
            turbidity,
            tds,
            temperature: None,
        }
    }

    fn breached(checks: &[ParameterCheck; 3]) -> Vec<Parameter> {
        checks
            .iter()
            .filter(|c| c.is_breached())
            .map(|c| c.parameter)
            .collect()
    }

    #[test]
    fn no_breach_within_range() {
        let checks = evaluate(&reading(7.0, 20.0, 180.0), &SafeRange::default());
        assert!(breached(&checks).is_empty());
    }

    #[test]
    fn boundaries_are_in_range() {
        let range = SafeRange::default();
        assert!(breached(&evaluate(&reading(6.0, 100.0, 500.0), &range)).is_empty());
        assert!(breached(&evaluate(&reading(9.0, 0.0, 0.0), &range)).is_empty());
    }

    #[test]
    fn low_ph_is_too_low() {
        let checks = evaluate(&reading(5.0, 20.0, 180.0), &SafeRange::default());
        assert_eq!(checks[Parameter::Ph.index()].breach, Some(BreachDirection::TooLow));
        assert_eq!(checks[Parameter::Ph.index()].value, 5.0);
    }

    #[test]
    fn high_ph_is_too_high() {
        let checks = evaluate(&reading(9.5, 20.0, 180.0), &SafeRange::default());
        assert_eq!(checks[Parameter::Ph.index()].breach, Some(BreachDirection::TooHigh));
    }

    #[test]
    fn turbidity_and_tds_only_breach_high() {
        let checks = evaluate(&reading(7.0, 150.0, 600.0), &SafeRange::default());
        assert_eq!(breached(&checks), vec![Parameter::Turbidity, Parameter::Tds]);
        assert_eq!(
            checks[Parameter::Tds.index()].breach,
            Some(BreachDirection::TooHigh)
        );
    }

    #[test]
    fn custom_range_is_respected() {
        let range = SafeRange {
            ph_min: 6.5,
            ph_max: 8.5,
            turbidity_max: 5.0,
            tds_max: 300.0,
        };
        let checks = evaluate(&reading(6.4, 5.1, 300.0), &range);
        assert_eq!(breached(&checks), vec![Parameter::Ph, Parameter::Turbidity]);
    }

    #[test]
    fn default_range_is_valid() {
        assert!(SafeRange::default().validate().is_ok());
    }

    #[test]
    fn inverted_ph_range_is_rejected() {
        let range = SafeRange {
            ph_min: 9.0,
            ph_max: 6.0,
            ..SafeRange::default()
        };
        assert!(range.validate().is_err());
    }

    #[test]
    fn describe_formats_bounds() {
        let range = SafeRange::default();
        assert_eq!(range.describe(Parameter::Ph), "Safe range: 6.0-9.0");
        assert_eq!(range.describe(Parameter::Turbidity), "Safe limit: 100.0 NTU");
        assert_eq!(range.describe(Parameter::Tds), "Safe limit: 500.0 ppm");
    }

    #[test]
    fn parameter_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Parameter::Tds).unwrap(), "\"tds\"");
    }

    #[test]
    fn parameter_parses_from_its_name() {
        for parameter in Parameter::ALL {
            assert_eq!(parameter.as_str().parse::<Parameter>().unwrap(), parameter);
        }
        assert!("chlorine".parse::<Parameter>().is_err());
    }
}
