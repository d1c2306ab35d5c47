/*
 *  metrics/mod.rs
 *
 *  EnviroMon - rolling heatmaps for the Enviro+
 *  (c) 2020-26 Stuart Hunter
 *
 *  The seven dashboard metrics and their evaluators
 *
 *  This program is free software: you can redistribute it and/or modify
 *  it under the terms of the GNU General Public License as published by
 *  the Free Software Foundation, either version 3 of the License, or
 *  (at your option) any later version.
 *
 *  This program is distributed in the hope that it will be useful,
 *  but WITHOUT ANY WARRANTY; without even the implied warranty of
 *  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *  GNU General Public License for more details.
 *
 *  See <http://www.gnu.org/licenses/> to get a copy of the GNU General
 *  Public License.
 *
 */

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod calibration;
pub mod environment;
pub mod gas;
pub mod temperature;

pub use calibration::CalibrationBaseline;
pub use environment::{evaluate_humidity, evaluate_light, evaluate_pressure};
pub use gas::{concentration, evaluate_gas, GasProfile};
pub use temperature::{compensate, evaluate_temperature, CpuTempSmoother};

/// One dashboard page. Order is the rotation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    Temperature,
    Pressure,
    Humidity,
    Light,
    Oxidised,
    Reduced,
    Nh3,
}

impl Metric {
    pub const ALL: [Metric; 7] = [
        Metric::Temperature,
        Metric::Pressure,
        Metric::Humidity,
        Metric::Light,
        Metric::Oxidised,
        Metric::Reduced,
        Metric::Nh3,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            Metric::Temperature => "temperature",
            Metric::Pressure => "pressure",
            Metric::Humidity => "humidity",
            Metric::Light => "light",
            Metric::Oxidised => "oxidised",
            Metric::Reduced => "reduced",
            Metric::Nh3 => "nh3",
        }
    }

    /// Next page, wrapping from the last back to the first.
    pub fn next(self) -> Metric {
        Metric::ALL[(self.index() + 1) % Metric::ALL.len()]
    }

    pub fn is_gas(self) -> bool {
        matches!(self, Metric::Oxidised | Metric::Reduced | Metric::Nh3)
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Metric {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Metric::ALL
            .iter()
            .copied()
            .find(|m| m.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown metric '{s}'"))
    }
}

/// How worrying a reading is. Pages without thresholds report `Info`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Info,
    Ok,
    Warning,
    Danger,
}

/// What a page shows this cycle: the value pushed to history and drawn in
/// the label, plus the unit text that follows it.
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    pub value: f64,
    pub unit: &'static str,
    pub severity: Severity,
}

impl Evaluation {
    /// Build an evaluation, refusing values that would poison the history.
    pub fn new(metric: Metric, value: f64, unit: &'static str, severity: Severity) -> Result<Self, EvalError> {
        if !value.is_finite() {
            return Err(EvalError::NonFinite { metric, value });
        }
        Ok(Self { value, unit, severity })
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvalError {
    #[error("{metric}: resistance ratio {ratio} is not a positive finite number")]
    InvalidGasRatio { metric: Metric, ratio: f64 },
    #[error("{metric}: baseline {baseline} kOhm is not a positive finite number")]
    InvalidBaseline { metric: Metric, baseline: f64 },
    #[error("{metric}: evaluated to non-finite value {value}")]
    NonFinite { metric: Metric, value: f64 },
    #[error("{0} is not a gas channel")]
    NotGas(Metric),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rotation_wraps() {
        assert_eq!(Metric::Temperature.next(), Metric::Pressure);
        assert_eq!(Metric::Nh3.next(), Metric::Temperature);
        let mut m = Metric::Humidity;
        for _ in 0..Metric::ALL.len() {
            m = m.next();
        }
        assert_eq!(m, Metric::Humidity);
    }

    #[test]
    fn test_index_matches_order() {
        for (i, m) in Metric::ALL.iter().enumerate() {
            assert_eq!(m.index(), i);
        }
    }

    #[test]
    fn test_parse_names() {
        assert_eq!("nh3".parse::<Metric>(), Ok(Metric::Nh3));
        assert_eq!("Oxidised".parse::<Metric>(), Ok(Metric::Oxidised));
        assert!("ozone".parse::<Metric>().is_err());
        assert_eq!(Metric::Reduced.to_string(), "reduced");
    }

    #[test]
    fn test_evaluation_rejects_nan() {
        let err = Evaluation::new(Metric::Pressure, f64::NAN, "hPa", Severity::Info).unwrap_err();
        assert!(matches!(err, EvalError::NonFinite { metric: Metric::Pressure, .. }));
    }

    #[test]
    fn test_severity_ordering() {
        assert!(Severity::Danger > Severity::Warning);
        assert!(Severity::Warning > Severity::Ok);
        assert!(Severity::Ok > Severity::Info);
    }
}
