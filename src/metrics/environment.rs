/*
 *  metrics/environment.rs
 *
 *  EnviroMon - rolling heatmaps for the Enviro+
 *  (c) 2020-26 Stuart Hunter
 *
 *  Pressure, humidity and light pages
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

use super::{EvalError, Evaluation, Metric, Severity};
use crate::constants::{LIGHT_PROXIMITY_LIMIT, LIGHT_SENTINEL};

pub const HUMIDITY_HIGH: f64 = 70.0;
pub const HUMIDITY_LOW: f64 = 20.0;

pub fn evaluate_pressure(hpa: f64) -> Result<Evaluation, EvalError> {
    Evaluation::new(Metric::Pressure, hpa, "hPa", Severity::Info)
}

pub fn evaluate_humidity(percent: f64) -> Result<Evaluation, EvalError> {
    let (unit, severity) = if percent > HUMIDITY_HIGH {
        ("%: humidity above safe levels", Severity::Warning)
    } else if percent < HUMIDITY_LOW {
        ("%: humidity below safe levels", Severity::Warning)
    } else {
        ("%: humidity acceptable", Severity::Ok)
    };
    Evaluation::new(Metric::Humidity, percent, unit, severity)
}

/// Lux is only meaningful with nothing in front of the sensor.
pub fn evaluate_light(lux: f64, proximity: u16) -> Result<Evaluation, EvalError> {
    let value = if proximity < LIGHT_PROXIMITY_LIMIT { lux } else { LIGHT_SENTINEL };
    Evaluation::new(Metric::Light, value, "Lux", Severity::Info)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_humidity_bands() {
        let wet = evaluate_humidity(75.0).unwrap();
        assert_eq!(wet.unit, "%: humidity above safe levels");
        assert_eq!(wet.value, 75.0);

        let dry = evaluate_humidity(15.0).unwrap();
        assert_eq!(dry.unit, "%: humidity below safe levels");

        let ok = evaluate_humidity(50.0).unwrap();
        assert_eq!(ok.unit, "%: humidity acceptable");
        assert_eq!(ok.severity, Severity::Ok);
    }

    #[test]
    fn test_pressure_passthrough() {
        let eval = evaluate_pressure(1013.2).unwrap();
        assert_eq!(eval.value, 1013.2);
        assert_eq!(eval.unit, "hPa");
        assert_eq!(eval.severity, Severity::Info);
    }

    #[test]
    fn test_light_gated_by_proximity() {
        assert_eq!(evaluate_light(312.5, 3).unwrap().value, 312.5);
        assert_eq!(evaluate_light(312.5, 10).unwrap().value, 1.0);
        assert_eq!(evaluate_light(312.5, 2000).unwrap().unit, "Lux");
    }
}
