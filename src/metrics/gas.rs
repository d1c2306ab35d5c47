/*
 *  metrics/gas.rs
 *
 *  EnviroMon - rolling heatmaps for the Enviro+
 *  (c) 2020-26 Stuart Hunter
 *
 *  MICS6814 resistance to estimated ppm, with per-gas bands
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

/// Log-log curve fit: `ppm = 10^(SLOPE * log10(ratio) + INTERCEPT)`
pub const CURVE_SLOPE: f64 = -1.25;
pub const CURVE_INTERCEPT: f64 = 0.64;

// empirical rescale, displayed = (ppm + offset) / scale
pub const OXIDISED_OFFSET: f64 = 0.05 - 0.8;
pub const OXIDISED_SCALE: f64 = 1.9195;
pub const REDUCED_OFFSET: f64 = 0.0;
pub const REDUCED_SCALE: f64 = 1.0;
pub const NH3_OFFSET: f64 = -10.0;
pub const NH3_SCALE: f64 = 4.96666666667;

/// Upper bound (exclusive, ppm) and the text shown below it.
type Band = (f64, &'static str, Severity);

/// Conversion and classification for one gas channel.
#[derive(Debug, Clone, Copy)]
pub struct GasProfile {
    pub metric: Metric,
    pub offset: f64,
    pub scale: f64,
    bands: &'static [Band],
    /// Label at or above the last band.
    ceiling: (&'static str, Severity),
}

pub const OXIDISED: GasProfile = GasProfile {
    metric: Metric::Oxidised,
    offset: OXIDISED_OFFSET,
    scale: OXIDISED_SCALE,
    bands: &[
        (10.0, "ppm, NO2 levels are good!", Severity::Ok),
        (20.0, "ppm, NO2 levels are high but still good", Severity::Warning),
    ],
    ceiling: ("ppm, NO2 levels are above measurable levels", Severity::Danger),
};

pub const REDUCED: GasProfile = GasProfile {
    metric: Metric::Reduced,
    offset: REDUCED_OFFSET,
    scale: REDUCED_SCALE,
    bands: &[
        (10.0, "ppm CO levels are safe", Severity::Ok),
        (20.0, "ppm CO levels are concerning", Severity::Warning),
        (50.0, "ppm CO levels are not safe, do not spend longer than 30 minutes in here", Severity::Warning),
        (200.0, "ppm CO levels are dangerous", Severity::Danger),
        (400.0, "ppm CO levels are highly dangerous", Severity::Danger),
    ],
    ceiling: ("ppm leave room immediately", Severity::Danger),
};

pub const NH3: GasProfile = GasProfile {
    metric: Metric::Nh3,
    offset: NH3_OFFSET,
    scale: NH3_SCALE,
    bands: &[
        (25.0, "ppm ammonia levels should be safe", Severity::Ok),
    ],
    ceiling: ("ppm ammonia levels are above safe levels", Severity::Danger),
};

impl GasProfile {
    pub fn for_metric(metric: Metric) -> Result<&'static GasProfile, EvalError> {
        match metric {
            Metric::Oxidised => Ok(&OXIDISED),
            Metric::Reduced => Ok(&REDUCED),
            Metric::Nh3 => Ok(&NH3),
            other => Err(EvalError::NotGas(other)),
        }
    }

    pub fn classify(&self, ppm: f64) -> (&'static str, Severity) {
        self.bands
            .iter()
            .find(|(limit, _, _)| ppm < *limit)
            .map(|&(_, unit, severity)| (unit, severity))
            .unwrap_or(self.ceiling)
    }

    pub fn rescale(&self, ppm: f64) -> f64 {
        (ppm + self.offset) / self.scale
    }
}

/// Estimated concentration from a reading and its clean-air baseline, both kΩ.
pub fn concentration(metric: Metric, kohm: f64, baseline_kohm: f64) -> Result<f64, EvalError> {
    if !baseline_kohm.is_finite() || baseline_kohm <= 0.0 {
        return Err(EvalError::InvalidBaseline { metric, baseline: baseline_kohm });
    }
    // the reading is checked on its own, two negatives divide to a positive ratio
    let ratio = kohm / baseline_kohm;
    if !kohm.is_finite() || kohm <= 0.0 || !ratio.is_finite() {
        return Err(EvalError::InvalidGasRatio { metric, ratio });
    }
    Ok(10f64.powf(CURVE_SLOPE * ratio.log10() + CURVE_INTERCEPT))
}

/// Evaluate a gas page from the raw resistance in ohms.
pub fn evaluate_gas(metric: Metric, ohms: f64, baseline_kohm: f64) -> Result<Evaluation, EvalError> {
    let profile = GasProfile::for_metric(metric)?;
    let ppm = concentration(metric, ohms / 1000.0, baseline_kohm)?;
    let (unit, severity) = profile.classify(ppm);
    Evaluation::new(metric, profile.rescale(ppm), unit, severity)
}

#[cfg(test)]
mod tests {
    use super::*;

    const AT_BASELINE: f64 = 4.365158322401661; // 10^0.64

    #[test]
    fn test_unit_ratio_gives_intercept() {
        let ppm = concentration(Metric::Reduced, 250.0, 250.0).unwrap();
        assert!((ppm - AT_BASELINE).abs() < 1e-12);
        assert!((ppm - 4.3656).abs() < 1e-4);
    }

    #[test]
    fn test_curve_slope() {
        // a tenfold rise in resistance divides ppm by 10^1.25
        let clean = concentration(Metric::Nh3, 10.0, 10.0).unwrap();
        let high = concentration(Metric::Nh3, 100.0, 10.0).unwrap();
        assert!((clean / high - 10f64.powf(1.25)).abs() < 1e-9);
    }

    #[test]
    fn test_invalid_ratio_is_an_error() {
        assert!(matches!(
            concentration(Metric::Oxidised, 0.0, 1.0),
            Err(EvalError::InvalidGasRatio { metric: Metric::Oxidised, .. })
        ));
        assert!(matches!(
            concentration(Metric::Oxidised, 5.0, 0.0),
            Err(EvalError::InvalidBaseline { .. })
        ));
        assert!(concentration(Metric::Oxidised, -5.0, 1.0).is_err());
        assert!(concentration(Metric::Oxidised, f64::NAN, 1.0).is_err());
    }

    #[test]
    fn test_negative_baseline_is_an_error() {
        assert!(matches!(
            concentration(Metric::Reduced, -5.0, -5.0),
            Err(EvalError::InvalidBaseline { metric: Metric::Reduced, .. })
        ));
        assert!(evaluate_gas(Metric::Reduced, -5_000.0, -5.0).is_err());
        assert!(evaluate_gas(Metric::Nh3, 5_000.0, f64::INFINITY).is_err());
        assert!(evaluate_gas(Metric::Oxidised, f64::INFINITY, 5.0).is_err());
    }

    #[test]
    fn test_oxidised_rescale_and_label() {
        let eval = evaluate_gas(Metric::Oxidised, 20_000.0, 20.0).unwrap();
        let expected = (AT_BASELINE + 0.05 - 0.8) / 1.9195;
        assert!((eval.value - expected).abs() < 1e-12);
        assert_eq!(eval.unit, "ppm, NO2 levels are good!");
        assert_eq!(eval.severity, Severity::Ok);
    }

    #[test]
    fn test_nh3_rescale_and_bands() {
        let eval = evaluate_gas(Metric::Nh3, 1_000.0, 1.0).unwrap();
        assert!((eval.value - (AT_BASELINE - 10.0) / 4.96666666667).abs() < 1e-12);
        assert_eq!(eval.unit, "ppm ammonia levels should be safe");
        assert_eq!(NH3.classify(25.0).0, "ppm ammonia levels are above safe levels");
    }

    #[test]
    fn test_reduced_bands_are_ordered() {
        assert_eq!(REDUCED.classify(9.9).0, "ppm CO levels are safe");
        assert_eq!(REDUCED.classify(10.0).0, "ppm CO levels are concerning");
        assert_eq!(REDUCED.classify(49.0).1, Severity::Warning);
        assert_eq!(REDUCED.classify(199.0).0, "ppm CO levels are dangerous");
        assert_eq!(REDUCED.classify(399.0).0, "ppm CO levels are highly dangerous");
        assert_eq!(REDUCED.classify(5000.0).0, "ppm leave room immediately");
        assert_eq!(REDUCED.rescale(42.0), 42.0);
    }

    #[test]
    fn test_oxidised_bands() {
        assert_eq!(OXIDISED.classify(15.0).0, "ppm, NO2 levels are high but still good");
        assert_eq!(OXIDISED.classify(20.0).1, Severity::Danger);
    }

    #[test]
    fn test_non_gas_metric_rejected() {
        assert_eq!(
            evaluate_gas(Metric::Humidity, 1.0, 1.0).unwrap_err(),
            EvalError::NotGas(Metric::Humidity)
        );
    }
}
