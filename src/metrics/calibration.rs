/*
 *  metrics/calibration.rs
 *
 *  EnviroMon - rolling heatmaps for the Enviro+
 *  (c) 2020-26 Stuart Hunter
 *
 *  Clean-air baseline for the gas channels
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

use log::info;

use super::Metric;
use crate::sensors::GasReading;

/// Per-channel baseline in kΩ. Reads 1.0 until the heater has warmed up,
/// then holds the single reading captured at that point.
#[derive(Debug, Clone)]
pub struct CalibrationBaseline {
    warmup_cycles: u32,
    elapsed: u32,
    baseline: Option<[f64; 3]>,
}

impl CalibrationBaseline {
    pub fn new(warmup_cycles: u32) -> Self {
        Self { warmup_cycles, elapsed: 0, baseline: None }
    }

    pub fn is_captured(&self) -> bool {
        self.baseline.is_some()
    }

    /// True on the first cycle after warm-up, until a reading is captured.
    pub fn wants_capture(&self) -> bool {
        self.baseline.is_none() && self.elapsed >= self.warmup_cycles
    }

    /// Count one warm-up cycle. No-op once warm-up is over.
    pub fn tick(&mut self) {
        if self.elapsed < self.warmup_cycles {
            self.elapsed += 1;
        }
    }

    /// Freeze the baseline from `reading`. Later calls are ignored.
    pub fn capture(&mut self, reading: &GasReading) {
        if self.baseline.is_some() {
            return;
        }
        let kohm = [
            reading.oxidising / 1000.0,
            reading.reducing / 1000.0,
            reading.nh3 / 1000.0,
        ];
        info!("Gas baseline captured: ox {:.1} kΩ, red {:.1} kΩ, nh3 {:.1} kΩ",
            kohm[0], kohm[1], kohm[2]);
        self.baseline = Some(kohm);
    }

    /// Baseline for a gas channel; 1.0 before capture or for non-gas metrics.
    pub fn kohm(&self, metric: Metric) -> f64 {
        let Some(b) = self.baseline else { return 1.0 };
        match metric {
            Metric::Oxidised => b[0],
            Metric::Reduced => b[1],
            Metric::Nh3 => b[2],
            _ => 1.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reading(ox: f64, red: f64, nh3: f64) -> GasReading {
        GasReading { oxidising: ox, reducing: red, nh3 }
    }

    #[test]
    fn test_baseline_is_one_during_warmup() {
        let mut cal = CalibrationBaseline::new(3);
        for _ in 0..3 {
            assert!(!cal.wants_capture());
            assert_eq!(cal.kohm(Metric::Reduced), 1.0);
            cal.tick();
        }
        assert!(cal.wants_capture());
    }

    #[test]
    fn test_capture_once_then_frozen() {
        let mut cal = CalibrationBaseline::new(0);
        assert!(cal.wants_capture());
        cal.capture(&reading(20_000.0, 400_000.0, 90_000.0));
        assert!(cal.is_captured());
        assert!(!cal.wants_capture());
        assert_eq!(cal.kohm(Metric::Oxidised), 20.0);
        assert_eq!(cal.kohm(Metric::Reduced), 400.0);
        assert_eq!(cal.kohm(Metric::Nh3), 90.0);

        cal.capture(&reading(1.0, 1.0, 1.0));
        cal.tick();
        assert_eq!(cal.kohm(Metric::Reduced), 400.0);
        assert_eq!(cal.kohm(Metric::Light), 1.0);
    }
}
