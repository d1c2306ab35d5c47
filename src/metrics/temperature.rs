/*
 *  metrics/temperature.rs
 *
 *  EnviroMon - rolling heatmaps for the Enviro+
 *  (c) 2020-26 Stuart Hunter
 *
 *  Ambient temperature with CPU self-heating removed
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

use std::collections::VecDeque;

use super::{EvalError, Evaluation, Metric, Severity};

/// Empirical tuning factor. Lower pulls the reading down, higher pushes it up.
pub const COMPENSATION_FACTOR: f64 = 2.25;
/// Number of CPU samples averaged.
pub const CPU_SAMPLES: usize = 5;

pub const TEMP_HIGH: f64 = 30.0;
pub const TEMP_LOW: f64 = 13.0;

const UNIT_HIGH: &str = "C, temperature exceeds safe value";
const UNIT_LOW: &str = "C, temperature below safe value";
const UNIT_SAFE: &str = "C, temperature at safe levels";

/// Rolling average of the last [`CPU_SAMPLES`] CPU die temperatures.
#[derive(Debug, Clone)]
pub struct CpuTempSmoother {
    samples: VecDeque<f64>,
}

impl CpuTempSmoother {
    /// Seed every slot with the first reading.
    pub fn new(first: f64) -> Self {
        Self { samples: std::iter::repeat_n(first, CPU_SAMPLES).collect() }
    }

    /// Record a sample and return the new average.
    pub fn push(&mut self, cpu_temp: f64) -> f64 {
        self.samples.pop_front();
        self.samples.push_back(cpu_temp);
        self.average()
    }

    pub fn average(&self) -> f64 {
        self.samples.iter().sum::<f64>() / self.samples.len() as f64
    }
}

/// `raw - (avg_cpu - raw) / factor`
pub fn compensate(raw: f64, avg_cpu: f64) -> f64 {
    raw - (avg_cpu - raw) / COMPENSATION_FACTOR
}

pub fn evaluate_temperature(raw: f64, avg_cpu: f64) -> Result<Evaluation, EvalError> {
    let value = compensate(raw, avg_cpu);
    let (unit, severity) = if value > TEMP_HIGH {
        (UNIT_HIGH, Severity::Danger)
    } else if value < TEMP_LOW {
        (UNIT_LOW, Severity::Warning)
    } else {
        (UNIT_SAFE, Severity::Ok)
    };
    Evaluation::new(Metric::Temperature, value, unit, severity)
}
