/*
 *  sensors/cpu.rs
 *
 *  EnviroMon - rolling heatmaps for the Enviro+
 *  (c) 2020-26 Stuart Hunter
 *
 *  CPU die temperature, used to correct the BME280 for self-heating
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

use std::fs;
use std::path::PathBuf;
use std::process::Command;

use crate::config::{CpuSource, SensorConfig};
use crate::sensors::{CpuThermometer, SensorError};

pub const THERMAL_ZONE: &str = "/sys/class/thermal/thermal_zone0/temp";

#[derive(Debug, Clone)]
pub struct CpuTemperature {
    source: CpuSource,
    zone: PathBuf,
}

impl CpuTemperature {
    pub fn new(source: CpuSource, zone: PathBuf) -> Self {
        Self { source, zone }
    }

    pub fn from_config(config: &SensorConfig) -> Self {
        Self::new(
            config.cpu_source.unwrap_or(CpuSource::Sysfs),
            config.thermal_zone.clone().unwrap_or_else(|| PathBuf::from(THERMAL_ZONE)),
        )
    }

    fn read_sysfs(&self) -> Result<f64, SensorError> {
        let content = fs::read_to_string(&self.zone)?;
        parse_millidegrees(&content)
    }

    fn read_vcgencmd(&self) -> Result<f64, SensorError> {
        let output = Command::new("vcgencmd").arg("measure_temp").output()?;
        parse_measure_temp(&String::from_utf8_lossy(&output.stdout))
    }
}

impl CpuThermometer for CpuTemperature {
    fn cpu_temperature(&mut self) -> Result<f64, SensorError> {
        match self.source {
            CpuSource::Sysfs => self.read_sysfs(),
            CpuSource::Vcgencmd => self.read_vcgencmd(),
        }
    }
}

/// The thermal zone reports millidegrees Celsius.
pub fn parse_millidegrees(content: &str) -> Result<f64, SensorError> {
    let first_word = content.split_whitespace().next().unwrap_or("");
    first_word
        .parse::<f64>()
        .map(|millideg| millideg / 1000.0)
        .map_err(|e| SensorError::Parse(format!("'{first_word}': {e}")))
}

/// `temp=48.3'C`
pub fn parse_measure_temp(output: &str) -> Result<f64, SensorError> {
    let value = output
        .split_once('=')
        .and_then(|(_, rest)| rest.rsplit_once('\''))
        .map(|(v, _)| v.trim())
        .ok_or_else(|| SensorError::Parse(format!("unexpected vcgencmd output '{}'", output.trim())))?;
    value
        .parse::<f64>()
        .map_err(|e| SensorError::Parse(format!("'{value}': {e}")))
}
