/*
 *  sensors/mod.rs
 *
 *  EnviroMon - rolling heatmaps for the Enviro+
 *  (c) 2020-26 Stuart Hunter
 *
 *  Sensor interfaces and backends
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
use thiserror::Error;

use crate::config::{SensorBackend, SensorConfig};

pub mod cpu;
pub mod ltr559;
pub mod mics6814;
pub mod simulated;

#[cfg(feature = "enviro-plus")]
pub mod bme280;
#[cfg(feature = "enviro-plus")]
pub mod enviroplus;

pub use cpu::CpuTemperature;
pub use simulated::SimulatedSensors;

#[derive(Debug, Error)]
pub enum SensorError {
    #[error("{sensor}: {operation} failed: {details}")]
    Bus {
        sensor: &'static str,
        operation: &'static str,
        details: String,
    },
    #[error("{sensor}: unexpected part id {found:#04x} (expected {expected:#04x})")]
    PartId { sensor: &'static str, expected: u8, found: u8 },
    #[error("{sensor}: conversion did not complete")]
    Timeout { sensor: &'static str },
    #[error("GPIO error: {0}")]
    Gpio(String),
    #[error("CPU temperature: {0}")]
    Parse(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("{0} support is not compiled into this build")]
    Unsupported(&'static str),
}

/// Resistances of the three MICS6814 channels, in ohms.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GasReading {
    pub oxidising: f64,
    pub reducing: f64,
    pub nh3: f64,
}

/// Temperature (°C), pressure (hPa) and relative humidity (%).
pub trait Environment {
    fn temperature(&mut self) -> Result<f64, SensorError>;
    fn pressure(&mut self) -> Result<f64, SensorError>;
    fn humidity(&mut self) -> Result<f64, SensorError>;
}

pub trait LightProximity {
    /// Raw proximity count; larger is closer.
    fn proximity(&mut self) -> Result<u16, SensorError>;
    fn lux(&mut self) -> Result<f64, SensorError>;
}

pub trait GasSensor {
    fn read_all(&mut self) -> Result<GasReading, SensorError>;
}

pub trait CpuThermometer {
    fn cpu_temperature(&mut self) -> Result<f64, SensorError>;
}

/// Everything the dashboard reads each cycle.
pub trait SensorHub: Environment + LightProximity + GasSensor + CpuThermometer {}

impl<T: Environment + LightProximity + GasSensor + CpuThermometer + ?Sized> SensorHub for T {}

pub type BoxedSensors = Box<dyn SensorHub>;

impl<T: Environment + ?Sized> Environment for Box<T> {
    fn temperature(&mut self) -> Result<f64, SensorError> { (**self).temperature() }
    fn pressure(&mut self) -> Result<f64, SensorError> { (**self).pressure() }
    fn humidity(&mut self) -> Result<f64, SensorError> { (**self).humidity() }
}

impl<T: LightProximity + ?Sized> LightProximity for Box<T> {
    fn proximity(&mut self) -> Result<u16, SensorError> { (**self).proximity() }
    fn lux(&mut self) -> Result<f64, SensorError> { (**self).lux() }
}

impl<T: GasSensor + ?Sized> GasSensor for Box<T> {
    fn read_all(&mut self) -> Result<GasReading, SensorError> { (**self).read_all() }
}

impl<T: CpuThermometer + ?Sized> CpuThermometer for Box<T> {
    fn cpu_temperature(&mut self) -> Result<f64, SensorError> { (**self).cpu_temperature() }
}

/// Backend used when the configuration does not name one
pub const fn default_backend() -> SensorBackend {
    if cfg!(feature = "enviro-plus") { SensorBackend::EnviroPlus } else { SensorBackend::Simulated }
}

/// Open the configured sensor backend.
pub fn open(config: &SensorConfig) -> Result<BoxedSensors, SensorError> {
    let backend = config.backend.unwrap_or_else(default_backend);
    info!("Opening {:?} sensors", backend);
    match backend {
        SensorBackend::Simulated => Ok(Box::new(SimulatedSensors::new(config.seed.unwrap_or(42)))),

        #[cfg(feature = "enviro-plus")]
        SensorBackend::EnviroPlus => Ok(Box::new(enviroplus::EnviroPlus::open(config)?)),

        #[cfg(not(feature = "enviro-plus"))]
        SensorBackend::EnviroPlus => Err(SensorError::Unsupported(
            "Enviro+ (enable with --features enviro-plus)",
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_simulated() {
        let config = SensorConfig {
            backend: Some(SensorBackend::Simulated),
            seed: Some(1),
            ..Default::default()
        };
        let mut sensors = open(&config).unwrap();
        let p = sensors.pressure().unwrap();
        assert!(p > 900.0 && p < 1100.0);
    }

    #[cfg(not(feature = "enviro-plus"))]
    #[test]
    fn test_enviroplus_needs_feature() {
        let config = SensorConfig {
            backend: Some(SensorBackend::EnviroPlus),
            ..Default::default()
        };
        assert!(matches!(open(&config), Err(SensorError::Unsupported(_))));
    }
}
