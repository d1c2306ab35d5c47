/*
 *  sensors/bme280.rs
 *
 *  EnviroMon - rolling heatmaps for the Enviro+
 *  (c) 2020-26 Stuart Hunter
 *
 *  BME280 temperature, pressure and humidity
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

use ::bme280::i2c::BME280;
use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;
use log::info;

use crate::sensors::{Environment, SensorError};

pub struct Bme280Sensor<I, D> {
    sensor: BME280<I>,
    delay: D,
}

impl<I: I2c, D: DelayNs> Bme280Sensor<I, D> {
    /// BME280 at the primary address (0x76).
    pub fn new(i2c: I, mut delay: D) -> Result<Self, SensorError> {
        let mut sensor = BME280::new_primary(i2c);
        sensor.init(&mut delay).map_err(|e| SensorError::Bus {
            sensor: "BME280",
            operation: "init",
            details: format!("{e:?}"),
        })?;
        info!("BME280 ready at 0x76");
        Ok(Self { sensor, delay })
    }

    /// One forced measurement: (°C, hPa, %).
    fn measure(&mut self) -> Result<(f64, f64, f64), SensorError> {
        let m = self.sensor.measure(&mut self.delay).map_err(|e| SensorError::Bus {
            sensor: "BME280",
            operation: "measure",
            details: format!("{e:?}"),
        })?;
        Ok((m.temperature as f64, m.pressure as f64 / 100.0, m.humidity as f64))
    }
}

impl<I: I2c, D: DelayNs> Environment for Bme280Sensor<I, D> {
    fn temperature(&mut self) -> Result<f64, SensorError> {
        Ok(self.measure()?.0)
    }

    fn pressure(&mut self) -> Result<f64, SensorError> {
        Ok(self.measure()?.1)
    }

    fn humidity(&mut self) -> Result<f64, SensorError> {
        Ok(self.measure()?.2)
    }
}
