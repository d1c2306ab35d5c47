/*
 *  sensors/enviroplus.rs
 *
 *  EnviroMon - rolling heatmaps for the Enviro+
 *  (c) 2020-26 Stuart Hunter
 *
 *  Bring-up of the Enviro+ sensors on a Raspberry Pi
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

use embedded_hal::digital::OutputPin;
use linux_embedded_hal::{
    gpio_cdev::{Chip, LineRequestFlags},
    CdevPin, Delay, I2cdev,
};
use log::info;

use crate::config::SensorConfig;
use crate::sensors::bme280::Bme280Sensor;
use crate::sensors::cpu::CpuTemperature;
use crate::sensors::ltr559::Ltr559;
use crate::sensors::mics6814::Mics6814;
use crate::sensors::{
    CpuThermometer, Environment, GasReading, GasSensor, LightProximity, SensorError,
};

const DEFAULT_I2C_BUS: &str = "/dev/i2c-1";
const DEFAULT_GPIO_CHIP: &str = "/dev/gpiochip0";
const DEFAULT_HEATER_PIN: u32 = 24;

/// All four Enviro+ sensor paths. Each device gets its own handle on the
/// bus; the kernel serialises transfers.
pub struct EnviroPlus {
    env: Bme280Sensor<I2cdev, Delay>,
    light: Ltr559<I2cdev>,
    gas: Mics6814<I2cdev, Delay>,
    cpu: CpuTemperature,
    // held so the heater stays on for the life of the process
    _heater: CdevPin,
}

fn open_bus(path: &str) -> Result<I2cdev, SensorError> {
    I2cdev::new(path).map_err(|e| SensorError::Bus {
        sensor: "i2c",
        operation: "open",
        details: format!("{path}: {e}"),
    })
}

fn heater_on(pin: u32) -> Result<CdevPin, SensorError> {
    let mut chip = Chip::new(DEFAULT_GPIO_CHIP)
        .map_err(|e| SensorError::Gpio(format!("{DEFAULT_GPIO_CHIP}: {e}")))?;
    let handle = chip
        .get_line(pin)
        .and_then(|line| line.request(LineRequestFlags::OUTPUT, 1, "enviromon-heater"))
        .map_err(|e| SensorError::Gpio(format!("BCM {pin}: {e}")))?;
    let mut heater = CdevPin::new(handle).map_err(|e| SensorError::Gpio(format!("BCM {pin}: {e}")))?;
    heater.set_high().map_err(|e| SensorError::Gpio(format!("heater: {e:?}")))?;
    Ok(heater)
}

impl EnviroPlus {
    pub fn open(config: &SensorConfig) -> Result<Self, SensorError> {
        let bus = config.i2c_bus.as_deref().unwrap_or(DEFAULT_I2C_BUS);
        let heater_pin = config.heater_pin.unwrap_or(DEFAULT_HEATER_PIN);

        let env = Bme280Sensor::new(open_bus(bus)?, Delay {})?;
        let light = Ltr559::new(open_bus(bus)?)?;
        let gas = Mics6814::new(open_bus(bus)?, Delay {});
        let heater = heater_on(heater_pin)?;
        info!("Enviro+ sensors ready on {} (gas heater BCM {})", bus, heater_pin);

        Ok(Self {
            env,
            light,
            gas,
            cpu: CpuTemperature::from_config(config),
            _heater: heater,
        })
    }
}

impl Environment for EnviroPlus {
    fn temperature(&mut self) -> Result<f64, SensorError> { self.env.temperature() }
    fn pressure(&mut self) -> Result<f64, SensorError> { self.env.pressure() }
    fn humidity(&mut self) -> Result<f64, SensorError> { self.env.humidity() }
}

impl LightProximity for EnviroPlus {
    fn proximity(&mut self) -> Result<u16, SensorError> { self.light.proximity() }
    fn lux(&mut self) -> Result<f64, SensorError> { self.light.lux() }
}

impl GasSensor for EnviroPlus {
    fn read_all(&mut self) -> Result<GasReading, SensorError> { self.gas.read_all() }
}

impl CpuThermometer for EnviroPlus {
    fn cpu_temperature(&mut self) -> Result<f64, SensorError> { self.cpu.cpu_temperature() }
}
