/*
 *  sensors/mics6814.rs
 *
 *  EnviroMon - rolling heatmaps for the Enviro+
 *  (c) 2020-26 Stuart Hunter
 *
 *  MICS6814 three channel gas sensor, sampled through an ADS1015
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

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;
use log::debug;

use crate::sensors::{GasReading, GasSensor, SensorError};

pub const ADDRESS: u8 = 0x49;

const REG_CONVERSION: u8 = 0x00;
const REG_CONFIG: u8 = 0x01;

const OS_START: u16 = 1 << 15;
const PGA_6_144V: u16 = 0b000 << 9;
const MODE_SINGLE_SHOT: u16 = 1 << 8;
const DR_1600SPS: u16 = 0b100 << 5;
const COMP_DISABLE: u16 = 0b11;

const FULL_SCALE_V: f64 = 6.144;
/// Supply across each sensing element and its load resistor.
const SUPPLY_V: f64 = 3.3;
const LOAD_OHMS: f64 = 56_000.0;

const POLL_LIMIT: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    Oxidising,
    Reducing,
    Nh3,
}

impl Channel {
    /// Single-ended mux setting: AIN0, AIN1, AIN2 against GND.
    fn mux(self) -> u16 {
        let bits = match self {
            Channel::Oxidising => 0b100,
            Channel::Reducing => 0b101,
            Channel::Nh3 => 0b110,
        };
        bits << 12
    }
}

/// ADS1015 config word for a single-shot conversion of `channel`.
pub fn config_word(channel: Channel) -> u16 {
    OS_START | channel.mux() | PGA_6_144V | MODE_SINGLE_SHOT | DR_1600SPS | COMP_DISABLE
}

/// Conversion register to volts. The ADS1015 result is 12 bits, left aligned.
pub fn raw_to_volts(raw: [u8; 2]) -> f64 {
    let counts = i16::from_be_bytes(raw) >> 4;
    counts as f64 * FULL_SCALE_V / 2048.0
}

/// Sensor resistance from the divider voltage; 0 at or above the supply
/// and for the small negative readings the ADC reports around ground.
pub fn volts_to_ohms(v: f64) -> f64 {
    if v >= SUPPLY_V || v <= 0.0 {
        return 0.0;
    }
    v * LOAD_OHMS / (SUPPLY_V - v)
}

pub struct Mics6814<I, D> {
    i2c: I,
    delay: D,
}

impl<I: I2c, D: DelayNs> Mics6814<I, D> {
    pub fn new(i2c: I, delay: D) -> Self {
        Self { i2c, delay }
    }

    pub fn release(self) -> I {
        self.i2c
    }

    fn bus_err<E: core::fmt::Debug>(operation: &'static str) -> impl FnOnce(E) -> SensorError {
        move |e| SensorError::Bus { sensor: "ADS1015", operation, details: format!("{e:?}") }
    }

    fn read_register(&mut self, reg: u8) -> Result<[u8; 2], SensorError> {
        let mut buf = [0u8; 2];
        self.i2c.write_read(ADDRESS, &[reg], &mut buf).map_err(Self::bus_err("read"))?;
        Ok(buf)
    }

    pub fn read_volts(&mut self, channel: Channel) -> Result<f64, SensorError> {
        let [hi, lo] = config_word(channel).to_be_bytes();
        self.i2c.write(ADDRESS, &[REG_CONFIG, hi, lo]).map_err(Self::bus_err("start conversion"))?;

        let mut ready = false;
        for _ in 0..POLL_LIMIT {
            self.delay.delay_us(700);
            let status = u16::from_be_bytes(self.read_register(REG_CONFIG)?);
            if status & OS_START != 0 {
                ready = true;
                break;
            }
        }
        if !ready {
            return Err(SensorError::Timeout { sensor: "ADS1015" });
        }
        Ok(raw_to_volts(self.read_register(REG_CONVERSION)?))
    }
}

impl<I: I2c, D: DelayNs> GasSensor for Mics6814<I, D> {
    fn read_all(&mut self) -> Result<GasReading, SensorError> {
        let ox = self.read_volts(Channel::Oxidising)?;
        let red = self.read_volts(Channel::Reducing)?;
        let nh3 = self.read_volts(Channel::Nh3)?;
        debug!("MICS6814: ox {:.3} V, red {:.3} V, nh3 {:.3} V", ox, red, nh3);
        Ok(GasReading {
            oxidising: volts_to_ohms(ox),
            reducing: volts_to_ohms(red),
            nh3: volts_to_ohms(nh3),
        })
    }
}
