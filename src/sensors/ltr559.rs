/*
 *  sensors/ltr559.rs
 *
 *  EnviroMon - rolling heatmaps for the Enviro+
 *  (c) 2020-26 Stuart Hunter
 *
 *  LTR-559 ambient light and proximity sensor
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

use embedded_hal::i2c::I2c;
use log::{debug, error, info};

use crate::sensors::{LightProximity, SensorError};

pub const ADDRESS: u8 = 0x23;
const PART_ID_EXPECTED: u8 = 0x92;

const REG_ALS_CONTROL: u8 = 0x80;
const REG_PS_CONTROL: u8 = 0x81;
const REG_ALS_MEAS_RATE: u8 = 0x85;
const REG_PART_ID: u8 = 0x86;
const REG_ALS_DATA: u8 = 0x88; // ch1 lo/hi, ch0 lo/hi
const REG_PS_DATA: u8 = 0x8D;

const ALS_ACTIVE: u8 = 0b1;
const ALS_GAIN_4X: u8 = 0b010 << 2;
const PS_ACTIVE: u8 = 0b11;
const ALS_INTEGRATION_50MS: u8 = 0b001 << 3;
const ALS_REPEAT_50MS: u8 = 0b000;

const GAIN: f64 = 4.0;
const INTEGRATION_MS: f64 = 50.0;

// lux coefficients, bucketed on the ch1 share of the total
const CH0_COEFF: [f64; 4] = [17743.0, 42785.0, 5926.0, 0.0];
const CH1_COEFF: [f64; 4] = [-11059.0, 19548.0, -1185.0, 0.0];

/// Lux from the two ALS channels.
pub fn lux_from_channels(ch0: u16, ch1: u16) -> f64 {
    let (ch0, ch1) = (ch0 as f64, ch1 as f64);
    let ratio = if ch0 + ch1 > 0.0 { ch1 * 100.0 / (ch0 + ch1) } else { 101.0 };
    let idx = if ratio < 45.0 {
        0
    } else if ratio < 64.0 {
        1
    } else if ratio < 85.0 {
        2
    } else {
        3
    };
    let lux = ch0 * CH0_COEFF[idx] - ch1 * CH1_COEFF[idx];
    lux / (INTEGRATION_MS / 100.0) / GAIN / 10000.0
}

pub struct Ltr559<I> {
    i2c: I,
}

impl<I: I2c> Ltr559<I> {
    /// Check the part id and start both the light and proximity engines.
    pub fn new(i2c: I) -> Result<Self, SensorError> {
        let mut dev = Self { i2c };
        let part_id = dev.read_reg(REG_PART_ID)?;
        if part_id != PART_ID_EXPECTED {
            error!("LTR559: part id {:#04x}", part_id);
            return Err(SensorError::PartId { sensor: "LTR559", expected: PART_ID_EXPECTED, found: part_id });
        }
        dev.write_reg(REG_ALS_CONTROL, ALS_GAIN_4X | ALS_ACTIVE)?;
        dev.write_reg(REG_PS_CONTROL, PS_ACTIVE)?;
        dev.write_reg(REG_ALS_MEAS_RATE, ALS_INTEGRATION_50MS | ALS_REPEAT_50MS)?;
        info!("LTR559 ready at {:#04x}", ADDRESS);
        Ok(dev)
    }

    pub fn release(self) -> I {
        self.i2c
    }

    fn read_reg(&mut self, reg: u8) -> Result<u8, SensorError> {
        let mut buf = [0u8; 1];
        self.read_regs(reg, &mut buf)?;
        Ok(buf[0])
    }

    fn read_regs(&mut self, reg: u8, buf: &mut [u8]) -> Result<(), SensorError> {
        self.i2c.write_read(ADDRESS, &[reg], buf).map_err(|e| SensorError::Bus {
            sensor: "LTR559",
            operation: "read",
            details: format!("reg {reg:#04x}: {e:?}"),
        })
    }

    fn write_reg(&mut self, reg: u8, value: u8) -> Result<(), SensorError> {
        self.i2c.write(ADDRESS, &[reg, value]).map_err(|e| SensorError::Bus {
            sensor: "LTR559",
            operation: "write",
            details: format!("reg {reg:#04x}: {e:?}"),
        })
    }
}

impl<I: I2c> LightProximity for Ltr559<I> {
    fn proximity(&mut self) -> Result<u16, SensorError> {
        let mut buf = [0u8; 2];
        self.read_regs(REG_PS_DATA, &mut buf)?;
        Ok(u16::from(buf[0]) | (u16::from(buf[1] & 0x07) << 8))
    }

    fn lux(&mut self) -> Result<f64, SensorError> {
        let mut buf = [0u8; 4];
        self.read_regs(REG_ALS_DATA, &mut buf)?;
        let ch1 = u16::from_le_bytes([buf[0], buf[1]]);
        let ch0 = u16::from_le_bytes([buf[2], buf[3]]);
        let lux = lux_from_channels(ch0, ch1);
        debug!("LTR559: ch0={} ch1={} lux={:.2}", ch0, ch1, lux);
        Ok(lux)
    }
}
