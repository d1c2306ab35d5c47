/*
 *  sensors/simulated.rs
 *
 *  EnviroMon - rolling heatmaps for the Enviro+
 *  (c) 2020-26 Stuart Hunter
 *
 *  Seeded random-walk sensors for desktop runs and CI
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

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::sensors::{
    CpuThermometer, Environment, GasReading, GasSensor, LightProximity, SensorError,
};

/// A value that drifts by at most `step` per read, held inside `[lo, hi]`.
#[derive(Debug, Clone)]
struct Walk {
    value: f64,
    step: f64,
    lo: f64,
    hi: f64,
}

impl Walk {
    fn new(value: f64, step: f64, lo: f64, hi: f64) -> Self {
        Self { value, step, lo, hi }
    }

    fn next(&mut self, rng: &mut StdRng) -> f64 {
        self.value = (self.value + rng.random_range(-self.step..=self.step)).clamp(self.lo, self.hi);
        self.value
    }
}

/// Every Enviro+ sensor, faked. Proximity now and then spikes past the tap
/// threshold so page rotation by gesture can be seen without hardware.
#[derive(Debug, Clone)]
pub struct SimulatedSensors {
    rng: StdRng,
    temperature: Walk,
    pressure: Walk,
    humidity: Walk,
    lux: Walk,
    cpu: Walk,
    oxidising: Walk,
    reducing: Walk,
    nh3: Walk,
    tap_chance: f64,
}

impl SimulatedSensors {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            temperature: Walk::new(24.0, 0.05, -10.0, 45.0),
            pressure: Walk::new(1013.0, 0.2, 950.0, 1050.0),
            humidity: Walk::new(45.0, 0.3, 5.0, 95.0),
            lux: Walk::new(300.0, 5.0, 0.0, 2000.0),
            cpu: Walk::new(45.0, 0.2, 30.0, 80.0),
            oxidising: Walk::new(20_000.0, 150.0, 1_000.0, 200_000.0),
            reducing: Walk::new(400_000.0, 2_000.0, 50_000.0, 1_500_000.0),
            nh3: Walk::new(90_000.0, 800.0, 10_000.0, 1_500_000.0),
            tap_chance: 0.002,
        }
    }

    /// Change how often proximity reports a tap; 0 disables taps.
    pub fn with_tap_chance(mut self, chance: f64) -> Self {
        self.tap_chance = chance.clamp(0.0, 1.0);
        self
    }
}

impl Environment for SimulatedSensors {
    fn temperature(&mut self) -> Result<f64, SensorError> {
        Ok(self.temperature.next(&mut self.rng))
    }

    fn pressure(&mut self) -> Result<f64, SensorError> {
        Ok(self.pressure.next(&mut self.rng))
    }

    fn humidity(&mut self) -> Result<f64, SensorError> {
        Ok(self.humidity.next(&mut self.rng))
    }
}

impl LightProximity for SimulatedSensors {
    fn proximity(&mut self) -> Result<u16, SensorError> {
        if self.rng.random_bool(self.tap_chance) {
            Ok(self.rng.random_range(1600..2047))
        } else {
            Ok(self.rng.random_range(0..8))
        }
    }

    fn lux(&mut self) -> Result<f64, SensorError> {
        Ok(self.lux.next(&mut self.rng))
    }
}

impl GasSensor for SimulatedSensors {
    fn read_all(&mut self) -> Result<GasReading, SensorError> {
        Ok(GasReading {
            oxidising: self.oxidising.next(&mut self.rng),
            reducing: self.reducing.next(&mut self.rng),
            nh3: self.nh3.next(&mut self.rng),
        })
    }
}

impl CpuThermometer for SimulatedSensors {
    fn cpu_temperature(&mut self) -> Result<f64, SensorError> {
        Ok(self.cpu.next(&mut self.rng))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_seed_same_readings() {
        let mut a = SimulatedSensors::new(7);
        let mut b = SimulatedSensors::new(7);
        for _ in 0..50 {
            assert_eq!(a.humidity().unwrap(), b.humidity().unwrap());
            assert_eq!(a.read_all().unwrap(), b.read_all().unwrap());
        }
    }

    #[test]
    fn test_walks_stay_in_range() {
        let mut s = SimulatedSensors::new(3);
        for _ in 0..5_000 {
            let h = s.humidity().unwrap();
            assert!((5.0..=95.0).contains(&h));
            let g = s.read_all().unwrap();
            assert!(g.oxidising > 0.0 && g.reducing > 0.0 && g.nh3 > 0.0);
        }
    }

    #[test]
    fn test_tap_chance() {
        let mut never = SimulatedSensors::new(1).with_tap_chance(0.0);
        assert!((0..1_000).all(|_| never.proximity().unwrap() < 8));

        let mut always = SimulatedSensors::new(1).with_tap_chance(1.0);
        assert!(always.proximity().unwrap() > 1500);
    }
}
