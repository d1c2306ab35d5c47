/*
 *  dashboard.rs
 *
 *  EnviroMon - rolling heatmaps for the Enviro+
 *  (c) 2020-26 Stuart Hunter
 *
 *  The dashboard cycle: read, evaluate, record, render, blit
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

use std::time::{Duration, Instant};

use embedded_graphics::pixelcolor::Rgb888;
use embedded_graphics::prelude::*;
use log::{debug, info, warn};
use thiserror::Error;

use crate::compositor::FrameCompositor;
use crate::config::Config;
use crate::constants::{DEFAULT_WARMUP_CYCLES, TOP_POS};
use crate::display::{DisplayDriver, DisplayError, Frame};
use crate::func_timer::FunctionTimer;
use crate::history::{normalize, HistoryStore};
use crate::metrics::{
    evaluate_gas, evaluate_humidity, evaluate_light, evaluate_pressure, evaluate_temperature,
    CalibrationBaseline, CpuTempSmoother, EvalError, Evaluation, Metric, Severity,
};
use crate::mode_controller::{ModeController, ModeControllerConfig, Transition};
use crate::pacer::Pacer;
use crate::scroller::LabelScroller;
use crate::sensors::{GasReading, SensorError, SensorHub};

#[derive(Debug, Error)]
pub enum DashboardError {
    #[error("sensor error: {0}")]
    Sensor(#[from] SensorError),
    #[error("evaluation error: {0}")]
    Eval(#[from] EvalError),
    #[error("display error: {0}")]
    Display(#[from] DisplayError),
}

/// Everything fixed for the life of the dashboard.
#[derive(Debug, Clone)]
pub struct DashboardSettings {
    pub width: u32,
    pub height: u32,
    pub top_pos: i32,
    pub mode: ModeControllerConfig,
    pub warmup_cycles: u32,
    pub cycle: Duration,
}

impl Default for DashboardSettings {
    fn default() -> Self {
        Self {
            width: crate::constants::DISPLAY_WIDTH,
            height: crate::constants::DISPLAY_HEIGHT,
            top_pos: TOP_POS,
            mode: ModeControllerConfig::default(),
            warmup_cycles: DEFAULT_WARMUP_CYCLES,
            cycle: Duration::from_millis(crate::constants::DEFAULT_CYCLE_MS),
        }
    }
}

impl DashboardSettings {
    pub fn from_config(config: &Config) -> Self {
        let mut settings = Self::default();
        if let Some(display) = config.display.as_ref() {
            settings.width = display.width_or_default();
            settings.height = display.height_or_default();
        }
        if let Some(dash) = config.dashboard.as_ref() {
            settings.mode = ModeControllerConfig {
                policy: dash.mode_policy.unwrap_or_default(),
                start: dash.start_metric.unwrap_or(Metric::Temperature),
                switch_cycles: dash.switch_cycles_or_default(),
                debounce: dash.debounce(),
            };
            settings.warmup_cycles = dash.warmup_cycles_or_default();
            settings.cycle = dash.cycle();
        }
        settings
    }
}

/// All mutable dashboard state, owned by the single cycle loop.
#[derive(Debug)]
pub struct DashboardState {
    pub histories: HistoryStore,
    pub scroller: LabelScroller,
    pub mode: ModeController,
    pub calibration: CalibrationBaseline,
    pub cpu: CpuTempSmoother,
    pub frame: Frame,
    last_severity: [Severity; 7],
    cycles: u64,
}

impl DashboardState {
    pub fn new(settings: &DashboardSettings, first_cpu_temp: f64) -> Self {
        Self {
            histories: HistoryStore::new(settings.width as usize),
            scroller: LabelScroller::new(),
            mode: ModeController::new(settings.mode.clone()),
            calibration: CalibrationBaseline::new(settings.warmup_cycles),
            cpu: CpuTempSmoother::new(first_cpu_temp),
            frame: Frame::new(settings.width, settings.height, Rgb888::WHITE),
            last_severity: [Severity::Info; 7],
            cycles: 0,
        }
    }

    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    /// Log when a page's classification gets worse.
    fn note_severity(&mut self, metric: Metric, eval: &Evaluation) {
        let prev = std::mem::replace(&mut self.last_severity[metric.index()], eval.severity);
        if eval.severity > prev && eval.severity >= Severity::Warning {
            warn!("{}: {:.1} {}", metric, eval.value, eval.unit.trim());
        }
    }
}

/// What one cycle did.
#[derive(Debug, Clone, PartialEq)]
pub struct CycleReport {
    pub metric: Metric,
    pub evaluation: Evaluation,
    pub label: String,
    pub transition: Option<Transition>,
}

pub struct Dashboard<S, D> {
    sensors: S,
    display: D,
    compositor: FrameCompositor,
    state: DashboardState,
}

impl<S: SensorHub, D: DisplayDriver> Dashboard<S, D> {
    /// Initialise the display and seed the CPU average from a first reading.
    pub fn new(mut sensors: S, mut display: D, settings: &DashboardSettings) -> Result<Self, DashboardError> {
        display.init()?;
        let first_cpu = sensors.cpu_temperature()?;
        info!("Dashboard {}x{}, policy {}, starting on {}",
            settings.width, settings.height, settings.mode.policy, settings.mode.start);
        Ok(Self {
            sensors,
            display,
            compositor: FrameCompositor::new(settings.top_pos, settings.height),
            state: DashboardState::new(settings, first_cpu),
        })
    }

    pub fn state(&self) -> &DashboardState {
        &self.state
    }

    pub fn display(&self) -> &D {
        &self.display
    }

    /// One full cycle. Any sensor, evaluation or display failure ends it.
    pub fn run_cycle(&mut self, now: Instant) -> Result<CycleReport, DashboardError> {
        let _timer = FunctionTimer::new("run_cycle");

        let proximity = self.sensors.proximity()?;

        let transition = self.state.mode.update(proximity, now);
        if let Some(t) = transition {
            self.state.scroller.reset();
            info!("Page {} -> {} ({:?})", t.from, t.to, t.trigger);
        }

        if self.state.calibration.wants_capture() {
            let reading = self.sensors.read_all()?;
            self.state.calibration.capture(&reading);
        } else {
            self.state.calibration.tick();
        }

        let metric = self.state.mode.current();
        let evaluation = self.evaluate(metric, proximity)?;
        self.state.note_severity(metric, &evaluation);

        let window = self.state.histories.push(metric, evaluation.value);
        let normalized = normalize(window);
        let label = self.state.scroller.next_window(evaluation.value, evaluation.unit);

        let Ok(()) = self.compositor.compose(&mut self.state.frame, &normalized, &label);
        self.display.blit(&self.state.frame)?;

        self.state.mode.tick();
        self.state.cycles += 1;

        Ok(CycleReport {
            metric,
            evaluation,
            label: label.to_string(),
            transition,
        })
    }

    fn evaluate(&mut self, metric: Metric, proximity: u16) -> Result<Evaluation, DashboardError> {
        let eval = match metric {
            Metric::Temperature => {
                let avg = self.state.cpu.push(self.sensors.cpu_temperature()?);
                evaluate_temperature(self.sensors.temperature()?, avg)?
            }
            Metric::Pressure => evaluate_pressure(self.sensors.pressure()?)?,
            Metric::Humidity => evaluate_humidity(self.sensors.humidity()?)?,
            Metric::Light => evaluate_light(self.sensors.lux()?, proximity)?,
            gas => {
                let reading = self.sensors.read_all()?;
                evaluate_gas(gas, channel_ohms(&reading, gas), self.state.calibration.kohm(gas))?
            }
        };
        Ok(eval)
    }

    /// Cycle forever at the configured cadence. Returns only on error.
    pub async fn run(&mut self, cycle: Duration) -> Result<(), DashboardError> {
        let mut pacer = Pacer::new(cycle);
        loop {
            let report = self.run_cycle(Instant::now())?;
            debug!("cycle {} {} {:.2}", self.state.cycles, report.metric, report.evaluation.value);
            pacer.wait().await;
        }
    }

    /// Blank the panel on the way out.
    pub fn shutdown(&mut self) -> Result<(), DashboardError> {
        self.state.frame.clear(Rgb888::BLACK).ok();
        self.display.blit(&self.state.frame)?;
        self.display.set_backlight(false)?;
        Ok(())
    }
}

fn channel_ohms(reading: &GasReading, metric: Metric) -> f64 {
    match metric {
        Metric::Oxidised => reading.oxidising,
        Metric::Reduced => reading.reducing,
        _ => reading.nh3,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::drivers::mock::MockDriver;
    use crate::mode_controller::ModePolicy;
    use crate::sensors::{CpuThermometer, Environment, GasSensor, LightProximity};

    /// Fixed readings; proximity can be scripted per call.
    struct Fixed {
        proximity: Vec<u16>,
        gas: GasReading,
        humidity: f64,
    }

    impl Fixed {
        fn new() -> Self {
            Self {
                proximity: Vec::new(),
                gas: GasReading { oxidising: 20_000.0, reducing: 400_000.0, nh3: 90_000.0 },
                humidity: 50.0,
            }
        }
    }

    impl Environment for Fixed {
        fn temperature(&mut self) -> Result<f64, SensorError> { Ok(25.0) }
        fn pressure(&mut self) -> Result<f64, SensorError> { Ok(1013.2) }
        fn humidity(&mut self) -> Result<f64, SensorError> { Ok(self.humidity) }
    }

    impl LightProximity for Fixed {
        fn proximity(&mut self) -> Result<u16, SensorError> {
            Ok(if self.proximity.is_empty() { 0 } else { self.proximity.remove(0) })
        }
        fn lux(&mut self) -> Result<f64, SensorError> { Ok(120.0) }
    }

    impl GasSensor for Fixed {
        fn read_all(&mut self) -> Result<GasReading, SensorError> { Ok(self.gas) }
    }

    impl CpuThermometer for Fixed {
        fn cpu_temperature(&mut self) -> Result<f64, SensorError> { Ok(40.0) }
    }

    fn settings(policy: ModePolicy, start: Metric, warmup: u32) -> DashboardSettings {
        DashboardSettings {
            mode: ModeControllerConfig { policy, start, ..Default::default() },
            warmup_cycles: warmup,
            ..Default::default()
        }
    }

    #[test]
    fn test_temperature_cycle_end_to_end() {
        let driver = MockDriver::new_with_size(160, 80);
        let state = driver.state();
        let mut dash = Dashboard::new(Fixed::new(), driver, &settings(ModePolicy::Pinned, Metric::Temperature, 10)).unwrap();

        let report = dash.run_cycle(Instant::now()).unwrap();
        assert_eq!(report.metric, Metric::Temperature);
        assert!((report.evaluation.value - 18.333333333333332).abs() < 1e-9);
        assert_eq!(report.evaluation.severity, Severity::Ok);
        assert_eq!(report.label, "          18.3 C, te");

        let state = state.lock().unwrap();
        assert_eq!(state.init_count, 1);
        assert_eq!(state.blit_count, 1);
    }

    #[test]
    fn test_history_only_for_active_metric() {
        let mut dash = Dashboard::new(
            Fixed::new(),
            MockDriver::new_with_size(160, 80),
            &settings(ModePolicy::Pinned, Metric::Pressure, 10),
        ).unwrap();
        dash.run_cycle(Instant::now()).unwrap();
        let hist = &dash.state().histories;
        assert_eq!(*hist.get(Metric::Pressure).iter().last().unwrap(), 1013.2);
        assert!(hist.get(Metric::Humidity).iter().all(|&v| v == 1.0));
        assert_eq!(hist.get(Metric::Pressure).len(), 160);
    }

    #[test]
    fn test_tap_resets_scroll() {
        let mut sensors = Fixed::new();
        sensors.proximity = vec![0, 0, 0, 2000];
        let mut dash = Dashboard::new(sensors, MockDriver::new_with_size(160, 80),
            &settings(ModePolicy::Gesture, Metric::Pressure, 10)).unwrap();
        let now = Instant::now();
        for _ in 0..3 {
            dash.run_cycle(now).unwrap();
        }
        assert_eq!(dash.state().scroller.position(), 3);

        let report = dash.run_cycle(now).unwrap();
        assert_eq!(report.metric, Metric::Humidity);
        assert!(report.transition.is_some());
        assert_eq!(dash.state().scroller.position(), 1);
        assert_eq!(dash.state().mode.counter(), 1);
    }

    #[test]
    fn test_gas_uses_frozen_baseline() {
        let mut dash = Dashboard::new(Fixed::new(), MockDriver::new_with_size(160, 80),
            &settings(ModePolicy::Pinned, Metric::Reduced, 2)).unwrap();
        let now = Instant::now();

        // warm-up: baseline 1 kOhm against a 400 kOhm reading
        let early = dash.run_cycle(now).unwrap();
        assert!(early.evaluation.value < 1.0);
        dash.run_cycle(now).unwrap();
        assert!(!dash.state().calibration.is_captured());

        // captured on the third cycle, reading now equals baseline
        let settled = dash.run_cycle(now).unwrap();
        assert!(dash.state().calibration.is_captured());
        assert!((settled.evaluation.value - 10f64.powf(0.64)).abs() < 1e-9);
        assert_eq!(settled.evaluation.unit, "ppm CO levels are safe");
    }

    #[test]
    fn test_bad_gas_reading_is_an_error() {
        let mut sensors = Fixed::new();
        sensors.gas.nh3 = 0.0;
        let mut dash = Dashboard::new(sensors, MockDriver::new_with_size(160, 80),
            &settings(ModePolicy::Pinned, Metric::Nh3, 100)).unwrap();
        let err = dash.run_cycle(Instant::now()).unwrap_err();
        assert!(matches!(err, DashboardError::Eval(EvalError::InvalidGasRatio { .. })));
    }

    #[test]
    fn test_negative_baseline_fails_the_cycle() {
        let mut sensors = Fixed::new();
        sensors.gas.reducing = -5_000.0;
        let mut dash = Dashboard::new(sensors, MockDriver::new_with_size(160, 80),
            &settings(ModePolicy::Pinned, Metric::Reduced, 0)).unwrap();
        let err = dash.run_cycle(Instant::now()).unwrap_err();
        assert!(dash.state().calibration.is_captured());
        assert!(matches!(err, DashboardError::Eval(EvalError::InvalidBaseline { metric: Metric::Reduced, .. })));
    }

    #[test]
    fn test_blit_failure_propagates() {
        let driver = MockDriver::new_with_size(160, 80);
        let state = driver.state();
        let mut dash = Dashboard::new(Fixed::new(), driver,
            &settings(ModePolicy::Pinned, Metric::Light, 10)).unwrap();
        state.lock().unwrap().simulate_blit_failure = true;
        assert!(matches!(dash.run_cycle(Instant::now()), Err(DashboardError::Display(_))));
    }

    #[test]
    fn test_frame_matches_composition() {
        let mut dash = Dashboard::new(Fixed::new(), MockDriver::new_with_size(160, 80),
            &settings(ModePolicy::Pinned, Metric::Humidity, 10)).unwrap();
        dash.run_cycle(Instant::now()).unwrap();
        let frame = &dash.state().frame;
        // 159 ones and a 50: max at the right edge, marker at the top row
        assert_eq!(frame.pixel(159, 25), Some(Rgb888::BLACK));
        assert_eq!(frame.pixel(159, 60), Some(crate::heatmap::heat_color(1.0)));
    }

    #[test]
    fn test_settings_from_config() {
        let config = crate::config::parse_yaml(
            "display:\n  width: 128\ndashboard:\n  mode_policy: timer\n  start_metric: light\n  warmup_cycles: 5\n",
        ).unwrap();
        let s = DashboardSettings::from_config(&config);
        assert_eq!(s.width, 128);
        assert_eq!(s.height, 80);
        assert_eq!(s.mode.policy, ModePolicy::Timer);
        assert_eq!(s.mode.start, Metric::Light);
        assert_eq!(s.warmup_cycles, 5);
    }
}
