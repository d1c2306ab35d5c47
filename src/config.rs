/*
 *  config.rs
 *
 *  EnviroMon - rolling heatmaps for the Enviro+
 *  (c) 2020-26 Stuart Hunter
 *
 *  Layered configuration: defaults, then YAML, then command line
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

use clap::{ArgAction, Parser, ValueHint};
use dirs_next::home_dir;
use serde::{Deserialize, Serialize};
use std::{fs, path::{Path, PathBuf}, time::Duration};
use thiserror::Error;

use crate::constants::{
    DEFAULT_CYCLE_MS, DEFAULT_DEBOUNCE_MS, DEFAULT_SWITCH_CYCLES, DEFAULT_WARMUP_CYCLES,
    DISPLAY_HEIGHT, DISPLAY_WIDTH,
};
use crate::metrics::Metric;
use crate::mode_controller::ModePolicy;

/// Error type for config loading/validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Validation error: {0}")]
    Validation(String),
}

/// Top-level app configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    pub log_level: Option<String>,     // e.g., "info" | "debug"
    pub display: Option<DisplayConfig>,
    pub sensors: Option<SensorConfig>,
    pub dashboard: Option<DashboardConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DisplayConfig {
    pub driver: Option<DriverKind>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub rotate_deg: Option<u16>,
    pub invert: Option<bool>,
    pub spi: Option<SpiConfig>,
    pub snapshot_dir: Option<PathBuf>,
    pub snapshot_every: Option<u32>,
}

impl DisplayConfig {
    pub fn width_or_default(&self) -> u32 {
        self.width.unwrap_or(DISPLAY_WIDTH)
    }

    pub fn height_or_default(&self) -> u32 {
        self.height.unwrap_or(DISPLAY_HEIGHT)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpiConfig {
    pub bus: String,                // e.g. "/dev/spidev0.1"
    pub speed_hz: Option<u32>,
    pub gpio_chip: Option<String>,  // e.g. "/dev/gpiochip0"
    pub dc_pin: u32,                // BCM numbering
    pub backlight_pin: Option<u32>,
    pub offset_x: Option<u16>,
    pub offset_y: Option<u16>,
}

impl Default for SpiConfig {
    /// Enviro+ wiring: CS1, DC on BCM 9, backlight on BCM 12
    fn default() -> Self {
        Self {
            bus: "/dev/spidev0.1".to_string(),
            speed_hz: Some(10_000_000),
            gpio_chip: Some("/dev/gpiochip0".to_string()),
            dc_pin: 9,
            backlight_pin: Some(12),
            offset_x: Some(1),
            offset_y: Some(26),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DriverKind {
    St7735,
    Snapshot,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SensorConfig {
    pub backend: Option<SensorBackend>,
    pub i2c_bus: Option<String>,
    pub cpu_source: Option<CpuSource>,
    pub thermal_zone: Option<PathBuf>,
    pub heater_pin: Option<u32>,
    pub seed: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SensorBackend {
    EnviroPlus,
    Simulated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CpuSource {
    Sysfs,
    Vcgencmd,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DashboardConfig {
    pub cycle_ms: Option<u64>,
    pub mode_policy: Option<ModePolicy>,
    pub start_metric: Option<Metric>,
    pub switch_cycles: Option<u32>,
    pub debounce_ms: Option<u64>,
    pub warmup_cycles: Option<u32>,
}

impl DashboardConfig {
    pub fn cycle(&self) -> Duration {
        Duration::from_millis(self.cycle_ms.unwrap_or(DEFAULT_CYCLE_MS))
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms.unwrap_or(DEFAULT_DEBOUNCE_MS))
    }

    pub fn switch_cycles_or_default(&self) -> u32 {
        self.switch_cycles.unwrap_or(DEFAULT_SWITCH_CYCLES)
    }

    pub fn warmup_cycles_or_default(&self) -> u32 {
        self.warmup_cycles.unwrap_or(DEFAULT_WARMUP_CYCLES)
    }
}

/// CLI overrides. All fields are Options so we can layer them over YAML.
#[derive(Debug, Parser, Clone, Default)]
#[command(name = "enviromon", version, about = "Enviro+ heatmap dashboard", disable_help_flag = false)]
pub struct Cli {
    /// Path to a YAML config file (overrides search)
    #[arg(long, short = 'c', value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,
    /// Enable debug log level
    #[arg(long, short = 'v', alias = "verbose", action = ArgAction::SetTrue)]
    pub debug: bool,
    #[arg(long)]
    pub log_level: Option<String>,
    /// Display driver (st7735 | snapshot)
    #[arg(long, value_parser = parse_driver)]
    pub display: Option<DriverKind>,
    /// Directory for snapshot frames
    #[arg(long, value_hint = ValueHint::DirPath)]
    pub snapshot_dir: Option<PathBuf>,
    /// Sensor backend (enviroplus | simulated)
    #[arg(long, value_parser = parse_backend)]
    pub sensors: Option<SensorBackend>,
    #[arg(long)]
    pub i2c_bus: Option<String>,
    #[arg(long)]
    pub cycle_ms: Option<u64>,
    /// Page rotation policy (gesture | timer | gesture-and-timer | pinned)
    #[arg(long, value_parser = parse_policy)]
    pub mode_policy: Option<ModePolicy>,
    /// First page shown (temperature, pressure, humidity, light, oxidised, reduced, nh3)
    #[arg(long, value_parser = parse_metric)]
    pub start_metric: Option<Metric>,
    /// dump fully merged config (after overrides) and exit
    #[arg(long, action = ArgAction::SetTrue)]
    pub dump_config: bool,
}

fn parse_driver(s: &str) -> Result<DriverKind, String> {
    match s {
        "st7735" => Ok(DriverKind::St7735),
        "snapshot" => Ok(DriverKind::Snapshot),
        _ => Err(format!("unknown display driver '{s}'")),
    }
}

fn parse_backend(s: &str) -> Result<SensorBackend, String> {
    match s {
        "enviroplus" => Ok(SensorBackend::EnviroPlus),
        "simulated" => Ok(SensorBackend::Simulated),
        _ => Err(format!("unknown sensor backend '{s}'")),
    }
}

fn parse_policy(s: &str) -> Result<ModePolicy, String> {
    s.parse()
}

fn parse_metric(s: &str) -> Result<Metric, String> {
    s.parse()
}

/// Public entry point: read YAML, merge CLI, validate.
pub fn load(cli: &Cli) -> Result<Config, ConfigError> {
    // 1) defaults (from `Default` impl)
    let mut cfg = Config::default();

    // 2) YAML file (explicit path or search)
    if let Some(p) = cli.config.as_ref() {
        if p.exists() {
            let y = read_yaml(p)?;
            merge(&mut cfg, y);
        } else {
            return Err(ConfigError::Validation(format!(
                "Config file not found: {}",
                p.display()
            )));
        }
    } else if let Some(p) = find_config_file() {
        let y = read_yaml(&p)?;
        merge(&mut cfg, y);
    }

    // 3) CLI overrides (highest precedence)
    apply_cli_overrides(&mut cfg, cli);

    // 4) Validate
    validate(&cfg)?;

    Ok(cfg)
}

/// Pretty YAML of effective config (nice for debugging)
pub fn dump(cfg: &Config) -> Result<String, ConfigError> {
    Ok(serde_yaml::to_string(cfg)?)
}

/// Try common locations in order (first hit wins).
fn find_config_file() -> Option<PathBuf> {
    // XDG-style: ~/.config/enviromon/config.yaml
    if let Some(home) = home_dir() {
        let p = home.join(".config/enviromon/config.yaml");
        if p.exists() { return Some(p) }
        let p = home.join(".config/enviromon.yaml");
        if p.exists() { return Some(p) }
    }
    // project local
    for candidate in &["enviromon.yaml", "config.yaml", "config/enviromon.yaml"] {
        let p = PathBuf::from(candidate);
        if p.exists() { return Some(p) }
    }
    None
}

fn read_yaml(path: &Path) -> Result<Config, ConfigError> {
    let s = fs::read_to_string(path)?;
    parse_yaml(&s)
}

pub fn parse_yaml(s: &str) -> Result<Config, ConfigError> {
    let cfg: Config = serde_yaml::from_str(s)?;
    Ok(cfg)
}

/// Shallow merge `src` into `dst`, Option-by-Option.
fn merge(dst: &mut Config, src: Config) {
    // top-level
    if src.log_level.is_some()      { dst.log_level = src.log_level; }
    match (&mut dst.display, src.display) {
        (None, Some(c)) => dst.display = Some(c),
        (Some(d), Some(s)) => merge_display(d, s),
        _ => {}
    }
    match (&mut dst.sensors, src.sensors) {
        (None, Some(c)) => dst.sensors = Some(c),
        (Some(d), Some(s)) => merge_sensors(d, s),
        _ => {}
    }
    match (&mut dst.dashboard, src.dashboard) {
        (None, Some(c)) => dst.dashboard = Some(c),
        (Some(d), Some(s)) => merge_dashboard(d, s),
        _ => {}
    }
}

fn merge_display(dst: &mut DisplayConfig, src: DisplayConfig) {
    if src.driver.is_some()         { dst.driver = src.driver; }
    if src.width.is_some()          { dst.width = src.width; }
    if src.height.is_some()         { dst.height = src.height; }
    if src.rotate_deg.is_some()     { dst.rotate_deg = src.rotate_deg; }
    if src.invert.is_some()         { dst.invert = src.invert; }
    if src.spi.is_some()            { dst.spi = src.spi; }
    if src.snapshot_dir.is_some()   { dst.snapshot_dir = src.snapshot_dir; }
    if src.snapshot_every.is_some() { dst.snapshot_every = src.snapshot_every; }
}

fn merge_sensors(dst: &mut SensorConfig, src: SensorConfig) {
    if src.backend.is_some()        { dst.backend = src.backend; }
    if src.i2c_bus.is_some()        { dst.i2c_bus = src.i2c_bus; }
    if src.cpu_source.is_some()     { dst.cpu_source = src.cpu_source; }
    if src.thermal_zone.is_some()   { dst.thermal_zone = src.thermal_zone; }
    if src.heater_pin.is_some()     { dst.heater_pin = src.heater_pin; }
    if src.seed.is_some()           { dst.seed = src.seed; }
}

fn merge_dashboard(dst: &mut DashboardConfig, src: DashboardConfig) {
    if src.cycle_ms.is_some()       { dst.cycle_ms = src.cycle_ms; }
    if src.mode_policy.is_some()    { dst.mode_policy = src.mode_policy; }
    if src.start_metric.is_some()   { dst.start_metric = src.start_metric; }
    if src.switch_cycles.is_some()  { dst.switch_cycles = src.switch_cycles; }
    if src.debounce_ms.is_some()    { dst.debounce_ms = src.debounce_ms; }
    if src.warmup_cycles.is_some()  { dst.warmup_cycles = src.warmup_cycles; }
}

fn apply_cli_overrides(cfg: &mut Config, cli: &Cli) {
    if cli.log_level.is_some()      { cfg.log_level = cli.log_level.clone(); }
    if cli.debug                    { cfg.log_level = Some("debug".to_string()); }

    if cli.display.is_some() || cli.snapshot_dir.is_some() {
        let display = cfg.display.get_or_insert_with(DisplayConfig::default);
        if cli.display.is_some()      { display.driver = cli.display; }
        if cli.snapshot_dir.is_some() { display.snapshot_dir = cli.snapshot_dir.clone(); }
    }

    if cli.sensors.is_some() || cli.i2c_bus.is_some() {
        let sensors = cfg.sensors.get_or_insert_with(SensorConfig::default);
        if cli.sensors.is_some()  { sensors.backend = cli.sensors; }
        if cli.i2c_bus.is_some()  { sensors.i2c_bus = cli.i2c_bus.clone(); }
    }

    if cli.cycle_ms.is_some() || cli.mode_policy.is_some() || cli.start_metric.is_some() {
        let dash = cfg.dashboard.get_or_insert_with(DashboardConfig::default);
        if cli.cycle_ms.is_some()     { dash.cycle_ms = cli.cycle_ms; }
        if cli.mode_policy.is_some()  { dash.mode_policy = cli.mode_policy; }
        if cli.start_metric.is_some() { dash.start_metric = cli.start_metric; }
    }
}

/// Put any invariants here (required fields, ranges, etc.)
pub fn validate(cfg: &Config) -> Result<(), ConfigError> {
    if let Some(display) = cfg.display.as_ref() {
        if display.width == Some(0) || display.height == Some(0) {
            return Err(ConfigError::Validation("display width/height must be > 0".into()));
        }
        if let Some(rot) = display.rotate_deg {
            match rot {
                0 | 90 | 180 | 270 => {},
                _ => return Err(ConfigError::Validation("display rotate_deg must be 0|90|180|270".into()))
            }
        }
        if display.snapshot_every == Some(0) {
            return Err(ConfigError::Validation("display snapshot_every must be > 0".into()));
        }
    }
    if let Some(dash) = cfg.dashboard.as_ref() {
        if dash.switch_cycles == Some(0) {
            return Err(ConfigError::Validation("dashboard switch_cycles must be > 0".into()));
        }
    }
    Ok(())
}
