/*
 *  main.rs
 *
 *  EnviroMon - rolling heatmaps for the Enviro+
 *  (c) 2020-26 Stuart Hunter
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

use anyhow::Context;
use clap::Parser;
use env_logger::Env;
use log::{error, info, warn};
use tokio::signal::unix::{signal, SignalKind};

use enviromon::config::{self, Cli};
use enviromon::dashboard::{Dashboard, DashboardSettings};
use enviromon::display::DisplayDriverFactory;
use enviromon::sensors;

include!(concat!(env!("OUT_DIR"), "/build_info.rs"));

/// Waits for SIGINT, SIGTERM or SIGHUP and logs which one arrived.
async fn signal_handler() -> std::io::Result<()> {
    let mut sigint = signal(SignalKind::interrupt())?;
    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sighup = signal(SignalKind::hangup())?;

    tokio::select! {
        _ = sigint.recv() => {
            info!("SIGINT received. Initiating graceful shutdown.");
        }
        _ = sigterm.recv() => {
            info!("SIGTERM received. Initiating graceful shutdown.");
        }
        _ = sighup.recv() => {
            info!("SIGHUP received. Initiating graceful shutdown.");
        }
    }
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // config first, it may carry the log level
    let loaded = config::load(&cli);
    let level = loaded
        .as_ref()
        .ok()
        .and_then(|cfg| cfg.log_level.clone())
        .unwrap_or_else(|| if cli.debug { "debug" } else { "info" }.to_string());
    env_logger::Builder::from_env(Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();

    let cfg = loaded.context("loading configuration")?;
    if cli.dump_config {
        print!("{}", config::dump(&cfg)?);
        return Ok(());
    }

    info!("{} v.{} built {} ({})", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"), BUILD_DATE, BUILD_PROFILE);

    let settings = DashboardSettings::from_config(&cfg);
    let display = DisplayDriverFactory::create_from_config(&cfg.display.clone().unwrap_or_default())
        .context("creating display driver")?;
    let sensors = sensors::open(&cfg.sensors.clone().unwrap_or_default())
        .context("opening sensors")?;
    let mut dashboard = Dashboard::new(sensors, display, &settings)
        .context("starting dashboard")?;

    let outcome = tokio::select! {
        res = signal_handler() => res.context("installing signal handlers"),
        res = dashboard.run(settings.cycle) => res.context("dashboard cycle failed"),
    };

    if let Err(e) = dashboard.shutdown() {
        warn!("Could not blank the display: {}", e);
    }

    if let Err(e) = &outcome {
        error!("{:#}", e);
    }
    info!("Exiting.");
    outcome
}
