/*
 *  lib.rs
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

//! Environmental dashboard engine: per-metric rolling history, heatmap and
//! line-graph rendering, scrolling labels and page rotation, driven by the
//! Enviro+ sensors (or a simulated stand-in).

pub mod config;
pub mod constants;
pub mod history;
pub mod heatmap;
pub mod scroller;
pub mod compositor;
pub mod mode_controller;
pub mod metrics;
pub mod sensors;
pub mod display;
pub mod dashboard;
pub mod pacer;
pub mod func_timer;

pub use dashboard::{Dashboard, DashboardError, DashboardState};
pub use metrics::Metric;
