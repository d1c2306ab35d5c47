/*
 *  constants.rs
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

// Display geometry (0.96" ST7735 in landscape)
/// The width of the Enviro+ LCD in pixels.
pub const DISPLAY_WIDTH: u32 = 160;
/// The height of the Enviro+ LCD in pixels.
pub const DISPLAY_HEIGHT: u32 = 80;

/// Y-position of the top of the heatmap strip; the label lives above it.
pub const TOP_POS: i32 = 25;
/// Height of the line-graph marker drawn over each heatmap column.
pub const MARKER_HEIGHT: u32 = 2;
/// Hue at normalised value 0. Caps the palette at blue so it never wraps to magenta.
pub const MAX_HUE: f64 = 0.6;

// Label scroller
/// Number of characters visible at once in the label.
pub const LABEL_WINDOW_CHARS: usize = 20;
/// Spaces added either side of the formatted label.
pub const LABEL_PADDING: usize = 10;
/// Byte capacity of the stack buffer holding the visible label window.
pub const LABEL_WINDOW_BYTES: usize = LABEL_WINDOW_CHARS * 4;

/// Value every history slot starts with so early frames are well formed.
pub const HISTORY_FILL: f64 = 1.0;

// Page rotation
/// Proximity reading that counts as a tap on the sensor.
pub const PROXIMITY_TAP_THRESHOLD: u16 = 1500;
/// Default minimum time between accepted taps.
pub const DEFAULT_DEBOUNCE_MS: u64 = 500;
/// Default number of cycles a page stays up before rotating.
pub const DEFAULT_SWITCH_CYCLES: u32 = 100;

/// Default number of cycles before the gas baseline is captured.
pub const DEFAULT_WARMUP_CYCLES: u32 = 6000;
/// Default loop cadence.
pub const DEFAULT_CYCLE_MS: u64 = 100;

/// Proximity below which the light sensor is trusted (nothing covering it).
pub const LIGHT_PROXIMITY_LIMIT: u16 = 10;
/// Lux reported while the sensor is covered.
pub const LIGHT_SENTINEL: f64 = 1.0;
