/*
 *  heatmap.rs
 *
 *  EnviroMon - rolling heatmaps for the Enviro+
 *  (c) 2020-26 Stuart Hunter
 *
 *  Heatmap strip with a line-graph overlay, one column per history sample
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

use embedded_graphics::{
    pixelcolor::Rgb888,
    prelude::*,
    primitives::{PrimitiveStyle, Rectangle},
};

use crate::constants::{MARKER_HEIGHT, MAX_HUE};

/// HSV to RGB, all components in [0, 1].
///
/// Same six-sector arithmetic as the classic `colorsys` conversion, so the
/// palette matches pixel for pixel.
pub fn hsv_to_rgb(h: f64, s: f64, v: f64) -> (f64, f64, f64) {
    if s == 0.0 {
        return (v, v, v);
    }
    let sector = (h * 6.0).floor();
    let f = h * 6.0 - sector;
    let p = v * (1.0 - s);
    let q = v * (1.0 - s * f);
    let t = v * (1.0 - s * (1.0 - f));
    match (sector as i64).rem_euclid(6) {
        0 => (v, t, p),
        1 => (q, v, p),
        2 => (p, v, t),
        3 => (p, q, v),
        4 => (t, p, v),
        _ => (v, p, q),
    }
}

/// Colour for a normalised sample: 1.0 is red, 0.0 is blue.
pub fn heat_color(normalized: f64) -> Rgb888 {
    let hue = (1.0 - normalized) * MAX_HUE;
    let (r, g, b) = hsv_to_rgb(hue, 1.0, 1.0);
    Rgb888::new(channel(r), channel(g), channel(b))
}

#[inline]
fn channel(x: f64) -> u8 {
    // truncation, not rounding
    (x * 255.0).clamp(0.0, 255.0) as u8
}

/// Row of the line-graph marker for a normalised sample. Higher values sit
/// nearer `top_pos`.
pub fn marker_row(normalized: f64, top_pos: i32, height: u32) -> i32 {
    let h = height as f64;
    let top = top_pos as f64;
    (h - (top + normalized * (h - top)) + top) as i32
}

/// Draws the coloured strip and the black line-graph markers for a window of
/// normalised samples, column `i` for sample `i`.
pub struct HeatmapRenderer {
    top_pos: i32,
    height: u32,
}

impl HeatmapRenderer {
    pub fn new(top_pos: i32, height: u32) -> Self {
        Self { top_pos, height }
    }

    pub fn draw<D>(&self, target: &mut D, normalized: &[f64]) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = Rgb888>,
    {
        let strip_height = (self.height as i32 - self.top_pos).max(0) as u32;
        let marker_style = PrimitiveStyle::with_fill(Rgb888::BLACK);

        for (i, &n) in normalized.iter().enumerate() {
            let x = i as i32;

            Rectangle::new(Point::new(x, self.top_pos), Size::new(1, strip_height))
                .into_styled(PrimitiveStyle::with_fill(heat_color(n)))
                .draw(target)?;

            let line_y = marker_row(n, self.top_pos, self.height);
            Rectangle::new(Point::new(x, line_y), Size::new(1, MARKER_HEIGHT))
                .into_styled(marker_style)
                .draw(target)?;
        }

        Ok(())
    }
}
