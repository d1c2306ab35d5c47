/*
 *  compositor.rs
 *
 *  EnviroMon - rolling heatmaps for the Enviro+
 *  (c) 2020-26 Stuart Hunter
 *
 *  Builds the full frame: background, heatmap, line graph, label
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
    mono_font::{ascii::FONT_10X20, MonoTextStyle},
    pixelcolor::Rgb888,
    prelude::*,
    text::{Baseline, Text},
};

use crate::heatmap::HeatmapRenderer;

/// Stateless: everything it draws comes in as arguments.
pub struct FrameCompositor {
    heatmap: HeatmapRenderer,
}

impl FrameCompositor {
    pub fn new(top_pos: i32, height: u32) -> Self {
        Self { heatmap: HeatmapRenderer::new(top_pos, height) }
    }

    /// Redraw `target` from scratch: white, the heatmap for `normalized`,
    /// then `label` in black at the top left.
    pub fn compose<D>(&self, target: &mut D, normalized: &[f64], label: &str) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = Rgb888>,
    {
        target.clear(Rgb888::WHITE)?;
        self.heatmap.draw(target, normalized)?;

        let style = MonoTextStyle::new(&FONT_10X20, Rgb888::BLACK);
        Text::with_baseline(label, Point::zero(), style, Baseline::Top).draw(target)?;
        Ok(())
    }
}
