/*
 *  display/traits.rs
 *
 *  EnviroMon - rolling heatmaps for the Enviro+
 *  (c) 2020-26 Stuart Hunter
 *
 *  Core trait definitions for display driver abstraction
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

use crate::display::error::DisplayError;
use crate::display::frame::Frame;

/// Display capabilities and metadata
#[derive(Debug, Clone)]
pub struct DisplayCapabilities {
    /// Display width in pixels
    pub width: u32,

    /// Display height in pixels
    pub height: u32,

    /// Maximum recommended frame rate
    pub max_fps: u32,

    /// Whether the backlight can be switched
    pub supports_backlight: bool,
}

/// Minimal hardware abstraction - all display drivers must implement this trait
///
/// The dashboard composes a whole [`Frame`] every cycle and hands it over in
/// one call; drivers never see partial updates.
pub trait DisplayDriver {
    /// Returns the capabilities of this display
    fn capabilities(&self) -> &DisplayCapabilities;

    /// Returns the display dimensions as (width, height)
    fn dimensions(&self) -> (u32, u32) {
        let caps = self.capabilities();
        (caps.width, caps.height)
    }

    /// Initialize the display hardware
    fn init(&mut self) -> Result<(), DisplayError>;

    /// Push a complete frame to the panel
    fn blit(&mut self, frame: &Frame) -> Result<(), DisplayError>;

    /// Switch the backlight on or off (if supported)
    fn set_backlight(&mut self, _on: bool) -> Result<(), DisplayError> {
        Ok(())
    }

    /// Reject frames that were not composed for this panel
    fn check_frame(&self, frame: &Frame) -> Result<(), DisplayError> {
        let expected = self.dimensions();
        let actual = (frame.width(), frame.height());
        if expected != actual {
            return Err(DisplayError::FrameSizeMismatch { expected, actual });
        }
        Ok(())
    }
}

impl<T: DisplayDriver + ?Sized> DisplayDriver for Box<T> {
    fn capabilities(&self) -> &DisplayCapabilities {
        (**self).capabilities()
    }

    fn init(&mut self) -> Result<(), DisplayError> {
        (**self).init()
    }

    fn blit(&mut self, frame: &Frame) -> Result<(), DisplayError> {
        (**self).blit(frame)
    }

    fn set_backlight(&mut self, on: bool) -> Result<(), DisplayError> {
        (**self).set_backlight(on)
    }
}
