/*
 *  display/factory.rs
 *
 *  EnviroMon - rolling heatmaps for the Enviro+
 *  (c) 2020-26 Stuart Hunter
 *
 *  Factory for creating display drivers from configuration
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

use log::info;

use crate::config::{DisplayConfig, DriverKind};
use crate::display::drivers::snapshot::SnapshotDriver;
use crate::display::error::DisplayError;
use crate::display::traits::DisplayDriver;

#[cfg(feature = "enviro-plus")]
use crate::display::drivers::st7735::St7735Driver;

/// Type alias for boxed display driver trait objects
pub type BoxedDriver = Box<dyn DisplayDriver>;

/// Panel used when the configuration does not name one
pub const fn default_driver() -> DriverKind {
    if cfg!(feature = "enviro-plus") { DriverKind::St7735 } else { DriverKind::Snapshot }
}

/// Factory for creating display drivers from configuration
pub struct DisplayDriverFactory;

impl DisplayDriverFactory {
    /// Create a display driver from configuration
    ///
    /// The driver is returned uninitialised; call [`DisplayDriver::init`]
    /// before the first blit.
    pub fn create_from_config(config: &DisplayConfig) -> Result<BoxedDriver, DisplayError> {
        let kind = config.driver.unwrap_or_else(default_driver);
        info!("Creating {:?} display driver", kind);

        match kind {
            DriverKind::Snapshot => Ok(Box::new(SnapshotDriver::new(config)?)),

            #[cfg(feature = "enviro-plus")]
            DriverKind::St7735 => Ok(Box::new(St7735Driver::new_spi(config)?)),

            #[cfg(not(feature = "enviro-plus"))]
            DriverKind::St7735 => Err(DisplayError::Unsupported(
                "ST7735 (enable with --features enviro-plus)",
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_from_config() {
        let config = DisplayConfig {
            driver: Some(DriverKind::Snapshot),
            width: Some(160),
            height: Some(80),
            ..Default::default()
        };
        let driver = DisplayDriverFactory::create_from_config(&config).unwrap();
        assert_eq!(driver.dimensions(), (160, 80));
    }

    #[cfg(not(feature = "enviro-plus"))]
    #[test]
    fn test_st7735_needs_feature() {
        let config = DisplayConfig {
            driver: Some(DriverKind::St7735),
            ..Default::default()
        };
        assert!(matches!(
            DisplayDriverFactory::create_from_config(&config),
            Err(DisplayError::Unsupported(_))
        ));
        assert_eq!(default_driver(), DriverKind::Snapshot);
    }
}
