/*
 *  display/drivers/st7735.rs
 *
 *  EnviroMon - rolling heatmaps for the Enviro+
 *  (c) 2020-26 Stuart Hunter
 *
 *  ST7735 0.96" colour LCD over spidev + gpio-cdev
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

use core::convert::Infallible;

use embedded_hal::digital::{ErrorType, OutputPin};
use linux_embedded_hal::{
    gpio_cdev::{Chip, LineRequestFlags},
    spidev::{SpiModeFlags, SpidevOptions},
    CdevPin, Delay, SpidevDevice,
};
use log::info;
use st7735_lcd::{Orientation, ST7735};

use crate::config::{DisplayConfig, SpiConfig};
use crate::display::error::DisplayError;
use crate::display::frame::Frame;
use crate::display::traits::{DisplayCapabilities, DisplayDriver};

/// The Enviro+ panel has no reset line wired; the controller is reset by
/// software during init.
#[derive(Debug, Default)]
pub struct NoReset;

impl ErrorType for NoReset {
    type Error = Infallible;
}

impl OutputPin for NoReset {
    fn set_low(&mut self) -> Result<(), Self::Error> { Ok(()) }
    fn set_high(&mut self) -> Result<(), Self::Error> { Ok(()) }
}

fn orientation(degrees: u16) -> Result<Orientation, DisplayError> {
    match degrees {
        0 => Ok(Orientation::Portrait),
        90 => Ok(Orientation::Landscape),
        180 => Ok(Orientation::PortraitSwapped),
        270 => Ok(Orientation::LandscapeSwapped),
        other => Err(DisplayError::InvalidRotation(other)),
    }
}

pub struct St7735Driver {
    lcd: ST7735<SpidevDevice, CdevPin, NoReset>,
    backlight: Option<CdevPin>,
    capabilities: DisplayCapabilities,
    orientation: Orientation,
    offset: (u16, u16),
}

impl St7735Driver {
    pub fn new_spi(config: &DisplayConfig) -> Result<Self, DisplayError> {
        let spi_cfg = config.spi.clone().unwrap_or_default();
        let width = config.width_or_default();
        let height = config.height_or_default();

        let mut spi = SpidevDevice::open(&spi_cfg.bus)
            .map_err(|e| DisplayError::SpiError(format!("{}: {e}", spi_cfg.bus)))?;
        let options = SpidevOptions::new()
            .bits_per_word(8)
            .max_speed_hz(spi_cfg.speed_hz.unwrap_or(10_000_000))
            .mode(SpiModeFlags::SPI_MODE_0)
            .build();
        spi.configure(&options)
            .map_err(|e| DisplayError::SpiError(format!("configure: {e}")))?;

        let (dc, backlight) = request_pins(&spi_cfg)?;

        let lcd = ST7735::new(
            spi,
            dc,
            NoReset,
            true,
            config.invert.unwrap_or(true),
            width,
            height,
        );

        Ok(Self {
            lcd,
            backlight,
            capabilities: DisplayCapabilities {
                width,
                height,
                max_fps: 30,
                supports_backlight: spi_cfg.backlight_pin.is_some(),
            },
            orientation: orientation(config.rotate_deg.unwrap_or(270))?,
            offset: (spi_cfg.offset_x.unwrap_or(1), spi_cfg.offset_y.unwrap_or(26)),
        })
    }
}

fn request_pins(spi_cfg: &SpiConfig) -> Result<(CdevPin, Option<CdevPin>), DisplayError> {
    let chip_path = spi_cfg.gpio_chip.as_deref().unwrap_or("/dev/gpiochip0");
    let mut chip = Chip::new(chip_path)
        .map_err(|e| DisplayError::GpioError(format!("{chip_path}: {e}")))?;

    let mut output = |pin: u32, level: u8, consumer: &str| -> Result<CdevPin, DisplayError> {
        let handle = chip
            .get_line(pin)
            .and_then(|line| line.request(LineRequestFlags::OUTPUT, level, consumer))
            .map_err(|e| DisplayError::GpioError(format!("BCM {pin}: {e}")))?;
        CdevPin::new(handle).map_err(|e| DisplayError::GpioError(format!("BCM {pin}: {e}")))
    };

    let dc = output(spi_cfg.dc_pin, 0, "enviromon-dc")?;
    let backlight = match spi_cfg.backlight_pin {
        Some(pin) => Some(output(pin, 0, "enviromon-bl")?),
        None => None,
    };
    Ok((dc, backlight))
}

impl DisplayDriver for St7735Driver {
    fn capabilities(&self) -> &DisplayCapabilities {
        &self.capabilities
    }

    fn init(&mut self) -> Result<(), DisplayError> {
        let mut delay = Delay {};
        self.lcd.init(&mut delay)
            .map_err(|_| DisplayError::InitializationFailed("ST7735 init sequence".into()))?;
        self.lcd.set_orientation(&self.orientation)
            .map_err(|_| DisplayError::InitializationFailed("ST7735 orientation".into()))?;
        self.lcd.set_offset(self.offset.0, self.offset.1);
        self.set_backlight(true)?;
        info!("ST7735 {}x{} ready", self.capabilities.width, self.capabilities.height);
        Ok(())
    }

    fn blit(&mut self, frame: &Frame) -> Result<(), DisplayError> {
        self.check_frame(frame)?;
        let ex = (frame.width() - 1) as u16;
        let ey = (frame.height() - 1) as u16;
        self.lcd.set_pixels(0, 0, ex, ey, frame.rgb565_words())
            .map_err(|_| DisplayError::SpiError("pixel transfer failed".into()))
    }

    fn set_backlight(&mut self, on: bool) -> Result<(), DisplayError> {
        if let Some(pin) = self.backlight.as_mut() {
            let res = if on { pin.set_high() } else { pin.set_low() };
            res.map_err(|e| DisplayError::GpioError(format!("backlight: {e:?}")))?;
        }
        Ok(())
    }
}
