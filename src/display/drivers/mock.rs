/*
 *  display/drivers/mock.rs
 *
 *  EnviroMon - rolling heatmaps for the Enviro+
 *  (c) 2020-26 Stuart Hunter
 *
 *  Mock display driver for testing without hardware
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

use std::sync::{Arc, Mutex};

use crate::display::error::DisplayError;
use crate::display::frame::Frame;
use crate::display::traits::{DisplayCapabilities, DisplayDriver};

/// Mock display driver for testing
///
/// Records every call and keeps a copy of the last frame blitted, so tests
/// can look at exactly what would have reached the panel.
#[derive(Debug, Clone)]
pub struct MockDriver {
    capabilities: DisplayCapabilities,

    /// Shared state for testing
    state: Arc<Mutex<MockDriverState>>,
}

/// Internal state for the mock driver (shared for inspection in tests)
#[derive(Debug, Default)]
pub struct MockDriverState {
    /// Number of times init() was called
    pub init_count: usize,

    /// Number of frames accepted by blit()
    pub blit_count: usize,

    /// Last frame accepted by blit()
    pub last_frame: Option<Frame>,

    /// Last backlight state set
    pub backlight: Option<bool>,

    pub is_initialized: bool,

    /// Simulate failures (for error testing)
    pub simulate_blit_failure: bool,
    pub simulate_init_failure: bool,
}

impl MockDriver {
    pub fn new_with_size(width: u32, height: u32) -> Self {
        Self {
            capabilities: DisplayCapabilities {
                width,
                height,
                max_fps: 60,
                supports_backlight: true,
            },
            state: Arc::new(Mutex::new(MockDriverState::default())),
        }
    }

    /// Get reference to state for inspection in tests
    pub fn state(&self) -> Arc<Mutex<MockDriverState>> {
        Arc::clone(&self.state)
    }
}

impl DisplayDriver for MockDriver {
    fn capabilities(&self) -> &DisplayCapabilities {
        &self.capabilities
    }

    fn init(&mut self) -> Result<(), DisplayError> {
        let mut state = self.state.lock().unwrap();
        if state.simulate_init_failure {
            return Err(DisplayError::InitializationFailed("Simulated init failure".to_string()));
        }
        state.init_count += 1;
        state.is_initialized = true;
        Ok(())
    }

    fn blit(&mut self, frame: &Frame) -> Result<(), DisplayError> {
        self.check_frame(frame)?;
        let mut state = self.state.lock().unwrap();
        if state.simulate_blit_failure {
            return Err(DisplayError::SpiError("Simulated blit failure".to_string()));
        }
        state.blit_count += 1;
        state.last_frame = Some(frame.clone());
        Ok(())
    }

    fn set_backlight(&mut self, on: bool) -> Result<(), DisplayError> {
        self.state.lock().unwrap().backlight = Some(on);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_graphics::pixelcolor::Rgb888;
    use embedded_graphics::prelude::*;

    #[test]
    fn test_mock_driver_records_blits() {
        let mut driver = MockDriver::new_with_size(16, 8);
        driver.init().unwrap();
        driver.blit(&Frame::new(16, 8, Rgb888::RED)).unwrap();
        driver.blit(&Frame::new(16, 8, Rgb888::BLUE)).unwrap();

        let state = driver.state();
        let state = state.lock().unwrap();
        assert_eq!(state.init_count, 1);
        assert_eq!(state.blit_count, 2);
        assert_eq!(state.last_frame.as_ref().unwrap().pixel(0, 0), Some(Rgb888::BLUE));
    }

    #[test]
    fn test_mock_driver_rejects_wrong_size() {
        let mut driver = MockDriver::new_with_size(16, 8);
        let err = driver.blit(&Frame::new(8, 8, Rgb888::WHITE)).unwrap_err();
        assert!(matches!(err, DisplayError::FrameSizeMismatch { expected: (16, 8), actual: (8, 8) }));
    }

    #[test]
    fn test_mock_driver_simulated_failures() {
        let mut driver = MockDriver::new_with_size(4, 4);
        driver.state().lock().unwrap().simulate_init_failure = true;
        assert!(driver.init().is_err());

        driver.state().lock().unwrap().simulate_blit_failure = true;
        assert!(driver.blit(&Frame::new(4, 4, Rgb888::WHITE)).is_err());
        assert_eq!(driver.state().lock().unwrap().blit_count, 0);
    }

    #[test]
    fn test_boxed_driver_delegates() {
        let mock = MockDriver::new_with_size(4, 4);
        let state = mock.state();
        let mut boxed: Box<dyn DisplayDriver> = Box::new(mock);
        assert_eq!(boxed.dimensions(), (4, 4));
        boxed.set_backlight(false).unwrap();
        assert_eq!(state.lock().unwrap().backlight, Some(false));
    }
}
