/*
 *  display/drivers/snapshot.rs
 *
 *  EnviroMon - rolling heatmaps for the Enviro+
 *  (c) 2020-26 Stuart Hunter
 *
 *  Headless display: writes the composed frame to a PPM file
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

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::Local;
use log::{debug, info};

use crate::config::DisplayConfig;
use crate::display::error::DisplayError;
use crate::display::frame::Frame;
use crate::display::traits::{DisplayCapabilities, DisplayDriver};

const SNAPSHOT_FILE: &str = "latest.ppm";
const DEFAULT_EVERY: u32 = 10;

/// Writes every Nth frame to `<dir>/latest.ppm` as a binary PPM (P6).
///
/// The file is written beside the target and renamed into place, so a
/// viewer polling the file never sees a half-written frame.
#[derive(Debug)]
pub struct SnapshotDriver {
    capabilities: DisplayCapabilities,
    dir: PathBuf,
    every: u32,
    blits: u64,
}

impl SnapshotDriver {
    pub fn new(config: &DisplayConfig) -> Result<Self, DisplayError> {
        let every = config.snapshot_every.unwrap_or(DEFAULT_EVERY);
        if every == 0 {
            return Err(DisplayError::InvalidConfiguration("snapshot_every must be > 0".into()));
        }
        Ok(Self {
            capabilities: DisplayCapabilities {
                width: config.width_or_default(),
                height: config.height_or_default(),
                max_fps: 30,
                supports_backlight: false,
            },
            dir: config.snapshot_dir.clone().unwrap_or_else(|| PathBuf::from("frames")),
            every,
            blits: 0,
        })
    }

    pub fn path(&self) -> PathBuf {
        self.dir.join(SNAPSHOT_FILE)
    }

    fn write_ppm(&self, frame: &Frame) -> Result<(), DisplayError> {
        let target = self.path();
        let tmp = self.dir.join(format!("{SNAPSHOT_FILE}.tmp"));
        {
            let mut out = BufWriter::new(File::create(&tmp)?);
            write_ppm(&mut out, frame)?;
            out.flush()?;
        }
        fs::rename(&tmp, &target)?;
        debug!("snapshot {} written", target.display());
        Ok(())
    }
}

/// Serialise `frame` as P6 with a timestamp comment.
pub fn write_ppm<W: Write>(out: &mut W, frame: &Frame) -> std::io::Result<()> {
    writeln!(out, "P6")?;
    writeln!(out, "# enviromon {}", Local::now().format("%Y-%m-%d %H:%M:%S"))?;
    writeln!(out, "{} {}", frame.width(), frame.height())?;
    writeln!(out, "255")?;
    out.write_all(&frame.to_rgb888_bytes())
}

fn ensure_dir(dir: &Path) -> Result<(), DisplayError> {
    if !dir.exists() {
        fs::create_dir_all(dir)?;
    }
    Ok(())
}

impl DisplayDriver for SnapshotDriver {
    fn capabilities(&self) -> &DisplayCapabilities {
        &self.capabilities
    }

    fn init(&mut self) -> Result<(), DisplayError> {
        ensure_dir(&self.dir)?;
        info!("Snapshot display {}x{} -> {} (every {} frames)",
            self.capabilities.width, self.capabilities.height,
            self.path().display(), self.every);
        Ok(())
    }

    fn blit(&mut self, frame: &Frame) -> Result<(), DisplayError> {
        self.check_frame(frame)?;
        let due = self.blits % self.every as u64 == 0;
        self.blits += 1;
        if due {
            self.write_ppm(frame)?;
        }
        Ok(())
    }
}
