/*
 *  pacer.rs
 *
 *  EnviroMon - rolling heatmaps for the Enviro+
 *	(c) 2020-26 Stuart Hunter
 *
 *	This program is free software: you can redistribute it and/or modify
 *	it under the terms of the GNU General Public License as published by
 *	the Free Software Foundation, either version 3 of the License, or
 *	(at your option) any later version.
 *
 *	This program is distributed in the hope that it will be useful,
 *	but WITHOUT ANY WARRANTY; without even the implied warranty of
 *	MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *	GNU General Public License for more details.
 *
 *	See <http://www.gnu.org/licenses/> to get a copy of the GNU General
 *	Public License.
 *
 */
use std::time::Duration;

use log::debug;
use tokio::time::{sleep_until, Instant};

/// Fixed cadence: each cycle starts `period` after the previous one started,
/// however long the work took.
pub struct Pacer {
    next_deadline: Instant,
    period: Duration,
}

impl Pacer {
    pub fn new(period: Duration) -> Self {
        Self { next_deadline: Instant::now() + period, period }
    }

    #[inline]
    pub fn period(&self) -> Duration {
        self.period
    }

    /// Next deadline after `now`. An overrun re-anchors on `now` rather
    /// than firing a burst of catch-up cycles.
    #[inline]
    fn schedule(&mut self, now: Instant) -> Instant {
        let deadline = self.next_deadline;
        if now > deadline {
            debug!("cycle overran by {:?}", now - deadline);
            self.next_deadline = now + self.period;
            now
        } else {
            self.next_deadline = deadline + self.period;
            deadline
        }
    }

    /// Sleep until the next cycle is due.
    pub async fn wait(&mut self) {
        let deadline = self.schedule(Instant::now());
        sleep_until(deadline).await;
    }
}
