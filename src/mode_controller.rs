/*
 *  mode_controller.rs
 *
 *  EnviroMon - rolling heatmaps for the Enviro+
 *  (c) 2020-26 Stuart Hunter
 *
 *  Page rotation: proximity taps and/or a cycle counter
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

use std::fmt;
use std::str::FromStr;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_DEBOUNCE_MS, DEFAULT_SWITCH_CYCLES, PROXIMITY_TAP_THRESHOLD};
use crate::metrics::Metric;

/// What is allowed to turn the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ModePolicy {
    /// Proximity taps only
    Gesture,
    /// Every `switch_cycles` cycles
    Timer,
    #[default]
    GestureAndTimer,
    /// Stay on the start metric
    Pinned,
}

impl ModePolicy {
    fn gesture(self) -> bool {
        matches!(self, ModePolicy::Gesture | ModePolicy::GestureAndTimer)
    }

    fn timer(self) -> bool {
        matches!(self, ModePolicy::Timer | ModePolicy::GestureAndTimer)
    }
}

impl FromStr for ModePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "gesture" => Ok(ModePolicy::Gesture),
            "timer" => Ok(ModePolicy::Timer),
            "gesture-and-timer" => Ok(ModePolicy::GestureAndTimer),
            "pinned" => Ok(ModePolicy::Pinned),
            _ => Err(format!("unknown mode policy '{s}'")),
        }
    }
}

impl fmt::Display for ModePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ModePolicy::Gesture => "gesture",
            ModePolicy::Timer => "timer",
            ModePolicy::GestureAndTimer => "gesture-and-timer",
            ModePolicy::Pinned => "pinned",
        };
        f.write_str(s)
    }
}

/// Configuration for the mode controller
#[derive(Debug, Clone)]
pub struct ModeControllerConfig {
    pub policy: ModePolicy,
    pub start: Metric,
    /// Cycles a page stays up under the timer rule
    pub switch_cycles: u32,
    /// Minimum time between accepted taps
    pub debounce: Duration,
}

impl Default for ModeControllerConfig {
    fn default() -> Self {
        Self {
            policy: ModePolicy::default(),
            start: Metric::Temperature,
            switch_cycles: DEFAULT_SWITCH_CYCLES,
            debounce: Duration::from_millis(DEFAULT_DEBOUNCE_MS),
        }
    }
}

/// Why the page turned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    Gesture,
    Timer,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub from: Metric,
    pub to: Metric,
    pub trigger: Trigger,
}

/// Selects the active metric.
#[derive(Debug, Clone)]
pub struct ModeController {
    config: ModeControllerConfig,
    current: Metric,
    counter: u32,
    last_change: Option<Instant>,
}

impl ModeController {
    pub fn new(config: ModeControllerConfig) -> Self {
        Self {
            current: config.start,
            config,
            counter: 0,
            last_change: None,
        }
    }

    pub fn current(&self) -> Metric {
        self.current
    }

    pub fn counter(&self) -> u32 {
        self.counter
    }

    pub fn policy(&self) -> ModePolicy {
        self.config.policy
    }

    /// Resolve this cycle's page from the proximity reading.
    ///
    /// Call once at the start of a cycle. A tap is accepted when proximity
    /// is over the threshold and the debounce has passed since the last
    /// change; the timer fires once the counter has passed `switch_cycles`.
    pub fn update(&mut self, proximity: u16, now: Instant) -> Option<Transition> {
        let trigger = if self.config.policy.gesture() && self.tapped(proximity, now) {
            Trigger::Gesture
        } else if self.config.policy.timer() && self.counter > self.config.switch_cycles {
            Trigger::Timer
        } else {
            return None;
        };

        let from = self.current;
        self.current = from.next();
        self.counter = 0;
        self.last_change = Some(now);
        Some(Transition { from, to: self.current, trigger })
    }

    fn tapped(&self, proximity: u16, now: Instant) -> bool {
        if proximity <= PROXIMITY_TAP_THRESHOLD {
            return false;
        }
        match self.last_change {
            Some(at) => now.saturating_duration_since(at) > self.config.debounce,
            None => true,
        }
    }

    /// Count a finished cycle.
    pub fn tick(&mut self) {
        self.counter = self.counter.saturating_add(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn controller(policy: ModePolicy) -> ModeController {
        ModeController::new(ModeControllerConfig {
            policy,
            ..Default::default()
        })
    }

    #[test]
    fn test_tap_advances_and_debounces() {
        let mut mc = controller(ModePolicy::Gesture);
        let t0 = Instant::now();

        let tr = mc.update(2000, t0).unwrap();
        assert_eq!(tr, Transition { from: Metric::Temperature, to: Metric::Pressure, trigger: Trigger::Gesture });

        // still held 100 ms later
        assert!(mc.update(2000, t0 + Duration::from_millis(100)).is_none());
        assert_eq!(mc.current(), Metric::Pressure);

        assert!(mc.update(2000, t0 + Duration::from_millis(600)).is_some());
        assert_eq!(mc.current(), Metric::Humidity);
    }

    #[test]
    fn test_threshold_is_exclusive() {
        let mut mc = controller(ModePolicy::Gesture);
        assert!(mc.update(1500, Instant::now()).is_none());
        assert!(mc.update(1501, Instant::now()).is_some());
    }

    #[test]
    fn test_timer_after_switch_cycles() {
        let mut mc = controller(ModePolicy::Timer);
        let now = Instant::now();
        for _ in 0..=100 {
            assert!(mc.update(0, now).is_none());
            mc.tick();
        }
        assert_eq!(mc.counter(), 101);
        let tr = mc.update(0, now).unwrap();
        assert_eq!(tr.trigger, Trigger::Timer);
        assert_eq!(mc.current(), Metric::Pressure);
        assert_eq!(mc.counter(), 0);
    }

    #[test]
    fn test_timer_policy_ignores_taps() {
        let mut mc = controller(ModePolicy::Timer);
        assert!(mc.update(2047, Instant::now()).is_none());
    }

    #[test]
    fn test_gesture_resets_counter() {
        let mut mc = controller(ModePolicy::GestureAndTimer);
        for _ in 0..50 {
            mc.tick();
        }
        assert!(mc.update(1800, Instant::now()).is_some());
        assert_eq!(mc.counter(), 0);
    }

    #[test]
    fn test_rotation_wraps_through_all_pages() {
        let mut mc = ModeController::new(ModeControllerConfig {
            policy: ModePolicy::Timer,
            switch_cycles: 0,
            ..Default::default()
        });
        let now = Instant::now();
        let mut seen = Vec::new();
        for _ in 0..7 {
            mc.tick();
            seen.push(mc.update(0, now).unwrap().to);
        }
        assert_eq!(seen.last(), Some(&Metric::Temperature));
        assert_eq!(seen.len(), 7);
    }

    #[test]
    fn test_pinned_never_moves() {
        let mut mc = ModeController::new(ModeControllerConfig {
            policy: ModePolicy::Pinned,
            start: Metric::Reduced,
            ..Default::default()
        });
        let now = Instant::now();
        for i in 0..500u64 {
            assert!(mc.update(2000, now + Duration::from_secs(i)).is_none());
            mc.tick();
        }
        assert_eq!(mc.current(), Metric::Reduced);
    }

    #[test]
    fn test_pinned_counter_keeps_running() {
        // no periodic reset either: the counter only ever climbs
        let mut mc = ModeController::new(ModeControllerConfig {
            policy: ModePolicy::Pinned,
            switch_cycles: 100,
            ..Default::default()
        });
        let now = Instant::now();
        for _ in 0..250 {
            assert!(mc.update(0, now).is_none());
            mc.tick();
        }
        assert_eq!(mc.counter(), 250);
    }

    #[test]
    fn test_policy_names() {
        for p in [ModePolicy::Gesture, ModePolicy::Timer, ModePolicy::GestureAndTimer, ModePolicy::Pinned] {
            assert_eq!(p.to_string().parse::<ModePolicy>(), Ok(p));
        }
        assert_eq!(ModePolicy::default(), ModePolicy::GestureAndTimer);
    }
}
