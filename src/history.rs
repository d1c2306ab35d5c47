/*
 *  history.rs
 *
 *  EnviroMon - rolling heatmaps for the Enviro+
 *  (c) 2020-26 Stuart Hunter
 *
 *  Fixed-length rolling windows and their min/max normalisation
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

use std::collections::VecDeque;

use crate::constants::HISTORY_FILL;
use crate::metrics::Metric;

/// FIFO window of the last `capacity` samples for one metric.
#[derive(Debug, Clone)]
pub struct HistoryBuffer {
    samples: VecDeque<f64>,
}

impl HistoryBuffer {
    /// Create a window of `capacity` slots, all holding [`HISTORY_FILL`].
    pub fn new(capacity: usize) -> Self {
        Self {
            samples: std::iter::repeat_n(HISTORY_FILL, capacity).collect(),
        }
    }

    /// Append `value`, drop the oldest sample and return the window, oldest first.
    pub fn push(&mut self, value: f64) -> &[f64] {
        if !self.samples.is_empty() {
            self.samples.pop_front();
            self.samples.push_back(value);
        }
        self.samples.make_contiguous()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &f64> {
        self.samples.iter()
    }
}

/// One [`HistoryBuffer`] per metric, all the same width.
#[derive(Debug, Clone)]
pub struct HistoryStore {
    buffers: Vec<HistoryBuffer>,
}

impl HistoryStore {
    pub fn new(width: usize) -> Self {
        Self {
            buffers: Metric::ALL.iter().map(|_| HistoryBuffer::new(width)).collect(),
        }
    }

    /// Record `value` for `metric` and return that metric's window.
    pub fn push(&mut self, metric: Metric, value: f64) -> &[f64] {
        self.buffers[metric.index()].push(value)
    }

    pub fn get(&self, metric: Metric) -> &HistoryBuffer {
        &self.buffers[metric.index()]
    }
}

/// Scale a window into (0, 1] against its own min and max.
///
/// Both numerator and denominator carry a `+1`, so a flat window maps to all
/// ones and the minimum maps to `1 / (range + 1)` rather than zero.
pub fn normalize(window: &[f64]) -> Vec<f64> {
    let Some((vmin, vmax)) = min_max(window) else {
        return Vec::new();
    };
    let span = vmax - vmin + 1.0;
    window.iter().map(|v| (v - vmin + 1.0) / span).collect()
}

fn min_max(window: &[f64]) -> Option<(f64, f64)> {
    let mut iter = window.iter().copied();
    let first = iter.next()?;
    Some(iter.fold((first, first), |(lo, hi), v| (lo.min(v), hi.max(v))))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_buffer_is_prefilled() {
        let buf = HistoryBuffer::new(160);
        assert_eq!(buf.len(), 160);
        assert!(buf.iter().all(|&v| v == 1.0));
    }

    #[test]
    fn test_push_keeps_length_constant() {
        let mut buf = HistoryBuffer::new(8);
        for i in 0..100 {
            let window = buf.push(i as f64);
            assert_eq!(window.len(), 8);
        }
    }

    #[test]
    fn test_push_keeps_last_values_in_order() {
        let mut buf = HistoryBuffer::new(5);
        buf.push(1.0);
        buf.push(2.0);
        let window = buf.push(3.0).to_vec();
        assert_eq!(window, vec![1.0, 1.0, 1.0, 2.0, 3.0]);

        for v in [10.0, 20.0, 30.0, 40.0, 50.0] {
            buf.push(v);
        }
        let tail: Vec<f64> = buf.iter().copied().collect();
        assert_eq!(tail, vec![10.0, 20.0, 30.0, 40.0, 50.0]);
    }

    #[test]
    fn test_store_keeps_metrics_apart() {
        let mut store = HistoryStore::new(4);
        store.push(Metric::Humidity, 55.0);
        assert_eq!(*store.get(Metric::Humidity).iter().last().unwrap(), 55.0);
        assert!(store.get(Metric::Pressure).iter().all(|&v| v == 1.0));
    }

    #[test]
    fn test_normalize_flat_window_is_all_ones() {
        let n = normalize(&[21.5; 10]);
        assert!(n.iter().all(|&v| v == 1.0));
    }

    #[test]
    fn test_normalize_exact_formula() {
        // range 4: max -> 5/5, min -> 1/5, middle -> 3/5
        let n = normalize(&[10.0, 12.0, 14.0]);
        assert_eq!(n, vec![0.2, 0.6, 1.0]);
    }

    #[test]
    fn test_normalize_stays_in_unit_interval() {
        let window = [1013.2, 1009.8, 1020.4, 998.1, 1001.0];
        let n = normalize(&window);
        assert!(n.iter().all(|&v| v > 0.0 && v <= 1.0));
        assert_eq!(n[2], 1.0);
        let min = (998.1 - 998.1 + 1.0) / (1020.4 - 998.1 + 1.0);
        assert!((n[3] - min).abs() < 1e-12);
    }

    #[test]
    fn test_normalize_empty_window() {
        assert!(normalize(&[]).is_empty());
    }
}
