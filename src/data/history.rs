//! Refresh history and sparkline normalisation.

use std::collections::VecDeque;
use std::time::Instant;

use super::vitals::VitalsData;

/// Maximum number of refreshes to keep.
const MAX_HISTORY_SIZE: usize = 60;

/// Tracks analytics across refreshes.
///
/// Each refresh records the mean heart rate and record count so the UI can
/// show how the dashboard itself has moved while it was open.
#[derive(Debug, Clone, Default)]
pub struct History {
    /// Mean heart rate at each refresh.
    pub mean_heart_rates: VecDeque<f64>,
    /// Record count at each refresh.
    pub record_counts: VecDeque<usize>,
    /// When each refresh happened.
    pub timestamps: VecDeque<Instant>,
}

impl History {
    /// Create a new empty history.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a new data snapshot.
    pub fn record(&mut self, data: &VitalsData) {
        push_bounded(&mut self.mean_heart_rates, data.analysis.mean_heart_rate);
        push_bounded(&mut self.record_counts, data.analysis.total_records);
        push_bounded(&mut self.timestamps, data.last_updated);
    }

    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    /// Records added since the previous refresh, if there was one.
    pub fn new_records(&self) -> Option<i64> {
        let n = self.record_counts.len();
        if n < 2 {
            return None;
        }
        Some(self.record_counts[n - 1] as i64 - self.record_counts[n - 2] as i64)
    }

    /// Sparkline of mean heart rate across refreshes.
    pub fn mean_sparkline(&self) -> Vec<u8> {
        let values: Vec<f64> = self.mean_heart_rates.iter().copied().collect();
        normalize_sparkline(&values)
    }
}

fn push_bounded<T>(queue: &mut VecDeque<T>, value: T) {
    queue.push_back(value);
    if queue.len() > MAX_HISTORY_SIZE {
        queue.pop_front();
    }
}

/// Normalize values to 0-7 for 8 bar levels.
///
/// Returns an empty Vec for fewer than two values. A flat series maps to
/// the middle level.
pub fn normalize_sparkline(values: &[f64]) -> Vec<u8> {
    if values.len() < 2 {
        return Vec::new();
    }

    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let range = max - min;

    if range <= f64::EPSILON {
        return vec![3; values.len()];
    }

    values
        .iter()
        .map(|&v| {
            let normalized = ((v - min) / range * 7.0).round() as u8;
            normalized.min(7)
        })
        .collect()
}
