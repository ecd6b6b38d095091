//! Heart-rate trend analytics over a snapshot of vital records.
//!
//! Everything here is a pure function of the records and a [`TrendPolicy`].
//! Records are taken in the order given; "recent" means the last readings in
//! iteration order. Malformed heart rates are filtered out and unknown risk
//! strings are ignored, so no input can make the analysis fail.

use serde::{Deserialize, Serialize};

use eye2heart_types::VitalRecord;

/// Window sizes and thresholds for trend classification.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrendPolicy {
    /// Number of readings in the recent (and previous) window.
    pub window: usize,
    /// Average change below which the trend counts as stable, in BPM.
    pub threshold_bpm: f64,
    /// Minimum valid readings needed to classify a trend.
    pub min_readings: usize,
}

impl Default for TrendPolicy {
    fn default() -> Self {
        Self {
            window: 3,
            threshold_bpm: 3.0,
            min_readings: 2,
        }
    }
}

/// Direction of the recent heart-rate trend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendStatus {
    Stable,
    Increasing,
    Decreasing,
    InsufficientData,
}

impl TrendStatus {
    /// Display label.
    pub fn label(&self) -> &'static str {
        match self {
            TrendStatus::Stable => "Stable Heart Rate",
            TrendStatus::Increasing => "Increasing Trend",
            TrendStatus::Decreasing => "Decreasing Trend",
            TrendStatus::InsufficientData => "Insufficient Data",
        }
    }

    /// Indicator glyph, if the status has one.
    pub fn icon(&self) -> Option<&'static str> {
        match self {
            TrendStatus::Stable => Some("📊"),
            TrendStatus::Increasing => Some("📈"),
            TrendStatus::Decreasing => Some("📉"),
            TrendStatus::InsufficientData => None,
        }
    }

    /// Accent colour as an RGB hex string.
    pub fn color_hex(&self) -> &'static str {
        match self {
            TrendStatus::Stable => "#059669",
            TrendStatus::Increasing => "#dc2626",
            TrendStatus::Decreasing => "#2563eb",
            TrendStatus::InsufficientData => "#64748b",
        }
    }
}

/// Result of trend classification.
///
/// The averages and delta are present whenever a status other than
/// [`TrendStatus::InsufficientData`] was computed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Trend {
    pub status: TrendStatus,
    pub recent_avg: Option<f64>,
    pub previous_avg: Option<f64>,
    pub delta: Option<f64>,
}

impl Trend {
    fn insufficient() -> Self {
        Self {
            status: TrendStatus::InsufficientData,
            recent_avg: None,
            previous_avg: None,
            delta: None,
        }
    }
}

/// Qualitative rating derived from the number of high-risk records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StabilityScore {
    Excellent,
    Good,
    ActionRequired,
}

impl StabilityScore {
    /// Rate a high-risk count: none is excellent, fewer than three is good.
    pub fn from_high_risk_count(count: usize) -> Self {
        match count {
            0 => StabilityScore::Excellent,
            1..=2 => StabilityScore::Good,
            _ => StabilityScore::ActionRequired,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            StabilityScore::Excellent => "EXCELLENT",
            StabilityScore::Good => "GOOD",
            StabilityScore::ActionRequired => "ACTION REQUIRED",
        }
    }
}

/// All analytics for one snapshot of records.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VitalsAnalysis {
    /// Number of records supplied, valid or not.
    pub total_records: usize,
    /// Number of records with a usable heart rate.
    pub valid_readings: usize,
    /// Rounded mean heart rate, 0 when there are no valid readings.
    pub mean_heart_rate: f64,
    pub high_risk_count: usize,
    pub trend: Trend,
    pub stability: StabilityScore,
}

/// Computes heart-rate analytics with a given policy.
#[derive(Debug, Clone, Default)]
pub struct TrendAnalyzer {
    policy: TrendPolicy,
}

impl TrendAnalyzer {
    pub fn new(policy: TrendPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &TrendPolicy {
        &self.policy
    }

    /// Usable heart-rate readings, in record order.
    pub fn valid_readings(records: &[VitalRecord]) -> Vec<f64> {
        records.iter().filter_map(VitalRecord::bpm).collect()
    }

    /// Mean of the valid readings, rounded half up. Returns 0 if none.
    pub fn mean_heart_rate(records: &[VitalRecord]) -> f64 {
        mean_of(&Self::valid_readings(records))
    }

    /// Number of records whose risk level is exactly `"High"`.
    pub fn high_risk_count(records: &[VitalRecord]) -> usize {
        records.iter().filter(|r| r.is_high_risk()).count()
    }

    /// Classify the heart-rate trend.
    pub fn trend(&self, records: &[VitalRecord]) -> Trend {
        self.trend_of(&Self::valid_readings(records))
    }

    fn trend_of(&self, readings: &[f64]) -> Trend {
        if readings.is_empty() || readings.len() < self.policy.min_readings {
            return Trend::insufficient();
        }

        let window = self.policy.window.max(1);
        let len = readings.len();

        let recent_start = len.saturating_sub(window);
        let recent_avg = average(&readings[recent_start..]);

        let previous_start = len.saturating_sub(window.saturating_mul(2));
        let previous = &readings[previous_start..recent_start];
        let previous_avg = if previous.is_empty() {
            // Too few readings for a previous window: compare against the first one
            readings[0]
        } else {
            average(previous)
        };

        let delta = recent_avg - previous_avg;
        let status = if delta.abs() < self.policy.threshold_bpm {
            TrendStatus::Stable
        } else if delta > 0.0 {
            TrendStatus::Increasing
        } else {
            TrendStatus::Decreasing
        };

        Trend {
            status,
            recent_avg: Some(recent_avg),
            previous_avg: Some(previous_avg),
            delta: Some(delta),
        }
    }

    /// Compute every metric in one pass over the valid readings.
    pub fn analyze(&self, records: &[VitalRecord]) -> VitalsAnalysis {
        let readings = Self::valid_readings(records);
        let high_risk_count = Self::high_risk_count(records);

        VitalsAnalysis {
            total_records: records.len(),
            valid_readings: readings.len(),
            mean_heart_rate: mean_of(&readings),
            high_risk_count,
            trend: self.trend_of(&readings),
            stability: StabilityScore::from_high_risk_count(high_risk_count),
        }
    }
}

fn mean_of(readings: &[f64]) -> f64 {
    if readings.is_empty() {
        return 0.0;
    }
    round_half_up(average(readings))
}

fn average(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

fn round_half_up(value: f64) -> f64 {
    (value + 0.5).floor()
}
