//! Vitals snapshot with analytics and display rows.
//!
//! This module turns a list of raw records into the data the views need:
//! the analysis, one formatted row per record and the reporting period.

use std::fs;
use std::path::Path;
use std::time::Instant;

use anyhow::Result;
use chrono::NaiveDateTime;

use eye2heart_client::records_from_value;
use eye2heart_types::{HeartRate, RiskLevel, VitalRecord};

use super::analyzer::{TrendAnalyzer, TrendPolicy, VitalsAnalysis};
use super::timestamp::{format_long, format_short, parse_timestamp, INVALID_DATE};

/// Normal resting heart rate, in BPM (inclusive).
pub const REFERENCE_RANGE: (f64, f64) = (60.0, 100.0);

/// Offset added to a row index to label records without an image name.
const SCAN_REF_OFFSET: usize = 100;

/// Where a heart rate sits relative to [`REFERENCE_RANGE`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum BpmRange {
    Below,
    Within,
    Above,
}

impl BpmRange {
    pub fn symbol(&self) -> &'static str {
        match self {
            BpmRange::Below => "LOW",
            BpmRange::Within => "OK",
            BpmRange::Above => "HIGH",
        }
    }
}

/// Classify a heart rate against the reference range.
pub fn classify_bpm(bpm: f64) -> BpmRange {
    let (low, high) = REFERENCE_RANGE;
    if bpm < low {
        BpmRange::Below
    } else if bpm > high {
        BpmRange::Above
    } else {
        BpmRange::Within
    }
}

/// One record prepared for display.
#[derive(Debug, Clone)]
pub struct VitalRow {
    /// Position in the original snapshot.
    pub index: usize,
    pub timestamp: Option<NaiveDateTime>,
    pub date_time: String,
    pub short_date: String,
    pub scan_label: String,
    /// Heart rate as supplied, for display.
    pub heart_rate: String,
    pub bpm: Option<f64>,
    pub range: Option<BpmRange>,
    pub risk_text: String,
    pub risk: Option<RiskLevel>,
    pub confidence: Option<f64>,
}

impl VitalRow {
    fn from_record(index: usize, record: &VitalRecord) -> Self {
        let timestamp = record.timestamp.as_deref().and_then(parse_timestamp);
        let (date_time, short_date) = match &timestamp {
            Some(ts) => (format_long(ts), format_short(ts)),
            None => (INVALID_DATE.to_string(), INVALID_DATE.to_string()),
        };

        let scan_label = record
            .image_reference
            .clone()
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| format!("SCAN_REF_{}", index + SCAN_REF_OFFSET));

        let bpm = record.bpm();

        Self {
            index,
            timestamp,
            date_time,
            short_date,
            scan_label,
            heart_rate: display_heart_rate(record.heart_rate.as_ref()),
            bpm,
            range: bpm.map(classify_bpm),
            risk_text: record.risk_level.clone().unwrap_or_default(),
            risk: record.risk(),
            confidence: record.confidence_percent(),
        }
    }
}

fn display_heart_rate(heart_rate: Option<&HeartRate>) -> String {
    match heart_rate {
        Some(HeartRate::Number(n)) if n.fract() == 0.0 && n.is_finite() => format!("{:.0}", n),
        Some(HeartRate::Number(n)) => n.to_string(),
        Some(HeartRate::Text(s)) => s.clone(),
        Some(HeartRate::Invalid) | None => String::new(),
    }
}

/// Complete vitals data ready for display.
#[derive(Debug, Clone)]
pub struct VitalsData {
    pub records: Vec<VitalRecord>,
    pub rows: Vec<VitalRow>,
    pub analysis: VitalsAnalysis,
    pub last_updated: Instant,
}

impl VitalsData {
    /// Load records from a JSON file.
    pub fn load(path: &Path, policy: &TrendPolicy) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::parse(&content, policy)
    }

    /// Parse records from a JSON string.
    pub fn parse(content: &str, policy: &TrendPolicy) -> Result<Self> {
        Ok(Self::from_records(parse_records(content)?, policy))
    }

    /// Analyze a snapshot of records.
    ///
    /// This is the primary conversion used by all data sources.
    pub fn from_records(records: Vec<VitalRecord>, policy: &TrendPolicy) -> Self {
        let analysis = TrendAnalyzer::new(*policy).analyze(&records);
        let rows = records
            .iter()
            .enumerate()
            .map(|(i, r)| VitalRow::from_record(i, r))
            .collect();

        Self {
            records,
            rows,
            analysis,
            last_updated: Instant::now(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Short dates of the first and last records, in snapshot order.
    pub fn period(&self) -> Option<(&str, &str)> {
        let first = self.rows.first()?;
        let last = self.rows.last()?;
        Some((&first.short_date, &last.short_date))
    }

    /// Valid heart-rate readings in snapshot order.
    pub fn heart_rate_series(&self) -> Vec<f64> {
        self.rows.iter().filter_map(|r| r.bpm).collect()
    }
}

/// Parse a JSON records document, with the same leniency as the API client.
pub fn parse_records(content: &str) -> Result<Vec<VitalRecord>> {
    let value: serde_json::Value = serde_json::from_str(content)?;
    Ok(records_from_value(value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::TrendStatus;

    const SAMPLE: &str = r#"[
        {"image_name": "scan_a.png", "heart_rate": 72, "risk_level": "Low",
         "confidence": 91.5, "created_at": "2024-03-01 09:00:00"},
        {"image_name": "", "heart_rate": "88", "risk_level": "High",
         "confidence": 76, "created_at": "2024-03-04 09:00:00"},
        {"heart_rate": null, "risk_level": "Medium", "created_at": "not a date"},
        {"image_name": "scan_d.png", "heart_rate": 104, "risk_level": "High",
         "confidence": 88, "created_at": "2024-03-09 18:30:00"}
    ]"#;

    #[test]
    fn test_parse_sample() {
        let data = VitalsData::parse(SAMPLE, &TrendPolicy::default()).unwrap();
        assert_eq!(data.records.len(), 4);
        assert_eq!(data.analysis.total_records, 4);
        assert_eq!(data.analysis.valid_readings, 3);
        assert_eq!(data.analysis.mean_heart_rate, 88.0);
        assert_eq!(data.analysis.high_risk_count, 2);
        assert_eq!(data.analysis.trend.status, TrendStatus::Increasing);
    }

    #[test]
    fn test_rows() {
        let data = VitalsData::parse(SAMPLE, &TrendPolicy::default()).unwrap();

        assert_eq!(data.rows[0].scan_label, "scan_a.png");
        assert_eq!(data.rows[0].heart_rate, "72");
        assert_eq!(data.rows[0].range, Some(BpmRange::Within));
        assert_eq!(data.rows[0].date_time, "3/1/2024, 9:00:00 AM");

        // Empty and missing image names fall back to a generated label
        assert_eq!(data.rows[1].scan_label, "SCAN_REF_101");
        assert_eq!(data.rows[2].scan_label, "SCAN_REF_102");

        assert_eq!(data.rows[2].heart_rate, "");
        assert_eq!(data.rows[2].range, None);
        assert_eq!(data.rows[2].short_date, INVALID_DATE);

        assert_eq!(data.rows[3].range, Some(BpmRange::Above));
        assert_eq!(data.rows[3].risk, Some(RiskLevel::High));
    }

    #[test]
    fn test_period() {
        let data = VitalsData::parse(SAMPLE, &TrendPolicy::default()).unwrap();
        assert_eq!(data.period(), Some(("Mar 1", "Mar 9")));

        let empty = VitalsData::from_records(Vec::new(), &TrendPolicy::default());
        assert!(empty.is_empty());
        assert_eq!(empty.period(), None);
    }

    #[test]
    fn test_non_array_document() {
        let data = VitalsData::parse(r#"{"error": "nope"}"#, &TrendPolicy::default()).unwrap();
        assert!(data.is_empty());
        assert_eq!(data.analysis.mean_heart_rate, 0.0);
        assert!(VitalsData::parse("not json", &TrendPolicy::default()).is_err());
    }

    #[test]
    fn test_non_record_entries_still_count() {
        let data = VitalsData::parse(
            r#"[{"heart_rate": 70, "risk_level": "High"}, 7, "x", null]"#,
            &TrendPolicy::default(),
        )
        .unwrap();
        assert_eq!(data.analysis.total_records, 4);
        assert_eq!(data.analysis.valid_readings, 1);
        assert_eq!(data.analysis.high_risk_count, 1);
        assert_eq!(data.rows.len(), 4);
    }

    #[test]
    fn test_classify_bpm() {
        assert_eq!(classify_bpm(59.9), BpmRange::Below);
        assert_eq!(classify_bpm(60.0), BpmRange::Within);
        assert_eq!(classify_bpm(100.0), BpmRange::Within);
        assert_eq!(classify_bpm(100.5), BpmRange::Above);
    }

    #[test]
    fn test_heart_rate_series() {
        let data = VitalsData::parse(SAMPLE, &TrendPolicy::default()).unwrap();
        assert_eq!(data.heart_rate_series(), vec![72.0, 88.0, 104.0]);
    }
}
