//! Vital records - one stored risk assessment.

use alloc::string::String;

use crate::{HeartRate, RiskLevel};

/// One stored result of a prior risk assessment.
///
/// Every field is optional because the API returns whatever was stored at
/// submission time. Accessors such as [`bpm`](Self::bpm) and
/// [`risk`](Self::risk) validate on read.
///
/// # Example
///
/// ```rust
/// use eye2heart_types::VitalRecord;
///
/// let record = VitalRecord::builder().heart_rate("81").risk_level("Low").build();
/// assert_eq!(record.bpm(), Some(81.0));
/// assert!(!record.is_high_risk());
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VitalRecord {
    /// When the assessment was stored, as the API formats it.
    #[cfg_attr(
        feature = "serde",
        serde(
            rename = "created_at",
            default,
            deserialize_with = "crate::de::lenient_string",
            skip_serializing_if = "Option::is_none"
        )
    )]
    pub timestamp: Option<String>,

    /// Heart rate reading in BPM.
    #[cfg_attr(
        feature = "serde",
        serde(
            default,
            deserialize_with = "crate::de::heart_rate",
            skip_serializing_if = "Option::is_none"
        )
    )]
    pub heart_rate: Option<HeartRate>,

    /// Risk category as free-form text.
    #[cfg_attr(
        feature = "serde",
        serde(
            default,
            deserialize_with = "crate::de::lenient_string",
            skip_serializing_if = "Option::is_none"
        )
    )]
    pub risk_level: Option<String>,

    /// Model confidence as a percentage (0-100).
    #[cfg_attr(
        feature = "serde",
        serde(
            default,
            deserialize_with = "crate::de::lenient_number",
            skip_serializing_if = "Option::is_none"
        )
    )]
    pub confidence: Option<f64>,

    /// Opaque label of the source scan.
    #[cfg_attr(
        feature = "serde",
        serde(
            rename = "image_name",
            default,
            deserialize_with = "crate::de::lenient_string",
            skip_serializing_if = "Option::is_none"
        )
    )]
    pub image_reference: Option<String>,
}

impl VitalRecord {
    /// Create an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a builder for a record.
    pub fn builder() -> VitalRecordBuilder {
        VitalRecordBuilder::new()
    }

    /// Heart rate as a finite BPM value, if the stored reading is usable.
    pub fn bpm(&self) -> Option<f64> {
        self.heart_rate.as_ref().and_then(HeartRate::bpm)
    }

    /// Recognised risk category, if the stored text is an exact match.
    pub fn risk(&self) -> Option<RiskLevel> {
        self.risk_level.as_deref().and_then(RiskLevel::parse)
    }

    /// Returns true if the record is flagged exactly `"High"`.
    pub fn is_high_risk(&self) -> bool {
        self.risk_level.as_deref() == Some("High")
    }

    /// Confidence clamped to the 0-100 range, if present and finite.
    pub fn confidence_percent(&self) -> Option<f64> {
        self.confidence.filter(|c| c.is_finite()).map(|c| c.clamp(0.0, 100.0))
    }
}

/// Builder for `VitalRecord`.
#[derive(Debug, Default)]
pub struct VitalRecordBuilder {
    record: VitalRecord,
}

impl VitalRecordBuilder {
    /// Create a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the creation timestamp text.
    pub fn created_at(mut self, timestamp: impl Into<String>) -> Self {
        self.record.timestamp = Some(timestamp.into());
        self
    }

    /// Set the heart-rate reading.
    pub fn heart_rate(mut self, heart_rate: impl Into<HeartRate>) -> Self {
        self.record.heart_rate = Some(heart_rate.into());
        self
    }

    /// Set the risk category text.
    pub fn risk_level(mut self, risk_level: impl Into<String>) -> Self {
        self.record.risk_level = Some(risk_level.into());
        self
    }

    /// Set the confidence percentage.
    pub fn confidence(mut self, confidence: f64) -> Self {
        self.record.confidence = Some(confidence);
        self
    }

    /// Set the source image label.
    pub fn image_name(mut self, image_name: impl Into<String>) -> Self {
        self.record.image_reference = Some(image_name.into());
        self
    }

    /// Build the record.
    pub fn build(self) -> VitalRecord {
        self.record
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_builder() {
        let record = VitalRecord::builder()
            .created_at("2024-01-05 10:00:00")
            .heart_rate(75.0)
            .risk_level("Medium")
            .confidence(88.2)
            .image_name("scan.png")
            .build();

        assert_eq!(record.timestamp.as_deref(), Some("2024-01-05 10:00:00"));
        assert_eq!(record.bpm(), Some(75.0));
        assert_eq!(record.risk(), Some(RiskLevel::Medium));
        assert_eq!(record.confidence_percent(), Some(88.2));
        assert_eq!(record.image_reference.as_deref(), Some("scan.png"));
    }

    #[test]
    fn test_high_risk_exact_match() {
        assert!(VitalRecord::builder().risk_level("High").build().is_high_risk());
        assert!(!VitalRecord::builder().risk_level("high").build().is_high_risk());
        assert!(!VitalRecord::new().is_high_risk());
    }

    #[test]
    fn test_confidence_clamped() {
        let record = VitalRecord::builder().confidence(140.0).build();
        assert_eq!(record.confidence_percent(), Some(100.0));
        let record = VitalRecord::builder().confidence(f64::NAN).build();
        assert_eq!(record.confidence_percent(), None);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_deserialize_api_payload() {
        let json = r#"[
            {"image_name": "a.png", "heart_rate": 72, "risk_level": "High",
             "confidence": 93.1, "created_at": "2024-02-01 08:00:00"},
            {"image_name": null, "heart_rate": null, "risk_level": "Low",
             "confidence": 50, "created_at": "2024-02-02 08:00:00"},
            {"heart_rate": "n/a", "risk_level": 3, "confidence": "77.5"},
            {"heart_rate": [1, 2], "confidence": {"v": 1}}
        ]"#;

        let records: Vec<VitalRecord> = serde_json::from_str(json).unwrap();
        assert_eq!(records.len(), 4);

        assert_eq!(records[0].bpm(), Some(72.0));
        assert!(records[0].is_high_risk());
        assert_eq!(records[0].image_reference.as_deref(), Some("a.png"));

        assert!(records[1].heart_rate.is_none());
        assert!(records[1].image_reference.is_none());

        assert_eq!(records[2].heart_rate, Some(HeartRate::Text("n/a".into())));
        assert_eq!(records[2].bpm(), None);
        assert!(records[2].risk_level.is_none());
        assert_eq!(records[2].confidence, Some(77.5));

        assert_eq!(records[3].heart_rate, Some(HeartRate::Invalid));
        assert!(records[3].confidence.is_none());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_serialize_uses_wire_names() {
        let record = VitalRecord::builder()
            .created_at("2024-02-01 08:00:00")
            .heart_rate(70.0)
            .image_name("b.png")
            .build();

        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["created_at"], "2024-02-01 08:00:00");
        assert_eq!(value["image_name"], "b.png");
        assert_eq!(value["heart_rate"], 70.0);
        assert!(value.get("risk_level").is_none());
    }
}
