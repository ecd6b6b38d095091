//! Request and response bodies for the API.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use eye2heart_types::RiskLevel;

use crate::ClientError;

/// Clinical features accepted by the risk model, in the order the API expects.
pub const FEATURE_NAMES: [&str; 14] = [
    "gender",
    "age",
    "currentSmoker",
    "cigsPerDay",
    "BPMeds",
    "prevalentStroke",
    "prevalentHyp",
    "diabetes",
    "totChol",
    "sysBP",
    "diaBP",
    "BMI",
    "heartRate",
    "glucose",
];

/// Yes/no features. Their values must be `0` or `1`.
pub const BINARY_FEATURES: [&str; 6] = [
    "gender",
    "currentSmoker",
    "BPMeds",
    "prevalentStroke",
    "prevalentHyp",
    "diabetes",
];

/// New account details.
#[derive(Debug, Clone, Serialize)]
pub struct Registration {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// Login credentials.
#[derive(Debug, Clone, Serialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

/// The logged-in user's profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub name: String,
    pub email: String,
}

/// A message for the support team.
#[derive(Debug, Clone, Serialize)]
pub struct ContactMessage {
    pub name: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    pub message: String,
}

impl ContactMessage {
    /// Check the fields the API requires.
    pub fn validate(&self) -> Result<(), ClientError> {
        if self.name.trim().is_empty()
            || self.email.trim().is_empty()
            || self.message.trim().is_empty()
        {
            return Err(ClientError::InvalidRequest(
                "Name, Email and Message are required".to_string(),
            ));
        }
        Ok(())
    }
}

/// Clinical details submitted with a retinal image.
///
/// Values are kept as text because the API receives them as form fields.
/// Yes/no fields start at the same defaults the submission form uses
/// (male, non-smoker, no medication or history).
#[derive(Debug, Clone, PartialEq)]
pub struct ClinicalFeatures {
    values: BTreeMap<String, String>,
}

impl Default for ClinicalFeatures {
    fn default() -> Self {
        let mut values = BTreeMap::new();
        values.insert("gender".to_string(), "1".to_string());
        for name in &BINARY_FEATURES[1..] {
            values.insert(name.to_string(), "0".to_string());
        }
        Self { values }
    }
}

impl ClinicalFeatures {
    /// Create features with form defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a feature value.
    ///
    /// Unknown feature names and non-numeric values are rejected, since the
    /// model cannot use them.
    pub fn set(&mut self, name: &str, value: &str) -> Result<(), ClientError> {
        if !FEATURE_NAMES.contains(&name) {
            return Err(ClientError::InvalidRequest(format!(
                "Unknown clinical feature '{}'",
                name
            )));
        }
        let value = value.trim();
        let parsed: f64 = value.parse().map_err(|_| {
            ClientError::InvalidRequest(format!("Feature '{}' must be numeric, got '{}'", name, value))
        })?;
        if BINARY_FEATURES.contains(&name) && parsed != 0.0 && parsed != 1.0 {
            return Err(ClientError::InvalidRequest(format!(
                "Feature '{}' must be 0 or 1",
                name
            )));
        }
        self.values.insert(name.to_string(), value.to_string());
        Ok(())
    }

    /// Parse a `name=value` pair and set it.
    pub fn set_pair(&mut self, pair: &str) -> Result<(), ClientError> {
        let (name, value) = pair.split_once('=').ok_or_else(|| {
            ClientError::InvalidRequest(format!("Expected name=value, got '{}'", pair))
        })?;
        self.set(name.trim(), value)
    }

    /// Get a feature value.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    /// Iterate over all set features.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Features the model expects that have no value yet.
    ///
    /// The API substitutes zero for these, so callers may want to warn.
    pub fn missing(&self) -> Vec<&'static str> {
        FEATURE_NAMES.iter().copied().filter(|name| !self.values.contains_key(*name)).collect()
    }
}

/// An image file to upload.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageUpload {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl ImageUpload {
    /// Create an upload from in-memory bytes.
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes,
        }
    }

    /// Read an image file from disk.
    pub fn from_path(path: &Path) -> Result<Self, ClientError> {
        let bytes = std::fs::read(path)?;
        if bytes.is_empty() {
            return Err(ClientError::InvalidRequest(format!(
                "Image file {} is empty",
                path.display()
            )));
        }
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "image".to_string());
        Ok(Self { file_name, bytes })
    }
}

/// A retinal image plus clinical details for risk prediction.
#[derive(Debug, Clone, PartialEq)]
pub struct PredictionRequest {
    pub image: ImageUpload,
    pub features: ClinicalFeatures,
}

/// Per-category probabilities from the clinical risk model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Probabilities {
    pub low: f64,
    pub medium: f64,
    pub high: f64,
}

/// Result of a risk prediction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    /// Whether the image model found signs of cardiovascular disease.
    pub disease_detected: bool,
    /// Raw image-model probability (0-1).
    pub dl_probability: f64,
    /// Risk category text.
    pub risk_level: String,
    /// Blended risk percentage (0-100).
    pub risk_percent: f64,
    /// Ten-year coronary heart disease outlook.
    pub ten_year_chd_prediction: String,
    /// Image-model confidence percentage.
    pub confidence: f64,
    /// Heart rate echoed back from the submitted features.
    #[serde(default)]
    pub heart_rate: Option<u32>,
    /// Base64 PNG with the Grad-CAM overlay.
    #[serde(default)]
    pub gradcam_image: Option<String>,
    /// Base64 PNG of the resized input image.
    #[serde(default)]
    pub original_image: Option<String>,
    #[serde(default)]
    pub probabilities: Option<Probabilities>,
    /// Colour -> meaning legend for the Grad-CAM overlay.
    #[serde(default)]
    pub gradcam_legend: BTreeMap<String, String>,
}

impl Prediction {
    /// Recognised risk category.
    pub fn risk(&self) -> Option<RiskLevel> {
        RiskLevel::parse(&self.risk_level)
    }
}

/// Response body of a successful login.
#[derive(Debug, Deserialize)]
pub(crate) struct LoginResponse {
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Error body shapes used by the API (`message` or `error`).
#[derive(Debug, Default, Deserialize)]
pub(crate) struct ApiMessage {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub msg: Option<String>,
}

impl ApiMessage {
    pub fn into_text(self) -> Option<String> {
        self.message.or(self.error).or(self.msg)
    }
}
