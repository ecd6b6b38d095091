//! # eye2heart-client
//!
//! Async client for the Eye2Heart backend API.
//!
//! The backend stores one record per retinal-scan risk assessment. This crate
//! covers the account endpoints (register, login, profile), the vitals
//! history, risk prediction from an image plus clinical features, and the
//! contact form.
//!
//! Authentication is explicit: [`ApiClient::login`] returns a [`Session`]
//! which is then passed to each call that needs it. A rejected or expired
//! token surfaces as [`ClientError::Unauthorized`].
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use eye2heart_client::{ApiClient, Credentials};
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = ApiClient::builder()
//!         .endpoint("http://localhost:5000")
//!         .timeout(Duration::from_secs(5))
//!         .build()?;
//!
//!     let session = client
//!         .login(&Credentials {
//!             email: "ana@example.com".into(),
//!             password: "secret".into(),
//!         })
//!         .await?;
//!
//!     let profile = client.profile(&session).await?;
//!     println!("Logged in as {}", profile.name);
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod error;
pub mod models;
pub mod session;

pub use client::{records_from_value, ApiClient, ApiClientBuilder};
pub use error::ClientError;
pub use models::{
    ClinicalFeatures, ContactMessage, Credentials, ImageUpload, Prediction, PredictionRequest,
    Probabilities, Profile, Registration,
};
pub use session::Session;

// Re-export types for convenience
pub use eye2heart_types::{HeartRate, RiskLevel, VitalRecord};
