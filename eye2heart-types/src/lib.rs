//! # eye2heart-types
//!
//! Core record types for Eye2Heart. These describe the stored results of past
//! cardiovascular risk assessments exactly as the remote API returns them,
//! without trusting any individual field.
//!
//! ## Design Goals
//!
//! - **Zero required dependencies**: Core types work without any serialization framework
//! - **Optional serialization**: Enable the `serde` feature for JSON support
//! - **Untrusted input**: Malformed fields deserialize to "invalid" markers
//!   instead of failing the whole payload
//! - **Ergonomic builders**: Fluent API for constructing records in tests and tools
//!
//! ## Features
//!
//! - `std` (default): Standard library support
//! - `serde`: JSON serialization via serde, matching the API wire names
//!
//! ## Example
//!
//! ```rust
//! use eye2heart_types::{RiskLevel, VitalRecord};
//!
//! let record = VitalRecord::builder()
//!     .created_at("2024-03-01 09:30:00")
//!     .heart_rate(72.0)
//!     .risk_level("High")
//!     .confidence(91.5)
//!     .image_name("retina_left.png")
//!     .build();
//!
//! assert_eq!(record.bpm(), Some(72.0));
//! assert_eq!(record.risk(), Some(RiskLevel::High));
//! ```

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

#[cfg(feature = "serde")]
mod de;
mod heart_rate;
mod record;
mod risk;

pub use heart_rate::*;
pub use record::*;
pub use risk::*;
