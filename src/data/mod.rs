//! Data models and processing for vitals snapshots.
//!
//! This module turns raw vital records into analysed, display-ready data.
//!
//! ## Submodules
//!
//! - [`analyzer`]: Trend analytics ([`TrendAnalyzer`], [`TrendPolicy`], [`VitalsAnalysis`])
//! - [`history`]: Refresh history for sparklines
//! - [`timestamp`]: Parsing and formatting of `created_at` values
//! - [`vitals`]: Snapshot model ([`VitalsData`]) with per-record display rows
//!
//! ## Data Flow
//!
//! ```text
//! Vec<VitalRecord> (from API or file)
//!        │
//!        ▼
//! VitalsData::from_records()
//!        │
//!        ├──▶ VitalsAnalysis (TrendAnalyzer with TrendPolicy)
//!        │
//!        ├──▶ VitalRow per record (formatted for display)
//!        │
//!        └──▶ History::record() (for sparklines)
//! ```

pub mod analyzer;
pub mod history;
pub mod timestamp;
pub mod vitals;

pub use analyzer::{StabilityScore, Trend, TrendAnalyzer, TrendPolicy, TrendStatus, VitalsAnalysis};
pub use history::History;
pub use vitals::{classify_bpm, BpmRange, VitalRow, VitalsData, REFERENCE_RANGE};
