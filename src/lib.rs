//! # eye2heart
//!
//! Terminal dashboard and command-line client for Eye2Heart cardiovascular
//! vitals trends.
//!
//! Each retinal-scan assessment stored by the Eye2Heart API yields a vital
//! record (heart rate, risk level, model confidence, timestamp). This crate
//! analyses a user's records (mean heart rate, high-risk count, trend
//! direction, stability score) and shows them in an interactive terminal UI.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        Application                          │
//! │  ┌─────────┐    ┌──────────┐    ┌─────────┐    ┌─────────┐ │
//! │  │  app    │───▶│   data   │───▶│   ui    │───▶│ Terminal│ │
//! │  │ (state) │    │(analysis)│    │(render) │    │         │ │
//! │  └────┬────┘    └──────────┘    └─────────┘    └─────────┘ │
//! │       │                                                     │
//! │       ▼                                                     │
//! │  ┌─────────┐                                                │
//! │  │ source  │◀── ApiSource | FileSource | ChannelSource     │
//! │  │ (input) │                                                │
//! │  └─────────┘                                                │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! - **[`app`]**: Application state, view navigation and user interaction
//! - **[`source`]**: Data source abstraction ([`DataSource`]) with API
//!   polling, file polling and channel-based input
//! - **[`data`]**: Trend analytics ([`TrendAnalyzer`]) and display rows
//! - **[`ui`]**: Terminal rendering using ratatui
//! - **[`report`]**: JSON report export
//! - **[`config`]**, **[`session`]**, **[`logging`]**: CLI plumbing
//!
//! ## Usage
//!
//! ### As a CLI tool
//!
//! ```bash
//! eye2heart login --email ana@example.com --password secret
//! eye2heart trends
//! eye2heart report --output vitals_report.json
//!
//! # Offline, from a saved GET /api/vitals response
//! eye2heart trends --file vitals.json
//! ```
//!
//! ### Analysing records directly
//!
//! ```
//! use eye2heart::{TrendAnalyzer, TrendPolicy, TrendStatus};
//! use eye2heart_types::VitalRecord;
//!
//! let records: Vec<VitalRecord> = [70.0, 72.0, 78.0, 80.0]
//!     .iter()
//!     .map(|&bpm| VitalRecord::builder().heart_rate(bpm).build())
//!     .collect();
//!
//! let analysis = TrendAnalyzer::new(TrendPolicy::default()).analyze(&records);
//! assert_eq!(analysis.mean_heart_rate, 75.0);
//! assert_eq!(analysis.trend.status, TrendStatus::Increasing);
//! ```
//!
//! ### As a library with file source
//!
//! ```
//! use eye2heart::{App, FileSource, TrendPolicy};
//!
//! let source = Box::new(FileSource::new("vitals.json"));
//! let app = App::new(source, TrendPolicy::default());
//! ```
//!
//! ### As a library with channel source
//!
//! ```
//! use eye2heart::{App, ChannelSource, TrendPolicy};
//!
//! let (tx, source) = ChannelSource::create("embedded");
//! let app = App::new(Box::new(source), TrendPolicy::default());
//!
//! // Push a snapshot whenever the records change
//! tx.send(Some(Vec::new())).unwrap();
//! ```

pub mod app;
pub mod config;
pub mod data;
pub mod events;
pub mod logging;
pub mod report;
pub mod session;
pub mod source;
pub mod ui;

// Re-export main types for convenience
pub use app::App;
pub use data::{
    StabilityScore, Trend, TrendAnalyzer, TrendPolicy, TrendStatus, VitalRow, VitalsAnalysis,
    VitalsData,
};
pub use source::{ApiSource, ChannelSource, DataSource, FetchStatus, FileSource};
