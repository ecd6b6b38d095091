//! Data source abstraction for receiving vitals snapshots.
//!
//! This module provides a trait-based abstraction for receiving vital records
//! from various sources (a JSON file, the remote API, in-memory channels).

mod api;
mod channel;
mod file;

pub use api::{ApiSource, FetchStatus};
pub use channel::ChannelSource;
pub use file::FileSource;

use std::fmt::Debug;

use eye2heart_types::VitalRecord;

/// Trait for receiving vital records from various sources.
///
/// Implementations of this trait provide record snapshots from different
/// backends - file polling, API polling, or in-memory channels.
///
/// # Example
///
/// ```
/// use eye2heart::{FileSource, DataSource};
///
/// let mut source = FileSource::new("vitals.json");
/// if let Some(records) = source.poll() {
///     println!("Got {} records", records.len());
/// }
/// ```
pub trait DataSource: Send + Debug {
    /// Poll for the latest snapshot.
    ///
    /// Returns `Some(records)` if new data is available, `None` otherwise.
    /// This method should be non-blocking.
    fn poll(&mut self) -> Option<Vec<VitalRecord>>;

    /// Returns a human-readable description of the source.
    ///
    /// Used for display in the TUI status bar.
    fn description(&self) -> &str;

    /// Check if the source has encountered an error.
    ///
    /// Returns the error message if an error occurred during the last poll.
    fn error(&self) -> Option<&str>;

    /// Returns true once the source's credentials have been rejected.
    fn is_unauthorized(&self) -> bool {
        false
    }

    /// Ask the source to fetch fresh data as soon as possible.
    fn refresh(&mut self) {}
}
