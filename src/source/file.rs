//! File-based data source.
//!
//! Polls a JSON file holding an array of vital records, in the same shape
//! `GET /api/vitals` returns.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use tracing::debug;

use eye2heart_types::VitalRecord;

use super::DataSource;
use crate::data::vitals::parse_records;

/// A data source that reads vital records from a JSON file.
///
/// This is the offline mode of operation. The source tracks the file's
/// modification time and only returns new data when the file has been
/// updated.
#[derive(Debug)]
pub struct FileSource {
    path: PathBuf,
    description: String,
    last_error: Option<String>,
    last_modified: Option<SystemTime>,
}

impl FileSource {
    /// Create a new file source for the given path.
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref().to_path_buf();
        let description = format!("file: {}", path.display());
        Self {
            path,
            description,
            last_error: None,
            last_modified: None,
        }
    }

    /// Returns the path being monitored.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn get_modified_time(&self) -> Option<SystemTime> {
        fs::metadata(&self.path).ok()?.modified().ok()
    }

    fn read_file(&mut self) -> Option<Vec<VitalRecord>> {
        match fs::read_to_string(&self.path) {
            Ok(content) => match parse_records(&content) {
                Ok(records) => {
                    self.last_error = None;
                    debug!(path = %self.path.display(), count = records.len(), "Read records");
                    Some(records)
                }
                Err(e) => {
                    self.last_error = Some(format!("Parse error: {}", e));
                    None
                }
            },
            Err(e) => {
                self.last_error = Some(format!("Read error: {}", e));
                None
            }
        }
    }
}

impl DataSource for FileSource {
    fn poll(&mut self) -> Option<Vec<VitalRecord>> {
        let current_modified = self.get_modified_time();

        let file_changed = match (&self.last_modified, &current_modified) {
            (None, _) => true,        // First poll, always read
            (Some(_), None) => false, // File disappeared, keep what we have
            (Some(last), Some(current)) => current > last,
        };

        if file_changed {
            if let Some(records) = self.read_file() {
                self.last_modified = current_modified;
                return Some(records);
            }
        }

        None
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    fn refresh(&mut self) {
        self.last_modified = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn sample_json() -> &'static str {
        r#"[
            {"image_name": "a.png", "heart_rate": 72, "risk_level": "Low",
             "confidence": 90, "created_at": "2024-03-01 09:00:00"},
            {"image_name": "b.png", "heart_rate": 75, "risk_level": "High",
             "confidence": 85, "created_at": "2024-03-02 09:00:00"}
        ]"#
    }

    #[test]
    fn test_file_source_new() {
        let source = FileSource::new("/tmp/vitals.json");
        assert_eq!(source.path(), Path::new("/tmp/vitals.json"));
        assert_eq!(source.description(), "file: /tmp/vitals.json");
        assert!(source.error().is_none());
        assert!(!source.is_unauthorized());
    }

    #[test]
    fn test_file_source_poll_reads_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "{}", sample_json()).unwrap();

        let mut source = FileSource::new(file.path());

        let records = source.poll().unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].bpm(), Some(75.0));

        // Unchanged file yields nothing new
        assert!(source.poll().is_none());
    }

    #[test]
    fn test_file_source_refresh_forces_reread() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "{}", sample_json()).unwrap();

        let mut source = FileSource::new(file.path());
        assert!(source.poll().is_some());
        assert!(source.poll().is_none());

        source.refresh();
        assert_eq!(source.poll().map(|r| r.len()), Some(2));
    }

    #[test]
    fn test_file_source_detects_changes() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "{}", sample_json()).unwrap();

        let mut source = FileSource::new(file.path());
        let _ = source.poll();

        std::thread::sleep(std::time::Duration::from_millis(10));
        std::fs::write(file.path(), r#"[{"heart_rate": 99}]"#).unwrap();

        // mtime resolution varies by filesystem, so a change may not be seen
        if let Some(records) = source.poll() {
            assert_eq!(records[0].bpm(), Some(99.0));
        }
    }

    #[test]
    fn test_file_source_missing_file() {
        let mut source = FileSource::new("/nonexistent/path/vitals.json");

        assert!(source.poll().is_none());
        assert!(source.error().unwrap().contains("Read error"));
    }

    #[test]
    fn test_file_source_invalid_json() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "not valid json").unwrap();

        let mut source = FileSource::new(file.path());

        assert!(source.poll().is_none());
        assert!(source.error().unwrap().contains("Parse error"));
    }
}
