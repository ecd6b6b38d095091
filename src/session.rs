//! Persisted login session.
//!
//! `eye2heart login` writes the access token to a small JSON file so later
//! commands can run without logging in again. Loading the file yields a
//! [`Session`] that is then passed explicitly to each API call.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

use eye2heart_client::Session;

#[derive(Debug, Serialize, Deserialize)]
struct StoredSession {
    token: String,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    saved_at: Option<String>,
}

/// A session file on disk.
#[derive(Debug, Clone)]
pub struct SessionFile {
    path: PathBuf,
}

impl SessionFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the stored session, if there is one.
    pub fn load(&self) -> Result<Option<Session>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read {}", self.path.display()))?;
        let stored: StoredSession = serde_json::from_str(&content)
            .with_context(|| format!("Corrupt session file {}", self.path.display()))?;

        if stored.token.is_empty() {
            return Ok(None);
        }
        Ok(Some(Session::new(stored.token)))
    }

    /// Store a session, replacing any previous one.
    pub fn save(&self, session: &Session, email: Option<&str>) -> Result<()> {
        let stored = StoredSession {
            token: session.token().to_string(),
            email: email.map(str::to_string),
            saved_at: Some(chrono::Utc::now().to_rfc3339()),
        };
        let json = serde_json::to_string_pretty(&stored)?;

        let mut file = open_private(&self.path)
            .with_context(|| format!("Failed to write {}", self.path.display()))?;
        file.write_all(json.as_bytes())?;
        debug!(path = %self.path.display(), "Session saved");
        Ok(())
    }

    /// Remove the stored session. Succeeds if there was none.
    pub fn clear(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => {
                debug!(path = %self.path.display(), "Session cleared");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e).with_context(|| format!("Failed to remove {}", self.path.display())),
        }
    }
}

#[cfg(unix)]
fn open_private(path: &Path) -> std::io::Result<fs::File> {
    use std::os::unix::fs::OpenOptionsExt;

    fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o600)
        .open(path)
}

#[cfg(not(unix))]
fn open_private(path: &Path) -> std::io::Result<fs::File> {
    fs::File::create(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let file = SessionFile::new(dir.path().join("session.json"));

        assert!(file.load().unwrap().is_none());

        file.save(&Session::new("tok-123"), Some("ana@example.com")).unwrap();
        let session = file.load().unwrap().unwrap();
        assert_eq!(session.token(), "tok-123");
    }

    #[test]
    fn test_clear() {
        let dir = tempfile::tempdir().unwrap();
        let file = SessionFile::new(dir.path().join("session.json"));

        file.save(&Session::new("tok"), None).unwrap();
        file.clear().unwrap();
        assert!(file.load().unwrap().is_none());

        // Clearing twice is fine
        file.clear().unwrap();
    }

    #[test]
    fn test_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(&path, "not json").unwrap();
        assert!(SessionFile::new(&path).load().is_err());
    }

    #[cfg(unix)]
    #[test]
    fn test_file_is_private() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let file = SessionFile::new(dir.path().join("session.json"));
        file.save(&Session::new("tok"), None).unwrap();

        let mode = std::fs::metadata(file.path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}
