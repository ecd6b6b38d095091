//! Application settings.
//!
//! Settings are layered: built-in defaults, then an optional TOML file, then
//! `EYE2HEART_*` environment variables. Nested keys use a double underscore,
//! e.g. `EYE2HEART_API__ENDPOINT` or `EYE2HEART_TREND__WINDOW`.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

use crate::data::TrendPolicy;

/// File name of the stored session, relative to the home directory.
const SESSION_FILE_NAME: &str = ".eye2heart_session.json";

/// Remote API connection settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiSettings {
    /// Base URL of the API.
    pub endpoint: String,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            endpoint: eye2heart_client::client::DEFAULT_ENDPOINT.to_string(),
            timeout_secs: eye2heart_client::client::DEFAULT_TIMEOUT.as_secs(),
        }
    }
}

impl ApiSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub api: ApiSettings,
    /// Seconds between vitals refreshes in the dashboard.
    pub refresh_secs: u64,
    pub trend: TrendPolicy,
    /// Where the login session is stored. Defaults to a file in the home
    /// directory.
    pub session_file: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api: ApiSettings::default(),
            refresh_secs: 30,
            trend: TrendPolicy::default(),
            session_file: None,
        }
    }
}

impl Settings {
    /// Load settings from an optional file and the process environment.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::load_from(path, Environment::with_prefix("EYE2HEART"))
    }

    /// Load settings with an explicit environment source.
    pub fn load_from(path: Option<&Path>, env: Environment) -> Result<Self> {
        let mut builder = Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(File::from(path));
        }
        builder = builder.add_source(
            env.prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build().context("Failed to load settings")?;
        config
            .try_deserialize()
            .context("Invalid settings")
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_secs.max(1))
    }

    /// Resolved session file location.
    pub fn session_path(&self) -> PathBuf {
        if let Some(ref path) = self.session_file {
            return path.clone();
        }
        match std::env::var_os("HOME") {
            Some(home) => PathBuf::from(home).join(SESSION_FILE_NAME),
            None => PathBuf::from(SESSION_FILE_NAME),
        }
    }
}
