//! User settings.
//!
//! Resolution order for every value: command-line override, then
//! environment, then the JSON settings file, then the built-in default.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::XdgDirs;

/// Loopback address the backend listens on during local development.
pub const DEFAULT_BACKEND_URL: &str = "http://127.0.0.1:5000";

/// Assistant message the conversation opens with.
pub const DEFAULT_GREETING: &str = "Hello, how can I help you?";

/// Environment variable holding the backend base URL.
pub const BACKEND_URL_ENV: &str = "BCCS_BACKEND_URL";

/// Errors that can occur while loading settings.
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Failed to read settings file: {0}")]
    Read(#[from] std::io::Error),

    #[error("Failed to parse settings file: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Settings file contents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Base URL of the backend; `/api/v1/llm` is appended
    pub backend_url: String,
    /// Opening assistant message (`null` to start empty)
    pub greeting: Option<String>,
    /// TCP connect timeout; the streamed body itself is never timed out
    pub connect_timeout_secs: Option<u64>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            backend_url: DEFAULT_BACKEND_URL.to_string(),
            greeting: Some(DEFAULT_GREETING.to_string()),
            connect_timeout_secs: None,
        }
    }
}

/// Values given on the command line.
#[derive(Debug, Clone, Default)]
pub struct SettingsOverrides {
    pub backend_url: Option<String>,
    pub no_greeting: bool,
}

impl Settings {
    /// Load from `path`. A missing file yields the defaults.
    pub fn load_from(path: &Path) -> Result<Self, SettingsError> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "No settings file, using defaults");
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let settings = serde_json::from_str(&content)?;
        tracing::debug!(path = %path.display(), "Loaded settings");
        Ok(settings)
    }

    /// Full resolution: file (explicit path or the XDG default), environment,
    /// then command-line overrides.
    pub fn resolve(
        path: Option<&Path>,
        overrides: &SettingsOverrides,
    ) -> Result<Self, SettingsError> {
        let mut settings = match path {
            Some(path) => Self::load_from(path)?,
            None => Self::load_from(&XdgDirs::new().settings_file())?,
        };
        settings.apply_env();
        settings.apply_overrides(overrides);
        Ok(settings)
    }

    /// Apply environment variables.
    pub fn apply_env(&mut self) {
        if let Ok(url) = std::env::var(BACKEND_URL_ENV) {
            if !url.trim().is_empty() {
                self.backend_url = url;
            }
        }
    }

    pub fn apply_overrides(&mut self, overrides: &SettingsOverrides) {
        if let Some(url) = &overrides.backend_url {
            self.backend_url = url.clone();
        }
        if overrides.no_greeting {
            self.greeting = None;
        }
    }

    pub fn connect_timeout(&self) -> Option<Duration> {
        self.connect_timeout_secs.map(Duration::from_secs)
    }
}
