//! Ingestion configuration.
//!
//! Stored as JSON at `<config dir>/leadledger/config.json`. A missing file
//! means defaults; data lives under `<data dir>/leadledger`.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{Error, Result};

const APP_DIR: &str = "leadledger";

/// Settings for ingestion runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestConfig {
    /// `SQLite` database file.
    pub database_path: PathBuf,
    /// Maildir spool holding inbound enquiry emails.
    pub maildir: PathBuf,
    /// Sender domain of the company's own website forms.
    pub website_domain: Option<String>,
    /// Seconds between runs in watch mode.
    pub poll_interval_secs: u64,
}

impl Default for IngestConfig {
    fn default() -> Self {
        let data_dir = data_dir();
        Self {
            database_path: data_dir.join("leadledger.db"),
            maildir: data_dir.join("maildir"),
            website_domain: None,
            poll_interval_secs: 300,
        }
    }
}

impl IngestConfig {
    /// Default configuration file location.
    #[must_use]
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(APP_DIR)
            .join("config.json")
    }

    /// Load configuration from `path`, or defaults if the file is missing.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed, or
    /// if the loaded values are invalid.
    pub async fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = tokio::fs::read_to_string(path).await?;
        let config: Self = serde_json::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to `path`, creating parent directories.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub async fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let contents = serde_json::to_string_pretty(self)?;
        tokio::fs::write(path, contents).await?;

        info!("Configuration saved to {}", path.display());
        Ok(())
    }

    /// Check values for consistency.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] describing the first invalid value.
    pub fn validate(&self) -> Result<()> {
        if self.poll_interval_secs == 0 {
            return Err(Error::Config(
                "poll_interval_secs must be at least 1".to_string(),
            ));
        }
        if self.database_path.as_os_str().is_empty() {
            return Err(Error::Config("database_path is empty".to_string()));
        }
        if let Some(domain) = self
            .website_domain
            .as_deref()
            .filter(|d| d.trim().is_empty() || d.contains('@'))
        {
            return Err(Error::Config(format!(
                "website_domain is not a domain: {domain:?}"
            )));
        }
        Ok(())
    }
}

/// Default directory for the database and maildir.
#[must_use]
pub fn data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
}
