//! Engine configuration
//!
//! TOML-backed settings for the pieces the deployment decides: file-service
//! allow-lists and the logging profile.
//!
//! ```toml
//! logging = "production"
//! allowed_read_dirs = ["/var/lib/conifer/configs"]
//! allowed_write_dirs = ["/var/lib/conifer/exports"]
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use conifer_core::logging_facility::Profile;

use crate::files::FileService;

/// Configuration load failure
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file '{path}': {message}")]
    Io { path: String, message: String },

    #[error("cannot parse config file '{path}': {message}")]
    Parse { path: String, message: String },
}

/// Deployment-level engine settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Directories url sources may be read from
    #[serde(default)]
    pub allowed_read_dirs: Vec<PathBuf>,

    /// Directories url targets may be written to (implicitly readable)
    #[serde(default)]
    pub allowed_write_dirs: Vec<PathBuf>,

    /// Logging profile name: development | production | test
    #[serde(default)]
    pub logging: Option<String>,
}

impl EngineConfig {
    /// Load configuration from a TOML file
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Io` when the file cannot be read and
    /// `ConfigError::Parse` when it is not valid TOML for this shape.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|err| ConfigError::Io {
            path: path.display().to_string(),
            message: err.to_string(),
        })?;
        toml::from_str(&raw).map_err(|err| ConfigError::Parse {
            path: path.display().to_string(),
            message: err.to_string(),
        })
    }

    /// Build the file service from the configured allow-lists
    pub fn file_service(&self) -> FileService {
        FileService::new(
            self.allowed_read_dirs.clone(),
            self.allowed_write_dirs.clone(),
        )
    }

    /// The logging profile this deployment selected
    ///
    /// Unknown names fall back to Development rather than failing boot.
    pub fn logging_profile(&self) -> Profile {
        match self.logging.as_deref() {
            Some("production") => Profile::Production,
            Some("test") => Profile::Test,
            _ => Profile::Development,
        }
    }
}
