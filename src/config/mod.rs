//! Settings loaded from `prefixlab.toml` in the app root directory.
//!
//! The file is optional and never written by the application. Every key has a
//! default, so a partial file only overrides what it names.

mod io;

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::app_dirs::AppDirError;
use crate::experiment::catalog::PREFIX_LENGTH_DEFAULT;
use crate::experiment::{DatasetId, ExperimentRequest, ModelId, Selection};

pub use io::{BACKEND_URL_ENV, CONFIG_FILE_NAME, config_path, load_from_path, load_or_default};

pub const DEFAULT_BACKEND_URL: &str = "http://localhost:5000";

/// Errors that may occur while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Config directory unavailable: {0}")]
    Dir(#[from] AppDirError),
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Invalid config at {path}: {source}")]
    ParseToml {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("Invalid backend URL '{url}': {reason}")]
    InvalidBackendUrl { url: String, reason: String },
}

/// Root of the TOML document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppSettings {
    #[serde(default)]
    pub backend: BackendSettings,
    #[serde(default)]
    pub experiment: ExperimentDefaults,
}

/// Where the experiment service lives and how long to wait for it.
///
/// Config keys: `base_url`, `probe_timeout_ms`, `experiment_timeout_secs`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackendSettings {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_probe_timeout_ms")]
    pub probe_timeout_ms: u64,
    #[serde(default = "default_experiment_timeout_secs")]
    pub experiment_timeout_secs: u64,
}

impl Default for BackendSettings {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            probe_timeout_ms: default_probe_timeout_ms(),
            experiment_timeout_secs: default_experiment_timeout_secs(),
        }
    }
}

impl BackendSettings {
    pub fn probe_timeout(&self) -> Duration {
        Duration::from_millis(self.probe_timeout_ms.max(1))
    }

    pub fn experiment_timeout(&self) -> Duration {
        Duration::from_secs(self.experiment_timeout_secs.max(1))
    }
}

/// Initial selection shown in the UI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperimentDefaults {
    #[serde(default = "default_dataset")]
    pub dataset: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_prefix_length")]
    pub prefix_length: i64,
}

impl Default for ExperimentDefaults {
    fn default() -> Self {
        Self {
            dataset: default_dataset(),
            model: default_model(),
            prefix_length: default_prefix_length(),
        }
    }
}

impl ExperimentDefaults {
    /// Validated selection; invalid entries fall back to the built-in default.
    pub fn selection(&self) -> Selection {
        match ExperimentRequest::build(&self.dataset, &self.model, self.prefix_length) {
            Ok(request) => Selection {
                dataset: request.dataset(),
                model: request.model(),
                prefix_length: request.prefix_length(),
            },
            Err(err) => {
                tracing::warn!(error = %err, "Ignoring invalid experiment defaults in config");
                Selection::default()
            }
        }
    }
}

fn default_base_url() -> String {
    DEFAULT_BACKEND_URL.to_string()
}

fn default_probe_timeout_ms() -> u64 {
    3_000
}

fn default_experiment_timeout_secs() -> u64 {
    120
}

fn default_dataset() -> String {
    DatasetId::default().as_str().to_string()
}

fn default_model() -> String {
    ModelId::default().as_str().to_string()
}

fn default_prefix_length() -> i64 {
    i64::from(PREFIX_LENGTH_DEFAULT)
}
