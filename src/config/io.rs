use std::path::{Path, PathBuf};

use super::{AppSettings, ConfigError};
use crate::app_dirs;

pub const CONFIG_FILE_NAME: &str = "prefixlab.toml";
/// Environment variable overriding `backend.base_url`.
pub const BACKEND_URL_ENV: &str = "PREFIXLAB_BACKEND_URL";

/// Resolve the configuration file path, ensuring the parent directory exists.
pub fn config_path() -> Result<PathBuf, ConfigError> {
    Ok(app_dirs::app_root_dir()?.join(CONFIG_FILE_NAME))
}

/// Load settings from the app root, returning defaults if the file is missing.
pub fn load_or_default() -> Result<AppSettings, ConfigError> {
    let path = config_path()?;
    let mut settings = load_from_path(&path)?;
    if let Ok(url) = std::env::var(BACKEND_URL_ENV) {
        tracing::info!(url = %url, "Backend URL overridden from {BACKEND_URL_ENV}");
        settings.backend.base_url = url;
    }
    validate_base_url(&settings.backend.base_url)?;
    Ok(settings)
}

/// Parse one settings file; a missing file yields defaults.
pub fn load_from_path(path: &Path) -> Result<AppSettings, ConfigError> {
    if !path.exists() {
        return Ok(AppSettings::default());
    }
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&text).map_err(|source| ConfigError::ParseToml {
        path: path.to_path_buf(),
        source,
    })
}

fn validate_base_url(raw: &str) -> Result<(), ConfigError> {
    let invalid = |reason: String| ConfigError::InvalidBackendUrl {
        url: raw.to_string(),
        reason,
    };
    let url = url::Url::parse(raw.trim()).map_err(|err| invalid(err.to_string()))?;
    match url.scheme() {
        "http" | "https" => {}
        other => return Err(invalid(format!("unsupported scheme '{other}'"))),
    }
    if url.host_str().is_none() {
        return Err(invalid("missing host".to_string()));
    }
    Ok(())
}
