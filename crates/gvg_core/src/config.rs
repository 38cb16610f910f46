//! Runtime configuration for the roster core.
//!
//! # Responsibility
//! - Load settings from an optional TOML file.
//! - Layer environment overrides on top of file values.
//!
//! # Invariants
//! - Every field has a usable default; an absent file is not an error.
//! - An explicitly requested file that cannot be read or parsed is an error.

use crate::images::{ImageResolver, ImageResolverError, DEFAULT_BUCKET};
use crate::logging::default_log_level;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variable naming the config file to load.
pub const CONFIG_PATH_ENV: &str = "GVG_CONFIG";
const DB_PATH_ENV: &str = "GVG_DB_PATH";
const LOG_LEVEL_ENV: &str = "GVG_LOG_LEVEL";
const LOG_DIR_ENV: &str = "GVG_LOG_DIR";
const IMAGE_BASE_URL_ENV: &str = "GVG_IMAGE_BASE_URL";

const DEFAULT_IMAGE_BASE_URL: &str = "http://localhost:54321/storage/v1/object/public";

#[derive(Debug)]
pub enum ConfigError {
    Read { path: PathBuf, message: String },
    Parse { path: PathBuf, message: String },
    Images(ImageResolverError),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Read { path, message } => {
                write!(f, "failed to read {}: {message}", path.display())
            }
            Self::Parse { path, message } => {
                write!(f, "failed to parse {}: {message}", path.display())
            }
            Self::Images(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Images(err) => Some(err),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// SQLite file; `None` means an in-memory session store.
    pub db_path: Option<PathBuf>,
    pub logging: LoggingConfig,
    pub images: ImagesConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `trace|debug|info|warn|error`; build-mode default when unset.
    pub level: Option<String>,
    /// Absolute directory for rolling log files; logging stays off when unset.
    pub dir: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImagesConfig {
    /// Public root of the blob store.
    pub base_url: String,
    pub bucket: String,
}

impl Default for ImagesConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_IMAGE_BASE_URL.to_string(),
            bucket: DEFAULT_BUCKET.to_string(),
        }
    }
}

impl Config {
    /// Parses a TOML document; missing keys fall back to defaults.
    pub fn from_toml_str(contents: &str, origin: &Path) -> Result<Self, ConfigError> {
        toml::from_str(contents).map_err(|err| ConfigError::Parse {
            path: origin.to_path_buf(),
            message: err.to_string(),
        })
    }

    /// Effective log level.
    pub fn log_level(&self) -> &str {
        self.logging
            .level
            .as_deref()
            .map(str::trim)
            .filter(|level| !level.is_empty())
            .unwrap_or_else(|| default_log_level())
    }

    pub fn image_resolver(&self) -> Result<ImageResolver, ConfigError> {
        ImageResolver::new(&self.images.base_url, &self.images.bucket).map_err(ConfigError::Images)
    }

    /// Applies `GVG_*` process environment overrides.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Applies overrides from `lookup`; blank values are ignored.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let value = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        if let Some(path) = value(DB_PATH_ENV) {
            self.db_path = Some(PathBuf::from(path));
        }
        if let Some(level) = value(LOG_LEVEL_ENV) {
            self.logging.level = Some(level);
        }
        if let Some(dir) = value(LOG_DIR_ENV) {
            self.logging.dir = Some(PathBuf::from(dir));
        }
        if let Some(base_url) = value(IMAGE_BASE_URL_ENV) {
            self.images.base_url = base_url;
        }
    }
}

/// Loads configuration from `path`, then applies environment overrides.
///
/// With `path = None`, the file named by `GVG_CONFIG` is used when set;
/// otherwise defaults apply.
pub fn load(path: Option<&Path>) -> Result<Config, ConfigError> {
    let env_path = std::env::var_os(CONFIG_PATH_ENV).map(PathBuf::from);
    let mut config = match path.or(env_path.as_deref()) {
        Some(path) => load_file(path)?,
        None => Config::default(),
    };
    config.apply_env_overrides();
    Ok(config)
}

fn load_file(path: &Path) -> Result<Config, ConfigError> {
    let contents = fs::read_to_string(path).map_err(|err| ConfigError::Read {
        path: path.to_path_buf(),
        message: err.to_string(),
    })?;
    Config::from_toml_str(&contents, path)
}

#[cfg(test)]
mod tests {
    use super::{load, Config, ConfigError};
    use std::collections::HashMap;
    use std::path::{Path, PathBuf};

    #[test]
    fn partial_file_keeps_defaults() {
        let config = Config::from_toml_str(
            "db_path = \"/tmp/gvg.sqlite3\"\n[images]\nbucket = \"portraits\"\n",
            Path::new("inline.toml"),
        )
        .unwrap();
        assert_eq!(config.db_path, Some(PathBuf::from("/tmp/gvg.sqlite3")));
        assert_eq!(config.images.bucket, "portraits");
        assert!(config.images.base_url.starts_with("http://localhost"));
    }

    #[test]
    fn overrides_replace_file_values_and_skip_blanks() {
        let mut config = Config::default();
        let env = HashMap::from([
            ("GVG_LOG_LEVEL", "warn"),
            ("GVG_IMAGE_BASE_URL", "https://cdn.example.com/public"),
            ("GVG_DB_PATH", "  "),
        ]);
        config.apply_overrides(|key| env.get(key).map(|value| value.to_string()));

        assert_eq!(config.log_level(), "warn");
        assert_eq!(config.images.base_url, "https://cdn.example.com/public");
        assert_eq!(config.db_path, None);
    }

    #[test]
    fn malformed_file_reports_path() {
        let err = Config::from_toml_str("db_path = [", Path::new("broken.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { ref path, .. } if path == Path::new("broken.toml")));
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load(Some(&dir.path().join("absent.toml"))).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn default_images_config_builds_resolver() {
        assert!(Config::default().image_resolver().is_ok());
    }
}
