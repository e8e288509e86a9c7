//! # Configuration State
//!
//! Console configuration loaded once at startup.
//!
//! ## Configuration Sources (later overrides earlier)
//! 1. Defaults (this file)
//! 2. Config file (`allot.toml` in the platform config dir, or `--config`)
//! 3. Environment variables (`ALLOT_*`)
//!
//! ## Example `allot.toml`
//! ```toml
//! output = "text"
//!
//! [sentinels]
//! any_warehouse = "WH-000"
//! any_supplier = "SP-000"
//!
//! [logging]
//! filter = "info,allot_core=debug"
//! format = "json"
//! ```
//!
//! Unknown keys are rejected. Top-level keys such as `output` must come
//! before the first `[table]` header.
//!
//! Configuration is read-only after `load`, so it is passed around by
//! reference with no locking.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use allot_core::{DEFAULT_ANY_SUPPLIER, DEFAULT_ANY_WAREHOUSE};

use crate::error::ApiError;

// =============================================================================
// Config Sections
// =============================================================================

/// Legacy ids that scenario files use to mean "any source".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SentinelConfig {
    pub any_warehouse: String,
    pub any_supplier: String,
}

impl Default for SentinelConfig {
    fn default() -> Self {
        SentinelConfig {
            any_warehouse: DEFAULT_ANY_WAREHOUSE.to_string(),
            any_supplier: DEFAULT_ANY_SUPPLIER.to_string(),
        }
    }
}

/// Log line format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable lines
    #[default]
    Pretty,

    /// One JSON object per event
    Json,
}

impl FromStr for LogFormat {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pretty" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            other => Err(ApiError::config(format!(
                "Unknown log format '{}', expected pretty or json",
                other
            ))),
        }
    }
}

/// Tracing subscriber settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    /// `EnvFilter` directive. `RUST_LOG` still wins when set.
    pub filter: String,
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            filter: "warn,allot_core=info,allot_console=info".to_string(),
            format: LogFormat::Pretty,
        }
    }
}

/// How command results are printed on stdout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl FromStr for OutputFormat {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            other => Err(ApiError::config(format!(
                "Unknown output format '{}', expected text or json",
                other
            ))),
        }
    }
}

// =============================================================================
// Config State
// =============================================================================

/// Console configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigState {
    pub output: OutputFormat,
    pub sentinels: SentinelConfig,
    pub logging: LoggingConfig,
}

impl ConfigState {
    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (explicit path, else the platform default)
    /// 3. Environment variables
    ///
    /// An explicit path that does not exist is an error; a missing default
    /// file is not.
    pub fn load(config_path: Option<PathBuf>) -> Result<Self, ApiError> {
        Self::load_with(config_path, |key| std::env::var(key).ok())
    }

    /// Same as [`ConfigState::load`] with a custom environment lookup.
    pub fn load_with<F>(config_path: Option<PathBuf>, env: F) -> Result<Self, ApiError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = match config_path {
            Some(path) => {
                if !path.exists() {
                    return Err(ApiError::config(format!(
                        "Config file not found: {}",
                        path.display()
                    )));
                }
                Self::from_file(&path)?
            }
            None => match Self::default_config_path() {
                Some(path) if path.exists() => Self::from_file(&path)?,
                Some(path) => {
                    debug!(?path, "Config file not found, using defaults");
                    Self::default()
                }
                None => Self::default(),
            },
        };

        config.apply_env_overrides(env)?;
        config.validate()?;

        Ok(config)
    }

    fn from_file(path: &Path) -> Result<Self, ApiError> {
        info!(?path, "Loading config from file");
        let contents = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&contents)?)
    }

    /// Applies `ALLOT_*` overrides.
    ///
    /// ## Environment Variables
    /// - `ALLOT_ANY_WAREHOUSE`: warehouse sentinel id
    /// - `ALLOT_ANY_SUPPLIER`: supplier sentinel id
    /// - `ALLOT_LOG_FILTER`: tracing filter directive
    /// - `ALLOT_LOG_FORMAT`: `pretty` or `json`
    /// - `ALLOT_OUTPUT`: `text` or `json`
    fn apply_env_overrides<F>(&mut self, env: F) -> Result<(), ApiError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(id) = env("ALLOT_ANY_WAREHOUSE") {
            debug!(warehouse = %id, "Overriding warehouse sentinel from environment");
            self.sentinels.any_warehouse = id;
        }

        if let Some(id) = env("ALLOT_ANY_SUPPLIER") {
            debug!(supplier = %id, "Overriding supplier sentinel from environment");
            self.sentinels.any_supplier = id;
        }

        if let Some(filter) = env("ALLOT_LOG_FILTER") {
            self.logging.filter = filter;
        }

        if let Some(format) = env("ALLOT_LOG_FORMAT") {
            self.logging.format = format.parse()?;
        }

        if let Some(output) = env("ALLOT_OUTPUT") {
            self.output = output.parse()?;
        }

        Ok(())
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), ApiError> {
        if self.sentinels.any_warehouse.trim().is_empty() {
            return Err(ApiError::config("sentinels.any_warehouse must not be empty"));
        }

        if self.sentinels.any_supplier.trim().is_empty() {
            return Err(ApiError::config("sentinels.any_supplier must not be empty"));
        }

        if self.logging.filter.trim().is_empty() {
            return Err(ApiError::config("logging.filter must not be empty"));
        }

        Ok(())
    }

    /// Default config path: `<platform config dir>/allot.toml`.
    pub fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "allot", "allot")
            .map(|dirs| dirs.config_dir().join("allot.toml"))
    }
}
