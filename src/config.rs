//! Application configuration loaded from environment variables.
//!
//! A `.env` file in the working directory is honored for local runs.

use crate::export::ExportFormat;
use crate::services::DEFAULT_MAX_CONCURRENT_ASSEMBLIES;
use crate::source::memory::DEFAULT_PAGE_SIZE;
use std::env;
use std::path::PathBuf;
use std::str::FromStr;

/// Log output format for the binary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Json,
    Pretty,
}

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// JSON store snapshot served by the memory source
    pub store_path: Option<PathBuf>,
    /// Directory exported files are written to
    pub export_dir: PathBuf,
    /// Export file format
    pub export_format: ExportFormat,
    /// Upper bound on concurrent activity assemblies in a batch
    pub max_concurrent_assemblies: usize,
    /// Location samples per route page served by the memory source
    pub route_page_size: usize,
    /// Keep only activities whose source device contains this text
    pub device_filter: Option<String>,
    /// Activities to export; `None` exports everything listed
    pub export_activity_ids: Option<Vec<String>>,
    /// Log output format
    pub log_format: LogFormat,
}

impl Default for Config {
    /// Default config for testing only.
    fn default() -> Self {
        Self {
            store_path: None,
            export_dir: PathBuf::from("exports"),
            export_format: ExportFormat::Gpx,
            max_concurrent_assemblies: DEFAULT_MAX_CONCURRENT_ASSEMBLIES,
            route_page_size: DEFAULT_PAGE_SIZE,
            device_filter: None,
            export_activity_ids: None,
            log_format: LogFormat::Json,
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        Ok(Self {
            store_path: non_empty("WORKOUT_STORE_PATH").map(PathBuf::from),
            export_dir: non_empty("EXPORT_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("exports")),
            export_format: match non_empty("EXPORT_FORMAT") {
                Some(value) => ExportFormat::from_str(&value)
                    .map_err(|_| ConfigError::Invalid("EXPORT_FORMAT", value))?,
                None => ExportFormat::Gpx,
            },
            max_concurrent_assemblies: parse_positive(
                "MAX_CONCURRENT_ASSEMBLIES",
                DEFAULT_MAX_CONCURRENT_ASSEMBLIES,
            )?,
            route_page_size: parse_positive("ROUTE_PAGE_SIZE", DEFAULT_PAGE_SIZE)?,
            device_filter: non_empty("DEVICE_FILTER"),
            export_activity_ids: non_empty("EXPORT_ACTIVITY_IDS").map(|ids| {
                ids.split(',')
                    .map(|id| id.trim().to_string())
                    .filter(|id| !id.is_empty())
                    .collect()
            }),
            log_format: match non_empty("LOG_FORMAT").as_deref() {
                None | Some("json") => LogFormat::Json,
                Some("pretty") => LogFormat::Pretty,
                Some(other) => return Err(ConfigError::Invalid("LOG_FORMAT", other.to_string())),
            },
        })
    }

    /// Store path, required by the binary.
    pub fn require_store_path(&self) -> Result<&PathBuf, ConfigError> {
        self.store_path
            .as_ref()
            .ok_or(ConfigError::Missing("WORKOUT_STORE_PATH"))
    }
}

fn non_empty(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_positive(name: &'static str, default: usize) -> Result<usize, ConfigError> {
    match non_empty(name) {
        None => Ok(default),
        Some(value) => match value.parse::<usize>() {
            Ok(n) if n > 0 => Ok(n),
            _ => Err(ConfigError::Invalid(name, value)),
        },
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {0}: {1}")]
    Invalid(&'static str, String),
}

#[cfg(test)]
mod tests {
    use super::*;

    // Environment variables are process-global; keep every env-touching
    // assertion in this one test.
    #[test]
    fn test_config_from_env() {
        env::set_var("WORKOUT_STORE_PATH", "data/store.json");
        env::set_var("EXPORT_FORMAT", "FIT");
        env::set_var("MAX_CONCURRENT_ASSEMBLIES", "3");
        env::set_var("EXPORT_ACTIVITY_IDS", "a, b,,c");
        env::remove_var("ROUTE_PAGE_SIZE");
        env::remove_var("LOG_FORMAT");

        let config = Config::from_env().expect("Config should load");

        assert_eq!(config.store_path, Some(PathBuf::from("data/store.json")));
        assert_eq!(config.export_format, ExportFormat::Fit);
        assert_eq!(config.max_concurrent_assemblies, 3);
        assert_eq!(config.route_page_size, DEFAULT_PAGE_SIZE);
        assert_eq!(
            config.export_activity_ids,
            Some(vec!["a".to_string(), "b".to_string(), "c".to_string()])
        );
        assert_eq!(config.log_format, LogFormat::Json);

        env::set_var("MAX_CONCURRENT_ASSEMBLIES", "0");
        assert!(matches!(
            Config::from_env(),
            Err(ConfigError::Invalid("MAX_CONCURRENT_ASSEMBLIES", _))
        ));
        env::set_var("MAX_CONCURRENT_ASSEMBLIES", "3");

        env::set_var("EXPORT_FORMAT", "tcx");
        assert!(matches!(
            Config::from_env(),
            Err(ConfigError::Invalid("EXPORT_FORMAT", _))
        ));
        env::remove_var("EXPORT_FORMAT");
    }

    #[test]
    fn test_require_store_path() {
        let config = Config::default();
        assert!(matches!(
            config.require_store_path(),
            Err(ConfigError::Missing("WORKOUT_STORE_PATH"))
        ));
    }
}
