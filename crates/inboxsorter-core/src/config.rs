//! Sorter configuration.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::cache::DEFAULT_CACHE_SAVE_INTERVAL;
use crate::{Error, Result};

/// Default database file name.
pub const DEFAULT_DB_PATH: &str = "SMTP_cache.db";

/// Settings for a sorting run, read from a JSON file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SorterConfig {
    /// Rules file.
    pub rules_path: PathBuf,
    /// `SQLite` database holding the address cache.
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,
    /// New resolutions between automatic cache flushes.
    #[serde(default = "default_cache_save_interval")]
    pub cache_save_interval: usize,
    /// Tracing filter directive, used when `RUST_LOG` is not set.
    #[serde(default)]
    pub log_filter: Option<String>,
}

fn default_db_path() -> PathBuf {
    PathBuf::from(DEFAULT_DB_PATH)
}

const fn default_cache_save_interval() -> usize {
    DEFAULT_CACHE_SAVE_INTERVAL
}

/// A configuration problem.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// No rules file given.
    EmptyRulesPath,
    /// No database path given.
    EmptyDbPath,
    /// Save interval of zero.
    ZeroSaveInterval,
}

impl ConfigError {
    /// Get human-readable error message.
    #[must_use]
    pub const fn message(&self) -> &'static str {
        match self {
            Self::EmptyRulesPath => "Rules file path is required",
            Self::EmptyDbPath => "Database path is required",
            Self::ZeroSaveInterval => "Cache save interval must be at least 1",
        }
    }

    /// Get the field name this error relates to.
    #[must_use]
    pub const fn field(&self) -> &'static str {
        match self {
            Self::EmptyRulesPath => "rules_path",
            Self::EmptyDbPath => "db_path",
            Self::ZeroSaveInterval => "cache_save_interval",
        }
    }
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field(), self.message())
    }
}

impl std::error::Error for ConfigError {}

impl SorterConfig {
    /// Create a configuration with defaults for everything but the rules file.
    #[must_use]
    pub fn new(rules_path: impl Into<PathBuf>) -> Self {
        Self {
            rules_path: rules_path.into(),
            db_path: default_db_path(),
            cache_save_interval: DEFAULT_CACHE_SAVE_INTERVAL,
            log_filter: None,
        }
    }

    /// Read and validate the configuration file at `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file is missing, unreadable, not valid JSON,
    /// or fails validation.
    pub async fn load(path: &Path) -> Result<Self> {
        if !tokio::fs::try_exists(path).await? {
            return Err(Error::Config(format!(
                "config file {} not found",
                path.display()
            )));
        }

        let contents = tokio::fs::read_to_string(path).await?;
        let config: Self = serde_json::from_str(&contents)?;

        config.validate().map_err(|errors| {
            let details: Vec<String> = errors.iter().map(ToString::to_string).collect();
            Error::Config(details.join("; "))
        })?;

        Ok(config)
    }

    /// Check every field.
    ///
    /// # Errors
    ///
    /// Returns all problems found.
    pub fn validate(&self) -> std::result::Result<(), Vec<ConfigError>> {
        let mut errors = Vec::new();

        if self.rules_path.as_os_str().is_empty() {
            errors.push(ConfigError::EmptyRulesPath);
        }
        if self.db_path.as_os_str().is_empty() {
            errors.push(ConfigError::EmptyDbPath);
        }
        if self.cache_save_interval == 0 {
            errors.push(ConfigError::ZeroSaveInterval);
        }

        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_applied() {
        let json = r#"{ "rules_path": "rules.json" }"#;
        let config: SorterConfig = serde_json::from_str(json).unwrap();

        assert_eq!(config.db_path, PathBuf::from("SMTP_cache.db"));
        assert_eq!(config.cache_save_interval, 100);
        assert_eq!(config.log_filter, None);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_reports_all() {
        let config = SorterConfig {
            rules_path: PathBuf::new(),
            db_path: PathBuf::new(),
            cache_save_interval: 0,
            log_filter: None,
        };

        let errors = config.validate().unwrap_err();
        assert_eq!(
            errors,
            vec![
                ConfigError::EmptyRulesPath,
                ConfigError::EmptyDbPath,
                ConfigError::ZeroSaveInterval,
            ]
        );
    }

    #[tokio::test]
    async fn test_load_missing_file() {
        let err = SorterConfig::load(Path::new("/no/such/config.json"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[tokio::test]
    async fn test_load_rejects_invalid() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        tokio::fs::write(&path, r#"{ "rules_path": "r.json", "cache_save_interval": 0 }"#)
            .await
            .unwrap();

        let err = SorterConfig::load(&path).await.unwrap_err();
        assert!(err.to_string().contains("cache_save_interval"));
    }

    #[tokio::test]
    async fn test_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        let mut config = SorterConfig::new("rules.json");
        config.cache_save_interval = 25;
        tokio::fs::write(&path, serde_json::to_string(&config).unwrap())
            .await
            .unwrap();

        assert_eq!(SorterConfig::load(&path).await.unwrap(), config);
    }
}
