//! Configuration management for `ScenicQA`
//!
//! Handles loading configuration from files, environment variables,
//! and provides validation for all configuration settings.

use crate::ScenicQaError;
use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Root configuration structure for `ScenicQA`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenicQaConfig {
    /// Attraction database settings
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Search limits and defaults
    #[serde(default)]
    pub search: SearchConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Alias -> canonical attraction name, applied when a question is not understood
    #[serde(default)]
    pub aliases: BTreeMap<String, String>,
}

/// Attraction database settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Path of the SQLite database file
    #[serde(default = "default_database_path")]
    pub path: String,
    /// How long a query waits on a locked database, in milliseconds
    #[serde(default = "default_busy_timeout")]
    pub busy_timeout_ms: u64,
}

/// Search limits and defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Radius used when a nearby question names none
    #[serde(default = "default_radius")]
    pub default_radius_km: f64,
    /// Larger radii are capped to this value
    #[serde(default = "default_max_radius")]
    pub max_radius_km: f64,
    /// Maximum rows for a nearby question
    #[serde(default = "default_nearby_limit")]
    pub nearby_limit: usize,
    /// Maximum rows for a "similar attractions nearby" question
    #[serde(default = "default_similar_limit")]
    pub similar_limit: usize,
    /// Maximum rows for city listings and compound filters
    #[serde(default = "default_city_limit")]
    pub city_limit: usize,
}

/// Logging configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log format (pretty or json)
    #[serde(default = "default_log_format")]
    pub format: String,
}

// Default value functions
fn default_database_path() -> String {
    "scenic_spots.db".to_string()
}

fn default_busy_timeout() -> u64 {
    2000
}

fn default_radius() -> f64 {
    5.0
}

fn default_max_radius() -> f64 {
    50.0
}

fn default_nearby_limit() -> usize {
    10
}

fn default_similar_limit() -> usize {
    5
}

fn default_city_limit() -> usize {
    5
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_database_path(),
            busy_timeout_ms: default_busy_timeout(),
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            default_radius_km: default_radius(),
            max_radius_km: default_max_radius(),
            nearby_limit: default_nearby_limit(),
            similar_limit: default_similar_limit(),
            city_limit: default_city_limit(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Default for ScenicQaConfig {
    fn default() -> Self {
        Self {
            database: DatabaseConfig::default(),
            search: SearchConfig::default(),
            logging: LoggingConfig::default(),
            aliases: BTreeMap::new(),
        }
    }
}

impl ScenicQaConfig {
    /// Load configuration from specified path
    pub fn load_from_path(config_path: Option<PathBuf>) -> Result<Self> {
        let mut builder = Config::builder();

        // Load from file if path is provided or use default location
        let config_file = config_path.unwrap_or_else(|| {
            Self::get_config_path().unwrap_or_else(|| PathBuf::from("config.toml"))
        });

        if config_file.exists() {
            builder = builder.add_source(
                File::from(config_file.clone())
                    .required(false)
                    .format(config::FileFormat::Toml),
            );
        }

        // Environment overrides, e.g. SCENICQA_DATABASE__PATH
        builder = builder.add_source(
            Environment::with_prefix("SCENICQA")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .with_context(|| "Failed to build configuration")?;

        let mut config: ScenicQaConfig = settings
            .try_deserialize()
            .with_context(|| "Failed to deserialize configuration")?;

        config.apply_defaults();
        config.validate()?;

        Ok(config)
    }

    /// Get the default configuration file path
    #[must_use]
    pub fn get_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("scenic-qa").join("config.toml"))
    }

    /// Apply default values to missing configuration fields
    pub fn apply_defaults(&mut self) {
        if self.database.path.is_empty() {
            self.database.path = default_database_path();
        }
        if self.database.busy_timeout_ms == 0 {
            self.database.busy_timeout_ms = default_busy_timeout();
        }
        if self.search.default_radius_km <= 0.0 {
            self.search.default_radius_km = default_radius();
        }
        if self.search.max_radius_km <= 0.0 {
            self.search.max_radius_km = default_max_radius();
        }
        if self.search.nearby_limit == 0 {
            self.search.nearby_limit = default_nearby_limit();
        }
        if self.search.similar_limit == 0 {
            self.search.similar_limit = default_similar_limit();
        }
        if self.search.city_limit == 0 {
            self.search.city_limit = default_city_limit();
        }
        if self.logging.level.is_empty() {
            self.logging.level = default_log_level();
        }
        if self.logging.format.is_empty() {
            self.logging.format = default_log_format();
        }
    }

    /// Validate all configuration settings
    pub fn validate(&self) -> Result<()> {
        self.validate_numeric_ranges()?;
        self.validate_string_values()?;
        Ok(())
    }

    /// Validate numeric configuration ranges
    fn validate_numeric_ranges(&self) -> Result<()> {
        if self.database.busy_timeout_ms > 60_000 {
            return Err(ScenicQaError::config(
                "Database busy timeout cannot exceed 60000 ms"
            ).into());
        }

        if self.search.max_radius_km > 500.0 {
            return Err(ScenicQaError::config(
                "Maximum search radius cannot exceed 500 km"
            ).into());
        }

        if self.search.default_radius_km > self.search.max_radius_km {
            return Err(ScenicQaError::config(
                "Default search radius cannot exceed the maximum search radius"
            ).into());
        }

        let limits = [
            ("nearby_limit", self.search.nearby_limit),
            ("similar_limit", self.search.similar_limit),
            ("city_limit", self.search.city_limit),
        ];
        for (name, value) in limits {
            if value > 100 {
                return Err(ScenicQaError::config(format!(
                    "Search {name} cannot exceed 100"
                )).into());
            }
        }

        Ok(())
    }

    /// Validate string configuration values
    fn validate_string_values(&self) -> Result<()> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.logging.level.as_str()) {
            return Err(ScenicQaError::config(
                format!("Invalid log level '{}'. Must be one of: {}",
                    self.logging.level,
                    valid_log_levels.join(", ")
                )
            ).into());
        }

        let valid_log_formats = ["pretty", "json"];
        if !valid_log_formats.contains(&self.logging.format.as_str()) {
            return Err(ScenicQaError::config(
                format!("Invalid log format '{}'. Must be one of: {}",
                    self.logging.format,
                    valid_log_formats.join(", ")
                )
            ).into());
        }

        if let Some((alias, _)) = self
            .aliases
            .iter()
            .find(|(alias, canonical)| alias.trim().is_empty() || canonical.trim().is_empty())
        {
            return Err(ScenicQaError::config(
                format!("Alias entry '{alias}' must map a non-empty alias to a non-empty name")
            ).into());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = ScenicQaConfig::default();
        assert_eq!(config.database.path, "scenic_spots.db");
        assert_eq!(config.search.default_radius_km, 5.0);
        assert_eq!(config.search.max_radius_km, 50.0);
        assert_eq!(config.search.nearby_limit, 10);
        assert_eq!(config.search.similar_limit, 5);
        assert_eq!(config.search.city_limit, 5);
        assert_eq!(config.logging.level, "info");
        assert!(config.aliases.is_empty());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation_invalid_log_level() {
        let mut config = ScenicQaConfig::default();
        config.logging.level = "invalid".to_string();
        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("Invalid log level"));
    }

    #[test]
    fn test_config_validation_numeric_ranges() {
        let mut config = ScenicQaConfig::default();
        config.search.max_radius_km = 1000.0;
        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("radius cannot exceed"));
    }

    #[test]
    fn test_config_validation_default_above_max() {
        let mut config = ScenicQaConfig::default();
        config.search.default_radius_km = 80.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_empty_alias() {
        let mut config = ScenicQaConfig::default();
        config.aliases.insert("故宫".to_string(), " ".to_string());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_apply_defaults_fills_zeroes() {
        let mut config = ScenicQaConfig::default();
        config.search.nearby_limit = 0;
        config.search.default_radius_km = 0.0;
        config.logging.format = String::new();
        config.apply_defaults();
        assert_eq!(config.search.nearby_limit, 10);
        assert_eq!(config.search.default_radius_km, 5.0);
        assert_eq!(config.logging.format, "pretty");
    }

    #[test]
    fn test_load_from_toml_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(
            file,
            "[database]\npath = \"/tmp/spots.db\"\n\n[search]\ncity_limit = 8\n\n[aliases]\n\"故宫\" = \"故宫博物院\""
        )
        .unwrap();

        let config = ScenicQaConfig::load_from_path(Some(path)).unwrap();
        assert_eq!(config.database.path, "/tmp/spots.db");
        assert_eq!(config.search.city_limit, 8);
        assert_eq!(config.search.nearby_limit, 10);
        assert_eq!(config.aliases.get("故宫").map(String::as_str), Some("故宫博物院"));
    }

    #[test]
    fn test_config_path_generation() {
        if let Some(path) = ScenicQaConfig::get_config_path() {
            assert!(path.to_string_lossy().contains("scenic-qa"));
            assert!(path.to_string_lossy().contains("config.toml"));
        }
    }
}
