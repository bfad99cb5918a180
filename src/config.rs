//! # Configuration Management Module
//!
//! ## Purpose
//! Centralized configuration for the jurisdiction graph core: default region,
//! seed data location, traversal bounds, source-detection mappings, and
//! logging settings, loaded from TOML with environment overrides.
//!
//! ## Input/Output Specification
//! - **Input**: Configuration files (TOML), environment variables
//! - **Output**: Validated configuration structs with defaults and overrides
//! - **Validation**: Range checks and required-field verification
//!
//! ## Configuration Sources (in order of precedence)
//! 1. Environment variables (highest priority)
//! 2. Configuration files
//! 3. Default values (lowest priority)
//!
//! ## Usage
//! ```rust,no_run
//! use jurisdiction_search::config::Config;
//!
//! let config = Config::from_file("config.toml").unwrap();
//! println!("Default region: {}", config.general.default_region);
//! ```

use crate::errors::{JurisdictionError, Result};
use crate::resolver::DEFAULT_MAX_DEPTH;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// General settings
    pub general: GeneralConfig,
    /// Region graph settings
    pub graph: GraphConfig,
    /// Document source detection settings
    pub detection: DetectionConfig,
    /// Logging settings
    pub logging: LoggingConfig,
}

/// General settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Fallback region for documents whose jurisdiction cannot be detected
    pub default_region: String,
}

/// Region graph settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphConfig {
    /// JSON seed file with regions and relationships
    pub seed_path: PathBuf,
    /// Defensive traversal bound for hierarchy resolution
    pub max_depth: usize,
}

/// Mapping rules for detecting a document's home region from its source
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionConfig {
    /// Statute sources mapped to a single-state jurisdiction
    pub statute_sources: BTreeMap<String, String>,
    /// Sources treated as case law (court-code based detection)
    pub case_law_sources: Vec<String>,
    /// Court-code substrings mapped to a state region (lowercase keys)
    pub court_state_codes: BTreeMap<String, String>,
    /// Sources treated as municipal/ordinance collections
    pub municipal_sources: Vec<String>,
}

/// Logging settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
    /// Enable structured JSON logging
    pub json_format: bool,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            default_region: "GA".to_string(),
        }
    }
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            seed_path: PathBuf::from("./data/georgia_regions.json"),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl Default for DetectionConfig {
    fn default() -> Self {
        let mut statute_sources = BTreeMap::new();
        statute_sources.insert("GA_CODE".to_string(), "GA".to_string());

        let mut court_state_codes = BTreeMap::new();
        court_state_codes.insert("ga".to_string(), "GA".to_string());

        Self {
            statute_sources,
            case_law_sources: vec!["COURTLISTENER".to_string()],
            court_state_codes,
            municipal_sources: vec!["MUNICODE".to_string()],
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json_format: false,
        }
    }
}

impl Config {
    /// Load configuration from the default location
    pub fn load() -> Result<Self> {
        Self::from_file("config.toml")
    }

    /// Load configuration from a specific file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            tracing::warn!("configuration file not found: {:?}, using defaults", path);
            let mut config = Self::default();
            config.apply_env_overrides()?;
            config.validate()?;
            return Ok(config);
        }

        let content = std::fs::read_to_string(path).map_err(|e| JurisdictionError::Config {
            message: format!("failed to read config file {:?}: {}", path, e),
        })?;

        let mut config: Config = toml::from_str(&content).map_err(|e| JurisdictionError::Config {
            message: format!("failed to parse config file {:?}: {}", path, e),
        })?;

        config.apply_env_overrides()?;
        config.validate()?;

        Ok(config)
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(region) = std::env::var("JURISDICTION_DEFAULT_REGION") {
            self.general.default_region = region;
        }
        if let Ok(seed_path) = std::env::var("JURISDICTION_SEED_PATH") {
            self.graph.seed_path = PathBuf::from(seed_path);
        }
        if let Ok(max_depth) = std::env::var("JURISDICTION_MAX_DEPTH") {
            self.graph.max_depth = max_depth.parse().map_err(|_| JurisdictionError::Config {
                message: "invalid value in JURISDICTION_MAX_DEPTH".to_string(),
            })?;
        }
        if let Ok(level) = std::env::var("JURISDICTION_LOG_LEVEL") {
            self.logging.level = level;
        }
        Ok(())
    }

    /// Validate configuration values
    fn validate(&self) -> Result<()> {
        if self.general.default_region.trim().is_empty() {
            return Err(JurisdictionError::Validation {
                field: "general.default_region".to_string(),
                reason: "default region cannot be empty".to_string(),
            });
        }

        if self.graph.max_depth == 0 {
            return Err(JurisdictionError::Validation {
                field: "graph.max_depth".to_string(),
                reason: "traversal depth bound must be greater than zero".to_string(),
            });
        }

        for key in self.detection.court_state_codes.keys() {
            if key.chars().any(|c| c.is_ascii_uppercase()) {
                return Err(JurisdictionError::Validation {
                    field: "detection.court_state_codes".to_string(),
                    reason: format!("court code '{}' must be lowercase", key),
                });
            }
        }

        Ok(())
    }

    /// Get configuration as TOML string
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| JurisdictionError::Config {
            message: format!("failed to serialize config to TOML: {}", e),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.general.default_region, "GA");
        assert_eq!(config.graph.max_depth, DEFAULT_MAX_DEPTH);
        assert_eq!(
            config.detection.statute_sources.get("GA_CODE").unwrap(),
            "GA"
        );
        config.validate().unwrap();
    }

    #[test]
    fn test_round_trip_through_toml() {
        let config = Config::default();
        let toml_str = config.to_toml().unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.general.default_region, config.general.default_region);
        assert_eq!(parsed.graph.max_depth, config.graph.max_depth);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[general]\ndefault_region = \"US\"\n\n[graph]\nmax_depth = 6"
        )
        .unwrap();

        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.general.default_region, "US");
        assert_eq!(config.graph.max_depth, 6);
        // Unspecified sections keep their defaults
        assert!(!config.detection.municipal_sources.is_empty());
    }

    #[test]
    fn test_zero_max_depth_rejected() {
        let mut config = Config::default();
        config.graph.max_depth = 0;
        let err = config.validate().unwrap_err();
        assert!(matches!(err, JurisdictionError::Validation { .. }));
    }

    #[test]
    fn test_uppercase_court_code_rejected() {
        let mut config = Config::default();
        config
            .detection
            .court_state_codes
            .insert("GA".to_string(), "GA".to_string());
        let err = config.validate().unwrap_err();
        assert!(matches!(err, JurisdictionError::Validation { .. }));
    }
}
