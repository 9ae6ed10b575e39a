//! DSNF Configuration Management
//!
//! Handles configuration from environment variables and TOML files, with
//! defaults matching the LTP tagset and the maritime domain vocabulary.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// LTP (863) part-of-speech tagset
pub const LTP_TAGSET: &[&str] = &[
    "a", "b", "c", "d", "e", "g", "h", "i", "j", "k", "m", "n", "nd", "nh", "ni", "nl", "ns",
    "nt", "nz", "o", "p", "q", "r", "u", "v", "wp", "ws", "x", "z",
];

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// Entity detection
    pub entity: EntityConfig,

    /// Entity pairing
    pub pairing: PairingConfig,

    /// Triple output
    pub output: OutputConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();

        // Entity detection
        if let Ok(tags) = std::env::var("DSNF_ENTITY_POSTAGS") {
            config.entity.entity_postags = split_list(&tags);
        }
        if let Ok(words) = std::env::var("DSNF_VOCABULARY") {
            config.entity.vocabulary = split_list(&words);
        }

        // Pairing
        if let Ok(max) = std::env::var("DSNF_MAX_ENTITIES_BETWEEN") {
            config.pairing.max_entities_between =
                max.parse().map_err(|_| ConfigError::InvalidValue {
                    key: "DSNF_MAX_ENTITIES_BETWEEN".to_string(),
                    value: max,
                })?;
        }

        // Output
        if let Ok(path) = std::env::var("DSNF_OUTPUT_PATH") {
            config.output.path = Some(PathBuf::from(path));
        }

        // Logging
        if let Ok(level) = std::env::var("LOG_LEVEL") {
            config.logging.level = level;
        }
        if let Ok(json) = std::env::var("LOG_JSON") {
            config.logging.json_format = matches!(json.as_str(), "1" | "true" | "yes");
        }

        Ok(config)
    }

    /// Load from a TOML file
    pub fn from_file(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let path = path.into();
        let content = std::fs::read_to_string(&path).map_err(|e| ConfigError::FileReadError {
            path: path.clone(),
            source: e,
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path,
            message: e.to_string(),
        })
    }

    /// Merge with environment variables (env takes precedence)
    pub fn with_env_override(mut self) -> Result<Self, ConfigError> {
        let env_config = Self::from_env()?;

        // Only override if env values differ from defaults
        if env_config.entity.entity_postags != EntityConfig::default().entity_postags {
            self.entity.entity_postags = env_config.entity.entity_postags;
        }
        if env_config.entity.vocabulary != EntityConfig::default().vocabulary {
            self.entity.vocabulary = env_config.entity.vocabulary;
        }
        if env_config.pairing.max_entities_between
            != PairingConfig::default().max_entities_between
        {
            self.pairing.max_entities_between = env_config.pairing.max_entities_between;
        }
        if env_config.output.path.is_some() {
            self.output.path = env_config.output.path;
        }
        if env_config.logging.level != LoggingConfig::default().level {
            self.logging.level = env_config.logging.level;
        }
        if env_config.logging.json_format {
            self.logging.json_format = true;
        }

        Ok(self)
    }

    /// Check the configuration once, before any sentence is processed
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.entity.validate()?;

        const LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];
        if !LEVELS.contains(&self.logging.level.to_lowercase().as_str()) {
            return Err(ConfigError::InvalidValue {
                key: "logging.level".to_string(),
                value: self.logging.level.clone(),
            });
        }

        Ok(())
    }
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Entity detection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EntityConfig {
    /// Postags that mark a word as an entity candidate
    pub entity_postags: Vec<String>,

    /// Domain class nouns that are entities regardless of postag
    pub vocabulary: Vec<String>,

    /// Postags treated as noun-like by the compound-noun rules
    pub noun_postags: Vec<String>,

    /// Full tagset the tagger is expected to emit
    pub tagset: Vec<String>,
}

impl Default for EntityConfig {
    fn default() -> Self {
        Self {
            // nh: person, ni: organization, ns: place, nz: other proper noun, j: abbreviation
            entity_postags: ["nh", "ni", "ns", "nz", "j"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            vocabulary: [
                "机动船",
                "帆船",
                "船舶",
                "船筏",
                "水上飞机",
                "航空器",
                "在航",
                "能见度",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            noun_postags: ["n", "i", "j", "ni", "nh", "nl", "ns", "nz", "ws"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            tagset: LTP_TAGSET.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl EntityConfig {
    /// Every entity and noun postag must belong to the tagset schema
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.entity_postags.is_empty() && self.vocabulary.is_empty() {
            return Err(ConfigError::MissingRequired(
                "entity.entity_postags or entity.vocabulary".to_string(),
            ));
        }

        for tag in self.entity_postags.iter().chain(&self.noun_postags) {
            if !self.tagset.contains(tag) {
                return Err(ConfigError::UnknownTag(tag.clone()));
            }
        }

        Ok(())
    }
}

/// Entity pairing configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PairingConfig {
    /// Maximum number of entity words allowed strictly between a pair
    pub max_entities_between: usize,
}

impl Default for PairingConfig {
    fn default() -> Self {
        Self {
            max_entities_between: 4,
        }
    }
}

/// Triple output configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct OutputConfig {
    /// JSON Lines file triples are appended to (stdout when unset)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// JSON format for logs
    pub json_format: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json_format: false,
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    FileReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {message}")]
    ParseError { path: PathBuf, message: String },

    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },

    #[error("Postag {0} is not part of the configured tagset")]
    UnknownTag(String),

    #[error("Missing required configuration: {0}")]
    MissingRequired(String),
}
