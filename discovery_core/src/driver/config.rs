//! Driver configuration.

use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use crate::oracle::{DEFAULT_ORACLE_URL, DEFAULT_REQUEST_DELAY};
use crate::snapshot::DEFAULT_SNAPSHOT_PATH;

/// Errors raised while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// A base item the run starts from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedItem {
    pub name: String,
    #[serde(rename = "emoji")]
    pub glyph: String,
}

impl SeedItem {
    pub fn new(name: impl Into<String>, glyph: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            glyph: glyph.into(),
        }
    }
}

/// Everything a discovery run needs to know up front.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscoveryConfig {
    pub seed_items: Vec<SeedItem>,

    /// Number of expansion + resolution + snapshot rounds.
    pub round_count: u32,

    /// Pause before every oracle call and between resolution passes.
    pub inter_call_delay_ms: u64,

    pub snapshot_path: PathBuf,

    pub oracle_url: String,

    /// Continue from the snapshot at `snapshot_path` when one exists.
    pub resume: bool,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            seed_items: vec![
                SeedItem::new("Earth", "🌎"),
                SeedItem::new("Water", "💧"),
                SeedItem::new("Fire", "🔥"),
                SeedItem::new("Wind", "🌬️"),
            ],
            round_count: 3,
            inter_call_delay_ms: DEFAULT_REQUEST_DELAY.as_millis() as u64,
            snapshot_path: PathBuf::from(DEFAULT_SNAPSHOT_PATH),
            oracle_url: DEFAULT_ORACLE_URL.to_string(),
            resume: false,
        }
    }
}

impl DiscoveryConfig {
    /// Parse a TOML document. Missing keys take their defaults.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and parse a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let source = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&source)
    }

    pub fn inter_call_delay(&self) -> Duration {
        Duration::from_millis(self.inter_call_delay_ms)
    }

    /// Check that the seed set is usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.seed_items.is_empty() {
            return Err(ConfigError::Invalid("at least one seed item is required".into()));
        }
        if let Some(seed) = self.seed_items.iter().find(|s| s.name.trim().is_empty()) {
            return Err(ConfigError::Invalid(format!(
                "seed item with glyph {:?} has an empty name",
                seed.glyph
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = DiscoveryConfig::default();
        assert_eq!(config.round_count, 3);
        assert_eq!(config.inter_call_delay(), Duration::from_millis(500));
        assert_eq!(config.seed_items.len(), 4);
        assert_eq!(config.seed_items[0], SeedItem::new("Earth", "🌎"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = DiscoveryConfig::from_toml_str(
            r#"
            round_count = 5
            inter_call_delay_ms = 0
            "#,
        )
        .unwrap();

        assert_eq!(config.round_count, 5);
        assert_eq!(config.inter_call_delay(), Duration::ZERO);
        assert_eq!(config.seed_items, DiscoveryConfig::default().seed_items);
        assert_eq!(config.oracle_url, DEFAULT_ORACLE_URL);
    }

    #[test]
    fn test_custom_seeds() {
        let config = DiscoveryConfig::from_toml_str(
            r#"
            snapshot_path = "out/data.json"
            resume = true

            [[seed_items]]
            name = "Salt"
            emoji = "🧂"

            [[seed_items]]
            name = "Pepper"
            emoji = "🌶️"
            "#,
        )
        .unwrap();

        assert_eq!(
            config.seed_items,
            vec![SeedItem::new("Salt", "🧂"), SeedItem::new("Pepper", "🌶️")]
        );
        assert_eq!(config.snapshot_path, PathBuf::from("out/data.json"));
        assert!(config.resume);
    }

    #[test]
    fn test_empty_seed_list_is_invalid() {
        let err = DiscoveryConfig::from_toml_str("seed_items = []").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_malformed_toml() {
        let err = DiscoveryConfig::from_toml_str("round_count = \"three\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_load_missing_file() {
        let err = DiscoveryConfig::load("/nonexistent/discovery.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
