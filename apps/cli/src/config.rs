//! CLI configuration loaded from YAML.

use garden_core::{Catalog, GameConfig};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Session settings for the headless client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    /// Save file used by the primary storage tier.
    pub save_path: PathBuf,
    /// Wall-clock period of the tick driver.
    pub tick_interval_ms: u64,
    /// Delay before the single retry of a failed forced save.
    pub retry_delay_ms: u64,
    /// YAML catalog replacing the built-in content.
    pub catalog_path: Option<PathBuf>,
    pub game: GameConfig,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            save_path: PathBuf::from("./saves/garden.json"),
            tick_interval_ms: 1_000,
            retry_delay_ms: 3_000,
            catalog_path: None,
            game: GameConfig::default(),
        }
    }
}

fn read(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })
}

impl CliConfig {
    /// Parse configuration from a YAML string.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let cfg: Self = serde_yaml::from_str(yaml)?;
        if cfg.tick_interval_ms == 0 {
            return Err(ConfigError::Invalid("tick_interval_ms must be > 0".into()));
        }
        Ok(cfg)
    }

    /// Load from `path`, or use defaults when no path is given.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(p) => Self::parse(&read(p)?),
            None => Ok(Self::default()),
        }
    }

    /// The catalog named by `catalog_path`, or the built-in one.
    pub fn catalog(&self) -> Result<Catalog, ConfigError> {
        match &self.catalog_path {
            Some(p) => Ok(serde_yaml::from_str(&read(p)?)?),
            None => Ok(Catalog::builtin()),
        }
    }
}
