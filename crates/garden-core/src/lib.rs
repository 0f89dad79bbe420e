#![deny(warnings)]

//! Core domain models and invariants for Idle Garden.
//!
//! This crate defines the serializable types shared across the workspace:
//! growable producers, the garden that owns them, the static content catalog
//! and the persisted save record, together with validation helpers that
//! guard the catalog's invariants.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

pub mod catalog;
pub mod entity;
pub mod garden;
pub mod record;

pub use catalog::{
    validate_catalog, AchievementCondition, AchievementTemplate, Biome, CapacityUpgradeTemplate,
    Catalog, ProducerTemplate, Progress, UpgradeTemplate,
};
pub use entity::{GrowableEntity, GrowthCurve};
pub use garden::Garden;
pub use record::{EntityRecord, SaveRecord};

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            /// Borrow the raw identifier.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.pad(&self.0)
            }
        }
    };
}

string_id!(
    /// Unique identifier of one owned producer instance.
    InstanceId
);
string_id!(
    /// Catalog identifier of a producer template, e.g. "p1".
    ProducerId
);
string_id!(
    /// Catalog identifier of a global multiplier upgrade, e.g. "u1".
    UpgradeId
);
string_id!(
    /// Catalog identifier of a capacity upgrade, e.g. "g1".
    CapacityUpgradeId
);
string_id!(
    /// Catalog identifier of an achievement, e.g. "a1".
    AchievementId
);

/// Session configuration parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Currency granted to a fresh save.
    pub starting_currency: f64,
    /// Garden capacity before any capacity upgrade.
    pub default_capacity: u32,
    /// Hard cap on owned instances sharing one producer template.
    pub per_type_limit: usize,
    /// Seed for the instance id generator.
    pub rng_seed: u64,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            starting_currency: 50.0,
            default_capacity: 6,
            per_type_limit: 5,
            rng_seed: 42,
        }
    }
}

/// Validation errors for catalog and configuration invariants.
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    /// Two catalog entries share an identifier.
    #[error("duplicate catalog id: {0}")]
    DuplicateId(String),
    /// Numeric field must be finite.
    #[error("non-finite numeric value in {0}")]
    NonFinite(String),
    /// Price or cost must be strictly positive.
    #[error("non-positive cost for {0}")]
    NonPositiveCost(String),
    /// Yields must be strictly positive.
    #[error("non-positive base yield for {0}")]
    NonPositiveYield(String),
    /// Multipliers must be strictly positive.
    #[error("non-positive multiplier for {0}")]
    NonPositiveMultiplier(String),
    /// Capacity upgrades must add at least one slot.
    #[error("capacity upgrade {0} adds no capacity")]
    ZeroCapacityIncrease(String),
    /// Unlock levels start at 1.
    #[error("producer {0} has unlock level 0")]
    ZeroUnlockLevel(String),
    /// Configuration values out of range.
    #[error("invalid config: {0}")]
    InvalidConfig(String),
}

/// Validate session configuration.
pub fn validate_config(cfg: &GameConfig) -> Result<(), ValidationError> {
    if !cfg.starting_currency.is_finite() || cfg.starting_currency < 0.0 {
        return Err(ValidationError::InvalidConfig(
            "starting_currency must be finite and >= 0".into(),
        ));
    }
    if cfg.default_capacity == 0 {
        return Err(ValidationError::InvalidConfig(
            "default_capacity must be >= 1".into(),
        ));
    }
    if cfg.per_type_limit == 0 {
        return Err(ValidationError::InvalidConfig(
            "per_type_limit must be >= 1".into(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let cfg = GameConfig::default();
        assert_eq!(cfg.default_capacity, 6);
        assert_eq!(cfg.per_type_limit, 5);
        assert_eq!(cfg.starting_currency, 50.0);
        validate_config(&cfg).unwrap();
    }

    #[test]
    fn rejects_zero_capacity() {
        let cfg = GameConfig {
            default_capacity: 0,
            ..GameConfig::default()
        };
        assert!(matches!(
            validate_config(&cfg),
            Err(ValidationError::InvalidConfig(_))
        ));
    }

    #[test]
    fn ids_serialize_transparently() {
        let id = ProducerId::from("p1");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"p1\"");
        assert_eq!(id.to_string(), "p1");
    }

    #[test]
    fn partial_config_fills_defaults() {
        let cfg: GameConfig = serde_json::from_str(r#"{"starting_currency": 500.0}"#).unwrap();
        assert_eq!(cfg.starting_currency, 500.0);
        assert_eq!(cfg.default_capacity, 6);
    }
}
