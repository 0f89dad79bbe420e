#![deny(warnings)]

//! Persistence layer: the save-store port and its implementations.
//!
//! - [`SaveStore`]: save/load/clear contract consumed by the engine.
//! - [`MemoryStore`]: in-process store holding a detached JSON copy.
//! - [`FileStore`]: one JSON document on disk, replaced atomically.
//! - [`ResilientStore`]: primary + fallback chain that degrades gracefully.

use garden_core::SaveRecord;
use std::rc::Rc;
use thiserror::Error;

mod file;
mod memory;
mod resilient;

pub use file::FileStore;
pub use memory::MemoryStore;
pub use resilient::ResilientStore;

/// Errors raised by a storage medium.
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("storage i/o failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("save record codec failed: {0}")]
    Codec(#[from] serde_json::Error),
    #[error("storage unavailable: {0}")]
    Unavailable(String),
    /// Both tiers of a resilient chain failed.
    #[error("all storage tiers failed (primary: {primary}; fallback: {fallback})")]
    AllTiersFailed {
        primary: Box<PersistenceError>,
        fallback: Box<PersistenceError>,
    },
    /// The fallback tier failed to clear; the primary outcome is not reported.
    #[error("fallback clear failed: {0}")]
    ClearFailed(Box<PersistenceError>),
}

/// Storage port for save records.
///
/// `load` returns `Ok(None)` when the medium is healthy but holds no save.
pub trait SaveStore {
    fn save(&self, record: &SaveRecord) -> Result<(), PersistenceError>;
    fn load(&self) -> Result<Option<SaveRecord>, PersistenceError>;
    fn clear(&self) -> Result<(), PersistenceError>;
}

impl<S: SaveStore + ?Sized> SaveStore for Rc<S> {
    fn save(&self, record: &SaveRecord) -> Result<(), PersistenceError> {
        (**self).save(record)
    }
    fn load(&self) -> Result<Option<SaveRecord>, PersistenceError> {
        (**self).load()
    }
    fn clear(&self) -> Result<(), PersistenceError> {
        (**self).clear()
    }
}

/// The production chain: a save file backed by an in-memory fallback.
pub fn default_store(path: impl Into<std::path::PathBuf>) -> ResilientStore<FileStore, MemoryStore> {
    ResilientStore::new(FileStore::new(path), MemoryStore::new())
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use garden_core::{EntityRecord, InstanceId, ProducerId, UpgradeId};

    pub fn sample_record(currency: f64) -> SaveRecord {
        SaveRecord {
            currency,
            level: 2,
            capacity: Some(8),
            entities: vec![EntityRecord {
                instance_id: InstanceId::from("a1b2"),
                level: 3,
                template_id: ProducerId::from("p1"),
                invested_value: Some(25.0),
            }],
            purchased_upgrade_ids: vec![UpgradeId::from("u1")],
            purchased_capacity_upgrade_ids: vec![],
            unlocked_achievement_ids: vec![],
        }
    }

    /// A medium that is always down.
    pub struct BrokenStore;

    impl SaveStore for BrokenStore {
        fn save(&self, _record: &SaveRecord) -> Result<(), PersistenceError> {
            Err(PersistenceError::Unavailable("broken".into()))
        }
        fn load(&self) -> Result<Option<SaveRecord>, PersistenceError> {
            Err(PersistenceError::Unavailable("broken".into()))
        }
        fn clear(&self) -> Result<(), PersistenceError> {
            Err(PersistenceError::Unavailable("broken".into()))
        }
    }
}
