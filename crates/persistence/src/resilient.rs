use garden_core::SaveRecord;
use tracing::{error, warn};

use crate::{PersistenceError, SaveStore};

/// Chains a primary and a fallback store.
///
/// - `save` and `load` fail only when both tiers fail. A primary `load` that
///   succeeds with no data is final: only a primary error consults the
///   fallback.
/// - `clear` always runs on both tiers and fails only when the fallback does.
#[derive(Debug)]
pub struct ResilientStore<P, F> {
    primary: P,
    fallback: F,
}

impl<P: SaveStore, F: SaveStore> ResilientStore<P, F> {
    pub fn new(primary: P, fallback: F) -> Self {
        Self { primary, fallback }
    }

    pub fn primary(&self) -> &P {
        &self.primary
    }

    pub fn fallback(&self) -> &F {
        &self.fallback
    }
}

impl<P: SaveStore, F: SaveStore> SaveStore for ResilientStore<P, F> {
    fn save(&self, record: &SaveRecord) -> Result<(), PersistenceError> {
        let primary = match self.primary.save(record) {
            Ok(()) => return Ok(()),
            Err(e) => e,
        };
        warn!(error = %primary, "primary save failed, using fallback");
        self.fallback.save(record).map_err(|fallback| {
            error!(error = %fallback, "fallback save failed");
            PersistenceError::AllTiersFailed {
                primary: Box::new(primary),
                fallback: Box::new(fallback),
            }
        })
    }

    fn load(&self) -> Result<Option<SaveRecord>, PersistenceError> {
        let primary = match self.primary.load() {
            Ok(found) => return Ok(found),
            Err(e) => e,
        };
        warn!(error = %primary, "primary load failed, using fallback");
        self.fallback.load().map_err(|fallback| {
            error!(error = %fallback, "fallback load failed");
            PersistenceError::AllTiersFailed {
                primary: Box::new(primary),
                fallback: Box::new(fallback),
            }
        })
    }

    fn clear(&self) -> Result<(), PersistenceError> {
        if let Err(e) = self.primary.clear() {
            warn!(error = %e, "primary clear failed, clearing fallback");
        }
        self.fallback.clear().map_err(|e| {
            error!(error = %e, "fallback clear failed");
            PersistenceError::ClearFailed(Box::new(e))
        })
    }
}
