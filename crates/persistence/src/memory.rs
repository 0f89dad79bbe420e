use garden_core::SaveRecord;
use std::cell::{Cell, RefCell};

use crate::{PersistenceError, SaveStore};

/// Keeps the last saved record as a JSON document so callers never share
/// state with the store.
///
/// The store can be switched offline to emulate an unavailable medium.
#[derive(Debug)]
pub struct MemoryStore {
    data: RefCell<Option<String>>,
    available: Cell<bool>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self {
            data: RefCell::new(None),
            available: Cell::new(true),
        }
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_available(&self, available: bool) {
        self.available.set(available);
    }

    fn ensure_available(&self) -> Result<(), PersistenceError> {
        if self.available.get() {
            Ok(())
        } else {
            Err(PersistenceError::Unavailable("memory store offline".into()))
        }
    }
}

impl SaveStore for MemoryStore {
    fn save(&self, record: &SaveRecord) -> Result<(), PersistenceError> {
        self.ensure_available()?;
        let json = serde_json::to_string(record)?;
        *self.data.borrow_mut() = Some(json);
        Ok(())
    }

    fn load(&self) -> Result<Option<SaveRecord>, PersistenceError> {
        self.ensure_available()?;
        match self.data.borrow().as_deref() {
            Some(json) => Ok(Some(serde_json::from_str(json)?)),
            None => Ok(None),
        }
    }

    fn clear(&self) -> Result<(), PersistenceError> {
        self.ensure_available()?;
        *self.data.borrow_mut() = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::sample_record;

    #[test]
    fn empty_store_loads_none() {
        assert!(MemoryStore::new().load().unwrap().is_none());
    }

    #[test]
    fn save_load_clear() {
        let store = MemoryStore::new();
        let rec = sample_record(42.0);
        store.save(&rec).unwrap();
        assert_eq!(store.load().unwrap(), Some(rec));
        store.clear().unwrap();
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn loaded_copy_is_detached() {
        let store = MemoryStore::new();
        store.save(&sample_record(1.0)).unwrap();
        let mut first = store.load().unwrap().unwrap();
        first.currency = 999.0;
        assert_eq!(store.load().unwrap().unwrap().currency, 1.0);
    }

    #[test]
    fn offline_store_fails_every_operation() {
        let store = MemoryStore::new();
        store.set_available(false);
        assert!(matches!(
            store.save(&sample_record(1.0)),
            Err(PersistenceError::Unavailable(_))
        ));
        assert!(store.load().is_err());
        assert!(store.clear().is_err());
        store.set_available(true);
        assert!(store.load().unwrap().is_none());
    }
}
