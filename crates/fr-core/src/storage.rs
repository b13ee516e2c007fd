//! In-process `StateStorage`, the stand-in for a browser's local storage slot.
//! Clones share the same slot, so a test can keep a handle while the store
//! owns another.

use std::sync::{Arc, Mutex};

use crate::error::Result;
use crate::traits::{lock_poisoned, StateStorage};

#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    slot: Arc<Mutex<Option<String>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts with a previously saved document (valid or not).
    pub fn with_contents(contents: impl Into<String>) -> Self {
        Self {
            slot: Arc::new(Mutex::new(Some(contents.into()))),
        }
    }

    /// The document currently held, if any.
    pub fn contents(&self) -> Option<String> {
        self.slot.lock().ok().and_then(|slot| slot.clone())
    }
}

impl StateStorage for MemoryStorage {
    fn load(&self) -> Result<Option<String>> {
        let slot = self.slot.lock().map_err(|_| lock_poisoned("memory storage"))?;
        Ok(slot.clone())
    }

    fn save(&self, contents: &str) -> Result<()> {
        let mut slot = self.slot.lock().map_err(|_| lock_poisoned("memory storage"))?;
        *slot = Some(contents.to_string());
        Ok(())
    }
}
