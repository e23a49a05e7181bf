//! In-memory implementation of the Backend trait.
//!
//! Same semantics as SQLite but nothing outlives the process. Sessions in
//! one process share it through an `Arc`.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use async_trait::async_trait;
use pindown_core::{Record, StoreAddress};

use crate::error::{Result, StoreError};
use crate::traits::{AppendOutcome, Backend, CreateOutcome};

/// In-memory backend.
///
/// All data is lost when the backend is dropped. Each primitive holds the
/// lock for its whole critical section, which is what makes it atomic.
pub struct MemoryBackend {
    ledgers: RwLock<HashMap<StoreAddress, Vec<Record>>>,
}

impl MemoryBackend {
    /// Create an empty backend.
    pub fn new() -> Self {
        Self {
            ledgers: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

fn poisoned<T>(e: PoisonError<T>) -> StoreError {
    StoreError::Poisoned(e.to_string())
}

#[async_trait]
impl Backend for MemoryBackend {
    async fn create_if_absent(&self, address: &StoreAddress) -> Result<CreateOutcome> {
        let mut ledgers = self.ledgers.write().map_err(poisoned)?;

        if ledgers.contains_key(address) {
            return Ok(CreateOutcome::AlreadyExists);
        }
        ledgers.insert(*address, Vec::new());
        Ok(CreateOutcome::Created)
    }

    async fn append(&self, address: &StoreAddress, record: &Record) -> Result<AppendOutcome> {
        let mut ledgers = self.ledgers.write().map_err(poisoned)?;

        match ledgers.get_mut(address) {
            Some(records) => {
                records.push(record.clone());
                Ok(AppendOutcome::Appended {
                    position: records.len() as u64,
                })
            }
            None => Ok(AppendOutcome::Missing),
        }
    }

    async fn read(&self, address: &StoreAddress) -> Result<Option<Vec<Record>>> {
        let ledgers = self.ledgers.read().map_err(poisoned)?;
        Ok(ledgers.get(address).cloned())
    }

    async fn exists(&self, address: &StoreAddress) -> Result<bool> {
        let ledgers = self.ledgers.read().map_err(poisoned)?;
        Ok(ledgers.contains_key(address))
    }
}
