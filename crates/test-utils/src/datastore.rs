//! # In-Memory Verification Store

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use anyhow::{Result, anyhow};
use verity_verifier::types::{Submission, Verification};

/// Verification records held in memory.
#[derive(Clone, Debug, Default)]
pub struct Store {
    records: Arc<Mutex<HashMap<String, Verification>>>,
}

impl Store {
    /// Save `verification`, replacing any record with the same id.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be locked.
    pub fn put(&self, verification: &Verification) -> Result<()> {
        let mut records = self.records.lock().map_err(|_| anyhow!("issue locking"))?;
        records.insert(verification.id.clone(), verification.clone());
        Ok(())
    }

    /// The verification with `id`, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be locked.
    pub fn get(&self, id: &str) -> Result<Option<Verification>> {
        let records = self.records.lock().map_err(|_| anyhow!("issue locking"))?;
        Ok(records.get(id).cloned())
    }

    /// Apply `submission` unless the record already holds a credential
    /// submission. `force` applies it regardless. The check and the update
    /// happen under one lock.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be locked.
    pub fn update(&self, id: &str, submission: &Submission, force: bool) -> Result<bool> {
        let mut records = self.records.lock().map_err(|_| anyhow!("issue locking"))?;
        let Some(record) = records.get_mut(id) else {
            return Ok(false);
        };
        if record.is_complete() && !force {
            return Ok(false);
        }
        record.apply(submission);
        Ok(true)
    }
}
