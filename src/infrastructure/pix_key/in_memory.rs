//! In-memory key record repository

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use crate::domain::pix_key::{PixKey, PixKeyId, PixKeyRepository};
use crate::domain::DomainError;

/// Thread-safe in-memory implementation of PixKeyRepository
///
/// Useful for testing, batch runs and development. Data is lost when the
/// process terminates.
#[derive(Debug, Default)]
pub struct InMemoryPixKeyRepository {
    keys: RwLock<HashMap<PixKeyId, PixKey>>,
}

impl InMemoryPixKeyRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a repository pre-populated with records
    pub fn with_keys(keys: Vec<PixKey>) -> Self {
        let map = keys.into_iter().map(|k| (*k.id(), k)).collect();

        Self {
            keys: RwLock::new(map),
        }
    }

    fn select<F>(&self, predicate: F) -> Result<Vec<PixKey>, DomainError>
    where
        F: Fn(&PixKey) -> bool,
    {
        let keys = self
            .keys
            .read()
            .map_err(|e| DomainError::storage(format!("Failed to acquire read lock: {}", e)))?;

        let mut result: Vec<PixKey> = keys.values().filter(|k| predicate(k)).cloned().collect();
        result.sort_by_key(|k| k.created_at());
        Ok(result)
    }
}

#[async_trait]
impl PixKeyRepository for InMemoryPixKeyRepository {
    async fn exists_by_value(&self, key_value: &str) -> Result<bool, DomainError> {
        let keys = self
            .keys
            .read()
            .map_err(|e| DomainError::storage(format!("Failed to acquire read lock: {}", e)))?;

        Ok(keys.values().any(|k| k.key_value() == key_value))
    }

    async fn find_by_id(&self, id: &PixKeyId) -> Result<Option<PixKey>, DomainError> {
        let keys = self
            .keys
            .read()
            .map_err(|e| DomainError::storage(format!("Failed to acquire read lock: {}", e)))?;

        Ok(keys.get(id).cloned())
    }

    async fn find_by_account(
        &self,
        branch_number: u32,
        account_number: u32,
    ) -> Result<Vec<PixKey>, DomainError> {
        self.select(|k| k.belongs_to(branch_number, account_number))
    }

    async fn find_by_owner_name(&self, name: &str) -> Result<Vec<PixKey>, DomainError> {
        self.select(|k| k.owner_first_name() == name)
    }

    async fn save(&self, key: &PixKey) -> Result<(), DomainError> {
        let mut keys = self
            .keys
            .write()
            .map_err(|e| DomainError::storage(format!("Failed to acquire write lock: {}", e)))?;

        // Unique constraint on the key value, checked under the write lock
        let clash = keys
            .values()
            .any(|k| k.key_value() == key.key_value() && k.id() != key.id());

        if clash {
            return Err(DomainError::duplicate_key(key.key_value()));
        }

        // Deactivation is permanent; a stale active copy must not undo it
        let reactivates = keys
            .get(key.id())
            .is_some_and(|stored| stored.is_inactive() && key.is_active());

        if reactivates {
            return Err(DomainError::InactiveRecord { id: *key.id() });
        }

        keys.insert(*key.id(), key.clone());
        Ok(())
    }
}
