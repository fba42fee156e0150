//! Key record repository port

use async_trait::async_trait;

#[cfg(test)]
use mockall::automock;

use super::entity::{PixKey, PixKeyId};
use crate::domain::DomainError;

/// Persistence port for key records
///
/// Implementations must treat the key value as globally unique and reject a
/// `save` that would duplicate it with [`DomainError::DuplicateKey`], so that
/// a registration racing past the service-level check still surfaces as a
/// duplicate. A `save` that would clear a stored deactivation fails with
/// [`DomainError::InactiveRecord`].
#[cfg_attr(test, automock)]
#[async_trait]
pub trait PixKeyRepository: Send + Sync {
    /// Whether any record, active or not, already uses this key value
    async fn exists_by_value(&self, key_value: &str) -> Result<bool, DomainError>;

    /// Find a record by ID
    async fn find_by_id(&self, id: &PixKeyId) -> Result<Option<PixKey>, DomainError>;

    /// All records bound to a branch/account pair
    async fn find_by_account(
        &self,
        branch_number: u32,
        account_number: u32,
    ) -> Result<Vec<PixKey>, DomainError>;

    /// All records whose owner first name matches exactly
    async fn find_by_owner_name(&self, name: &str) -> Result<Vec<PixKey>, DomainError>;

    /// Insert or replace a record
    async fn save(&self, key: &PixKey) -> Result<(), DomainError>;
}
