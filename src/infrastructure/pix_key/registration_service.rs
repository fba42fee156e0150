//! Key registration use case

use std::sync::Arc;

use tracing::{info, warn};

use crate::domain::pix_key::{AccountPolicy, KeyFormatRegistry, NewPixKey, PixKey, PixKeyRepository};
use crate::domain::DomainError;

/// Registers new key records
///
/// Checks run in a fixed order and stop at the first failure: global
/// uniqueness of the key value, the account quota, then the record's own
/// format and field invariants.
#[derive(Debug)]
pub struct RegistrationService<R: PixKeyRepository> {
    repository: Arc<R>,
    formats: Arc<KeyFormatRegistry>,
    policy: AccountPolicy,
}

impl<R: PixKeyRepository> RegistrationService<R> {
    pub fn new(
        repository: Arc<R>,
        formats: Arc<KeyFormatRegistry>,
        policy: AccountPolicy,
    ) -> Self {
        Self {
            repository,
            formats,
            policy,
        }
    }

    /// Register a new key and return the persisted record
    pub async fn register(&self, new_key: NewPixKey) -> Result<PixKey, DomainError> {
        let branch_number = new_key.account.branch_number;
        let account_number = new_key.account.account_number;

        info!(
            key_type = %new_key.key_type,
            owner_category = %new_key.owner_category,
            branch_number,
            account_number,
            "Registering key"
        );

        if self.repository.exists_by_value(&new_key.key_value).await? {
            warn!(key_type = %new_key.key_type, "Key value already registered");
            return Err(DomainError::duplicate_key(new_key.key_value));
        }

        let existing = self
            .repository
            .find_by_account(branch_number, account_number)
            .await?;

        if !self.policy.has_room(new_key.owner_category, &existing) {
            let current = self.policy.counted_keys(&existing);
            let limit = self.policy.max_keys_for(new_key.owner_category);

            warn!(
                branch_number,
                account_number, current, limit, "Key quota exceeded for account"
            );

            return Err(DomainError::QuotaExceeded {
                branch_number,
                account_number,
                current,
                limit,
            });
        }

        let key = PixKey::create(&self.formats, new_key)?;

        self.repository.save(&key).await?;

        info!(id = %key.id(), key_type = %key.key_type(), "Key registered");
        Ok(key)
    }
}
