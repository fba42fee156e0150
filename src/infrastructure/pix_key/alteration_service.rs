//! Key alteration and deactivation use cases

use std::sync::Arc;

use tracing::{info, warn};

use crate::domain::pix_key::{AccountDetails, KeyType, PixKey, PixKeyId, PixKeyRepository};
use crate::domain::DomainError;

/// Request for altering a key record
///
/// Only account and owner fields can change. The key type and value are
/// fixed at registration; `expected_key_type` lets a caller assert which
/// type it believes it is altering.
#[derive(Debug, Clone)]
pub struct AlterPixKeyRequest {
    pub expected_key_type: Option<KeyType>,
    pub account: AccountDetails,
}

impl AlterPixKeyRequest {
    pub fn new(account: AccountDetails) -> Self {
        Self {
            expected_key_type: None,
            account,
        }
    }

    pub fn with_expected_key_type(mut self, key_type: KeyType) -> Self {
        self.expected_key_type = Some(key_type);
        self
    }
}

/// Alters and deactivates existing key records
#[derive(Debug)]
pub struct AlterationService<R: PixKeyRepository> {
    repository: Arc<R>,
}

impl<R: PixKeyRepository> AlterationService<R> {
    pub fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }

    /// Replace the account and owner fields of an active record
    pub async fn alter(
        &self,
        id: &PixKeyId,
        request: AlterPixKeyRequest,
    ) -> Result<PixKey, DomainError> {
        info!(id = %id, "Altering key");

        let mut key = self.get_active(id).await?;

        if let Some(expected) = request.expected_key_type {
            if expected != key.key_type() {
                warn!(
                    id = %id,
                    expected = %expected,
                    actual = %key.key_type(),
                    "Key type mismatch"
                );
                return Err(DomainError::TypeMismatch {
                    expected,
                    actual: key.key_type(),
                });
            }
        }

        key.update_allowed_fields(request.account)
            .map_err(|e| DomainError::from_record(id, e))?;

        self.repository.save(&key).await?;

        info!(id = %id, "Key altered");
        Ok(key)
    }

    /// Deactivate a record; it stays stored but can no longer change
    pub async fn deactivate(&self, id: &PixKeyId) -> Result<PixKey, DomainError> {
        info!(id = %id, "Deactivating key");

        let mut key = self.get_active(id).await?;

        key.deactivate()
            .map_err(|e| DomainError::from_record(id, e))?;

        self.repository.save(&key).await?;

        info!(id = %id, "Key deactivated");
        Ok(key)
    }

    async fn get_active(&self, id: &PixKeyId) -> Result<PixKey, DomainError> {
        let key = self.repository.find_by_id(id).await?.ok_or_else(|| {
            warn!(id = %id, "Key not found");
            DomainError::not_found(format!("Key '{}' not found", id))
        })?;

        if key.is_inactive() {
            warn!(id = %id, "Key is inactive");
            return Err(DomainError::InactiveRecord { id: *id });
        }

        Ok(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::pix_key::{
        AccountType, FieldValidationError, KeyFormatRegistry, MockPixKeyRepository, NewPixKey,
        OwnerCategory,
    };
    use crate::infrastructure::pix_key::InMemoryPixKeyRepository;

    fn account(first_name: &str) -> AccountDetails {
        AccountDetails {
            account_type: AccountType::Checking,
            branch_number: 1234,
            account_number: 5678,
            owner_first_name: first_name.to_string(),
            owner_last_name: None,
        }
    }

    fn stored_key() -> PixKey {
        PixKey::create(
            &KeyFormatRegistry::default(),
            NewPixKey {
                key_type: KeyType::Email,
                key_value: "maria@bank.com".to_string(),
                owner_category: OwnerCategory::Individual,
                account: account("Maria"),
            },
        )
        .unwrap()
    }

    fn create_service(
        keys: Vec<PixKey>,
    ) -> (
        AlterationService<InMemoryPixKeyRepository>,
        Arc<InMemoryPixKeyRepository>,
    ) {
        let repository = Arc::new(InMemoryPixKeyRepository::with_keys(keys));
        (AlterationService::new(repository.clone()), repository)
    }

    #[tokio::test]
    async fn test_alter_updates_mutable_fields() {
        let key = stored_key();
        let (service, repository) = create_service(vec![key.clone()]);

        let update = AccountDetails {
            account_type: AccountType::Savings,
            branch_number: 1,
            account_number: 2,
            owner_first_name: "Joana".to_string(),
            owner_last_name: Some("Souza".to_string()),
        };

        let altered = service
            .alter(key.id(), AlterPixKeyRequest::new(update.clone()))
            .await
            .unwrap();

        assert_eq!(altered.account(), &update);
        assert_eq!(altered.key_value(), key.key_value());
        assert_eq!(altered.key_type(), key.key_type());
        assert_eq!(altered.owner_category(), key.owner_category());
        assert_eq!(altered.created_at(), key.created_at());

        let stored = repository.find_by_id(key.id()).await.unwrap().unwrap();
        assert_eq!(stored, altered);
    }

    #[tokio::test]
    async fn test_alter_not_found() {
        let (service, _) = create_service(vec![]);

        let err = service
            .alter(&PixKeyId::generate(), AlterPixKeyRequest::new(account("Joana")))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_alter_inactive_record_always_fails() {
        let mut key = stored_key();
        key.deactivate().unwrap();
        let (service, _) = create_service(vec![key.clone()]);

        for first_name in ["Joana", ""] {
            let err = service
                .alter(key.id(), AlterPixKeyRequest::new(account(first_name)))
                .await
                .unwrap_err();
            assert!(matches!(err, DomainError::InactiveRecord { id } if id == *key.id()));
        }
    }

    #[tokio::test]
    async fn test_alter_type_mismatch() {
        let key = stored_key();
        let (service, repository) = create_service(vec![key.clone()]);

        let request =
            AlterPixKeyRequest::new(account("Joana")).with_expected_key_type(KeyType::Phone);
        let err = service.alter(key.id(), request).await.unwrap_err();

        assert!(matches!(
            err,
            DomainError::TypeMismatch {
                expected: KeyType::Phone,
                actual: KeyType::Email
            }
        ));
        let stored = repository.find_by_id(key.id()).await.unwrap().unwrap();
        assert_eq!(stored.owner_first_name(), "Maria");
    }

    #[tokio::test]
    async fn test_alter_matching_expected_type() {
        let key = stored_key();
        let (service, _) = create_service(vec![key.clone()]);

        let request =
            AlterPixKeyRequest::new(account("Joana")).with_expected_key_type(KeyType::Email);
        let altered = service.alter(key.id(), request).await.unwrap();
        assert_eq!(altered.owner_first_name(), "Joana");
    }

    #[tokio::test]
    async fn test_alter_rejected_update_is_not_persisted() {
        let key = stored_key();

        let mut mock = MockPixKeyRepository::new();
        let found = key.clone();
        mock.expect_find_by_id()
            .returning(move |_| Ok(Some(found.clone())));
        mock.expect_save().times(0);

        let service = AlterationService::new(Arc::new(mock));

        let err = service
            .alter(key.id(), AlterPixKeyRequest::new(account(&"a".repeat(31))))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DomainError::FieldInvariant(FieldValidationError::FirstNameTooLong(30))
        ));
    }

    #[tokio::test]
    async fn test_deactivate() {
        let key = stored_key();
        let (service, repository) = create_service(vec![key.clone()]);

        let deactivated = service.deactivate(key.id()).await.unwrap();
        assert!(deactivated.is_inactive());

        let stored = repository.find_by_id(key.id()).await.unwrap().unwrap();
        assert!(stored.is_inactive());

        let err = service.deactivate(key.id()).await.unwrap_err();
        assert!(matches!(err, DomainError::InactiveRecord { .. }));
    }
}
