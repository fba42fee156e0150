//! Key lookup use cases

use std::sync::Arc;

use tracing::{info, warn};

use crate::domain::pix_key::{PixKey, PixKeyId, PixKeyRepository};
use crate::domain::DomainError;

/// One of the supported lookup criteria
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PixKeyLookup {
    ById(PixKeyId),
    ByAccount {
        branch_number: u32,
        account_number: u32,
    },
    ByOwnerName(String),
}

/// Read-only access to key records
#[derive(Debug)]
pub struct QueryService<R: PixKeyRepository> {
    repository: Arc<R>,
}

impl<R: PixKeyRepository> QueryService<R> {
    pub fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }

    /// Get a key by ID, failing if it does not exist
    pub async fn by_id(&self, id: &PixKeyId) -> Result<PixKey, DomainError> {
        info!(id = %id, "Querying key by ID");

        self.repository.find_by_id(id).await?.ok_or_else(|| {
            warn!(id = %id, "Key not found");
            DomainError::not_found(format!("Key '{}' not found", id))
        })
    }

    /// All keys of an account, failing if there are none
    pub async fn by_account(
        &self,
        branch_number: u32,
        account_number: u32,
    ) -> Result<Vec<PixKey>, DomainError> {
        info!(branch_number, account_number, "Querying keys by account");

        let keys = self
            .repository
            .find_by_account(branch_number, account_number)
            .await?;

        if keys.is_empty() {
            warn!(branch_number, account_number, "No keys found for account");
            return Err(DomainError::not_found(format!(
                "No keys found for account {}/{}",
                branch_number, account_number
            )));
        }

        Ok(keys)
    }

    /// All keys whose owner has this first name; may be empty
    pub async fn by_owner_name(&self, name: &str) -> Result<Vec<PixKey>, DomainError> {
        info!(name = %name, "Querying keys by owner name");
        self.repository.find_by_owner_name(name).await
    }

    /// Dispatch a lookup by whichever criterion the caller supplied
    pub async fn lookup(&self, criteria: &PixKeyLookup) -> Result<Vec<PixKey>, DomainError> {
        match criteria {
            PixKeyLookup::ById(id) => self.by_id(id).await.map(|k| vec![k]),
            PixKeyLookup::ByAccount {
                branch_number,
                account_number,
            } => self.by_account(*branch_number, *account_number).await,
            PixKeyLookup::ByOwnerName(name) => self.by_owner_name(name).await,
        }
    }
}
