//! Wiring of the key record services

use std::sync::Arc;

use tracing::info;

use super::{AlterationService, QueryService, RegistrationService};
use crate::config::RegistryConfig;
use crate::domain::pix_key::{AccountPolicy, KeyFormatRegistry, PixKeyRepository};

/// The three use-case services sharing one repository and one format table
#[derive(Debug)]
pub struct PixKeyServices<R: PixKeyRepository> {
    pub registration: RegistrationService<R>,
    pub alteration: AlterationService<R>,
    pub query: QueryService<R>,
}

impl<R: PixKeyRepository> PixKeyServices<R> {
    /// Build the format table and policy from configuration, once
    pub fn new(repository: Arc<R>, config: &RegistryConfig) -> Self {
        info!(
            random_key_grammar = ?config.random_key_grammar,
            quota_scope = ?config.quota_scope,
            "Building key registry services"
        );

        let formats = Arc::new(KeyFormatRegistry::new(config.random_key_grammar));
        let policy = AccountPolicy::new(config.quota_scope);

        Self {
            registration: RegistrationService::new(repository.clone(), formats, policy),
            alteration: AlterationService::new(repository.clone()),
            query: QueryService::new(repository),
        }
    }
}
