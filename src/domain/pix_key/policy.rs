//! Per-account key quota

use serde::{Deserialize, Serialize};

use super::entity::{OwnerCategory, PixKey};

const MAX_KEYS_INDIVIDUAL: usize = 5;
const MAX_KEYS_BUSINESS: usize = 20;

/// Which of an account's keys count against its quota
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuotaScope {
    /// Every key bound to the account, active or not
    #[default]
    AllKeys,
    /// Only keys that have not been deactivated
    ActiveOnly,
}

/// Key quota rules for a branch/account pair
#[derive(Debug, Clone, Copy, Default)]
pub struct AccountPolicy {
    scope: QuotaScope,
}

impl AccountPolicy {
    pub fn new(scope: QuotaScope) -> Self {
        Self { scope }
    }

    /// Maximum number of keys an account may hold
    pub fn max_keys_for(&self, category: OwnerCategory) -> usize {
        match category {
            OwnerCategory::Individual => MAX_KEYS_INDIVIDUAL,
            OwnerCategory::Business => MAX_KEYS_BUSINESS,
        }
    }

    /// Number of the given keys that count against the quota
    pub fn counted_keys(&self, keys: &[PixKey]) -> usize {
        match self.scope {
            QuotaScope::AllKeys => keys.len(),
            QuotaScope::ActiveOnly => keys.iter().filter(|k| k.is_active()).count(),
        }
    }

    /// Whether one more key may be added to an account already holding `keys`
    pub fn has_room(&self, category: OwnerCategory, keys: &[PixKey]) -> bool {
        self.counted_keys(keys) < self.max_keys_for(category)
    }
}
