//! Key record domain
//!
//! A key binds an alias (document number, e-mail, phone or random token) to a
//! bank account so payments can be routed without exposing the account
//! number. This module holds the record entity, the per-type value grammars,
//! the account quota policy and the persistence port.

mod entity;
mod format;
mod policy;
mod repository;
mod validation;

pub use entity::{
    AccountDetails, AccountType, KeyType, NewPixKey, OwnerCategory, PixKey, PixKeyId,
};
pub use format::{
    validate_business_document, validate_email, validate_individual_document, validate_phone,
    validate_random, FormatViolation, KeyFormat, KeyFormatError, KeyFormatRegistry,
    RandomKeyGrammar,
};
pub use policy::{AccountPolicy, QuotaScope};
pub use repository::PixKeyRepository;
pub use validation::{
    validate_account_details, FieldValidationError, PixKeyValidationError,
    MAX_ACCOUNT_DIGITS, MAX_BRANCH_DIGITS, MAX_FIRST_NAME_LENGTH, MAX_LAST_NAME_LENGTH,
};

#[cfg(test)]
pub use repository::MockPixKeyRepository;
