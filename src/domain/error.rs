use thiserror::Error;

use super::pix_key::{
    FieldValidationError, KeyFormatError, KeyType, PixKeyId, PixKeyValidationError,
};

/// Core domain errors
#[derive(Debug, Error)]
pub enum DomainError {
    #[error(transparent)]
    Format(#[from] KeyFormatError),

    #[error(transparent)]
    FieldInvariant(#[from] FieldValidationError),

    #[error("Key '{key_value}' is already registered")]
    DuplicateKey { key_value: String },

    #[error(
        "Account {branch_number}/{account_number} already holds {current} keys (limit {limit})"
    )]
    QuotaExceeded {
        branch_number: u32,
        account_number: u32,
        current: usize,
        limit: usize,
    },

    #[error("Key '{id}' is inactive and cannot be modified")]
    InactiveRecord { id: PixKeyId },

    #[error("Key type mismatch: expected {expected}, stored {actual}")]
    TypeMismatch { expected: KeyType, actual: KeyType },

    #[error("Not found: {message}")]
    NotFound { message: String },

    #[error("Invalid ID format: {message}")]
    InvalidId { message: String },

    #[error("Storage error: {message}")]
    Storage { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl From<PixKeyValidationError> for DomainError {
    fn from(error: PixKeyValidationError) -> Self {
        match error {
            PixKeyValidationError::Format(e) => Self::Format(e),
            PixKeyValidationError::Field(e) => Self::FieldInvariant(e),
            PixKeyValidationError::Inactive => {
                Self::internal("Key record is inactive but no record ID is known")
            }
        }
    }
}

impl DomainError {
    pub fn duplicate_key(key_value: impl Into<String>) -> Self {
        Self::DuplicateKey {
            key_value: key_value.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    pub fn invalid_id(message: impl Into<String>) -> Self {
        Self::InvalidId {
            message: message.into(),
        }
    }

    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Map an entity-level error, attaching the record it came from
    pub fn from_record(id: &PixKeyId, error: PixKeyValidationError) -> Self {
        match error {
            PixKeyValidationError::Inactive => Self::InactiveRecord { id: *id },
            other => other.into(),
        }
    }

    /// Stable code for transport layers to map onto their own responses
    pub fn code(&self) -> &'static str {
        match self {
            Self::Format(e) => match e.key_type {
                KeyType::Email => "422.001",
                KeyType::DocumentIndividual => "422.002",
                KeyType::DocumentBusiness => "422.003",
                KeyType::Phone => "422.004",
                KeyType::Random => "422.005",
            },
            Self::FieldInvariant(e) => match e {
                FieldValidationError::EmptyFirstName
                | FieldValidationError::FirstNameTooLong(_) => "422.007",
                FieldValidationError::LastNameTooLong(_) => "422.008",
                FieldValidationError::BranchNumberTooLong(_) => "422.009",
                FieldValidationError::AccountNumberTooLong(_)
                | FieldValidationError::InvalidAccountType(_) => "422.006",
                FieldValidationError::InvalidOwnerCategory(_)
                | FieldValidationError::InvalidKeyType(_) => "400.014",
            },
            Self::DuplicateKey { .. } => "400.020",
            Self::QuotaExceeded { .. } => "400.019",
            Self::InactiveRecord { .. } => "400.018",
            Self::TypeMismatch { .. } => "422.010",
            Self::NotFound { .. } => "404.001",
            Self::InvalidId { .. } => "400.014",
            Self::Storage { .. } | Self::Internal { .. } => "500.000",
        }
    }
}
