//! Field invariants shared by record creation and alteration

use thiserror::Error;

use super::entity::AccountDetails;
use super::format::KeyFormatError;

pub const MAX_FIRST_NAME_LENGTH: usize = 30;
pub const MAX_LAST_NAME_LENGTH: usize = 45;
pub const MAX_BRANCH_DIGITS: usize = 4;
pub const MAX_ACCOUNT_DIGITS: usize = 8;

/// A structural field that breaks its rule
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FieldValidationError {
    #[error("Owner first name cannot be empty")]
    EmptyFirstName,

    #[error("Owner first name cannot exceed {0} characters")]
    FirstNameTooLong(usize),

    #[error("Owner last name cannot exceed {0} characters")]
    LastNameTooLong(usize),

    #[error("Branch number cannot exceed {0} digits")]
    BranchNumberTooLong(usize),

    #[error("Account number cannot exceed {0} digits")]
    AccountNumberTooLong(usize),

    #[error("Invalid account type: '{0}'")]
    InvalidAccountType(String),

    #[error("Invalid owner category: '{0}'")]
    InvalidOwnerCategory(String),

    #[error("Invalid key type: '{0}'")]
    InvalidKeyType(String),
}

/// Errors raised by the key record itself
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PixKeyValidationError {
    #[error(transparent)]
    Format(#[from] KeyFormatError),

    #[error(transparent)]
    Field(#[from] FieldValidationError),

    #[error("Key record is inactive and cannot be modified")]
    Inactive,
}

/// Validate the mutable account and owner fields, in declaration order
pub fn validate_account_details(details: &AccountDetails) -> Result<(), FieldValidationError> {
    let first_name_length = details.owner_first_name.chars().count();

    if first_name_length == 0 {
        return Err(FieldValidationError::EmptyFirstName);
    }

    if first_name_length > MAX_FIRST_NAME_LENGTH {
        return Err(FieldValidationError::FirstNameTooLong(MAX_FIRST_NAME_LENGTH));
    }

    if let Some(ref last_name) = details.owner_last_name {
        if last_name.chars().count() > MAX_LAST_NAME_LENGTH {
            return Err(FieldValidationError::LastNameTooLong(MAX_LAST_NAME_LENGTH));
        }
    }

    if decimal_digits(details.branch_number) > MAX_BRANCH_DIGITS {
        return Err(FieldValidationError::BranchNumberTooLong(MAX_BRANCH_DIGITS));
    }

    if decimal_digits(details.account_number) > MAX_ACCOUNT_DIGITS {
        return Err(FieldValidationError::AccountNumberTooLong(MAX_ACCOUNT_DIGITS));
    }

    Ok(())
}

fn decimal_digits(n: u32) -> usize {
    n.checked_ilog10().map_or(1, |log| log as usize + 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::pix_key::entity::AccountType;

    fn details() -> AccountDetails {
        AccountDetails {
            account_type: AccountType::Savings,
            branch_number: 1,
            account_number: 1,
            owner_first_name: "Ana".to_string(),
            owner_last_name: None,
        }
    }

    #[test]
    fn test_valid_details() {
        assert!(validate_account_details(&details()).is_ok());

        let mut at_limits = details();
        at_limits.owner_first_name = "a".repeat(30);
        at_limits.owner_last_name = Some("b".repeat(45));
        at_limits.branch_number = 9999;
        at_limits.account_number = 99_999_999;
        assert!(validate_account_details(&at_limits).is_ok());
    }

    #[test]
    fn test_zero_numbers_have_one_digit() {
        let mut d = details();
        d.branch_number = 0;
        d.account_number = 0;
        assert!(validate_account_details(&d).is_ok());
    }

    #[test]
    fn test_empty_last_name_is_allowed() {
        let mut d = details();
        d.owner_last_name = Some(String::new());
        assert!(validate_account_details(&d).is_ok());
    }

    #[test]
    fn test_first_name_rules() {
        let mut d = details();
        d.owner_first_name = String::new();
        assert_eq!(
            validate_account_details(&d),
            Err(FieldValidationError::EmptyFirstName)
        );

        d.owner_first_name = "a".repeat(31);
        assert_eq!(
            validate_account_details(&d),
            Err(FieldValidationError::FirstNameTooLong(30))
        );

        // Length counts characters, not bytes
        d.owner_first_name = "é".repeat(30);
        assert!(validate_account_details(&d).is_ok());
    }

    #[test]
    fn test_last_name_too_long() {
        let mut d = details();
        d.owner_last_name = Some("b".repeat(46));
        assert_eq!(
            validate_account_details(&d),
            Err(FieldValidationError::LastNameTooLong(45))
        );
    }

    #[test]
    fn test_number_digit_limits() {
        let mut d = details();
        d.branch_number = 10_000;
        assert_eq!(
            validate_account_details(&d),
            Err(FieldValidationError::BranchNumberTooLong(4))
        );

        let mut d = details();
        d.account_number = 100_000_000;
        assert_eq!(
            validate_account_details(&d),
            Err(FieldValidationError::AccountNumberTooLong(8))
        );
    }

    #[test]
    fn test_first_violation_wins() {
        let mut d = details();
        d.owner_first_name = String::new();
        d.branch_number = 10_000;
        assert_eq!(
            validate_account_details(&d),
            Err(FieldValidationError::EmptyFirstName)
        );
    }
}
