//! Key value grammars
//!
//! Each key type has its own grammar. Document numbers carry modulo-11 check
//! digits; phone numbers are E.164-like; e-mail is intentionally permissive;
//! random keys are opaque alphanumeric tokens.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::entity::KeyType;

const INDIVIDUAL_DOCUMENT_LENGTH: usize = 11;
const BUSINESS_DOCUMENT_LENGTH: usize = 14;
const MAX_EMAIL_LENGTH: usize = 77;
const MIN_PHONE_DIGITS: usize = 12;
const MAX_PHONE_DIGITS: usize = 13;
const MAX_RANDOM_KEY_LENGTH: usize = 36;

const BUSINESS_FIRST_WEIGHTS: [u32; 12] = [5, 4, 3, 2, 9, 8, 7, 6, 5, 4, 3, 2];
const BUSINESS_SECOND_WEIGHTS: [u32; 13] = [6, 5, 4, 3, 2, 9, 8, 7, 6, 5, 4, 3, 2];

/// Which rule of a key grammar was violated
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FormatViolation {
    #[error("expected exactly {expected} characters, got {actual}")]
    WrongLength { expected: usize, actual: usize },

    #[error("expected between {min} and {max} characters, got {actual}")]
    LengthOutOfRange {
        min: usize,
        max: usize,
        actual: usize,
    },

    #[error("cannot exceed {max} characters, got {actual}")]
    TooLong { max: usize, actual: usize },

    #[error("only ASCII digits are allowed")]
    NonDigit,

    #[error("all digits are identical")]
    RepeatedDigits,

    #[error("check digits do not match")]
    CheckDigitMismatch,

    #[error("missing '@' separator")]
    MissingAtSign,

    #[error("must start with '+'")]
    MissingPlusPrefix,

    #[error("invalid character '{0}', only ASCII letters and digits are allowed")]
    InvalidCharacter(char),
}

/// A key value rejected by the grammar of its key type
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("Invalid {key_type} key: {violation}")]
pub struct KeyFormatError {
    pub key_type: KeyType,
    pub violation: FormatViolation,
}

impl KeyFormatError {
    pub fn new(key_type: KeyType, violation: FormatViolation) -> Self {
        Self {
            key_type,
            violation,
        }
    }
}

/// Accepted grammar for opaque random keys
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RandomKeyGrammar {
    /// 1 to 36 ASCII alphanumerics
    #[default]
    UpToMax,
    /// Exactly 36 ASCII alphanumerics
    Exact,
}

/// Grammar attached to one key type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyFormat {
    DocumentIndividual,
    DocumentBusiness,
    Email,
    Phone,
    Random(RandomKeyGrammar),
}

impl KeyFormat {
    pub fn key_type(&self) -> KeyType {
        match self {
            Self::DocumentIndividual => KeyType::DocumentIndividual,
            Self::DocumentBusiness => KeyType::DocumentBusiness,
            Self::Email => KeyType::Email,
            Self::Phone => KeyType::Phone,
            Self::Random(_) => KeyType::Random,
        }
    }

    /// Check a candidate value against this grammar
    pub fn validate(&self, value: &str) -> Result<(), KeyFormatError> {
        let result = match self {
            Self::DocumentIndividual => validate_individual_document(value),
            Self::DocumentBusiness => validate_business_document(value),
            Self::Email => validate_email(value),
            Self::Phone => validate_phone(value),
            Self::Random(grammar) => validate_random(value, *grammar),
        };

        result.map_err(|violation| KeyFormatError::new(self.key_type(), violation))
    }
}

/// Immutable table of grammars, one per key type
///
/// Built once at startup from configuration and shared by `Arc`.
#[derive(Debug, Clone)]
pub struct KeyFormatRegistry {
    formats: [KeyFormat; KeyType::COUNT],
}

impl KeyFormatRegistry {
    pub fn new(random_grammar: RandomKeyGrammar) -> Self {
        let mut formats = [KeyFormat::Email; KeyType::COUNT];

        for format in [
            KeyFormat::DocumentIndividual,
            KeyFormat::DocumentBusiness,
            KeyFormat::Email,
            KeyFormat::Phone,
            KeyFormat::Random(random_grammar),
        ] {
            formats[format.key_type().index()] = format;
        }

        Self { formats }
    }

    pub fn format_for(&self, key_type: KeyType) -> &KeyFormat {
        &self.formats[key_type.index()]
    }

    pub fn validate(&self, key_type: KeyType, value: &str) -> Result<(), KeyFormatError> {
        let result = self.format_for(key_type).validate(value);

        if let Err(ref e) = result {
            tracing::debug!(key_type = %key_type, reason = %e.violation, "Key value rejected");
        }

        result
    }
}

impl Default for KeyFormatRegistry {
    fn default() -> Self {
        Self::new(RandomKeyGrammar::default())
    }
}

/// Individual taxpayer document: 11 digits, two modulo-11 check digits
pub fn validate_individual_document(value: &str) -> Result<(), FormatViolation> {
    let digits = parse_document_digits(value, INDIVIDUAL_DOCUMENT_LENGTH)?;

    let first = individual_check_digit(&digits[..9]);
    let second = individual_check_digit(&digits[..10]);

    if digits[9] != first || digits[10] != second {
        return Err(FormatViolation::CheckDigitMismatch);
    }

    Ok(())
}

/// Business taxpayer document: 14 digits, two modulo-11 check digits
pub fn validate_business_document(value: &str) -> Result<(), FormatViolation> {
    let digits = parse_document_digits(value, BUSINESS_DOCUMENT_LENGTH)?;

    let first = business_check_digit(&digits[..12], &BUSINESS_FIRST_WEIGHTS);
    let second = business_check_digit(&digits[..13], &BUSINESS_SECOND_WEIGHTS);

    if digits[12] != first || digits[13] != second {
        return Err(FormatViolation::CheckDigitMismatch);
    }

    Ok(())
}

/// E-mail: at most 77 characters and an '@' somewhere
pub fn validate_email(value: &str) -> Result<(), FormatViolation> {
    let length = value.chars().count();

    if length > MAX_EMAIL_LENGTH {
        return Err(FormatViolation::TooLong {
            max: MAX_EMAIL_LENGTH,
            actual: length,
        });
    }

    if !value.contains('@') {
        return Err(FormatViolation::MissingAtSign);
    }

    Ok(())
}

/// Phone: '+', 1-2 country digits, 2 area digits, 9 subscriber digits
pub fn validate_phone(value: &str) -> Result<(), FormatViolation> {
    let Some(digits) = value.strip_prefix('+') else {
        return Err(FormatViolation::MissingPlusPrefix);
    };

    if !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(FormatViolation::NonDigit);
    }

    if !(MIN_PHONE_DIGITS..=MAX_PHONE_DIGITS).contains(&digits.len()) {
        return Err(FormatViolation::LengthOutOfRange {
            min: MIN_PHONE_DIGITS,
            max: MAX_PHONE_DIGITS,
            actual: digits.len(),
        });
    }

    Ok(())
}

/// Random key: ASCII alphanumerics, length per the configured grammar
pub fn validate_random(value: &str, grammar: RandomKeyGrammar) -> Result<(), FormatViolation> {
    if let Some(c) = value.chars().find(|c| !c.is_ascii_alphanumeric()) {
        return Err(FormatViolation::InvalidCharacter(c));
    }

    let min = match grammar {
        RandomKeyGrammar::UpToMax => 1,
        RandomKeyGrammar::Exact => MAX_RANDOM_KEY_LENGTH,
    };

    if !(min..=MAX_RANDOM_KEY_LENGTH).contains(&value.len()) {
        return Err(FormatViolation::LengthOutOfRange {
            min,
            max: MAX_RANDOM_KEY_LENGTH,
            actual: value.len(),
        });
    }

    Ok(())
}

fn parse_document_digits(value: &str, expected: usize) -> Result<Vec<u32>, FormatViolation> {
    let actual = value.chars().count();

    if actual != expected {
        return Err(FormatViolation::WrongLength { expected, actual });
    }

    let digits = value
        .chars()
        .map(|c| c.to_digit(10))
        .collect::<Option<Vec<u32>>>()
        .ok_or(FormatViolation::NonDigit)?;

    if digits.iter().all(|d| *d == digits[0]) {
        return Err(FormatViolation::RepeatedDigits);
    }

    Ok(digits)
}

// Weights run from len+1 down to 2; a result above 9 becomes 0.
fn individual_check_digit(digits: &[u32]) -> u32 {
    let top = digits.len() as u32 + 1;
    let sum: u32 = digits
        .iter()
        .enumerate()
        .map(|(i, d)| d * (top - i as u32))
        .sum();

    let digit = 11 - (sum % 11);
    if digit > 9 { 0 } else { digit }
}

fn business_check_digit(digits: &[u32], weights: &[u32]) -> u32 {
    let sum: u32 = digits.iter().zip(weights).map(|(d, w)| d * w).sum();

    let remainder = sum % 11;
    if remainder < 2 { 0 } else { 11 - remainder }
}
