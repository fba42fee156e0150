//! Key record entity and related types

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::format::KeyFormatRegistry;
use super::validation::{validate_account_details, FieldValidationError, PixKeyValidationError};
use crate::domain::DomainError;

/// Key record identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PixKeyId(Uuid);

impl PixKeyId {
    /// Generate a fresh random identifier
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse a caller-supplied identifier
    pub fn parse(id: &str) -> Result<Self, DomainError> {
        id.parse()
            .map_err(|e| DomainError::invalid_id(format!("'{}' is not a valid key ID: {}", id, e)))
    }
}

impl FromStr for PixKeyId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim()).map(Self)
    }
}

impl std::fmt::Display for PixKeyId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Kind of alias a key binds to an account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum KeyType {
    /// Individual taxpayer document number
    #[serde(alias = "CPF")]
    DocumentIndividual,
    /// Business taxpayer document number
    #[serde(alias = "CNPJ")]
    DocumentBusiness,
    Email,
    #[serde(alias = "CELULAR")]
    Phone,
    /// Opaque random token
    #[serde(alias = "ALEATORIA")]
    Random,
}

impl KeyType {
    pub const COUNT: usize = 5;

    pub const ALL: [KeyType; Self::COUNT] = [
        Self::DocumentIndividual,
        Self::DocumentBusiness,
        Self::Email,
        Self::Phone,
        Self::Random,
    ];

    /// Position of this type in per-type lookup tables
    pub fn index(&self) -> usize {
        match self {
            Self::DocumentIndividual => 0,
            Self::DocumentBusiness => 1,
            Self::Email => 2,
            Self::Phone => 3,
            Self::Random => 4,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DocumentIndividual => "DOCUMENT_INDIVIDUAL",
            Self::DocumentBusiness => "DOCUMENT_BUSINESS",
            Self::Email => "EMAIL",
            Self::Phone => "PHONE",
            Self::Random => "RANDOM",
        }
    }
}

impl std::fmt::Display for KeyType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for KeyType {
    type Err = FieldValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "DOCUMENT_INDIVIDUAL" | "CPF" => Ok(Self::DocumentIndividual),
            "DOCUMENT_BUSINESS" | "CNPJ" => Ok(Self::DocumentBusiness),
            "EMAIL" => Ok(Self::Email),
            "PHONE" | "CELULAR" => Ok(Self::Phone),
            "RANDOM" | "ALEATORIA" => Ok(Self::Random),
            _ => Err(FieldValidationError::InvalidKeyType(s.to_string())),
        }
    }
}

/// Bank account type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccountType {
    #[serde(alias = "CORRENTE")]
    Checking,
    #[serde(alias = "POUPANCA")]
    Savings,
}

impl std::fmt::Display for AccountType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Checking => write!(f, "CHECKING"),
            Self::Savings => write!(f, "SAVINGS"),
        }
    }
}

impl FromStr for AccountType {
    type Err = FieldValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "CHECKING" | "CORRENTE" => Ok(Self::Checking),
            "SAVINGS" | "POUPANCA" => Ok(Self::Savings),
            _ => Err(FieldValidationError::InvalidAccountType(s.to_string())),
        }
    }
}

/// Account holder classification, determines the key quota
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OwnerCategory {
    #[serde(alias = "PESSOA_FISICA")]
    Individual,
    #[serde(alias = "PESSOA_JURIDICA")]
    Business,
}

impl std::fmt::Display for OwnerCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Individual => write!(f, "INDIVIDUAL"),
            Self::Business => write!(f, "BUSINESS"),
        }
    }
}

impl FromStr for OwnerCategory {
    type Err = FieldValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "INDIVIDUAL" | "PESSOA_FISICA" => Ok(Self::Individual),
            "BUSINESS" | "PESSOA_JURIDICA" => Ok(Self::Business),
            _ => Err(FieldValidationError::InvalidOwnerCategory(s.to_string())),
        }
    }
}

fn normalize(s: &str) -> String {
    s.trim().to_ascii_uppercase()
}

/// Account and owner fields, the only part of a record that may change
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountDetails {
    pub account_type: AccountType,
    pub branch_number: u32,
    pub account_number: u32,
    pub owner_first_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_last_name: Option<String>,
}

/// Input for creating a key record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewPixKey {
    pub key_type: KeyType,
    pub key_value: String,
    pub owner_category: OwnerCategory,
    #[serde(flatten)]
    pub account: AccountDetails,
}

/// Key record entity
///
/// Deserialization runs the same checks as [`PixKey::create`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "StoredPixKey")]
pub struct PixKey {
    id: PixKeyId,
    key_type: KeyType,
    key_value: String,
    owner_category: OwnerCategory,
    #[serde(flatten)]
    account: AccountDetails,
    created_at: DateTime<Utc>,
    #[serde(default)]
    deactivated_at: Option<DateTime<Utc>>,
}

/// Unchecked wire form of a stored record
#[derive(Deserialize)]
struct StoredPixKey {
    id: PixKeyId,
    key_type: KeyType,
    key_value: String,
    owner_category: OwnerCategory,
    #[serde(flatten)]
    account: AccountDetails,
    created_at: DateTime<Utc>,
    #[serde(default)]
    deactivated_at: Option<DateTime<Utc>>,
}

// The default table accepts every random key any configured grammar accepts.
impl TryFrom<StoredPixKey> for PixKey {
    type Error = PixKeyValidationError;

    fn try_from(stored: StoredPixKey) -> Result<Self, Self::Error> {
        KeyFormatRegistry::default().validate(stored.key_type, &stored.key_value)?;
        validate_account_details(&stored.account)?;

        Ok(Self {
            id: stored.id,
            key_type: stored.key_type,
            key_value: stored.key_value,
            owner_category: stored.owner_category,
            account: stored.account,
            created_at: stored.created_at,
            deactivated_at: stored.deactivated_at,
        })
    }
}

impl PixKey {
    /// Create a new, active key record
    ///
    /// Validates the key value against the grammar of its type, then every
    /// account field. The first violated rule is returned.
    pub fn create(
        formats: &KeyFormatRegistry,
        new_key: NewPixKey,
    ) -> Result<Self, PixKeyValidationError> {
        formats.validate(new_key.key_type, &new_key.key_value)?;
        validate_account_details(&new_key.account)?;

        Ok(Self {
            id: PixKeyId::generate(),
            key_type: new_key.key_type,
            key_value: new_key.key_value,
            owner_category: new_key.owner_category,
            account: new_key.account,
            created_at: Utc::now(),
            deactivated_at: None,
        })
    }

    // Getters

    pub fn id(&self) -> &PixKeyId {
        &self.id
    }

    pub fn key_type(&self) -> KeyType {
        self.key_type
    }

    pub fn key_value(&self) -> &str {
        &self.key_value
    }

    pub fn owner_category(&self) -> OwnerCategory {
        self.owner_category
    }

    pub fn account(&self) -> &AccountDetails {
        &self.account
    }

    pub fn account_type(&self) -> AccountType {
        self.account.account_type
    }

    pub fn branch_number(&self) -> u32 {
        self.account.branch_number
    }

    pub fn account_number(&self) -> u32 {
        self.account.account_number
    }

    pub fn owner_first_name(&self) -> &str {
        &self.account.owner_first_name
    }

    pub fn owner_last_name(&self) -> Option<&str> {
        self.account.owner_last_name.as_deref()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn deactivated_at(&self) -> Option<DateTime<Utc>> {
        self.deactivated_at
    }

    pub fn is_inactive(&self) -> bool {
        self.deactivated_at.is_some()
    }

    pub fn is_active(&self) -> bool {
        !self.is_inactive()
    }

    /// Whether this record is bound to the given branch and account
    pub fn belongs_to(&self, branch_number: u32, account_number: u32) -> bool {
        self.account.branch_number == branch_number
            && self.account.account_number == account_number
    }

    // Mutators

    /// Replace the account and owner fields
    ///
    /// All fields are validated before any is applied, so a rejected update
    /// leaves the record untouched.
    pub fn update_allowed_fields(
        &mut self,
        account: AccountDetails,
    ) -> Result<(), PixKeyValidationError> {
        if self.is_inactive() {
            return Err(PixKeyValidationError::Inactive);
        }

        validate_account_details(&account)?;
        self.account = account;
        Ok(())
    }

    /// Deactivate the record; it can never be mutated again
    pub fn deactivate(&mut self) -> Result<(), PixKeyValidationError> {
        if self.is_inactive() {
            return Err(PixKeyValidationError::Inactive);
        }

        self.deactivated_at = Some(Utc::now());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::pix_key::format::FormatViolation;

    fn details() -> AccountDetails {
        AccountDetails {
            account_type: AccountType::Checking,
            branch_number: 1234,
            account_number: 12345678,
            owner_first_name: "Maria".to_string(),
            owner_last_name: Some("Silva".to_string()),
        }
    }

    fn new_key() -> NewPixKey {
        NewPixKey {
            key_type: KeyType::DocumentIndividual,
            key_value: "11144477735".to_string(),
            owner_category: OwnerCategory::Individual,
            account: details(),
        }
    }

    #[test]
    fn test_create_round_trips_every_field() {
        let before = Utc::now();
        let key = PixKey::create(&KeyFormatRegistry::default(), new_key()).unwrap();

        assert_eq!(key.key_type(), KeyType::DocumentIndividual);
        assert_eq!(key.key_value(), "11144477735");
        assert_eq!(key.owner_category(), OwnerCategory::Individual);
        assert_eq!(key.account_type(), AccountType::Checking);
        assert_eq!(key.branch_number(), 1234);
        assert_eq!(key.account_number(), 12345678);
        assert_eq!(key.owner_first_name(), "Maria");
        assert_eq!(key.owner_last_name(), Some("Silva"));
        assert!(key.created_at() >= before);
        assert!(key.deactivated_at().is_none());
        assert!(key.is_active());
    }

    #[test]
    fn test_create_generates_unique_ids() {
        let formats = KeyFormatRegistry::default();
        let a = PixKey::create(&formats, new_key()).unwrap();
        let b = PixKey::create(&formats, new_key()).unwrap();
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn test_create_rejects_bad_key_value_first() {
        let mut input = new_key();
        input.key_value = "11144477700".to_string();
        input.account.owner_first_name = String::new();

        let err = PixKey::create(&KeyFormatRegistry::default(), input).unwrap_err();
        match err {
            PixKeyValidationError::Format(e) => {
                assert_eq!(e.key_type, KeyType::DocumentIndividual);
                assert_eq!(e.violation, FormatViolation::CheckDigitMismatch);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_create_rejects_field_violation() {
        let mut input = new_key();
        input.account.branch_number = 12345;

        let err = PixKey::create(&KeyFormatRegistry::default(), input).unwrap_err();
        assert_eq!(
            err,
            PixKeyValidationError::Field(FieldValidationError::BranchNumberTooLong(4))
        );
    }

    #[test]
    fn test_update_allowed_fields() {
        let mut key = PixKey::create(&KeyFormatRegistry::default(), new_key()).unwrap();

        let update = AccountDetails {
            account_type: AccountType::Savings,
            branch_number: 1,
            account_number: 99,
            owner_first_name: "Joana".to_string(),
            owner_last_name: None,
        };
        key.update_allowed_fields(update.clone()).unwrap();

        assert_eq!(key.account(), &update);
        assert_eq!(key.key_value(), "11144477735");
        assert_eq!(key.key_type(), KeyType::DocumentIndividual);
    }

    #[test]
    fn test_update_is_all_or_nothing() {
        let mut key = PixKey::create(&KeyFormatRegistry::default(), new_key()).unwrap();
        let original = key.clone();

        let update = AccountDetails {
            account_type: AccountType::Savings,
            branch_number: 42,
            account_number: 123456789,
            owner_first_name: "Joana".to_string(),
            owner_last_name: None,
        };
        let err = key.update_allowed_fields(update).unwrap_err();

        assert_eq!(
            err,
            PixKeyValidationError::Field(FieldValidationError::AccountNumberTooLong(8))
        );
        assert_eq!(key, original);
    }

    #[test]
    fn test_inactive_record_cannot_be_updated() {
        let mut key = PixKey::create(&KeyFormatRegistry::default(), new_key()).unwrap();
        key.deactivate().unwrap();

        assert!(key.is_inactive());
        assert_eq!(
            key.update_allowed_fields(details()),
            Err(PixKeyValidationError::Inactive)
        );

        let mut invalid = details();
        invalid.owner_first_name = String::new();
        assert_eq!(
            key.update_allowed_fields(invalid),
            Err(PixKeyValidationError::Inactive)
        );
    }

    #[test]
    fn test_deactivate_keeps_first_timestamp() {
        let mut key = PixKey::create(&KeyFormatRegistry::default(), new_key()).unwrap();
        key.deactivate().unwrap();
        let first = key.deactivated_at();

        assert_eq!(key.deactivate(), Err(PixKeyValidationError::Inactive));
        assert_eq!(key.deactivated_at(), first);
    }

    #[test]
    fn test_enum_parsing() {
        assert_eq!("cpf".parse::<KeyType>().unwrap(), KeyType::DocumentIndividual);
        assert_eq!(
            " document_business ".parse::<KeyType>().unwrap(),
            KeyType::DocumentBusiness
        );
        assert_eq!("celular".parse::<KeyType>().unwrap(), KeyType::Phone);
        assert!("pix".parse::<KeyType>().is_err());

        assert_eq!("corrente".parse::<AccountType>().unwrap(), AccountType::Checking);
        assert_eq!("SAVINGS".parse::<AccountType>().unwrap(), AccountType::Savings);
        assert_eq!(
            "salary".parse::<AccountType>(),
            Err(FieldValidationError::InvalidAccountType("salary".to_string()))
        );

        assert_eq!(
            "pessoa_juridica".parse::<OwnerCategory>().unwrap(),
            OwnerCategory::Business
        );
    }

    #[test]
    fn test_serde_shape() {
        let key = PixKey::create(&KeyFormatRegistry::default(), new_key()).unwrap();
        let json = serde_json::to_value(&key).unwrap();

        assert_eq!(json["key_type"], "DOCUMENT_INDIVIDUAL");
        assert_eq!(json["account_type"], "CHECKING");
        assert_eq!(json["owner_category"], "INDIVIDUAL");
        assert_eq!(json["branch_number"], 1234);
        assert!(json["deactivated_at"].is_null());

        let back: PixKey = serde_json::from_value(json).unwrap();
        assert_eq!(back, key);
    }

    #[test]
    fn test_deserialize_rejects_broken_record() {
        let key = PixKey::create(&KeyFormatRegistry::default(), new_key()).unwrap();

        let mut json = serde_json::to_value(&key).unwrap();
        json["key_value"] = "xx".into();
        let err = serde_json::from_value::<PixKey>(json).unwrap_err();
        assert!(err.to_string().contains("DOCUMENT_INDIVIDUAL"));

        let mut json = serde_json::to_value(&key).unwrap();
        json["branch_number"] = 99999.into();
        let err = serde_json::from_value::<PixKey>(json).unwrap_err();
        assert!(err.to_string().contains("Branch number"));

        let mut json = serde_json::to_value(&key).unwrap();
        json["owner_first_name"] = "".into();
        assert!(serde_json::from_value::<PixKey>(json).is_err());
    }

    #[test]
    fn test_id_parse() {
        let id = PixKeyId::generate();
        assert_eq!(id.to_string().parse::<PixKeyId>().unwrap(), id);
        assert!("not-a-uuid".parse::<PixKeyId>().is_err());
        assert!(matches!(
            PixKeyId::parse("not-a-uuid"),
            Err(DomainError::InvalidId { .. })
        ));
    }
}
