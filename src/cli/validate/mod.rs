//! Validate command - checks one key value against its grammar

use clap::Args;
use tracing::info;

use crate::domain::pix_key::{KeyFormatRegistry, KeyType, RandomKeyGrammar};
use crate::domain::DomainError;

/// Arguments for the validate command
#[derive(Args, Clone)]
pub struct ValidateArgs {
    /// Key type (DOCUMENT_INDIVIDUAL, DOCUMENT_BUSINESS, EMAIL, PHONE, RANDOM)
    #[arg(long, short = 't')]
    pub key_type: KeyType,

    /// Require random keys to be exactly 36 characters (overrides config)
    #[arg(long)]
    pub exact_random: bool,

    /// Value to check
    pub value: String,
}

/// Run the validate command
pub async fn run(args: ValidateArgs) -> anyhow::Result<()> {
    let config = super::bootstrap()?;

    let grammar = if args.exact_random {
        RandomKeyGrammar::Exact
    } else {
        config.registry.random_key_grammar
    };

    match check(&KeyFormatRegistry::new(grammar), args.key_type, &args.value) {
        Ok(()) => {
            info!(key_type = %args.key_type, "Key value is valid");
            println!("valid");
            Ok(())
        }
        Err(e) => anyhow::bail!("[{}] {}", e.code(), e),
    }
}

fn check(formats: &KeyFormatRegistry, key_type: KeyType, value: &str) -> Result<(), DomainError> {
    formats.validate(key_type, value).map_err(DomainError::from)
}
