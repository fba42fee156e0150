//! CLI module for the key registry
//!
//! Operator subcommands:
//! - `validate`: check a single key value against its type's grammar
//! - `batch`: run a file of registry operations against an in-memory registry

pub mod batch;
pub mod validate;

use anyhow::Context;
use clap::{Parser, Subcommand};

use crate::config::AppConfig;
use crate::infrastructure::logging;

/// Key registry - validation and business rules for payment-key records
#[derive(Parser)]
#[command(name = "pix-key-registry")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Validate one key value
    Validate(validate::ValidateArgs),

    /// Process a JSON-lines file of registry operations
    Batch(batch::BatchArgs),
}

/// Load `.env` and configuration, then install logging
pub(crate) fn bootstrap() -> anyhow::Result<AppConfig> {
    dotenvy::dotenv().ok();

    let config = AppConfig::load().context("Failed to load configuration")?;
    logging::init_logging(&config.logging);

    Ok(config)
}
