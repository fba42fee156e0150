//! Key registry
//!
//! Validation and business rules for instant-payment key records:
//! - Per-type key grammars (individual and business documents, e-mail,
//!   phone, random token)
//! - Account and owner field invariants
//! - Registration with global uniqueness and per-account quotas
//! - Alteration, deactivation and lookup of existing records

pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;
