//! Domain layer - entities, value grammars and ports

pub mod error;
pub mod pix_key;

pub use error::DomainError;
