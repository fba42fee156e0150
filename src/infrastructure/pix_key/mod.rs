//! Key record use cases and adapters

mod alteration_service;
mod in_memory;
mod query_service;
mod registration_service;
mod services;

pub use alteration_service::{AlterPixKeyRequest, AlterationService};
pub use in_memory::InMemoryPixKeyRepository;
pub use query_service::{PixKeyLookup, QueryService};
pub use registration_service::RegistrationService;
pub use services::PixKeyServices;
