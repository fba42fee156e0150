//! Infrastructure layer - use-case services, adapters and logging

pub mod logging;
pub mod pix_key;
