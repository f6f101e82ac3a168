/// Vows Core - Shared library for the wedding site serverless functions
///
/// This crate contains the models, configuration, pagination protocol,
/// response envelope and collaborator services used by the API and worker
/// Lambda functions.
pub mod config;
pub mod constants;
pub mod cursor;
pub mod envelope;
pub mod error;
pub mod listing;
pub mod models;
pub mod services;
pub mod utils;

// Re-export commonly used types
pub use config::SiteConfig;
pub use envelope::{CorrelationIds, Envelope, ErrorCode};
pub use error::VowsError;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
