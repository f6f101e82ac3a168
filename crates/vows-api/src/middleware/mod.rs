/// Middleware modules
pub mod logging;

pub use logging::{Correlation, logging_middleware};
