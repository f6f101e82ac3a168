/// Vows Worker - queue-event Lambda
///
/// Fans new comments out to photo subscribers and sends queued mail.
pub mod context;
pub mod handlers;

pub use context::WorkerContext;
pub use handlers::handler;
