/// Data models for the wedding site functions
pub mod comment;
pub mod contact;
pub mod events;
pub mod item;
pub mod mail;
pub mod page;
pub mod subscription;

// Re-export commonly used types
pub use comment::*;
pub use contact::*;
pub use events::*;
pub use item::*;
pub use mail::*;
pub use page::*;
pub use subscription::*;
