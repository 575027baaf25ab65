//! Infrastructure layer
//!
//! Implementations of the event-source port and other external concerns
//! such as the database pool.

pub mod database;
pub mod event_repository;
pub mod in_memory;
pub mod log_messages;

pub use database::*;
pub use event_repository::PgEventWindowLoader;
pub use in_memory::{InMemoryEventLoader, OwnedEvent};
