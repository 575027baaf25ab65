//! Domain types and business logic
//!
//! Nothing in here performs I/O or holds shared state.

pub mod breeding;
pub mod identifiers;

pub use breeding::*;
pub use identifiers::{CattleId, OwnerId};
