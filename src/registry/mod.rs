//! In-memory registries shared between request handlers.
//!
//! Each registry is a cheaply cloneable handle around a single mutex, so
//! inserts and removals on the same registry never interleave.

pub mod bots;
pub mod pages;

pub use bots::{BotRecord, BotRegistry};
pub use pages::PageRegistry;
