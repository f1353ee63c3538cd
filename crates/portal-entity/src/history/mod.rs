//! Profile assignment history entities.

pub mod model;

pub use model::{ProfileChangeKind, ProfileHistoryEntry};
