//! Quota alert domain entities.

pub mod model;

pub use model::{AlertChannel, AlertRule, TriggeredAlert};
