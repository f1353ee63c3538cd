//! Profile domain entities.

pub mod model;
pub mod quota;

pub use model::{CreateProfile, Profile};
pub use quota::QuotaMode;
