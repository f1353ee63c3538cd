//! Promotion domain entities.

pub mod model;

pub use model::{CreatePromotion, Promotion};
