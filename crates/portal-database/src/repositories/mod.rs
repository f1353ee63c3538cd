//! Concrete repository implementations, one per aggregate.

pub mod alert;
pub mod history;
pub mod profile;
pub mod promotion;
pub mod radius;
pub mod usage;
pub mod user;
