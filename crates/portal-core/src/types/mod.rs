//! Shared types used across the portal crates.

pub mod pagination;
pub mod window;

pub use window::QuotaWindow;
