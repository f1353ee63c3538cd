//! # portal-core
//!
//! Core crate for the NetGate portal control plane. Contains configuration
//! schemas, shared types (quota windows, pagination), and the unified
//! error system.
//!
//! This crate has **no** internal dependencies on other portal crates.

pub mod config;
pub mod error;
pub mod result;
pub mod types;

pub use error::AppError;
pub use result::AppResult;
