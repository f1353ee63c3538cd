//! # portal-entity
//!
//! Domain entity models for the NetGate portal control plane. Every struct
//! in this crate represents a database table row or a domain value object.
//! All entities derive `Debug`, `Clone`, `Serialize`, `Deserialize`, and
//! database entities additionally derive `sqlx::FromRow`.

pub mod alert;
pub mod history;
pub mod profile;
pub mod promotion;
pub mod radius;
pub mod usage;
pub mod user;
