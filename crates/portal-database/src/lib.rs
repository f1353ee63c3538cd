//! # portal-database
//!
//! PostgreSQL connection management and concrete repository
//! implementations for the portal directory, the usage ledger, and the
//! AAA (FreeRADIUS-style) tables.

pub mod connection;
pub mod migration;
pub mod repositories;

pub use connection::DatabasePool;
