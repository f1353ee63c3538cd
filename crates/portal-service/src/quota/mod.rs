//! Quota ledger.

pub mod service;

pub use service::{ExceededUser, QuotaService};
