//! Usage ledger domain entities.

pub mod accounting;
pub mod model;

pub use accounting::AccountingUpdate;
pub use model::{UsageLedger, UsageSnapshot};
