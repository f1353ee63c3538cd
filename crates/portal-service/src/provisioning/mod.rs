//! AAA provisioning engine.

pub mod report;
pub mod service;

pub use report::{BatchReport, UserProvisionError};
pub use service::ProvisioningService;
