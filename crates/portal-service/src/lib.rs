//! # portal-service
//!
//! Control-plane service layer for the NetGate portal. Each service
//! orchestrates repositories to implement one part of the access
//! pipeline: profile resolution, AAA provisioning, quota metering,
//! alert evaluation, and the profile-change audit trail.
//!
//! Services follow constructor injection — all dependencies are provided
//! at construction time via `Arc` references.

pub mod alerts;
pub mod directory;
pub mod history;
pub mod provisioning;
pub mod quota;
pub mod resolver;

pub use alerts::{AlertEvaluator, ChannelNotifier, Notifier};
pub use directory::DirectoryService;
pub use history::HistoryRecorder;
pub use provisioning::{BatchReport, ProvisioningService};
pub use quota::QuotaService;
pub use resolver::ProfileResolver;
