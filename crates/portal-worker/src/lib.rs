//! Scheduled background tasks for the NetGate portal.
//!
//! This crate provides a cron scheduler that drives the periodic
//! control-plane work: quota window resets at their boundaries, the
//! alert sweep, and the enforcement sweep that deprovisions users who
//! have exhausted a window limit.

pub mod scheduler;

pub use scheduler::CronScheduler;
