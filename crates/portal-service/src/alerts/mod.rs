//! Quota alert evaluation and delivery.

pub mod evaluator;
pub mod notifier;
pub mod template;

pub use evaluator::AlertEvaluator;
pub use notifier::{ChannelNotifier, Notifier};
