//! User domain entities (network-access fields).

pub mod access;
pub mod model;

pub use access::AccessState;
pub use model::{MemberAccess, User};
