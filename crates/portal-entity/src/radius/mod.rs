//! AAA (FreeRADIUS-style) row entities.

pub mod model;

pub use model::{
    AaaEntrySet, AaaValues, RadCheck, RadReply, RadUserGroup, ATTR_CLEARTEXT_PASSWORD,
    ATTR_IDLE_TIMEOUT, ATTR_RATE_LIMIT, ATTR_SESSION_TIMEOUT, ATTR_SIMULTANEOUS_USE, OP_SET,
};
