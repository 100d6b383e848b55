//! Session persistence: the on-disk record of a generation run (§6).

pub mod persistence;

pub use persistence::{SessionError, SessionStore};
