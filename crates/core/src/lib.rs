//! Moonglade domain core.
//!
//! Shared types, the domain error enum, and the protocol primitives of the
//! pingback subsystem. This crate performs no I/O; the database, HTTP and
//! event layers build on it.

pub mod error;
pub mod keyed_lock;
pub mod pingback;
pub mod types;
