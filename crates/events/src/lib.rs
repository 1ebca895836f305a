//! Moonglade event bus and audit trail.
//!
//! - [`EventBus`] -- in-process publish/subscribe hub backed by
//!   `tokio::sync::broadcast`.
//! - [`PlatformEvent`] -- the domain event envelope.
//! - [`AuditSink`] -- background service that appends every event to the
//!   `audit_log` table.

pub mod audit;
pub mod bus;

pub use audit::AuditSink;
pub use bus::{EventBus, PlatformEvent};
