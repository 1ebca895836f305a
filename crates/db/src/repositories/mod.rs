//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that
//! accept `&PgPool` as the first argument.

pub mod audit_repo;
pub mod pingback_repo;
pub mod post_repo;

pub use audit_repo::AuditRepo;
pub use pingback_repo::PingbackRepo;
pub use post_repo::PostRepo;
