//! Request extractors shared by handlers.
//!
//! - [`auth::AuthUser`] -- Extracts the caller from a JWT Bearer token.
//! - [`rbac::RequireAdmin`] -- Requires the `admin` role.
//! - [`client_ip::ClientIp`] -- Resolves the remote address of the caller.

pub mod auth;
pub mod client_ip;
pub mod rbac;
