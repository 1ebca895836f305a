//! Pingback protocol primitives.
//!
//! - [`status`] -- the terminal outcomes of an inbound ping and their
//!   XML-RPC fault codes.
//! - [`xmlrpc`] -- parsing `pingback.ping` calls and building XML-RPC bodies.
//! - [`route`] -- mapping post URLs to `(slug, publish date)` and back.
//! - [`source`] -- analysing a fetched source page (title, spam, link).
//! - [`links`] -- extracting outbound link candidates from post content.

pub mod links;
pub mod route;
pub mod source;
pub mod status;
pub mod xmlrpc;

pub use route::PostRoute;
pub use source::PingRequest;
pub use status::PingbackStatus;
