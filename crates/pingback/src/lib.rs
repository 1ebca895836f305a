//! Pingback reception and sending.
//!
//! - [`inspector`] -- fetches a pingback source and analyses it.
//! - [`receiver`] -- the `ReceivePingCommand` handler: one validation state
//!   machine from raw XML-RPC body to [`PingbackResponse`].
//! - [`sender`] -- discovers pingback endpoints behind the links of a post
//!   and notifies them.
//! - [`store`] -- the persistence seam of the receiver and its Postgres
//!   implementation.

pub mod client;
pub mod inspector;
pub mod receiver;
pub mod sender;
pub mod store;

pub use inspector::{HttpSourceInspector, InspectionError, SourceInspector};
pub use receiver::{PingbackResponse, ReceivePingCommand, ReceivePingHandler};
pub use sender::{HttpPingbackTransport, PingbackSender, PingbackTransport, SendReport};
pub use store::{PgPingbackStore, PingbackStore, StoreError};
