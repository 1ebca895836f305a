use std::sync::Arc;

use moonglade_events::EventBus;
use moonglade_pingback::{PingbackSender, ReceivePingHandler};

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable: inner data is behind `Arc` or is already `Clone`.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: moonglade_db::DbPool,
    pub config: Arc<ServerConfig>,
    /// Centralized event bus for publishing platform events.
    pub event_bus: Arc<EventBus>,
    /// Inbound ping validation and recording.
    pub pingback_receiver: Arc<ReceivePingHandler>,
    /// Outbound ping delivery.
    pub pingback_sender: PingbackSender,
}
