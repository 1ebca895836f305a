//! Inbound XML-RPC pingback endpoint.

use std::sync::Arc;

use axum::body::to_bytes;
use axum::extract::{Request, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use moonglade_events::bus::event_types;
use moonglade_events::{EventBus, PlatformEvent};
use moonglade_pingback::ReceivePingCommand;
use serde_json::json;

use crate::middleware::client_ip::ClientIp;
use crate::pingback_result::PingbackResult;
use crate::state::AppState;

/// Largest XML-RPC body accepted. A ping carries two URLs.
const MAX_BODY_BYTES: usize = 64 * 1024;

/// POST /pingback (also /api/v1/pingback)
///
/// Validates and records a `pingback.ping` call. The body is only read once
/// receiving is enabled.
pub async fn receive(
    State(state): State<AppState>,
    ClientIp(client_ip): ClientIp,
    request: Request,
) -> Response {
    if !state.config.pingback.receive_enabled {
        tracing::info!(client_ip = %client_ip, "Pingback receive is disabled, rejecting");
        return StatusCode::FORBIDDEN.into_response();
    }

    let request_body = match to_bytes(request.into_body(), MAX_BODY_BYTES).await {
        Ok(bytes) => match String::from_utf8(bytes.to_vec()) {
            Ok(body) => body,
            Err(_) => {
                tracing::warn!(client_ip = %client_ip, "Pingback body is not UTF-8");
                return StatusCode::BAD_REQUEST.into_response();
            }
        },
        Err(e) => {
            tracing::warn!(client_ip = %client_ip, error = %e, "Failed to read pingback body");
            return StatusCode::BAD_REQUEST.into_response();
        }
    };

    let bus = Arc::clone(&state.event_bus);
    let response = state
        .pingback_receiver
        .handle_with(
            ReceivePingCommand {
                request_body,
                client_ip: client_ip.clone(),
            },
            move |pingback| publish_received(&bus, pingback),
        )
        .await;

    let status = response.status();
    tracing::info!(client_ip = %client_ip, status = %status, "Pingback processed");
    PingbackResult(status).into_response()
}

fn publish_received(bus: &EventBus, pingback: &moonglade_db::models::pingback::Pingback) {
    bus.publish(
        PlatformEvent::new(event_types::PINGBACK_RECEIVED)
            .with_source("pingback", pingback.id)
            .with_payload(json!({
                "target_post_id": pingback.target_post_id,
                "target_post_title": pingback.target_post_title,
                "source_url": pingback.source_url,
                "source_title": pingback.source_title,
                "domain": pingback.domain,
                "source_ip": pingback.source_ip,
            })),
    );
}
