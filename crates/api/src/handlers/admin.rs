//! Admin handlers for managing received pingbacks and sending outbound ones.
//!
//! All endpoints require the `admin` role via [`RequireAdmin`].

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use moonglade_core::error::CoreError;
use moonglade_core::pingback::PostRoute;
use moonglade_core::types::DbId;
use moonglade_db::repositories::{PingbackRepo, PostRepo};
use moonglade_events::bus::event_types;
use moonglade_events::PlatformEvent;
use serde::Serialize;
use serde_json::json;

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct ClearedPingbacks {
    pub removed: u64,
}

#[derive(Debug, Serialize)]
pub struct SendAccepted {
    pub post_id: DbId,
    pub post_url: String,
}

// ---------------------------------------------------------------------------
// Received pingbacks
// ---------------------------------------------------------------------------

/// GET /api/v1/admin/pingbacks
///
/// All recorded pingbacks, newest first.
pub async fn list_pingbacks(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let pingbacks = PingbackRepo::list(&state.pool).await?;
    Ok(Json(DataResponse { data: pingbacks }))
}

/// DELETE /api/v1/admin/pingbacks/{id}
pub async fn delete_pingback(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(pingback_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    if !PingbackRepo::delete(&state.pool, pingback_id).await? {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "Pingback",
            id: pingback_id,
        }));
    }

    tracing::info!(%pingback_id, admin = %admin.subject, "Pingback deleted");
    state.event_bus.publish(
        PlatformEvent::new(event_types::PINGBACK_DELETED)
            .with_source("pingback", pingback_id)
            .with_actor(admin.subject),
    );

    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /api/v1/admin/pingbacks
///
/// Remove every recorded pingback.
pub async fn clear_pingbacks(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let removed = PingbackRepo::clear(&state.pool).await?;

    tracing::info!(removed, admin = %admin.subject, "Pingbacks cleared");
    state.event_bus.publish(
        PlatformEvent::new(event_types::PINGBACK_CLEARED)
            .with_actor(admin.subject)
            .with_payload(json!({ "removed": removed })),
    );

    Ok(Json(DataResponse {
        data: ClearedPingbacks { removed },
    }))
}

// ---------------------------------------------------------------------------
// Outbound
// ---------------------------------------------------------------------------

/// POST /api/v1/admin/posts/{id}/pingback
///
/// Notify every site the post links to. Sending runs in the background; the
/// response only confirms it was scheduled.
pub async fn send_for_post(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(post_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    if !state.config.pingback.send_enabled {
        return Err(AppError::Core(CoreError::Conflict(
            "Pingback sending is disabled".into(),
        )));
    }

    let post = PostRepo::find_published_by_id(&state.pool, post_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Post",
            id: post_id,
        }))?;

    let post_url = PostRoute {
        slug: post.slug,
        pub_date: post.pub_date_utc.date_naive(),
    }
    .to_url(&state.config.canonical_prefix);

    tracing::info!(%post_id, %post_url, admin = %admin.subject, "Scheduling outbound pingbacks");
    state.event_bus.publish(
        PlatformEvent::new(event_types::PINGBACK_SEND_REQUESTED)
            .with_source("post", post_id)
            .with_actor(admin.subject)
            .with_payload(json!({ "post_url": post_url })),
    );

    let sender = state.pingback_sender.clone();
    let url = post_url.clone();
    let content = post.post_content;
    tokio::spawn(async move {
        sender.try_send_ping(&url, &content).await;
    });

    Ok((
        StatusCode::ACCEPTED,
        Json(DataResponse {
            data: SendAccepted { post_id, post_url },
        }),
    ))
}
