//! Read access to the audit log written by the event sink.

use axum::extract::{Query, State};
use axum::response::IntoResponse;
use axum::Json;
use moonglade_db::repositories::AuditRepo;
use serde::Deserialize;

use crate::error::AppResult;
use crate::middleware::rbac::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct AuditListParams {
    pub limit: Option<i64>,
}

/// GET /api/v1/admin/audit
///
/// Most recent audit entries, newest first.
pub async fn list_audit_entries(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Query(params): Query<AuditListParams>,
) -> AppResult<impl IntoResponse> {
    let entries = AuditRepo::list_recent(&state.pool, params.limit).await?;
    Ok(Json(DataResponse { data: entries }))
}
