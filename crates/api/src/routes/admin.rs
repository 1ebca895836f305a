use axum::routing::{delete, get, post};
use axum::Router;

use crate::handlers::{admin, audit};
use crate::state::AppState;

/// Admin routes mounted at `/admin`.
///
/// All routes require the `admin` role (enforced by handler extractors).
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/pingbacks",
            get(admin::list_pingbacks).delete(admin::clear_pingbacks),
        )
        .route("/pingbacks/{id}", delete(admin::delete_pingback))
        .route("/posts/{id}/pingback", post(admin::send_for_post))
        .route("/audit", get(audit::list_audit_entries))
}
