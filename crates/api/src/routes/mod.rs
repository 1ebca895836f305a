pub mod admin;
pub mod health;
pub mod pingback;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// ```text
/// POST   /pingback                         inbound XML-RPC ping
///
/// GET    /admin/pingbacks                  list (admin)
/// DELETE /admin/pingbacks                  clear (admin)
/// DELETE /admin/pingbacks/{id}             delete (admin)
/// POST   /admin/posts/{id}/pingback        send outbound pings (admin)
/// GET    /admin/audit                      recent audit entries (admin)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(pingback::router())
        .nest("/admin", admin::router())
}
