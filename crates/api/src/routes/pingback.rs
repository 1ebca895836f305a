use axum::routing::post;
use axum::Router;

use crate::handlers::pingback;
use crate::state::AppState;

/// Inbound ping endpoint. Mounted both at the root (the advertised
/// `X-Pingback` URL) and under `/api/v1`.
pub fn router() -> Router<AppState> {
    Router::new().route("/pingback", post(pingback::receive))
}
