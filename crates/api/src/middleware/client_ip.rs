//! Remote address of the caller.
//!
//! The socket peer address (recorded by
//! `into_make_service_with_connect_info`) is used by default. Forwarded
//! headers are only consulted when `trust_proxy_headers` is enabled: a
//! direct caller can put anything in them, and the address is part of the
//! pingback duplicate key. When trusted, the first `X-Forwarded-For` entry
//! wins, then `X-Real-IP`. Falls back to `"unknown"` so the extractor never
//! rejects.

use std::convert::Infallible;
use std::net::SocketAddr;

use axum::extract::{ConnectInfo, FromRequestParts};
use axum::http::request::Parts;
use axum::http::HeaderMap;

use crate::state::AppState;

pub const UNKNOWN_IP: &str = "unknown";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientIp(pub String);

impl FromRequestParts<AppState> for ClientIp {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let peer = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip().to_string());
        Ok(ClientIp(resolve(
            &parts.headers,
            peer,
            state.config.trust_proxy_headers,
        )))
    }
}

fn resolve(headers: &HeaderMap, peer: Option<String>, trust_headers: bool) -> String {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    };

    let forwarded = if trust_headers {
        header("x-forwarded-for").or_else(|| header("x-real-ip"))
    } else {
        None
    };

    forwarded
        .or(peer)
        .unwrap_or_else(|| UNKNOWN_IP.to_string())
}
