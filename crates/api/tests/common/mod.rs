//! Shared helpers for the HTTP integration tests.
//!
//! Builds the production router over a test database, with the remote-HTTP
//! seams (source inspection, outbound transport) replaced by in-memory fakes.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, Response};
use axum::Router;
use chrono::{TimeZone, Utc};
use http_body_util::BodyExt;
use moonglade_api::auth::jwt::{generate_access_token, JwtConfig};
use moonglade_api::config::{PingbackSettings, ServerConfig};
use moonglade_api::router::build_app_router;
use moonglade_api::state::AppState;
use moonglade_core::pingback::{xmlrpc, PingRequest};
use moonglade_events::EventBus;
use moonglade_pingback::sender::SendError;
use moonglade_pingback::{
    InspectionError, PgPingbackStore, PingbackSender, PingbackTransport, ReceivePingHandler,
    SourceInspector,
};
use sqlx::PgPool;
use tower::ServiceExt;
use url::Url;
use uuid::Uuid;

pub const CANONICAL_PREFIX: &str = "https://blog.example";
pub const TARGET_URL: &str = "https://blog.example/post/2020/5/1/hello-world";
pub const SOURCE_URL: &str = "https://a.example/p";
pub const CLIENT_IP: &str = "203.0.113.9";

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:3000".to_string()],
        request_timeout_secs: 30,
        canonical_prefix: CANONICAL_PREFIX.to_string(),
        // Requests carry their client address in X-Forwarded-For.
        trust_proxy_headers: true,
        pingback: PingbackSettings {
            receive_enabled: true,
            send_enabled: true,
            timeout_secs: 5,
        },
        jwt: JwtConfig {
            secret: "test-secret-that-is-long-enough-for-hmac".to_string(),
            access_token_expiry_mins: 15,
        },
    }
}

// ---------------------------------------------------------------------------
// Fakes
// ---------------------------------------------------------------------------

/// Serves canned HTML per source URL; unknown sources are unreachable.
#[derive(Default)]
pub struct CannedSources {
    pages: HashMap<String, String>,
}

impl CannedSources {
    pub fn with_page(mut self, url: &str, html: &str) -> Self {
        self.pages.insert(url.to_string(), html.to_string());
        self
    }
}

#[async_trait]
impl SourceInspector for CannedSources {
    async fn examine_source(
        &self,
        source_url: &str,
        target_url: &str,
    ) -> Result<PingRequest, InspectionError> {
        let html = self
            .pages
            .get(source_url)
            .ok_or_else(|| InspectionError::Unreachable {
                url: source_url.to_string(),
                reason: "no such page".to_string(),
            })?;
        Ok(PingRequest::from_source_html(source_url, target_url, html))
    }
}

/// Every target advertises `https://remote.example/xmlrpc`; pings are recorded.
#[derive(Default)]
pub struct RecordingTransport {
    pub pinged: Mutex<Vec<(String, String)>>,
}

pub const REMOTE_ENDPOINT: &str = "https://remote.example/xmlrpc";

#[async_trait]
impl PingbackTransport for RecordingTransport {
    async fn discover_endpoint(&self, _target: &Url) -> Result<Option<String>, SendError> {
        Ok(Some(REMOTE_ENDPOINT.to_string()))
    }

    async fn send_ping(
        &self,
        _endpoint: &Url,
        source_url: &str,
        target_url: &str,
    ) -> Result<(), SendError> {
        self.pinged
            .lock()
            .unwrap()
            .push((source_url.to_string(), target_url.to_string()));
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// App
// ---------------------------------------------------------------------------

pub struct TestApp {
    pub router: Router,
    pub config: ServerConfig,
    pub event_bus: Arc<EventBus>,
    pub transport: Arc<RecordingTransport>,
}

impl TestApp {
    pub fn admin_token(&self) -> String {
        generate_access_token("editor", "admin", &self.config.jwt).unwrap()
    }

    pub fn token_with_role(&self, role: &str) -> String {
        generate_access_token("someone", role, &self.config.jwt).unwrap()
    }
}

/// Source page that links to [`TARGET_URL`].
pub fn linking_page() -> String {
    format!("<html><head><title>A post</title></head><body><a href=\"{TARGET_URL}\">x</a></body></html>")
}

/// Router over `pool` with the default config and a linking page at
/// [`SOURCE_URL`].
pub fn build_test_app(pool: PgPool) -> TestApp {
    build_test_app_with(
        pool,
        test_config(),
        CannedSources::default().with_page(SOURCE_URL, &linking_page()),
    )
}

pub fn build_test_app_with(pool: PgPool, config: ServerConfig, sources: CannedSources) -> TestApp {
    let event_bus = Arc::new(EventBus::default());
    let transport = Arc::new(RecordingTransport::default());

    let state = AppState {
        pool: pool.clone(),
        config: Arc::new(config.clone()),
        event_bus: Arc::clone(&event_bus),
        pingback_receiver: Arc::new(ReceivePingHandler::new(
            Arc::new(sources),
            Arc::new(PgPingbackStore::new(pool)),
        )),
        pingback_sender: PingbackSender::new(transport.clone()),
    };

    TestApp {
        router: build_app_router(state, &config),
        config,
        event_bus,
        transport,
    }
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// Insert a post published on 2020-05-01 and return its id.
pub async fn insert_post(pool: &PgPool, slug: &str, content: &str, published: bool) -> Uuid {
    let id = Uuid::new_v4();
    sqlx::query(
        "INSERT INTO posts (id, title, slug, post_content, is_published, pub_date_utc) \
         VALUES ($1, $2, $3, $4, $5, $6)",
    )
    .bind(id)
    .bind("Hello")
    .bind(slug)
    .bind(content)
    .bind(published)
    .bind(Utc.with_ymd_and_hms(2020, 5, 1, 9, 0, 0).unwrap())
    .execute(pool)
    .await
    .unwrap();
    id
}

pub fn ping_body(source: &str, target: &str) -> String {
    xmlrpc::build_ping_call(source, target)
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

pub async fn send(app: &TestApp, request: Request<Body>) -> Response<Body> {
    app.router.clone().oneshot(request).await.unwrap()
}

pub async fn post_ping(app: &TestApp, uri: &str, body: String, client_ip: &str) -> Response<Body> {
    post_ping_bytes(app, uri, body.into_bytes(), client_ip).await
}

pub async fn post_ping_bytes(
    app: &TestApp,
    uri: &str,
    body: Vec<u8>,
    client_ip: &str,
) -> Response<Body> {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "text/xml")
        .header("x-forwarded-for", client_ip)
        .body(Body::from(body))
        .unwrap();
    send(app, request).await
}

pub async fn get(app: &TestApp, uri: &str, token: Option<&str>) -> Response<Body> {
    send(app, authed("GET", uri, token)).await
}

pub async fn delete(app: &TestApp, uri: &str, token: Option<&str>) -> Response<Body> {
    send(app, authed("DELETE", uri, token)).await
}

pub async fn post_empty(app: &TestApp, uri: &str, token: Option<&str>) -> Response<Body> {
    send(app, authed("POST", uri, token)).await
}

fn authed(method: &str, uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    builder.body(Body::empty()).unwrap()
}

pub async fn body_text(response: Response<Body>) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
