//! Inbound pingback reception.
//!
//! [`ReceivePingHandler::handle`] walks one XML-RPC request through the
//! validation steps below and always ends in a [`PingbackResponse`]:
//!
//! 1. empty body -> `GenericError`
//! 2. not a `pingback.ping` call -> `InvalidPingRequest`
//! 3. fewer than two params / malformed XML -> `InvalidPingRequest`
//! 4. source unreachable -> `InvalidPingRequest`; no link -> `Error17`;
//!    markup in title -> `SpamDetectedFakeNotFound`
//! 5. target is not a post permalink -> `GenericError`
//! 6. no such published post -> `Error32`
//! 7. already recorded -> `Error48`
//! 8. persisted -> `Success`
//!
//! Steps 7 and 8 run under a per-key lock so concurrent identical pings
//! inside this process cannot both pass the duplicate check.

use std::sync::Arc;

use chrono::Utc;
use moonglade_core::keyed_lock::KeyedLocks;
use moonglade_core::pingback::route::RouteError;
use moonglade_core::pingback::{links, xmlrpc, PingbackStatus, PostRoute};
use moonglade_core::types::DbId;
use moonglade_db::models::pingback::{CreatePingback, Pingback};
use uuid::Uuid;

use crate::inspector::SourceInspector;
use crate::store::{PingbackStore, StoreError};

/// One inbound ping as received over HTTP.
#[derive(Debug, Clone)]
pub struct ReceivePingCommand {
    pub request_body: String,
    pub client_ip: String,
}

/// Terminal result of [`ReceivePingHandler::handle`].
#[derive(Debug, Clone, PartialEq)]
pub enum PingbackResponse {
    /// The ping was recorded; carries the new row.
    Success(Pingback),
    GenericError,
    InvalidPingRequest,
    Error32TargetUriNotExist,
    Error48PingbackAlreadyRegistered,
    Error17SourceNotContainTargetUri,
    SpamDetectedFakeNotFound,
}

impl PingbackResponse {
    pub fn status(&self) -> PingbackStatus {
        match self {
            PingbackResponse::Success(_) => PingbackStatus::Success,
            PingbackResponse::GenericError => PingbackStatus::GenericError,
            PingbackResponse::InvalidPingRequest => PingbackStatus::InvalidPingRequest,
            PingbackResponse::Error32TargetUriNotExist => PingbackStatus::Error32TargetUriNotExist,
            PingbackResponse::Error48PingbackAlreadyRegistered => {
                PingbackStatus::Error48PingbackAlreadyRegistered
            }
            PingbackResponse::Error17SourceNotContainTargetUri => {
                PingbackStatus::Error17SourceNotContainTargetUri
            }
            PingbackResponse::SpamDetectedFakeNotFound => PingbackStatus::SpamDetectedFakeNotFound,
        }
    }
}

/// Failures that abort reception; all surface as `GenericError`.
#[derive(Debug, thiserror::Error)]
enum ReceiveError {
    #[error(transparent)]
    Route(#[from] RouteError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Lock key: (target post, source URL, trimmed source IP).
type PingKey = (DbId, String, String);

/// Handler for [`ReceivePingCommand`].
pub struct ReceivePingHandler {
    inspector: Arc<dyn SourceInspector>,
    store: Arc<dyn PingbackStore>,
    locks: KeyedLocks<PingKey>,
}

impl ReceivePingHandler {
    pub fn new(inspector: Arc<dyn SourceInspector>, store: Arc<dyn PingbackStore>) -> Self {
        Self {
            inspector,
            store,
            locks: KeyedLocks::new(),
        }
    }

    /// Process a ping without a success hook.
    pub async fn handle(&self, command: ReceivePingCommand) -> PingbackResponse {
        self.handle_with(command, |_| {}).await
    }

    /// Process a ping, calling `on_success` with the recorded row once it
    /// has been persisted.
    pub async fn handle_with<F>(&self, command: ReceivePingCommand, on_success: F) -> PingbackResponse
    where
        F: FnOnce(&Pingback) + Send,
    {
        let client_ip = command.client_ip.trim().to_string();
        match self.process(&command.request_body, &client_ip, on_success).await {
            Ok(response) => response,
            Err(e) => {
                tracing::error!(error = %e, client_ip = %client_ip, "Pingback reception failed");
                PingbackResponse::GenericError
            }
        }
    }

    async fn process<F>(
        &self,
        body: &str,
        client_ip: &str,
        on_success: F,
    ) -> Result<PingbackResponse, ReceiveError>
    where
        F: FnOnce(&Pingback) + Send,
    {
        if body.trim().is_empty() {
            tracing::warn!(client_ip, "Pingback request body is empty");
            return Ok(PingbackResponse::GenericError);
        }

        if !xmlrpc::is_ping_call(body) {
            tracing::warn!(client_ip, "Request is not a pingback.ping call");
            return Ok(PingbackResponse::InvalidPingRequest);
        }

        let params = match xmlrpc::parse_ping_params(body) {
            Ok(params) => params,
            Err(e) => {
                tracing::warn!(client_ip, error = %e, "Invalid pingback.ping params");
                return Ok(PingbackResponse::InvalidPingRequest);
            }
        };
        let source_url = params.source_url.as_str();
        let target_url = params.target_url.as_str();

        tracing::info!(client_ip, source_url, target_url, "Processing pingback");

        let source = match self.inspector.examine_source(source_url, target_url).await {
            Ok(source) => source,
            Err(e) => {
                tracing::warn!(error = %e, "Pingback source could not be inspected");
                return Ok(PingbackResponse::InvalidPingRequest);
            }
        };

        if !source.source_has_link {
            tracing::info!(source_url, target_url, "Pingback source does not link to target");
            return Ok(PingbackResponse::Error17SourceNotContainTargetUri);
        }

        if source.contains_html {
            tracing::warn!(source_url, title = %source.title, "Spam detected in pingback source title");
            return Ok(PingbackResponse::SpamDetectedFakeNotFound);
        }

        let route = PostRoute::from_url(target_url)?;

        let Some(post) = self.store.find_post(&route).await? else {
            tracing::info!(
                slug = %route.slug,
                pub_date = %route.pub_date,
                "Pingback target post not found"
            );
            return Ok(PingbackResponse::Error32TargetUriNotExist);
        };

        let _guard = self
            .locks
            .lock((post.id, source_url.to_string(), client_ip.to_string()))
            .await;

        if self
            .store
            .pingback_exists(post.id, source_url, client_ip)
            .await?
        {
            tracing::info!(post_id = %post.id, source_url, client_ip, "Pingback already registered");
            return Ok(PingbackResponse::Error48PingbackAlreadyRegistered);
        }

        let input = CreatePingback {
            id: Uuid::new_v4(),
            ping_time_utc: Utc::now(),
            domain: links::domain_of(source_url).unwrap_or_default(),
            source_url: source.source_url,
            source_title: source.title,
            target_post_id: post.id,
            target_post_title: post.title,
            source_ip: client_ip.to_string(),
        };
        let pingback = self.store.save_pingback(input).await?;

        tracing::info!(
            pingback_id = %pingback.id,
            post_id = %pingback.target_post_id,
            domain = %pingback.domain,
            "Pingback recorded"
        );
        on_success(&pingback);

        Ok(PingbackResponse::Success(pingback))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use assert_matches::assert_matches;
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use moonglade_core::pingback::PingRequest;
    use moonglade_db::models::post::PostRef;

    use super::*;
    use crate::inspector::InspectionError;

    const SOURCE: &str = "https://a.example/p";
    const TARGET: &str = "https://blog.example/post/2020/5/1/hello-world";

    // -- Fakes ---------------------------------------------------------------

    /// Serves canned HTML for every source and counts fetches.
    struct FakeInspector {
        html: Option<String>,
        calls: AtomicUsize,
    }

    impl FakeInspector {
        fn serving(html: &str) -> Self {
            Self {
                html: Some(html.to_string()),
                calls: AtomicUsize::new(0),
            }
        }

        fn offline() -> Self {
            Self {
                html: None,
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl SourceInspector for FakeInspector {
        async fn examine_source(
            &self,
            source_url: &str,
            target_url: &str,
        ) -> Result<PingRequest, InspectionError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match &self.html {
                Some(html) => Ok(PingRequest::from_source_html(source_url, target_url, html)),
                None => Err(InspectionError::Unreachable {
                    url: source_url.to_string(),
                    reason: "connection refused".into(),
                }),
            }
        }
    }

    #[derive(Default)]
    struct MemoryStore {
        posts: Vec<(String, NaiveDate, PostRef)>,
        pingbacks: Mutex<Vec<Pingback>>,
        fail: bool,
    }

    impl MemoryStore {
        fn with_hello_world() -> (Self, DbId) {
            let id = Uuid::new_v4();
            let store = Self {
                posts: vec![(
                    "hello-world".into(),
                    NaiveDate::from_ymd_opt(2020, 5, 1).unwrap(),
                    PostRef {
                        id,
                        title: "Hello World".into(),
                    },
                )],
                ..Default::default()
            };
            (store, id)
        }

        fn count(&self) -> usize {
            self.pingbacks.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl PingbackStore for MemoryStore {
        async fn find_post(&self, route: &PostRoute) -> Result<Option<PostRef>, StoreError> {
            if self.fail {
                return Err(StoreError::Database(sqlx::Error::PoolTimedOut));
            }
            Ok(self
                .posts
                .iter()
                .find(|(slug, date, _)| *slug == route.slug && *date == route.pub_date)
                .map(|(_, _, post)| post.clone()))
        }

        async fn pingback_exists(
            &self,
            target_post_id: DbId,
            source_url: &str,
            source_ip: &str,
        ) -> Result<bool, StoreError> {
            Ok(self.pingbacks.lock().unwrap().iter().any(|p| {
                p.target_post_id == target_post_id
                    && p.source_url == source_url
                    && p.source_ip.trim() == source_ip
            }))
        }

        async fn save_pingback(&self, input: CreatePingback) -> Result<Pingback, StoreError> {
            let pingback = Pingback::from(input);
            self.pingbacks.lock().unwrap().push(pingback.clone());
            Ok(pingback)
        }
    }

    // -- Helpers -------------------------------------------------------------

    fn ping_body(source: &str, target: &str) -> String {
        format!(
            "<methodCall><methodName>pingback.ping</methodName><params>\
             <param><value><string>{source}</string></value></param>\
             <param><value><string>{target}</string></value></param>\
             </params></methodCall>"
        )
    }

    fn command(body: impl Into<String>) -> ReceivePingCommand {
        ReceivePingCommand {
            request_body: body.into(),
            client_ip: "203.0.113.7".into(),
        }
    }

    fn linking_page(title: &str) -> String {
        format!("<html><head><title>{title}</title></head><body><a href=\"{TARGET}\">hi</a></body></html>")
    }

    fn build(inspector: FakeInspector, store: MemoryStore) -> (ReceivePingHandler, Arc<FakeInspector>, Arc<MemoryStore>) {
        let inspector = Arc::new(inspector);
        let store = Arc::new(store);
        let handler = ReceivePingHandler::new(inspector.clone(), store.clone());
        (handler, inspector, store)
    }

    // -- Tests ---------------------------------------------------------------

    #[tokio::test]
    async fn accepts_valid_ping() {
        let (store, post_id) = MemoryStore::with_hello_world();
        let (handler, _, store) = build(FakeInspector::serving(&linking_page("A post")), store);

        let mut seen = None;
        let response = handler
            .handle_with(command(ping_body(SOURCE, TARGET)), |p| seen = Some(p.id))
            .await;

        let pingback = assert_matches!(response, PingbackResponse::Success(p) => p);
        assert_eq!(pingback.target_post_id, post_id);
        assert_eq!(pingback.target_post_title, "Hello World");
        assert_eq!(pingback.source_title, "A post");
        assert_eq!(pingback.domain, "a.example");
        assert_eq!(pingback.source_ip, "203.0.113.7");
        assert_eq!(seen, Some(pingback.id));
        assert_eq!(store.count(), 1);
    }

    #[tokio::test]
    async fn empty_body_is_generic_error() {
        let (store, _) = MemoryStore::with_hello_world();
        let (handler, inspector, _) = build(FakeInspector::serving(""), store);

        assert_eq!(handler.handle(command("  \n")).await, PingbackResponse::GenericError);
        assert_eq!(inspector.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn non_ping_call_is_rejected_without_network_io() {
        let (store, _) = MemoryStore::with_hello_world();
        let (handler, inspector, _) = build(FakeInspector::serving(&linking_page("x")), store);

        let body = "<methodCall><methodName>weblogUpdates.ping</methodName></methodCall>";
        assert_eq!(handler.handle(command(body)).await, PingbackResponse::InvalidPingRequest);
        assert_eq!(inspector.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn missing_params_are_invalid() {
        let (store, _) = MemoryStore::with_hello_world();
        let (handler, inspector, _) = build(FakeInspector::serving(""), store);

        let body = "<methodCall><methodName>pingback.ping</methodName><params></params></methodCall>";
        assert_eq!(handler.handle(command(body)).await, PingbackResponse::InvalidPingRequest);
        assert_eq!(inspector.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn unreachable_source_is_invalid() {
        let (store, _) = MemoryStore::with_hello_world();
        let (handler, _, store) = build(FakeInspector::offline(), store);

        assert_eq!(
            handler.handle(command(ping_body(SOURCE, TARGET))).await,
            PingbackResponse::InvalidPingRequest
        );
        assert_eq!(store.count(), 0);
    }

    #[tokio::test]
    async fn source_without_link_is_error17() {
        let (store, _) = MemoryStore::with_hello_world();
        let page = "<html><head><title>A post</title></head><body>no link</body></html>";
        let (handler, _, _) = build(FakeInspector::serving(page), store);

        assert_eq!(
            handler.handle(command(ping_body(SOURCE, TARGET))).await,
            PingbackResponse::Error17SourceNotContainTargetUri
        );
    }

    #[tokio::test]
    async fn markup_in_title_is_spam() {
        let (store, _) = MemoryStore::with_hello_world();
        let (handler, _, store) = build(
            FakeInspector::serving(&linking_page("Buy <a href=\"x\">now</a>")),
            store,
        );

        assert_eq!(
            handler.handle(command(ping_body(SOURCE, TARGET))).await,
            PingbackResponse::SpamDetectedFakeNotFound
        );
        assert_eq!(store.count(), 0);
    }

    #[tokio::test]
    async fn target_outside_post_route_is_generic_error() {
        let (store, _) = MemoryStore::with_hello_world();
        let target = "https://blog.example/page/about";
        let page = format!("<title>A post</title><a href=\"{target}\">x</a>");
        let (handler, _, _) = build(FakeInspector::serving(&page), store);

        assert_eq!(
            handler.handle(command(ping_body(SOURCE, target))).await,
            PingbackResponse::GenericError
        );
    }

    #[tokio::test]
    async fn unknown_post_is_error32() {
        let (store, _) = MemoryStore::with_hello_world();
        let target = "https://blog.example/post/2020/5/2/hello-world";
        let page = format!("<title>A post</title><a href=\"{target}\">x</a>");
        let (handler, _, _) = build(FakeInspector::serving(&page), store);

        assert_eq!(
            handler.handle(command(ping_body(SOURCE, target))).await,
            PingbackResponse::Error32TargetUriNotExist
        );
    }

    #[tokio::test]
    async fn repeat_ping_is_error48() {
        let (store, _) = MemoryStore::with_hello_world();
        let (handler, _, store) = build(FakeInspector::serving(&linking_page("A post")), store);

        let first = handler.handle(command(ping_body(SOURCE, TARGET))).await;
        assert_eq!(first.status(), PingbackStatus::Success);

        let mut again = command(ping_body(SOURCE, TARGET));
        again.client_ip = " 203.0.113.7 ".into();
        assert_eq!(
            handler.handle(again).await,
            PingbackResponse::Error48PingbackAlreadyRegistered
        );
        assert_eq!(store.count(), 1);
    }

    #[tokio::test]
    async fn same_source_from_another_ip_is_accepted() {
        let (store, _) = MemoryStore::with_hello_world();
        let (handler, _, store) = build(FakeInspector::serving(&linking_page("A post")), store);

        handler.handle(command(ping_body(SOURCE, TARGET))).await;
        let mut other = command(ping_body(SOURCE, TARGET));
        other.client_ip = "198.51.100.1".into();
        assert_eq!(handler.handle(other).await.status(), PingbackStatus::Success);
        assert_eq!(store.count(), 2);
    }

    #[tokio::test]
    async fn concurrent_identical_pings_record_once() {
        let (store, _) = MemoryStore::with_hello_world();
        let (handler, _, store) = build(FakeInspector::serving(&linking_page("A post")), store);
        let handler = Arc::new(handler);

        let tasks: Vec<_> = (0..8)
            .map(|_| {
                let handler = Arc::clone(&handler);
                tokio::spawn(async move { handler.handle(command(ping_body(SOURCE, TARGET))).await })
            })
            .collect();

        let mut successes = 0;
        for task in tasks {
            match task.await.unwrap() {
                PingbackResponse::Success(_) => successes += 1,
                other => assert_eq!(other, PingbackResponse::Error48PingbackAlreadyRegistered),
            }
        }
        assert_eq!(successes, 1);
        assert_eq!(store.count(), 1);
    }

    #[tokio::test]
    async fn store_failure_is_generic_error() {
        let (mut store, _) = MemoryStore::with_hello_world();
        store.fail = true;
        let (handler, _, _) = build(FakeInspector::serving(&linking_page("A post")), store);

        assert_eq!(
            handler.handle(command(ping_body(SOURCE, TARGET))).await,
            PingbackResponse::GenericError
        );
    }
}
