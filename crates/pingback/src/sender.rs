//! Outbound pingback sending.
//!
//! For every absolute link in a post, [`PingbackSender`] asks the linked
//! page for its pingback endpoint (`X-Pingback`, falling back to
//! `Pingback`) and, when one is advertised, POSTs a `pingback.ping` call
//! naming the post as source. Links are processed one after another with a
//! single attempt each; a failing link is logged and skipped.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use moonglade_core::pingback::{links, xmlrpc};
use reqwest::header::CONTENT_TYPE;
use url::Url;

use crate::client;

/// Response headers that advertise a pingback endpoint, in lookup order.
const ENDPOINT_HEADERS: [&str; 2] = ["x-pingback", "pingback"];

#[derive(Debug, thiserror::Error)]
pub enum SendError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Pingback endpoint returned HTTP {0}")]
    HttpStatus(u16),

    #[error("Pingback endpoint returned a fault: {0}")]
    Fault(String),
}

/// HTTP operations the sender performs against remote sites.
#[async_trait]
pub trait PingbackTransport: Send + Sync {
    /// GET `target` and return the raw value of its pingback header, if any.
    async fn discover_endpoint(&self, target: &Url) -> Result<Option<String>, SendError>;

    /// POST a `pingback.ping(source_url, target_url)` call to `endpoint`.
    async fn send_ping(
        &self,
        endpoint: &Url,
        source_url: &str,
        target_url: &str,
    ) -> Result<(), SendError>;
}

/// [`PingbackTransport`] over `reqwest`.
pub struct HttpPingbackTransport {
    client: reqwest::Client,
}

impl HttpPingbackTransport {
    pub fn new(timeout: Duration) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: client::build_client(timeout)?,
        })
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl PingbackTransport for HttpPingbackTransport {
    async fn discover_endpoint(&self, target: &Url) -> Result<Option<String>, SendError> {
        let response = self.client.get(target.clone()).send().await?;
        let headers = response.headers();
        let endpoint = ENDPOINT_HEADERS
            .iter()
            .find_map(|name| headers.get(*name))
            .and_then(|value| value.to_str().ok())
            .map(|value| value.trim().to_string());
        Ok(endpoint)
    }

    async fn send_ping(
        &self,
        endpoint: &Url,
        source_url: &str,
        target_url: &str,
    ) -> Result<(), SendError> {
        let response = self
            .client
            .post(endpoint.clone())
            .header(CONTENT_TYPE, "text/xml")
            .body(xmlrpc::build_ping_call(source_url, target_url))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(SendError::HttpStatus(status.as_u16()));
        }

        let body = response.text().await?;
        if body.contains("<fault>") {
            return Err(SendError::Fault(body));
        }
        Ok(())
    }
}

/// Counters describing one [`PingbackSender::try_send_ping`] run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SendReport {
    /// Distinct absolute links found in the content.
    pub candidates: usize,
    /// Links whose page advertised a usable pingback endpoint.
    pub endpoints: usize,
    /// Pings accepted by the remote endpoint.
    pub sent: usize,
    /// Links that failed at any step.
    pub failed: usize,
}

/// Sends pingbacks for the links of a published post.
#[derive(Clone)]
pub struct PingbackSender {
    transport: Arc<dyn PingbackTransport>,
}

impl PingbackSender {
    pub fn new(transport: Arc<dyn PingbackTransport>) -> Self {
        Self { transport }
    }

    /// Notify every linked site that supports pingback that `post_url`
    /// links to it. Never fails; problems are logged and counted.
    pub async fn try_send_ping(&self, post_url: &str, post_content: &str) -> SendReport {
        let mut report = SendReport::default();

        if !links::mentions_web_url(post_content) {
            tracing::debug!(post_url, "No URLs in post content, skipping pingback");
            return report;
        }

        let targets = links::extract_link_urls(post_content);
        report.candidates = targets.len();
        tracing::info!(post_url, candidates = targets.len(), "Sending pingbacks");

        for target in &targets {
            match self.ping_target(post_url, target).await {
                Ok(PingOutcome::NoEndpoint) => {}
                Ok(PingOutcome::Sent) => {
                    report.endpoints += 1;
                    report.sent += 1;
                }
                Err((found_endpoint, e)) => {
                    if found_endpoint {
                        report.endpoints += 1;
                    }
                    report.failed += 1;
                    tracing::warn!(post_url, link = %target, error = %e, "Pingback failed");
                }
            }
        }

        tracing::info!(
            post_url,
            candidates = report.candidates,
            endpoints = report.endpoints,
            sent = report.sent,
            failed = report.failed,
            "Pingback sending finished"
        );
        report
    }

    /// Discover and ping one target. On error, reports whether an endpoint
    /// had already been found.
    async fn ping_target(&self, post_url: &str, target: &Url) -> Result<PingOutcome, (bool, SendError)> {
        let header = self
            .transport
            .discover_endpoint(target)
            .await
            .map_err(|e| (false, e))?;

        let Some(endpoint) = header.as_deref().and_then(|h| Url::parse(h).ok()) else {
            tracing::debug!(link = %target, "Target does not advertise a pingback endpoint");
            return Ok(PingOutcome::NoEndpoint);
        };

        tracing::debug!(link = %target, endpoint = %endpoint, "Pinging endpoint");
        self.transport
            .send_ping(&endpoint, post_url, target.as_str())
            .await
            .map_err(|e| (true, e))?;

        Ok(PingOutcome::Sent)
    }
}

enum PingOutcome {
    NoEndpoint,
    Sent,
}
