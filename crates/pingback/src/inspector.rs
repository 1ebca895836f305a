//! Pingback source inspection.
//!
//! [`SourceInspector`] is the seam the receiver uses to learn what a source
//! page says about the target. [`HttpSourceInspector`] is the production
//! implementation: one GET with the configured timeout.

use std::time::Duration;

use async_trait::async_trait;
use moonglade_core::pingback::PingRequest;

use crate::client;

#[derive(Debug, thiserror::Error)]
pub enum InspectionError {
    /// The source could not be fetched (network, DNS, timeout, bad body).
    #[error("Source {url} is unreachable: {reason}")]
    Unreachable { url: String, reason: String },
}

#[async_trait]
pub trait SourceInspector: Send + Sync {
    /// Fetch `source_url` and report its title, spam signal and whether it
    /// links to `target_url`.
    async fn examine_source(
        &self,
        source_url: &str,
        target_url: &str,
    ) -> Result<PingRequest, InspectionError>;
}

/// Inspects sources over HTTP.
pub struct HttpSourceInspector {
    client: reqwest::Client,
}

impl HttpSourceInspector {
    pub fn new(timeout: Duration) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: client::build_client(timeout)?,
        })
    }

    /// Inspector sharing an existing client.
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl SourceInspector for HttpSourceInspector {
    async fn examine_source(
        &self,
        source_url: &str,
        target_url: &str,
    ) -> Result<PingRequest, InspectionError> {
        tracing::debug!(source_url, target_url, "Examining pingback source");

        let unreachable = |e: reqwest::Error| InspectionError::Unreachable {
            url: source_url.to_string(),
            reason: e.to_string(),
        };

        // The body is analysed whatever the status: an error page simply
        // will not contain the link.
        let response = self.client.get(source_url).send().await.map_err(unreachable)?;
        let status = response.status();
        let html = response.text().await.map_err(unreachable)?;

        let request = PingRequest::from_source_html(source_url, target_url, &html);
        tracing::debug!(
            source_url,
            status = status.as_u16(),
            title = %request.title,
            contains_html = request.contains_html,
            source_has_link = request.source_has_link,
            "Pingback source examined"
        );
        Ok(request)
    }
}
