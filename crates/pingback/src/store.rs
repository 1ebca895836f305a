//! Persistence seam of the pingback receiver.

use async_trait::async_trait;
use moonglade_core::pingback::PostRoute;
use moonglade_core::types::DbId;
use moonglade_db::models::pingback::{CreatePingback, Pingback};
use moonglade_db::models::post::PostRef;
use moonglade_db::repositories::{PingbackRepo, PostRepo};
use moonglade_db::DbPool;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Post lookup and pingback persistence, as the receiver needs them.
#[async_trait]
pub trait PingbackStore: Send + Sync {
    /// The published post a permalink route points at.
    async fn find_post(&self, route: &PostRoute) -> Result<Option<PostRef>, StoreError>;

    /// Whether `(post, source_url, source_ip)` has already been recorded.
    async fn pingback_exists(
        &self,
        target_post_id: DbId,
        source_url: &str,
        source_ip: &str,
    ) -> Result<bool, StoreError>;

    async fn save_pingback(&self, input: CreatePingback) -> Result<Pingback, StoreError>;
}

/// [`PingbackStore`] over the Postgres repositories.
#[derive(Clone)]
pub struct PgPingbackStore {
    pool: DbPool,
}

impl PgPingbackStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PingbackStore for PgPingbackStore {
    async fn find_post(&self, route: &PostRoute) -> Result<Option<PostRef>, StoreError> {
        Ok(PostRepo::find_published_by_route(&self.pool, &route.slug, route.pub_date).await?)
    }

    async fn pingback_exists(
        &self,
        target_post_id: DbId,
        source_url: &str,
        source_ip: &str,
    ) -> Result<bool, StoreError> {
        Ok(PingbackRepo::exists(&self.pool, target_post_id, source_url, source_ip).await?)
    }

    async fn save_pingback(&self, input: CreatePingback) -> Result<Pingback, StoreError> {
        Ok(PingbackRepo::create(&self.pool, &input).await?)
    }
}
