//! Read-only queries over the `posts` table.

use chrono::NaiveDate;
use moonglade_core::types::DbId;
use sqlx::PgPool;

use crate::models::post::{PostRef, PublishedPost};

/// Post lookups used by the pingback subsystem.
pub struct PostRepo;

impl PostRepo {
    /// Find a published, non-deleted post by slug and UTC publish date.
    pub async fn find_published_by_route(
        pool: &PgPool,
        slug: &str,
        pub_date: NaiveDate,
    ) -> Result<Option<PostRef>, sqlx::Error> {
        sqlx::query_as::<_, PostRef>(
            "SELECT id, title FROM posts \
             WHERE slug = $1 \
               AND is_published \
               AND NOT is_deleted \
               AND (pub_date_utc AT TIME ZONE 'UTC')::date = $2 \
             LIMIT 1",
        )
        .bind(slug)
        .bind(pub_date)
        .fetch_optional(pool)
        .await
    }

    /// Find a published, non-deleted post by id, with its content.
    pub async fn find_published_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<PublishedPost>, sqlx::Error> {
        sqlx::query_as::<_, PublishedPost>(
            "SELECT id, title, slug, post_content, pub_date_utc FROM posts \
             WHERE id = $1 \
               AND is_published \
               AND NOT is_deleted \
               AND pub_date_utc IS NOT NULL",
        )
        .bind(id)
        .fetch_optional(pool)
        .await
    }
}
