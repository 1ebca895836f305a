//! Repository for the `pingbacks` table.

use moonglade_core::types::DbId;
use sqlx::PgPool;

use crate::models::pingback::{CreatePingback, Pingback};

/// Column list for `pingbacks` queries.
const COLUMNS: &str = "\
    id, ping_time_utc, domain, source_url, source_title, \
    target_post_id, target_post_title, source_ip";

/// Provides CRUD operations for pingbacks.
pub struct PingbackRepo;

impl PingbackRepo {
    /// Whether a pingback from `source_url` at `source_ip` was already
    /// recorded against the post. Stored IPs are compared trimmed.
    pub async fn exists(
        pool: &PgPool,
        target_post_id: DbId,
        source_url: &str,
        source_ip: &str,
    ) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS( \
                 SELECT 1 FROM pingbacks \
                 WHERE target_post_id = $1 AND source_url = $2 AND TRIM(source_ip) = $3 \
             )",
        )
        .bind(target_post_id)
        .bind(source_url)
        .bind(source_ip.trim())
        .fetch_one(pool)
        .await
    }

    /// Insert a pingback, returning the stored row.
    pub async fn create(pool: &PgPool, input: &CreatePingback) -> Result<Pingback, sqlx::Error> {
        let query = format!(
            "INSERT INTO pingbacks \
                 (id, ping_time_utc, domain, source_url, source_title, \
                  target_post_id, target_post_title, source_ip) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Pingback>(&query)
            .bind(input.id)
            .bind(input.ping_time_utc)
            .bind(&input.domain)
            .bind(&input.source_url)
            .bind(&input.source_title)
            .bind(input.target_post_id)
            .bind(&input.target_post_title)
            .bind(&input.source_ip)
            .fetch_one(pool)
            .await
    }

    /// Find a pingback by its ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Pingback>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM pingbacks WHERE id = $1");
        sqlx::query_as::<_, Pingback>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List all pingbacks, newest first.
    pub async fn list(pool: &PgPool) -> Result<Vec<Pingback>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM pingbacks ORDER BY ping_time_utc DESC, id");
        sqlx::query_as::<_, Pingback>(&query).fetch_all(pool).await
    }

    /// Delete a pingback. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM pingbacks WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Delete every pingback. Returns the number of rows removed.
    pub async fn clear(pool: &PgPool) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM pingbacks").execute(pool).await?;
        Ok(result.rows_affected())
    }
}
