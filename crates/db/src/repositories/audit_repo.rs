//! Repository for the append-only `audit_log` table.

use moonglade_core::types::DbId;
use sqlx::PgPool;

use crate::models::audit::AuditEntry;

/// Default number of entries returned by [`AuditRepo::list_recent`].
const DEFAULT_LIMIT: i64 = 50;

/// Maximum number of entries returned by [`AuditRepo::list_recent`].
const MAX_LIMIT: i64 = 500;

pub struct AuditRepo;

impl AuditRepo {
    /// Append an entry, returning its id.
    pub async fn insert(
        pool: &PgPool,
        event_type: &str,
        source_entity_type: Option<&str>,
        source_entity_id: Option<DbId>,
        payload: &serde_json::Value,
    ) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>(
            "INSERT INTO audit_log (event_type, source_entity_type, source_entity_id, payload) \
             VALUES ($1, $2, $3, $4) \
             RETURNING id",
        )
        .bind(event_type)
        .bind(source_entity_type)
        .bind(source_entity_id)
        .bind(payload)
        .fetch_one(pool)
        .await
    }

    /// Most recent entries first.
    pub async fn list_recent(
        pool: &PgPool,
        limit: Option<i64>,
    ) -> Result<Vec<AuditEntry>, sqlx::Error> {
        let limit = limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);
        sqlx::query_as::<_, AuditEntry>(
            "SELECT id, event_type, source_entity_type, source_entity_id, payload, created_at \
             FROM audit_log \
             ORDER BY id DESC \
             LIMIT $1",
        )
        .bind(limit)
        .fetch_all(pool)
        .await
    }
}
