//! Durable audit trail.
//!
//! [`AuditSink`] subscribes to the [`EventBus`](crate::bus::EventBus) and
//! appends every received [`PlatformEvent`] to `audit_log`. It runs as a
//! long-lived background task and exits when the bus is dropped.

use moonglade_db::repositories::AuditRepo;
use moonglade_db::DbPool;
use tokio::sync::broadcast;

use crate::bus::PlatformEvent;

pub struct AuditSink;

impl AuditSink {
    /// Run the audit loop until the channel closes.
    pub async fn run(pool: DbPool, mut receiver: broadcast::Receiver<PlatformEvent>) {
        loop {
            match receiver.recv().await {
                Ok(event) => {
                    if let Err(e) = Self::record(&pool, &event).await {
                        tracing::error!(
                            error = %e,
                            event_type = %event.event_type,
                            "Failed to record audit entry"
                        );
                    }
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(skipped = n, "Audit sink lagged, some events were not recorded");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    tracing::info!("Event bus closed, audit sink shutting down");
                    break;
                }
            }
        }
    }

    /// Append one event, folding the actor and timestamp into the payload.
    pub async fn record(pool: &DbPool, event: &PlatformEvent) -> Result<i64, sqlx::Error> {
        let payload = serde_json::json!({
            "actor": event.actor,
            "occurred_at": event.timestamp,
            "data": event.payload,
        });
        AuditRepo::insert(
            pool,
            &event.event_type,
            event.source_entity_type.as_deref(),
            event.source_entity_id,
            &payload,
        )
        .await
    }
}
