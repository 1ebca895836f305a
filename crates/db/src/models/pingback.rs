//! Pingback model and DTOs.

use moonglade_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `pingbacks` table.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
pub struct Pingback {
    pub id: DbId,
    pub ping_time_utc: Timestamp,
    pub domain: String,
    pub source_url: String,
    pub source_title: String,
    pub target_post_id: DbId,
    pub target_post_title: String,
    pub source_ip: String,
}

/// Everything needed to record a validated inbound ping.
///
/// The id and timestamp are assigned by the caller so the created row can
/// be reported without a second round-trip.
#[derive(Debug, Clone)]
pub struct CreatePingback {
    pub id: DbId,
    pub ping_time_utc: Timestamp,
    pub domain: String,
    pub source_url: String,
    pub source_title: String,
    pub target_post_id: DbId,
    pub target_post_title: String,
    pub source_ip: String,
}

impl From<CreatePingback> for Pingback {
    fn from(input: CreatePingback) -> Self {
        Self {
            id: input.id,
            ping_time_utc: input.ping_time_utc,
            domain: input.domain,
            source_url: input.source_url,
            source_title: input.source_title,
            target_post_id: input.target_post_id,
            target_post_title: input.target_post_title,
            source_ip: input.source_ip,
        }
    }
}
