//! Read-only views of the `posts` table.

use moonglade_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// The identity of a post a pingback can target.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize)]
pub struct PostRef {
    pub id: DbId,
    pub title: String,
}

/// A post as needed to send outbound pingbacks for it.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct PublishedPost {
    pub id: DbId,
    pub title: String,
    pub slug: String,
    pub post_content: String,
    pub pub_date_utc: Timestamp,
}
