use serde::Serialize;
use time::OffsetDateTime;
use uuid::Uuid;

/// One stored byte stream: the uploaded original or a derived variant.
/// Immutable after creation.
#[derive(Debug, Clone, Serialize)]
pub struct StoredImage {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub title: String,
    pub storage_key: String,
    pub content_type: String,
    pub width: i32,
    pub height: i32,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    pub url: Option<String>,
}
