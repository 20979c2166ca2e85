use anyhow::anyhow;
use bytes::Bytes;
use serde::Serialize;
use sqlx::Row;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::app::error::ServiceError;
use crate::domain::account::Entitlement;
use crate::imaging::naming;
use crate::infra::db::Db;
use crate::infra::storage::ObjectStorage;

pub const MIN_TTL_SECONDS: i64 = 300;
pub const MAX_TTL_SECONDS: i64 = 30_000;

/// Bounded retries for link-token collisions before giving up.
const MAX_TOKEN_ATTEMPTS: u32 = 3;

#[derive(Clone)]
pub struct LinkService {
    db: Db,
    storage: ObjectStorage,
}

#[derive(Debug, Serialize)]
pub struct IssuedLink {
    pub token: String,
    pub seconds_left: i64,
}

/// Outcome of resolving a token. Expired is a first-class outcome, kept
/// apart from NotFound so callers can branch on it.
#[derive(Debug)]
pub enum LinkResolution {
    Active { bytes: Bytes, content_type: String },
    Expired,
    NotFound,
}

/// The single expiry computation. Expiry is always derived from the
/// stored creation time, never cached as a flag, and the boundary is
/// strict: at `elapsed == ttl` the link is already expired.
pub fn seconds_left(created_at: OffsetDateTime, ttl_seconds: i64, now: OffsetDateTime) -> i64 {
    let elapsed = (now - created_at).whole_seconds();
    (ttl_seconds - elapsed).max(0)
}

pub fn validate_ttl(ttl_seconds: i64) -> Result<(), ServiceError> {
    if !(MIN_TTL_SECONDS..=MAX_TTL_SECONDS).contains(&ttl_seconds) {
        return Err(ServiceError::Validation(format!(
            "ttl_seconds must be between {} and {}",
            MIN_TTL_SECONDS, MAX_TTL_SECONDS
        )));
    }
    Ok(())
}

impl LinkService {
    pub fn new(db: Db, storage: ObjectStorage) -> Self {
        Self { db, storage }
    }

    /// Mint a capability token for one of the caller's stored images.
    /// All validation happens before the insert.
    pub async fn issue(
        &self,
        entitlement: &Entitlement,
        image_id: Uuid,
        ttl_seconds: i64,
    ) -> Result<IssuedLink, ServiceError> {
        if !entitlement.allow_expiring_links {
            return Err(ServiceError::Forbidden(
                "account tier does not allow expiring links".into(),
            ));
        }
        validate_ttl(ttl_seconds)?;

        let image: Option<Uuid> =
            sqlx::query_scalar("SELECT id FROM stored_images WHERE id = $1 AND owner_id = $2")
                .bind(image_id)
                .bind(entitlement.account_id)
                .fetch_optional(self.db.pool())
                .await?;
        if image.is_none() {
            return Err(ServiceError::NotFound("image"));
        }

        for attempt in 1..=MAX_TOKEN_ATTEMPTS {
            let token = naming::random_token(naming::LINK_TOKEN_LEN);
            let result = sqlx::query(
                "INSERT INTO expiring_links (image_id, token, ttl_seconds) VALUES ($1, $2, $3)",
            )
            .bind(image_id)
            .bind(&token)
            .bind(ttl_seconds)
            .execute(self.db.pool())
            .await;

            match result {
                Ok(_) => {
                    tracing::info!(image_id = %image_id, ttl_seconds, "expiring link issued");
                    return Ok(IssuedLink {
                        token,
                        seconds_left: ttl_seconds,
                    });
                }
                Err(sqlx::Error::Database(db)) if db.is_unique_violation() => {
                    tracing::warn!(attempt, "link token collided, regenerating");
                }
                Err(err) => return Err(err.into()),
            }
        }

        Err(ServiceError::Conflict(
            "link token allocation exhausted".into(),
        ))
    }

    /// Pure read plus time arithmetic; safe to call concurrently and
    /// repeatedly for the same token.
    pub async fn resolve(&self, token: &str) -> Result<LinkResolution, ServiceError> {
        let row = sqlx::query(
            "SELECT el.created_at, el.ttl_seconds, si.storage_key, si.content_type \
             FROM expiring_links el \
             JOIN stored_images si ON si.id = el.image_id \
             WHERE el.token = $1",
        )
        .bind(token)
        .fetch_optional(self.db.pool())
        .await?;

        let row = match row {
            Some(row) => row,
            None => return Ok(LinkResolution::NotFound),
        };

        let created_at: OffsetDateTime = row.get("created_at");
        let ttl_seconds: i64 = row.get("ttl_seconds");
        if seconds_left(created_at, ttl_seconds, OffsetDateTime::now_utc()) == 0 {
            return Ok(LinkResolution::Expired);
        }

        let storage_key: String = row.get("storage_key");
        let bytes = self
            .storage
            .get(&storage_key)
            .await
            .map_err(ServiceError::Internal)?
            .ok_or_else(|| {
                ServiceError::Internal(anyhow!("stored object missing: {}", storage_key))
            })?;

        Ok(LinkResolution::Active {
            bytes,
            content_type: row.get("content_type"),
        })
    }
}
