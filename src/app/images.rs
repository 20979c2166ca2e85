use anyhow::anyhow;
use bytes::Bytes;
use serde::Serialize;
use sqlx::Row;
use uuid::Uuid;

use crate::app::error::ServiceError;
use crate::domain::account::Entitlement;
use crate::domain::image::StoredImage;
use crate::imaging::{naming, variants};
use crate::infra::db::Db;
use crate::infra::storage::{ObjectStorage, StorageError};

const MAX_TITLE_LEN: usize = 128;

/// Bounded retries for storage-name collisions before giving up.
const MAX_NAME_ATTEMPTS: u32 = 3;

#[derive(Clone)]
pub struct ImageService {
    db: Db,
    storage: ObjectStorage,
    media_base_url: String,
}

/// Ordered outcome of one upload: the original link (when the tier grants
/// it) followed by one link per entitled size, in tier order.
#[derive(Debug, Serialize)]
pub struct UploadReceipt {
    pub original_url: Option<String>,
    pub variant_urls: Vec<String>,
}

impl ImageService {
    pub fn new(db: Db, storage: ObjectStorage, media_base_url: String) -> Self {
        Self {
            db,
            storage,
            media_base_url,
        }
    }

    /// Run the full upload flow: derive every variant, store the bytes,
    /// then commit all image rows in one transaction. Validation happens
    /// before any side effect; a failure mid-batch persists nothing.
    pub async fn upload(
        &self,
        entitlement: &Entitlement,
        title: &str,
        source: Bytes,
    ) -> Result<UploadReceipt, ServiceError> {
        let title = title.trim();
        if title.is_empty() {
            return Err(ServiceError::Validation("title is required".into()));
        }
        if title.len() > MAX_TITLE_LEN {
            return Err(ServiceError::Validation(format!(
                "title must be at most {} characters",
                MAX_TITLE_LEN
            )));
        }

        // Decode and resize are CPU-bound; keep them off the async path.
        let generated = {
            let entitlement = entitlement.clone();
            let title = title.to_string();
            tokio::task::spawn_blocking(move || variants::generate(&source, &title, &entitlement))
                .await
                .map_err(|err| ServiceError::Internal(anyhow!("variant task panicked: {}", err)))??
        };

        let mut stored = Vec::with_capacity(generated.len());
        for mut variant in generated {
            let mut attempts = 0;
            loop {
                attempts += 1;
                match self
                    .storage
                    .put_unique(&variant.name, variant.format.content_type(), variant.bytes.clone())
                    .await
                {
                    Ok(()) => break,
                    Err(StorageError::Duplicate) if attempts < MAX_NAME_ATTEMPTS => {
                        tracing::warn!(name = %variant.name, "storage name collided, reallocating");
                        variant.name = naming::allocate(
                            Some(title),
                            variant.size.as_ref(),
                            Some(variant.format.ext()),
                        )?;
                    }
                    Err(StorageError::Duplicate) => {
                        return Err(ServiceError::Conflict(
                            "storage name allocation exhausted".into(),
                        ));
                    }
                    Err(StorageError::Other(err)) => return Err(err.into()),
                }
            }
            stored.push(variant);
        }

        let mut tx = self.db.pool().begin().await?;
        for variant in &stored {
            let result = sqlx::query(
                "INSERT INTO stored_images (owner_id, title, storage_key, content_type, width, height) \
                 VALUES ($1, $2, $3, $4, $5, $6)",
            )
            .bind(entitlement.account_id)
            .bind(title)
            .bind(&variant.name)
            .bind(variant.format.content_type())
            .bind(variant.width as i32)
            .bind(variant.height as i32)
            .execute(&mut *tx)
            .await;

            match result {
                Ok(_) => {}
                Err(sqlx::Error::Database(db)) if db.is_unique_violation() => {
                    return Err(ServiceError::Conflict(format!(
                        "storage key already recorded: {}",
                        variant.name
                    )));
                }
                Err(err) => return Err(err.into()),
            }
        }
        tx.commit().await?;

        let mut original_url = None;
        let mut variant_urls = Vec::new();
        for variant in &stored {
            let url = self.public_url(&variant.name);
            if variant.size.is_none() {
                original_url = Some(url);
            } else {
                variant_urls.push(url);
            }
        }

        tracing::info!(
            account_id = %entitlement.account_id,
            count = stored.len(),
            "upload stored"
        );

        Ok(UploadReceipt {
            original_url,
            variant_urls,
        })
    }

    pub async fn list_for_account(&self, account_id: Uuid) -> Result<Vec<StoredImage>, ServiceError> {
        let rows = sqlx::query(
            "SELECT id, owner_id, title, storage_key, content_type, width, height, created_at \
             FROM stored_images WHERE owner_id = $1 \
             ORDER BY created_at DESC, id",
        )
        .bind(account_id)
        .fetch_all(self.db.pool())
        .await?;

        let images = rows
            .into_iter()
            .map(|row| {
                let storage_key: String = row.get("storage_key");
                let url = self.public_url(&storage_key);
                StoredImage {
                    id: row.get("id"),
                    owner_id: row.get("owner_id"),
                    title: row.get("title"),
                    storage_key,
                    content_type: row.get("content_type"),
                    width: row.get("width"),
                    height: row.get("height"),
                    created_at: row.get("created_at"),
                    url: Some(url),
                }
            })
            .collect();

        Ok(images)
    }

    /// The core only ever constructs public URLs; serving them is the
    /// object store's concern.
    fn public_url(&self, storage_key: &str) -> String {
        format!(
            "{}/{}",
            self.media_base_url.trim_end_matches('/'),
            storage_key
        )
    }
}
