use sqlx::Row;
use uuid::Uuid;

use crate::app::error::ServiceError;
use crate::domain::account::Entitlement;
use crate::domain::tier::DimensionSpec;
use crate::infra::db::Db;

/// Maps an authenticated principal to what its tier allows. Always reads
/// the current tier definition so operator edits apply immediately.
#[derive(Clone)]
pub struct AccountService {
    db: Db,
}

impl AccountService {
    pub fn new(db: Db) -> Self {
        Self { db }
    }

    pub async fn resolve_entitlement(&self, user_id: Uuid) -> Result<Entitlement, ServiceError> {
        let row = sqlx::query(
            "SELECT a.id AS account_id, t.id AS tier_id, \
                    t.allow_original_access, t.allow_expiring_links \
             FROM accounts a \
             JOIN account_tiers t ON t.id = a.tier_id \
             WHERE a.user_id = $1",
        )
        .bind(user_id)
        .fetch_optional(self.db.pool())
        .await?;

        let row = match row {
            Some(row) => row,
            None => return Err(ServiceError::NoAccount),
        };

        let tier_id: Uuid = row.get("tier_id");
        let image_sizes = self.tier_sizes(tier_id).await?;

        Ok(Entitlement {
            account_id: row.get("account_id"),
            allow_original_access: row.get("allow_original_access"),
            allow_expiring_links: row.get("allow_expiring_links"),
            image_sizes,
        })
    }

    async fn tier_sizes(&self, tier_id: Uuid) -> Result<Vec<DimensionSpec>, ServiceError> {
        let rows = sqlx::query(
            "SELECT ds.id, ds.height, ds.width \
             FROM tier_dimension_specs tds \
             JOIN dimension_specs ds ON ds.id = tds.spec_id \
             WHERE tds.tier_id = $1 \
             ORDER BY tds.position, ds.id",
        )
        .bind(tier_id)
        .fetch_all(self.db.pool())
        .await?;

        let sizes = rows
            .into_iter()
            .map(|row| DimensionSpec {
                id: row.get("id"),
                height: row.get::<Option<i32>, _>("height").map(|v| v as u32),
                width: row.get::<Option<i32>, _>("width").map(|v| v as u32),
            })
            .collect();

        Ok(sizes)
    }
}
