use sqlx::Row;
use uuid::Uuid;

use crate::app::auth::hash_password;
use crate::app::error::ServiceError;
use crate::domain::tier::{AccountTier, DimensionSpec};
use crate::infra::db::Db;

/// Operator-facing service: tier and dimension-spec definitions plus
/// account provisioning. Gated by the admin token at the HTTP layer.
#[derive(Clone)]
pub struct TierService {
    db: Db,
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct CreatedAccount {
    pub account_id: Uuid,
    pub user_id: Uuid,
}

impl TierService {
    pub fn new(db: Db) -> Self {
        Self { db }
    }

    pub async fn create_dimension_spec(
        &self,
        height: Option<u32>,
        width: Option<u32>,
    ) -> Result<DimensionSpec, ServiceError> {
        if height.is_none() && width.is_none() {
            return Err(ServiceError::Validation(
                "at least one of height or width is required".into(),
            ));
        }
        if height == Some(0) || width == Some(0) {
            return Err(ServiceError::Validation(
                "height and width must be at least 1".into(),
            ));
        }

        let row = sqlx::query(
            "INSERT INTO dimension_specs (height, width) VALUES ($1, $2) RETURNING id",
        )
        .bind(height.map(|v| v as i32))
        .bind(width.map(|v| v as i32))
        .fetch_one(self.db.pool())
        .await?;

        Ok(DimensionSpec {
            id: row.get("id"),
            height,
            width,
        })
    }

    pub async fn create_tier(
        &self,
        name: &str,
        allow_original_access: bool,
        allow_expiring_links: bool,
        spec_ids: &[Uuid],
    ) -> Result<AccountTier, ServiceError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ServiceError::Validation("name is required".into()));
        }
        // A tier with zero sizes is invalid, enforced here at definition time.
        if spec_ids.is_empty() {
            return Err(ServiceError::Validation(
                "a tier must reference at least one dimension spec".into(),
            ));
        }

        let mut tx = self.db.pool().begin().await?;

        let tier_id: Uuid = match sqlx::query_scalar(
            "INSERT INTO account_tiers (name, allow_original_access, allow_expiring_links) \
             VALUES ($1, $2, $3) RETURNING id",
        )
        .bind(name)
        .bind(allow_original_access)
        .bind(allow_expiring_links)
        .fetch_one(&mut *tx)
        .await
        {
            Ok(id) => id,
            Err(sqlx::Error::Database(db)) if db.is_unique_violation() => {
                return Err(ServiceError::Conflict(format!(
                    "a tier named {} already exists",
                    name
                )));
            }
            Err(err) => return Err(err.into()),
        };

        for (position, spec_id) in spec_ids.iter().enumerate() {
            let result = sqlx::query(
                "INSERT INTO tier_dimension_specs (tier_id, spec_id, position) \
                 VALUES ($1, $2, $3)",
            )
            .bind(tier_id)
            .bind(spec_id)
            .bind(position as i32)
            .execute(&mut *tx)
            .await;

            match result {
                Ok(_) => {}
                Err(sqlx::Error::Database(db)) if db.is_foreign_key_violation() => {
                    return Err(ServiceError::Validation(format!(
                        "unknown dimension spec: {}",
                        spec_id
                    )));
                }
                Err(sqlx::Error::Database(db)) if db.is_unique_violation() => {
                    return Err(ServiceError::Validation(format!(
                        "duplicate dimension spec in list: {}",
                        spec_id
                    )));
                }
                Err(err) => return Err(err.into()),
            }
        }

        tx.commit().await?;

        let image_sizes = self.spec_rows(tier_id).await?;
        Ok(AccountTier {
            id: tier_id,
            name: name.to_string(),
            allow_original_access,
            allow_expiring_links,
            image_sizes,
        })
    }

    pub async fn list_tiers(&self) -> Result<Vec<AccountTier>, ServiceError> {
        let rows = sqlx::query(
            "SELECT id, name, allow_original_access, allow_expiring_links \
             FROM account_tiers ORDER BY created_at, name",
        )
        .fetch_all(self.db.pool())
        .await?;

        let mut tiers = Vec::with_capacity(rows.len());
        for row in rows {
            let id: Uuid = row.get("id");
            tiers.push(AccountTier {
                id,
                name: row.get("name"),
                allow_original_access: row.get("allow_original_access"),
                allow_expiring_links: row.get("allow_expiring_links"),
                image_sizes: self.spec_rows(id).await?,
            });
        }

        Ok(tiers)
    }

    /// Deleting a tier that accounts still reference is a referential
    /// integrity error, surfaced as a conflict instead of cascading.
    pub async fn delete_tier(&self, tier_id: Uuid) -> Result<(), ServiceError> {
        let result = sqlx::query("DELETE FROM account_tiers WHERE id = $1")
            .bind(tier_id)
            .execute(self.db.pool())
            .await;

        match result {
            Ok(done) if done.rows_affected() > 0 => Ok(()),
            Ok(_) => Err(ServiceError::NotFound("tier")),
            Err(sqlx::Error::Database(db)) if db.is_foreign_key_violation() => Err(
                ServiceError::Conflict("tier is still referenced by accounts".into()),
            ),
            Err(err) => Err(err.into()),
        }
    }

    pub async fn create_account(
        &self,
        email: &str,
        password: &str,
        tier_id: Uuid,
    ) -> Result<CreatedAccount, ServiceError> {
        let email = email.trim();
        if email.is_empty() || !email.contains('@') {
            return Err(ServiceError::Validation("a valid email is required".into()));
        }
        if password.len() < 8 {
            return Err(ServiceError::Validation(
                "password must be at least 8 characters".into(),
            ));
        }

        let password_hash = hash_password(password)?;
        let mut tx = self.db.pool().begin().await?;

        let user_id: Uuid = match sqlx::query_scalar(
            "INSERT INTO users (email, password_hash) VALUES ($1, $2) RETURNING id",
        )
        .bind(email)
        .bind(password_hash)
        .fetch_one(&mut *tx)
        .await
        {
            Ok(id) => id,
            Err(sqlx::Error::Database(db)) if db.is_unique_violation() => {
                return Err(ServiceError::Conflict("email is already registered".into()));
            }
            Err(err) => return Err(err.into()),
        };

        let account_id: Uuid = match sqlx::query_scalar(
            "INSERT INTO accounts (user_id, tier_id) VALUES ($1, $2) RETURNING id",
        )
        .bind(user_id)
        .bind(tier_id)
        .fetch_one(&mut *tx)
        .await
        {
            Ok(id) => id,
            Err(sqlx::Error::Database(db)) if db.is_foreign_key_violation() => {
                return Err(ServiceError::Validation(format!("unknown tier: {}", tier_id)));
            }
            Err(err) => return Err(err.into()),
        };

        tx.commit().await?;

        Ok(CreatedAccount {
            account_id,
            user_id,
        })
    }

    async fn spec_rows(&self, tier_id: Uuid) -> Result<Vec<DimensionSpec>, ServiceError> {
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

        Ok(rows
            .into_iter()
            .map(|row| DimensionSpec {
                id: row.get("id"),
                height: row.get::<Option<i32>, _>("height").map(|v| v as u32),
                width: row.get::<Option<i32>, _>("width").map(|v| v as u32),
            })
            .collect())
    }
}
