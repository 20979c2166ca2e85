use anyhow::{anyhow, Result};
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use pasetors::claims::{Claims, ClaimsValidationRules};
use pasetors::keys::SymmetricKey;
use pasetors::token::UntrustedToken;
use pasetors::{local, version4::V4, Local};
use sqlx::Row;
use time::{Duration, OffsetDateTime};
use uuid::Uuid;

use crate::domain::user::User;
use crate::infra::db::Db;

const TOKEN_ISSUER: &str = "imagex";

#[derive(Debug, Clone)]
pub struct AuthSession {
    pub user_id: Uuid,
}

#[derive(Debug, Clone)]
pub struct AccessToken {
    pub token: String,
    pub expires_at: OffsetDateTime,
}

#[derive(Clone)]
pub struct AuthService {
    db: Db,
    access_key: [u8; 32],
    access_ttl_minutes: u64,
}

impl AuthService {
    pub fn new(db: Db, access_key: [u8; 32], access_ttl_minutes: u64) -> Self {
        Self {
            db,
            access_key,
            access_ttl_minutes,
        }
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<Option<AccessToken>> {
        let row = sqlx::query("SELECT id, password_hash FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(self.db.pool())
            .await?;

        let row = match row {
            Some(row) => row,
            None => return Ok(None),
        };

        let user_id: Uuid = row.get("id");
        let password_hash: String = row.get("password_hash");
        if password_hash.is_empty() || !verify_password(password, &password_hash)? {
            return Ok(None);
        }

        let token = self.issue_access_token(user_id)?;
        Ok(Some(token))
    }

    pub async fn authenticate_access_token(&self, token: &str) -> Result<Option<AuthSession>> {
        let claims = match self.decrypt_claims(token)? {
            Some(claims) => claims,
            None => return Ok(None),
        };
        let user_id = claim_uuid(&claims, "sub")?;
        Ok(Some(AuthSession { user_id }))
    }

    pub async fn get_current_user(&self, user_id: Uuid) -> Result<Option<User>> {
        let row = sqlx::query("SELECT id, email, created_at FROM users WHERE id = $1")
            .bind(user_id)
            .fetch_optional(self.db.pool())
            .await?;

        let user = row.map(|row| User {
            id: row.get("id"),
            email: row.get("email"),
            created_at: row.get("created_at"),
        });

        Ok(user)
    }

    fn issue_access_token(&self, user_id: Uuid) -> Result<AccessToken> {
        let duration = std::time::Duration::from_secs(self.access_ttl_minutes * 60);
        let mut claims = Claims::new_expires_in(&duration)?;
        claims.issuer(TOKEN_ISSUER)?;
        claims.audience(TOKEN_ISSUER)?;
        claims.subject(&user_id.to_string())?;

        let key = SymmetricKey::<V4>::from(&self.access_key)?;
        let token = local::encrypt(&key, &claims, None, None)?;
        let expires_at =
            OffsetDateTime::now_utc() + Duration::minutes(self.access_ttl_minutes as i64);

        Ok(AccessToken { token, expires_at })
    }

    fn decrypt_claims(&self, token: &str) -> Result<Option<Claims>> {
        let key = SymmetricKey::<V4>::from(&self.access_key)?;
        let mut rules = ClaimsValidationRules::new();
        rules.validate_issuer_with(TOKEN_ISSUER);
        rules.validate_audience_with(TOKEN_ISSUER);

        let untrusted = match UntrustedToken::<Local, V4>::try_from(token) {
            Ok(token) => token,
            Err(_) => return Ok(None),
        };
        let trusted = match local::decrypt(&key, &untrusted, &rules, None, None) {
            Ok(token) => token,
            Err(_) => return Ok(None),
        };
        Ok(trusted.payload_claims().cloned())
    }
}

pub(crate) fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut argon2::password_hash::rand_core::OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|err| anyhow!("failed to hash password: {}", err))?;
    Ok(hash.to_string())
}

fn verify_password(password: &str, hash: &str) -> Result<bool> {
    let parsed = PasswordHash::new(hash)
        .map_err(|err| anyhow!("failed to parse password hash: {}", err))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

fn claim_uuid(claims: &Claims, name: &str) -> Result<Uuid> {
    let value = claims
        .get_claim(name)
        .and_then(|value| value.as_str())
        .ok_or_else(|| anyhow!("missing {} claim", name))?;
    Ok(Uuid::parse_str(value)?)
}
