use anyhow::{anyhow, Result};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use std::net::SocketAddr;
use std::str::FromStr;
use url::Url;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub http_addr: String,
    pub database_url: String,
    pub s3_endpoint: String,
    pub s3_region: String,
    pub s3_bucket: String,
    /// Base URL prepended to storage keys when shaping responses. The
    /// service never fetches through it.
    pub media_base_url: String,
    pub db_max_connections: u32,
    pub db_connect_timeout_seconds: u64,
    pub admin_token: Option<String>,
    pub upload_max_bytes: usize,
    pub paseto_access_key: [u8; 32],
    pub access_ttl_minutes: u64,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        let http_addr = env_or("HTTP_ADDR", "0.0.0.0:8080");
        SocketAddr::from_str(&http_addr).map_err(|err| anyhow!("invalid HTTP_ADDR: {}", err))?;

        let media_base_url = env_or_err("MEDIA_BASE_URL")?;
        Url::parse(&media_base_url).map_err(|err| anyhow!("invalid MEDIA_BASE_URL: {}", err))?;

        Ok(Self {
            http_addr,
            database_url: env_or_err("DATABASE_URL")?,
            s3_endpoint: env_or_err("S3_ENDPOINT")?,
            s3_region: env_or("S3_REGION", "us-east-1"),
            s3_bucket: env_or_err("S3_BUCKET")?,
            media_base_url,
            db_max_connections: env_or_parse("DB_MAX_CONNECTIONS", "25")?,
            db_connect_timeout_seconds: env_or_parse("DB_CONNECT_TIMEOUT_SECONDS", "5")?,
            admin_token: std::env::var("ADMIN_TOKEN").ok(),
            upload_max_bytes: env_or_parse("UPLOAD_MAX_BYTES", "10485760")?,
            paseto_access_key: env_key_32("PASETO_ACCESS_KEY")?,
            access_ttl_minutes: env_or_parse("ACCESS_TTL_MINUTES", "15")?,
        })
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_or_err(key: &str) -> Result<String> {
    std::env::var(key).map_err(|_| anyhow!("missing required env var: {}", key))
}

fn env_or_parse<T>(key: &str, default: &str) -> Result<T>
where
    T: FromStr,
    <T as FromStr>::Err: std::fmt::Display,
{
    let value = std::env::var(key).unwrap_or_else(|_| default.to_string());
    value
        .parse::<T>()
        .map_err(|err| anyhow!("invalid {}: {}", key, err))
}

fn env_key_32(key: &str) -> Result<[u8; 32]> {
    let value = env_or_err(key)?;
    let decoded = STANDARD
        .decode(value.as_bytes())
        .map_err(|err| anyhow!("invalid {}: {}", key, err))?;
    if decoded.len() != 32 {
        return Err(anyhow!("invalid {}: expected 32 bytes", key));
    }
    let mut key_bytes = [0u8; 32];
    key_bytes.copy_from_slice(&decoded);
    Ok(key_bytes)
}
