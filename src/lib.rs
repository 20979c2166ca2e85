pub mod app;
pub mod config;
pub mod domain;
pub mod http;
pub mod imaging;
pub mod infra;

use crate::infra::{db::Db, storage::ObjectStorage};

#[derive(Clone)]
pub struct AppState {
    pub db: Db,
    pub storage: ObjectStorage,
    pub media_base_url: String,
    pub admin_token: Option<String>,
    pub paseto_access_key: [u8; 32],
    pub access_ttl_minutes: u64,
    pub upload_max_bytes: usize,
}
