use axum::extract::DefaultBodyLimit;
use axum::{routing::delete, routing::get, routing::post, Router};

use crate::http::handlers;
use crate::AppState;

pub fn health() -> Router<AppState> {
    Router::new().route("/health", get(handlers::health))
}

pub fn auth() -> Router<AppState> {
    Router::new()
        .route("/auth/login", post(handlers::login))
        .route("/auth/me", get(handlers::get_current_user))
}

pub fn images(upload_max_bytes: usize) -> Router<AppState> {
    Router::new()
        .route(
            "/images",
            post(handlers::upload_image).get(handlers::list_images),
        )
        .layer(DefaultBodyLimit::max(upload_max_bytes))
}

pub fn links() -> Router<AppState> {
    Router::new()
        .route("/expiring-links", post(handlers::issue_expiring_link))
        .route(
            "/expiring-links/:token",
            get(handlers::resolve_expiring_link),
        )
}

pub fn admin() -> Router<AppState> {
    Router::new()
        .route(
            "/admin/dimension-specs",
            post(handlers::create_dimension_spec),
        )
        .route(
            "/admin/tiers",
            post(handlers::create_tier).get(handlers::list_tiers),
        )
        .route("/admin/tiers/:id", delete(handlers::delete_tier))
        .route("/admin/accounts", post(handlers::create_account))
}
