use axum::extract::FromRequestParts;
use axum::http::header;
use axum::http::request::Parts;
use axum::http::HeaderName;
use subtle::ConstantTimeEq;

use crate::app::auth::AuthService;
use crate::http::AppError;
use crate::AppState;

#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: uuid::Uuid,
}

/// Marker extractor for the operator surface.
#[derive(Debug, Clone)]
pub struct AdminToken;

const ADMIN_TOKEN_HEADER: HeaderName = HeaderName::from_static("x-admin-token");

#[axum::async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| AppError::unauthorized("missing Authorization header"))?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or_else(|| AppError::unauthorized("invalid Authorization header"))?;

        let service = AuthService::new(
            state.db.clone(),
            state.paseto_access_key,
            state.access_ttl_minutes,
        );
        let session = service
            .authenticate_access_token(token)
            .await
            .map_err(|_| AppError::internal("failed to authenticate"))?;

        let session = session.ok_or_else(|| AppError::unauthorized("invalid token"))?;
        Ok(AuthUser {
            user_id: session.user_id,
        })
    }
}

#[axum::async_trait]
impl FromRequestParts<AppState> for AdminToken {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let expected = state
            .admin_token
            .as_ref()
            .ok_or_else(|| AppError::forbidden("admin token not configured"))?;

        let provided = parts
            .headers
            .get(ADMIN_TOKEN_HEADER)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| AppError::forbidden("missing admin token"))?;

        if provided.as_bytes().ct_eq(expected.as_bytes()).unwrap_u8() != 1 {
            return Err(AppError::forbidden("invalid admin token"));
        }

        Ok(AdminToken)
    }
}
