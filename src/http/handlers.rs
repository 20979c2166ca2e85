use axum::extract::{Multipart, Path, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::app::accounts::AccountService;
use crate::app::auth::AuthService;
use crate::app::images::{ImageService, UploadReceipt};
use crate::app::links::{IssuedLink, LinkResolution, LinkService};
use crate::app::tiers::{CreatedAccount, TierService};
use crate::domain::image::StoredImage;
use crate::domain::tier::{AccountTier, DimensionSpec};
use crate::domain::user::User;
use crate::http::{AdminToken, AppError, AuthUser};
use crate::AppState;

#[derive(Serialize)]
pub(crate) struct HealthResponse {
    status: &'static str,
}

pub(crate) async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let status = if state.db.ping().await.is_ok() {
        "ok"
    } else {
        "degraded"
    };
    Json(HealthResponse { status })
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Serialize)]
pub struct LoginResponse {
    pub access_token: String,
    #[serde(with = "time::serde::rfc3339")]
    pub expires_at: OffsetDateTime,
}

pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    if payload.email.trim().is_empty() || payload.password.trim().is_empty() {
        return Err(AppError::bad_request("email and password are required"));
    }

    let service = auth_service(&state);
    let token = service
        .login(&payload.email, &payload.password)
        .await
        .map_err(|err| {
            tracing::error!(error = ?err, "failed to login");
            AppError::internal("failed to login")
        })?
        .ok_or_else(|| AppError::unauthorized("invalid credentials"))?;

    Ok(Json(LoginResponse {
        access_token: token.token,
        expires_at: token.expires_at,
    }))
}

pub async fn get_current_user(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<User>, AppError> {
    let service = auth_service(&state);
    let user = service
        .get_current_user(auth.user_id)
        .await
        .map_err(|err| {
            tracing::error!(error = ?err, "failed to load current user");
            AppError::internal("failed to load user")
        })?
        .ok_or_else(|| AppError::not_found("user not found"))?;

    Ok(Json(user))
}

#[derive(Serialize)]
pub struct UploadResponse {
    pub original_url: Option<String>,
    pub variant_urls: Vec<String>,
}

impl From<UploadReceipt> for UploadResponse {
    fn from(receipt: UploadReceipt) -> Self {
        Self {
            original_url: receipt.original_url,
            variant_urls: receipt.variant_urls,
        }
    }
}

pub async fn upload_image(
    State(state): State<AppState>,
    auth: AuthUser,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<UploadResponse>), AppError> {
    let mut title: Option<String> = None;
    let mut image: Option<Bytes> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|_| AppError::bad_request("malformed multipart body"))?
    {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("title") => {
                let value = field
                    .text()
                    .await
                    .map_err(|_| AppError::bad_request("title: invalid text field"))?;
                title = Some(value);
            }
            Some("image") => {
                let value = field
                    .bytes()
                    .await
                    .map_err(|_| AppError::bad_request("image: could not read upload"))?;
                image = Some(value);
            }
            _ => {}
        }
    }

    let title = title.ok_or_else(|| AppError::bad_request("title is required"))?;
    let image = image.ok_or_else(|| AppError::bad_request("image file is required"))?;

    let entitlement = AccountService::new(state.db.clone())
        .resolve_entitlement(auth.user_id)
        .await?;

    let receipt = image_service(&state)
        .upload(&entitlement, &title, image)
        .await?;

    Ok((StatusCode::CREATED, Json(receipt.into())))
}

pub async fn list_images(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<Vec<StoredImage>>, AppError> {
    let entitlement = AccountService::new(state.db.clone())
        .resolve_entitlement(auth.user_id)
        .await?;

    let images = image_service(&state)
        .list_for_account(entitlement.account_id)
        .await?;

    Ok(Json(images))
}

#[derive(Deserialize)]
pub struct IssueLinkRequest {
    pub image_id: Uuid,
    pub ttl_seconds: i64,
}

#[derive(Serialize)]
pub struct IssueLinkResponse {
    pub token: String,
    pub link: String,
    pub seconds_left: i64,
}

impl From<IssuedLink> for IssueLinkResponse {
    fn from(issued: IssuedLink) -> Self {
        Self {
            link: format!("/v1/expiring-links/{}", issued.token),
            token: issued.token,
            seconds_left: issued.seconds_left,
        }
    }
}

pub async fn issue_expiring_link(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<IssueLinkRequest>,
) -> Result<(StatusCode, Json<IssueLinkResponse>), AppError> {
    let entitlement = AccountService::new(state.db.clone())
        .resolve_entitlement(auth.user_id)
        .await?;

    let issued = LinkService::new(state.db.clone(), state.storage.clone())
        .issue(&entitlement, payload.image_id, payload.ttl_seconds)
        .await?;

    Ok((StatusCode::CREATED, Json(issued.into())))
}

pub async fn resolve_expiring_link(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> Result<Response, AppError> {
    let outcome = LinkService::new(state.db.clone(), state.storage.clone())
        .resolve(&token)
        .await?;

    match outcome {
        LinkResolution::Active {
            bytes,
            content_type,
        } => Ok(([(header::CONTENT_TYPE, content_type)], bytes).into_response()),
        LinkResolution::Expired => Err(AppError::gone("link has expired")),
        LinkResolution::NotFound => Err(AppError::not_found("link not found")),
    }
}

#[derive(Deserialize)]
pub struct CreateDimensionSpecRequest {
    pub height: Option<u32>,
    pub width: Option<u32>,
}

pub async fn create_dimension_spec(
    State(state): State<AppState>,
    _admin: AdminToken,
    Json(payload): Json<CreateDimensionSpecRequest>,
) -> Result<(StatusCode, Json<DimensionSpec>), AppError> {
    let spec = TierService::new(state.db.clone())
        .create_dimension_spec(payload.height, payload.width)
        .await?;

    Ok((StatusCode::CREATED, Json(spec)))
}

#[derive(Deserialize)]
pub struct CreateTierRequest {
    pub name: String,
    #[serde(default)]
    pub allow_original_access: bool,
    #[serde(default)]
    pub allow_expiring_links: bool,
    pub dimension_spec_ids: Vec<Uuid>,
}

pub async fn create_tier(
    State(state): State<AppState>,
    _admin: AdminToken,
    Json(payload): Json<CreateTierRequest>,
) -> Result<(StatusCode, Json<AccountTier>), AppError> {
    let tier = TierService::new(state.db.clone())
        .create_tier(
            &payload.name,
            payload.allow_original_access,
            payload.allow_expiring_links,
            &payload.dimension_spec_ids,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(tier)))
}

pub async fn list_tiers(
    State(state): State<AppState>,
    _admin: AdminToken,
) -> Result<Json<Vec<AccountTier>>, AppError> {
    let tiers = TierService::new(state.db.clone()).list_tiers().await?;
    Ok(Json(tiers))
}

pub async fn delete_tier(
    State(state): State<AppState>,
    _admin: AdminToken,
    Path(tier_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    TierService::new(state.db.clone()).delete_tier(tier_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Deserialize)]
pub struct CreateAccountRequest {
    pub email: String,
    pub password: String,
    pub tier_id: Uuid,
}

pub async fn create_account(
    State(state): State<AppState>,
    _admin: AdminToken,
    Json(payload): Json<CreateAccountRequest>,
) -> Result<(StatusCode, Json<CreatedAccount>), AppError> {
    let created = TierService::new(state.db.clone())
        .create_account(&payload.email, &payload.password, payload.tier_id)
        .await?;

    Ok((StatusCode::CREATED, Json(created)))
}

fn auth_service(state: &AppState) -> AuthService {
    AuthService::new(
        state.db.clone(),
        state.paseto_access_key,
        state.access_ttl_minutes,
    )
}

fn image_service(state: &AppState) -> ImageService {
    ImageService::new(
        state.db.clone(),
        state.storage.clone(),
        state.media_base_url.clone(),
    )
}
