use thiserror::Error;

use crate::imaging::naming::NamingError;
use crate::imaging::variants::VariantError;

/// Failure taxonomy for the application services. Each variant maps to a
/// distinct HTTP status at the edge; callers match on it, not on strings.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{0}")]
    Validation(String),
    #[error("no account is linked to this user")]
    NoAccount,
    #[error("{0}")]
    Forbidden(String),
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("{0}")]
    Conflict(String),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl From<sqlx::Error> for ServiceError {
    fn from(err: sqlx::Error) -> Self {
        Self::Internal(err.into())
    }
}

impl From<VariantError> for ServiceError {
    fn from(err: VariantError) -> Self {
        match err {
            VariantError::UnsupportedFormat => {
                Self::Validation("only PNG and JPEG uploads are supported".into())
            }
            VariantError::InvalidImage(_) => {
                Self::Validation("the uploaded file is not a valid image".into())
            }
            VariantError::Encode(_) | VariantError::Naming(_) => Self::Internal(err.into()),
        }
    }
}

impl From<NamingError> for ServiceError {
    fn from(err: NamingError) -> Self {
        Self::Internal(err.into())
    }
}
