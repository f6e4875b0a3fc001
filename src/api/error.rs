use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

use crate::auth::AuthError;
use crate::billing::BillingError;
use crate::cases::CaseError;
use crate::store::StoreError;

/// Everything a handler can fail with, mapped to a status code and a
/// user-visible message. Store failures are the one exception: the
/// detail goes to the log, the client gets a generic body.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Unauthorized(String),
    #[error("Solo administradores")]
    Forbidden,
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    Conflict(String),
    #[error("Error interno")]
    Internal(#[from] StoreError),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let Self::Internal(err) = &self {
            tracing::error!(error = %err, "store failure");
        }

        let status = self.status();
        let body = json!({ "error": self.to_string() });
        (status, Json(body)).into_response()
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::DuplicateUser => Self::Conflict(err.to_string()),
            AuthError::BadCredentials => Self::Unauthorized(err.to_string()),
            AuthError::Store(e) => Self::Internal(e),
        }
    }
}

impl From<CaseError> for ApiError {
    fn from(err: CaseError) -> Self {
        match err {
            CaseError::NotFound => Self::NotFound(err.to_string()),
            CaseError::Store(e) => Self::Internal(e),
        }
    }
}

impl From<BillingError> for ApiError {
    fn from(err: BillingError) -> Self {
        match err {
            BillingError::DuplicateProduct => Self::Conflict(err.to_string()),
            BillingError::UnknownLine => Self::NotFound(err.to_string()),
            BillingError::EmptyName | BillingError::InvalidPrice => {
                Self::Validation(err.to_string())
            }
        }
    }
}
