//! Server-specific error types

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::api::response::ErrorResponse;
use crate::db::StoreError;
use crate::ingest::PrefetchError;
use crate::welfare::WelfareError;

/// Alias for Result with AppError
pub type ApiResult<T> = Result<T, AppError>;

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// A required upstream is not configured
    #[error("Service unavailable: {0}")]
    Unavailable(String),

    /// data.go.kr failed or refused the request
    #[error("Upstream error: {0}")]
    Upstream(String),

    #[error("Storage error: {0}")]
    Store(#[from] StoreError),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            AppError::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            AppError::Unauthorized(_) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
            AppError::Unavailable(_) => (StatusCode::SERVICE_UNAVAILABLE, "SERVICE_UNAVAILABLE"),
            AppError::Upstream(_) => (StatusCode::BAD_GATEWAY, "UPSTREAM_ERROR"),
            AppError::Store(_) | AppError::Internal(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR")
            },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();
        let message = match self {
            AppError::NotFound(msg)
            | AppError::BadRequest(msg)
            | AppError::Unauthorized(msg)
            | AppError::Unavailable(msg) => msg,
            AppError::Upstream(msg) => {
                tracing::warn!("Upstream error: {}", msg);
                msg
            },
            AppError::Store(e) => {
                tracing::error!("Storage error: {}", e);
                "A database error occurred".to_string()
            },
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                "An internal error occurred".to_string()
            },
        };

        (status, Json(ErrorResponse::new(code, message))).into_response()
    }
}

impl From<WelfareError> for AppError {
    fn from(err: WelfareError) -> Self {
        match err {
            WelfareError::NotFound { .. } => AppError::NotFound(err.to_string()),
            WelfareError::MissingServiceKey => AppError::Unavailable(err.to_string()),
            other => AppError::Upstream(other.to_string()),
        }
    }
}

impl From<PrefetchError> for AppError {
    fn from(err: PrefetchError) -> Self {
        match err {
            PrefetchError::List(e) => e.into(),
            PrefetchError::Store(e) => e.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_welfare_error_mapping() {
        let not_found: AppError = WelfareError::NotFound {
            serv_id: "WLF1".into(),
            message: "NODATA_ERROR".into(),
        }
        .into();
        assert_eq!(not_found.status_and_code().0, StatusCode::NOT_FOUND);

        let no_key: AppError = WelfareError::MissingServiceKey.into();
        assert_eq!(no_key.status_and_code().0, StatusCode::SERVICE_UNAVAILABLE);

        let quota: AppError = WelfareError::QuotaExceeded.into();
        assert_eq!(quota.status_and_code().0, StatusCode::BAD_GATEWAY);

        let exhausted: AppError = WelfareError::RetriesExhausted {
            attempts: 3,
            last_error: "Timeout".into(),
        }
        .into();
        assert_eq!(exhausted.status_and_code(), (StatusCode::BAD_GATEWAY, "UPSTREAM_ERROR"));
    }

    #[test]
    fn test_store_error_is_opaque() {
        let err = AppError::Store(StoreError::Invalid("bad row".into()));
        assert_eq!(err.status_and_code().0, StatusCode::INTERNAL_SERVER_ERROR);
    }
}
