use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use fv_service::ServiceError;
use fv_types::FieldErrors;
use serde_json::{json, Value};
use thiserror::Error;

/// Failures while configuring or running the server.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("store error: {0}")]
    Store(#[from] fv_store::StoreError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

pub type ServerResult<T> = Result<T, ServerError>;

pub const DETAIL_NOT_FOUND: &str = "Not found.";
pub const DETAIL_INVALID_PAGE: &str = "Invalid page.";
pub const DETAIL_INTERNAL: &str = "Internal server error.";

/// A request failure rendered as a JSON error body.
#[derive(Debug)]
pub enum ApiError {
    /// 400 with `{field: [messages]}`.
    Fields(FieldErrors),
    /// 400 with `{"detail": ...}`, for bodies that are not usable JSON.
    Malformed(String),
    NotFound,
    InvalidPage,
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Fields(_) | Self::Malformed(_) => StatusCode::BAD_REQUEST,
            Self::NotFound | Self::InvalidPage => StatusCode::NOT_FOUND,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn body(&self) -> Value {
        match self {
            Self::Fields(errors) => json!(errors),
            Self::Malformed(detail) => json!({ "detail": detail }),
            Self::NotFound => json!({ "detail": DETAIL_NOT_FOUND }),
            Self::InvalidPage => json!({ "detail": DETAIL_INVALID_PAGE }),
            Self::Internal(_) => json!({ "detail": DETAIL_INTERNAL }),
        }
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Validation(errors) | ServiceError::InvalidParameter(errors) => Self::Fields(errors),
            ServiceError::NotFound(_) => Self::NotFound,
            ServiceError::InvalidPage(_) => Self::InvalidPage,
            ServiceError::Store(e) => Self::Internal(e.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let Self::Internal(reason) = &self {
            tracing::error!(%reason, "request failed");
        }
        (self.status(), Json(self.body())).into_response()
    }
}
