use fv_store::StoreError;
use fv_types::validation::{FIELD_TITLE, MSG_DUPLICATE_TITLE};
use fv_types::{FeatureId, FieldErrors};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServiceError {
    /// One or more submitted fields are invalid.
    #[error("validation failed: {0}")]
    Validation(FieldErrors),

    /// A query parameter is out of range.
    #[error("invalid parameter: {0}")]
    InvalidParameter(FieldErrors),

    #[error("feature not found: {0}")]
    NotFound(FeatureId),

    /// The requested page lies past the last page of results.
    #[error("invalid page: {0}")]
    InvalidPage(u64),

    #[error("store error: {0}")]
    Store(StoreError),
}

impl From<StoreError> for ServiceError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(id) => Self::NotFound(id),
            StoreError::DuplicateTitle(_) => {
                Self::Validation(FieldErrors::single(FIELD_TITLE, MSG_DUPLICATE_TITLE))
            }
            other => Self::Store(other),
        }
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;
