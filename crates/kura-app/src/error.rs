use salvo::http::StatusCode;
use thiserror::Error;

use kura_service::error::ServiceError;

/// Application-level errors (HTTP layer)
#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    ServiceError(#[from] ServiceError),

    #[error(transparent)]
    DatabaseError(#[from] kura_db::error::DbError),

    #[error(transparent)]
    CoreError(#[from] kura_core::error::CoreError),

    #[error("Failed to read request: {0}")]
    RequestError(String),
}

pub type AppResult<T> = std::result::Result<T, AppError>;

impl AppError {
    /// ## Summary
    /// The HTTP status a middleware answers with when it fails with this error.
    ///
    /// Token and header problems are the caller's fault and answer 401. Store
    /// and database outages answer 503. Anything unexpected is a 500.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::ServiceError(error) => match error {
                ServiceError::AuthorizationHeader(_) | ServiceError::InvalidToken(_) => {
                    StatusCode::UNAUTHORIZED
                }
                ServiceError::UnsupportedMethod(_) => StatusCode::METHOD_NOT_ALLOWED,
                ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
                ServiceError::StoreError(_) | ServiceError::DatabaseError(_) => {
                    StatusCode::SERVICE_UNAVAILABLE
                }
                ServiceError::AclParse { .. }
                | ServiceError::InvalidHeader(_)
                | ServiceError::InvalidConfiguration(_)
                | ServiceError::InvariantViolation(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::DatabaseError(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::RequestError(_) => StatusCode::BAD_REQUEST,
            Self::CoreError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}
