//! Error types for the Libraria server

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Stable numeric error codes returned in every error body
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum ErrorCode {
    Failure = 1,
    NotAuthorized = 2,
    DbFailure = 3,
    NoSuchRecord = 4,
    NoAvailableCopy = 5,
    InvalidDate = 6,
    AlreadyReturned = 7,
    Conflict = 8,
    Timeout = 9,
    Duplicate = 10,
    BadValue = 11,
}

/// Main application error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Authorization failed: {0}")]
    Authorization(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("No available copy of book {0}")]
    NoAvailableCopy(i32),

    #[error("Invalid date: {0}")]
    InvalidDate(String),

    #[error("Borrow {0} has already been returned")]
    AlreadyReturned(i32),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Timeout: {0}")]
    Timeout(String),

    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    #[error("Database error: {0}")]
    Database(sqlx::Error),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    /// Whether the caller may simply retry the same operation
    pub fn is_retryable(&self) -> bool {
        matches!(self, AppError::Conflict(_) | AppError::Timeout(_))
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            AppError::Authentication(_) | AppError::Authorization(_) => ErrorCode::NotAuthorized,
            AppError::NotFound(_) => ErrorCode::NoSuchRecord,
            AppError::Validation(_) => ErrorCode::BadValue,
            AppError::NoAvailableCopy(_) => ErrorCode::NoAvailableCopy,
            AppError::InvalidDate(_) => ErrorCode::InvalidDate,
            AppError::AlreadyReturned(_) => ErrorCode::AlreadyReturned,
            AppError::Conflict(_) => ErrorCode::Conflict,
            AppError::Timeout(_) => ErrorCode::Timeout,
            AppError::ConstraintViolation(_) => ErrorCode::Duplicate,
            AppError::Database(_) => ErrorCode::DbFailure,
            AppError::Internal(_) => ErrorCode::Failure,
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            AppError::Authentication(_) => StatusCode::UNAUTHORIZED,
            AppError::Authorization(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::InvalidDate(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::NoAvailableCopy(_)
            | AppError::AlreadyReturned(_)
            | AppError::Conflict(_)
            | AppError::ConstraintViolation(_) => StatusCode::CONFLICT,
            AppError::Timeout(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Database(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Postgres SQLSTATE codes we classify explicitly
mod sqlstate {
    pub const UNIQUE_VIOLATION: &str = "23505";
    pub const FOREIGN_KEY_VIOLATION: &str = "23503";
    pub const SERIALIZATION_FAILURE: &str = "40001";
    pub const DEADLOCK_DETECTED: &str = "40P01";
    pub const LOCK_NOT_AVAILABLE: &str = "55P03";
    pub const QUERY_CANCELED: &str = "57014";
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => return AppError::NotFound("Record not found".to_string()),
            sqlx::Error::PoolTimedOut => {
                return AppError::Timeout("Timed out waiting for a database connection".to_string())
            }
            _ => {}
        }

        let (code, message) = match &err {
            sqlx::Error::Database(db) => (db.code().map(|c| c.into_owned()), db.message().to_string()),
            _ => (None, String::new()),
        };

        match code.as_deref() {
            Some(sqlstate::UNIQUE_VIOLATION) => AppError::ConstraintViolation(message),
            Some(sqlstate::FOREIGN_KEY_VIOLATION) => AppError::NotFound(message),
            Some(sqlstate::SERIALIZATION_FAILURE)
            | Some(sqlstate::DEADLOCK_DETECTED)
            | Some(sqlstate::LOCK_NOT_AVAILABLE) => AppError::Conflict(message),
            Some(sqlstate::QUERY_CANCELED) => AppError::Timeout(message),
            _ => AppError::Database(err),
        }
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        AppError::Validation(errors.to_string())
    }
}

/// Error response body
#[derive(Serialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    pub code: u32,
    pub error: String,
    pub message: String,
    pub retryable: bool,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let message = match &self {
            AppError::Database(e) => {
                tracing::error!("Database error: {:?}", e);
                "Database error".to_string()
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                "Internal server error".to_string()
            }
            other => other.to_string(),
        };

        let code = self.code();
        let body = Json(ErrorResponse {
            code: code as u32,
            error: format!("{:?}", code),
            message,
            retryable: self.is_retryable(),
        });

        (self.status(), body).into_response()
    }
}

/// Result type alias for application operations
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn row_not_found_maps_to_not_found() {
        let err: AppError = sqlx::Error::RowNotFound.into();
        assert!(matches!(err, AppError::NotFound(_)));
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn pool_timeout_is_a_retryable_timeout() {
        let err: AppError = sqlx::Error::PoolTimedOut.into();
        assert!(matches!(err, AppError::Timeout(_)));
        assert!(err.is_retryable());
        assert_eq!(err.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn circulation_errors_are_conflicts_but_not_retryable() {
        for err in [AppError::NoAvailableCopy(3), AppError::AlreadyReturned(9)] {
            assert_eq!(err.status(), StatusCode::CONFLICT);
            assert!(!err.is_retryable());
        }
        assert_eq!(AppError::NoAvailableCopy(3).code(), ErrorCode::NoAvailableCopy);
        assert_eq!(AppError::AlreadyReturned(9).code(), ErrorCode::AlreadyReturned);
    }

    #[test]
    fn invalid_date_is_unprocessable() {
        let err = AppError::InvalidDate("in the future".into());
        assert_eq!(err.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(err.code() as u32, 6);
    }

    #[test]
    fn constraint_violation_reports_duplicate() {
        let err = AppError::ConstraintViolation("favorites_unique".into());
        assert_eq!(err.code(), ErrorCode::Duplicate);
        assert!(!err.is_retryable());
    }
}
