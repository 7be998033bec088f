//! Book copy (physical, individually tracked instance of a book)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use super::enums::CopyStatus;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct BookCopy {
    pub id: i32,
    pub book_id: i32,
    /// Human-readable copy identifier (shelf label)
    pub copy_code: String,
    /// Only changed by the circulation rules
    pub status: CopyStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl BookCopy {
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}

/// Create copy request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateBookCopy {
    #[validate(length(min = 1, max = 64))]
    pub copy_code: String,
    /// Defaults to `available`; `borrowed` is refused
    pub status: Option<CopyStatus>,
}

/// Update copy request (status is not editable)
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateBookCopy {
    #[validate(length(min = 1, max = 64))]
    pub copy_code: String,
}
