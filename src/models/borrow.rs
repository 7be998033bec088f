//! Borrow (loan of one copy to one student) model and related types

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};

use super::enums::BorrowStatus;

/// Borrow model from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Borrow {
    pub id: i32,
    pub student_id: i32,
    pub book_copy_id: i32,
    pub date_borrowed: NaiveDate,
    /// `None` while the borrow is active
    pub date_returned: Option<NaiveDate>,
    pub return_status: BorrowStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
    // Computed fields (populated when queried with JOINs, None otherwise)
    #[sqlx(default)]
    #[serde(default)]
    pub book_id: Option<i32>,
    #[sqlx(default)]
    #[serde(default)]
    pub book_title: Option<String>,
    #[sqlx(default)]
    #[serde(default)]
    pub copy_code: Option<String>,
    #[sqlx(default)]
    #[serde(default)]
    pub student_number: Option<String>,
    #[sqlx(default)]
    #[serde(default)]
    pub student_name: Option<String>,
}

impl Borrow {
    pub fn is_active(&self) -> bool {
        self.date_returned.is_none()
    }
}

/// Create borrow request: the copy is picked by the server
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateBorrow {
    pub student_id: i32,
    pub book_id: i32,
    /// Defaults to today; must not be in the future
    pub date_borrowed: Option<NaiveDate>,
}

/// Return borrow request
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct ReturnBorrow {
    /// Defaults to today; must not precede the borrow date
    pub date_returned: Option<NaiveDate>,
}

/// Borrow list filters
#[derive(Debug, Default, Clone, Deserialize, IntoParams, ToSchema)]
pub struct BorrowQuery {
    pub student_id: Option<i32>,
    pub book_id: Option<i32>,
    /// `borrowed` lists active borrows, `returned` the closed ones
    pub status: Option<BorrowStatus>,
    pub include_deleted: Option<bool>,
}

/// Copy availability of one book
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct BookAvailability {
    pub book_id: i32,
    pub available_copies: i64,
    pub total_copies: i64,
    pub is_available: bool,
}

impl BookAvailability {
    pub fn new(book_id: i32, available_copies: i64, total_copies: i64) -> Self {
        Self {
            book_id,
            available_copies,
            total_copies,
            is_available: available_copies > 0,
        }
    }
}
