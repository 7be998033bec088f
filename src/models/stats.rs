//! Dashboard counters

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

/// Library-wide counters (soft-deleted rows excluded)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct LibraryStats {
    pub students: i64,
    pub books: i64,
    pub copies: i64,
    pub available_copies: i64,
    pub active_borrows: i64,
    /// Students holding at least one active borrow
    pub borrowing_students: i64,
}
