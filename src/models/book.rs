//! Book (catalog entry) model and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

/// Catalog entry; physical copies live in `book_copies`
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Book {
    pub id: i32,
    pub title: String,
    pub isbn: Option<String>,
    pub description: Option<String>,
    pub published_year: Option<i32>,
    pub image_path: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
    // Computed fields (populated when queried with sub-selects, empty otherwise)
    #[sqlx(default)]
    #[serde(default)]
    pub author_ids: Vec<i32>,
    #[sqlx(default)]
    #[serde(default)]
    pub genre_ids: Vec<i32>,
    #[sqlx(default)]
    #[serde(default)]
    pub available_copies: Option<i64>,
}

/// Create book request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateBook {
    #[validate(length(min = 1, max = 255))]
    pub title: String,
    #[validate(length(max = 32))]
    pub isbn: Option<String>,
    #[validate(length(max = 65535))]
    pub description: Option<String>,
    pub published_year: Option<i32>,
    pub image_path: Option<String>,
    #[serde(default)]
    pub author_ids: Vec<i32>,
    #[serde(default)]
    pub genre_ids: Vec<i32>,
}

/// Update book request; `author_ids`/`genre_ids` replace the whole relation when present
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateBook {
    #[validate(length(min = 1, max = 255))]
    pub title: Option<String>,
    #[validate(length(max = 32))]
    pub isbn: Option<String>,
    #[validate(length(max = 65535))]
    pub description: Option<String>,
    pub published_year: Option<i32>,
    pub image_path: Option<String>,
    pub author_ids: Option<Vec<i32>>,
    pub genre_ids: Option<Vec<i32>>,
}

/// Book list filters
#[derive(Debug, Default, Clone, Deserialize, IntoParams, ToSchema)]
pub struct BookQuery {
    /// Case-insensitive title search
    pub search: Option<String>,
    pub author_id: Option<i32>,
    pub genre_id: Option<i32>,
    /// Only books with at least one available copy
    pub available_only: Option<bool>,
    pub include_deleted: Option<bool>,
}
