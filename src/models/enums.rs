//! Shared domain enums, persisted as Postgres enum types

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

// ---------------------------------------------------------------------------
// CopyStatus
// ---------------------------------------------------------------------------

/// Availability of one physical copy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema, sqlx::Type)]
#[sqlx(type_name = "copy_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum CopyStatus {
    Available,
    Borrowed,
    Lost,
    Damaged,
}

impl CopyStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CopyStatus::Available => "available",
            CopyStatus::Borrowed => "borrowed",
            CopyStatus::Lost => "lost",
            CopyStatus::Damaged => "damaged",
        }
    }
}

impl std::fmt::Display for CopyStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ---------------------------------------------------------------------------
// BorrowStatus
// ---------------------------------------------------------------------------

/// Borrow lifecycle: `Borrowed` is initial, `Returned` is terminal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema, sqlx::Type)]
#[sqlx(type_name = "borrow_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum BorrowStatus {
    Borrowed,
    Returned,
}

impl BorrowStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BorrowStatus::Borrowed => "borrowed",
            BorrowStatus::Returned => "returned",
        }
    }
}

impl std::fmt::Display for BorrowStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ---------------------------------------------------------------------------
// FavorableType
// ---------------------------------------------------------------------------

/// Persisted tag of a favorite's target; ordered like the Postgres enum
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema, sqlx::Type)]
#[sqlx(type_name = "favorable_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum FavorableType {
    Genre,
    Book,
    Author,
}

impl FavorableType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FavorableType::Genre => "genre",
            FavorableType::Book => "book",
            FavorableType::Author => "author",
        }
    }
}

impl std::fmt::Display for FavorableType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for FavorableType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "genre" => Ok(FavorableType::Genre),
            "book" => Ok(FavorableType::Book),
            "author" => Ok(FavorableType::Author),
            _ => Err(format!("Invalid favorable type: {}", s)),
        }
    }
}
