//! Favorite (a user's saved reference to a genre, book or author)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

use super::enums::FavorableType;

/// What a favorite points at. Persisted as `(favorable_type, favorable_id)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FavoriteTarget {
    Genre(i32),
    Book(i32),
    Author(i32),
}

impl FavoriteTarget {
    pub fn from_parts(kind: FavorableType, id: i32) -> Self {
        match kind {
            FavorableType::Genre => FavoriteTarget::Genre(id),
            FavorableType::Book => FavoriteTarget::Book(id),
            FavorableType::Author => FavoriteTarget::Author(id),
        }
    }

    pub fn kind(&self) -> FavorableType {
        match self {
            FavoriteTarget::Genre(_) => FavorableType::Genre,
            FavoriteTarget::Book(_) => FavorableType::Book,
            FavoriteTarget::Author(_) => FavorableType::Author,
        }
    }

    pub fn id(&self) -> i32 {
        match *self {
            FavoriteTarget::Genre(id) | FavoriteTarget::Book(id) | FavoriteTarget::Author(id) => id,
        }
    }
}

impl std::fmt::Display for FavoriteTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.kind(), self.id())
    }
}

/// Favorite row; `deleted_at` set means the favorite is currently removed
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Favorite {
    pub id: i32,
    pub user_id: i32,
    pub favorable_type: FavorableType,
    pub favorable_id: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Favorite {
    pub fn target(&self) -> FavoriteTarget {
        FavoriteTarget::from_parts(self.favorable_type, self.favorable_id)
    }

    pub fn is_active(&self) -> bool {
        self.deleted_at.is_none()
    }
}

/// Result of a toggle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ToggleOutcome {
    Added,
    Removed,
}

/// Write a toggle performs against the single row kept per (user, target)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleAction {
    Insert,
    Revive,
    Remove,
}

impl ToggleAction {
    pub fn for_existing(existing: Option<&Favorite>) -> Self {
        match existing {
            None => ToggleAction::Insert,
            Some(favorite) if favorite.is_active() => ToggleAction::Remove,
            Some(_) => ToggleAction::Revive,
        }
    }

    pub fn outcome(self) -> ToggleOutcome {
        match self {
            ToggleAction::Insert | ToggleAction::Revive => ToggleOutcome::Added,
            ToggleAction::Remove => ToggleOutcome::Removed,
        }
    }
}

/// Toggle response with the notification text shown to the user
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ToggleResult {
    pub outcome: ToggleOutcome,
    pub favorable_type: FavorableType,
    pub favorable_id: i32,
    pub message: String,
}
