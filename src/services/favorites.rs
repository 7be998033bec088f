//! Favorite genres, books and authors

use std::{sync::Arc, time::Duration};

use super::bounded;
use crate::{
    error::AppResult,
    models::{
        favorite::{ToggleOutcome, ToggleResult},
        Favorite, FavoriteTarget, User,
    },
    repository::{AuthorStore, BookStore, FavoriteStore, GenreStore, LibraryStore},
};

/// Avatars shown in the "favorited by" column
pub const FAVORITED_BY_DEFAULT_LIMIT: i64 = 3;

#[derive(Clone)]
pub struct FavoritesService {
    store: Arc<dyn LibraryStore>,
    limit: Duration,
}

impl FavoritesService {
    pub fn new(store: Arc<dyn LibraryStore>, limit: Duration) -> Self {
        Self { store, limit }
    }

    /// Title used in notifications; fails with `NotFound` for a missing or deleted target
    async fn target_title(&self, target: FavoriteTarget) -> AppResult<String> {
        let title = match target {
            FavoriteTarget::Genre(id) => bounded(self.limit, "get_genre", self.store.get_genre(id, false)).await?.title,
            FavoriteTarget::Book(id) => bounded(self.limit, "get_book", self.store.get_book(id, false)).await?.title,
            FavoriteTarget::Author(id) => bounded(self.limit, "get_author", self.store.get_author(id, false))
                .await?
                .full_name(),
        };
        Ok(title)
    }

    /// Add `target` to the user's favorites, or remove it if already there
    pub async fn toggle(&self, user_id: i32, target: FavoriteTarget) -> AppResult<ToggleResult> {
        let title = self.target_title(target).await?;
        let outcome = bounded(self.limit, "toggle_favorite", self.store.toggle_favorite(user_id, target)).await?;

        let message = match outcome {
            ToggleOutcome::Added => format!("{} added to favorites", title),
            ToggleOutcome::Removed => format!("{} removed from favorites", title),
        };
        tracing::info!(user_id, %target, ?outcome, "favorite toggled");

        Ok(ToggleResult {
            outcome,
            favorable_type: target.kind(),
            favorable_id: target.id(),
            message,
        })
    }

    pub async fn list_for_user(&self, user_id: i32) -> AppResult<Vec<Favorite>> {
        bounded(self.limit, "list_favorites", self.store.list_favorites(user_id)).await
    }

    /// Most recent users holding `target` as a favorite
    pub async fn favorited_by(&self, target: FavoriteTarget, limit: Option<i64>) -> AppResult<Vec<User>> {
        self.target_title(target).await?;
        let limit = limit.unwrap_or(FAVORITED_BY_DEFAULT_LIMIT).max(0);
        bounded(self.limit, "favorited_by", self.store.favorited_by(target, limit)).await
    }
}
