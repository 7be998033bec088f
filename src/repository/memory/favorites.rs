//! Favorites and dashboard counters

use async_trait::async_trait;
use chrono::Utc;

use super::InMemoryStore;
use crate::{
    error::{AppError, AppResult},
    models::{
        favorite::{ToggleAction, ToggleOutcome},
        CopyStatus, Favorite, FavoriteTarget, LibraryStats, User,
    },
    repository::{FavoriteStore, StatsStore},
};

#[async_trait]
impl FavoriteStore for InMemoryStore {
    async fn toggle_favorite(&self, user_id: i32, target: FavoriteTarget) -> AppResult<ToggleOutcome> {
        let mut state = self.lock().await?;
        if !state.users.contains_key(&user_id) {
            return Err(AppError::NotFound(format!("User {} not found", user_id)));
        }
        let target_live = match target {
            FavoriteTarget::Genre(id) => state.genres.get(&id).is_some_and(|g| g.deleted_at.is_none()),
            FavoriteTarget::Book(id) => state.books.get(&id).is_some_and(|b| b.deleted_at.is_none()),
            FavoriteTarget::Author(id) => state.authors.get(&id).is_some_and(|a| a.deleted_at.is_none()),
        };
        if !target_live {
            return Err(AppError::NotFound(format!("{} not found", target)));
        }

        let existing = state
            .favorites
            .values()
            .find(|f| f.user_id == user_id && f.target() == target)
            .cloned();
        let action = ToggleAction::for_existing(existing.as_ref());
        let now = Utc::now();

        match existing {
            None => {
                let favorite = Favorite {
                    id: state.next_id("favorites"),
                    user_id,
                    favorable_type: target.kind(),
                    favorable_id: target.id(),
                    created_at: now,
                    updated_at: now,
                    deleted_at: None,
                };
                state.favorites.insert(favorite.id, favorite);
            }
            Some(favorite) => {
                if let Some(row) = state.favorites.get_mut(&favorite.id) {
                    row.deleted_at = (action == ToggleAction::Remove).then_some(now);
                    row.updated_at = now;
                }
            }
        }

        Ok(action.outcome())
    }

    async fn list_favorites(&self, user_id: i32) -> AppResult<Vec<Favorite>> {
        let state = self.lock().await?;
        let mut favorites: Vec<Favorite> = state
            .favorites
            .values()
            .filter(|f| f.user_id == user_id && f.is_active())
            .cloned()
            .collect();
        favorites.sort_by_key(|f| (f.favorable_type, f.favorable_id));
        Ok(favorites)
    }

    async fn favorited_by(&self, target: FavoriteTarget, limit: i64) -> AppResult<Vec<User>> {
        let state = self.lock().await?;
        let mut favorites: Vec<&Favorite> = state
            .favorites
            .values()
            .filter(|f| f.target() == target && f.is_active())
            .collect();
        favorites.sort_by(|a, b| (b.updated_at, b.id).cmp(&(a.updated_at, a.id)));

        Ok(favorites
            .into_iter()
            .filter_map(|f| state.users.get(&f.user_id).cloned())
            .take(usize::try_from(limit).unwrap_or(0))
            .collect())
    }
}

#[async_trait]
impl StatsStore for InMemoryStore {
    async fn library_stats(&self) -> AppResult<LibraryStats> {
        let state = self.lock().await?;
        let live_copies: Vec<_> = state.copies.values().filter(|c| !c.is_deleted()).collect();
        let mut borrowing: Vec<i32> = state.active_borrows().map(|b| b.student_id).collect();
        let active_borrows = borrowing.len() as i64;
        borrowing.sort_unstable();
        borrowing.dedup();

        Ok(LibraryStats {
            students: state.students.values().filter(|s| s.deleted_at.is_none()).count() as i64,
            books: state.books.values().filter(|b| b.deleted_at.is_none()).count() as i64,
            copies: live_copies.len() as i64,
            available_copies: live_copies
                .iter()
                .filter(|c| c.status == CopyStatus::Available)
                .count() as i64,
            active_borrows,
            borrowing_students: borrowing.len() as i64,
        })
    }
}
