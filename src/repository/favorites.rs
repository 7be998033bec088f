//! Favorites repository

use async_trait::async_trait;

use super::{FavoriteStore, Repository};
use crate::{
    error::{AppError, AppResult},
    models::{
        favorite::{ToggleAction, ToggleOutcome},
        FavorableType, Favorite, FavoriteTarget, User,
    },
};

fn target_table(kind: FavorableType) -> &'static str {
    match kind {
        FavorableType::Genre => "genres",
        FavorableType::Book => "books",
        FavorableType::Author => "authors",
    }
}

#[async_trait]
impl FavoriteStore for Repository {
    async fn toggle_favorite(&self, user_id: i32, target: FavoriteTarget) -> AppResult<ToggleOutcome> {
        let mut tx = self.begin().await?;

        // Held until commit, so a concurrent delete of the target waits for us
        let live_target = format!(
            "SELECT id FROM {} WHERE id = $1 AND deleted_at IS NULL FOR SHARE",
            target_table(target.kind())
        );
        sqlx::query_scalar::<_, i32>(&live_target)
            .bind(target.id())
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("{} not found", target)))?;

        let existing = sqlx::query_as::<_, Favorite>(
            r#"
            SELECT * FROM favorites
            WHERE user_id = $1 AND favorable_type = $2 AND favorable_id = $3
            FOR UPDATE
            "#,
        )
        .bind(user_id)
        .bind(target.kind())
        .bind(target.id())
        .fetch_optional(&mut *tx)
        .await?;

        let action = ToggleAction::for_existing(existing.as_ref());
        match existing {
            None => {
                // Two first-time toggles racing here meet the unique constraint;
                // the loser gets ConstraintViolation.
                sqlx::query("INSERT INTO favorites (user_id, favorable_type, favorable_id) VALUES ($1, $2, $3)")
                    .bind(user_id)
                    .bind(target.kind())
                    .bind(target.id())
                    .execute(&mut *tx)
                    .await?;
            }
            Some(favorite) => {
                // Remove soft-deletes, Revive clears the marker
                sqlx::query(
                    "UPDATE favorites SET deleted_at = CASE WHEN $2 THEN NOW() END, updated_at = NOW() WHERE id = $1",
                )
                .bind(favorite.id)
                .bind(action == ToggleAction::Remove)
                .execute(&mut *tx)
                .await?;
            }
        }

        tx.commit().await?;
        Ok(action.outcome())
    }

    async fn list_favorites(&self, user_id: i32) -> AppResult<Vec<Favorite>> {
        let favorites = sqlx::query_as::<_, Favorite>(
            r#"
            SELECT * FROM favorites
            WHERE user_id = $1 AND deleted_at IS NULL
            ORDER BY favorable_type, favorable_id
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(favorites)
    }

    async fn favorited_by(&self, target: FavoriteTarget, limit: i64) -> AppResult<Vec<User>> {
        let users = sqlx::query_as::<_, User>(
            r#"
            SELECT u.* FROM favorites f
            JOIN users u ON u.id = f.user_id
            WHERE f.favorable_type = $1 AND f.favorable_id = $2 AND f.deleted_at IS NULL
            ORDER BY f.updated_at DESC, f.id DESC
            LIMIT $3
            "#,
        )
        .bind(target.kind())
        .bind(target.id())
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(users)
    }
}
