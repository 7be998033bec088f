//! Genres repository

use async_trait::async_trait;

use super::{GenreStore, Repository};
use crate::{
    error::{AppError, AppResult},
    models::{
        genre::{CreateGenre, GenreQuery, UpdateGenre},
        Genre,
    },
};

#[async_trait]
impl GenreStore for Repository {
    async fn create_genre(&self, data: &CreateGenre) -> AppResult<Genre> {
        let genre = sqlx::query_as::<_, Genre>(
            "INSERT INTO genres (title, slug, description) VALUES ($1, $2, $3) RETURNING *",
        )
        .bind(&data.title)
        .bind(&data.slug)
        .bind(&data.description)
        .fetch_one(&self.pool)
        .await?;
        Ok(genre)
    }

    async fn get_genre(&self, id: i32, include_deleted: bool) -> AppResult<Genre> {
        sqlx::query_as::<_, Genre>("SELECT * FROM genres WHERE id = $1 AND ($2 OR deleted_at IS NULL)")
            .bind(id)
            .bind(include_deleted)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Genre {} not found", id)))
    }

    async fn list_genres(&self, query: &GenreQuery) -> AppResult<Vec<Genre>> {
        let genres = sqlx::query_as::<_, Genre>(
            r#"
            SELECT * FROM genres
            WHERE ($1 OR deleted_at IS NULL)
              AND ($2::text IS NULL OR position(lower($2) in lower(title)) > 0)
            ORDER BY title
            "#,
        )
        .bind(query.include_deleted.unwrap_or(false))
        .bind(&query.search)
        .fetch_all(&self.pool)
            .await?;
        Ok(genres)
    }

    async fn update_genre(&self, id: i32, data: &UpdateGenre) -> AppResult<Genre> {
        sqlx::query_as::<_, Genre>(
            r#"
            UPDATE genres SET
                title = COALESCE($2, title),
                slug = COALESCE($3, slug),
                description = COALESCE($4, description),
                updated_at = NOW()
            WHERE id = $1 AND deleted_at IS NULL
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&data.title)
        .bind(&data.slug)
        .bind(&data.description)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Genre {} not found", id)))
    }

    async fn delete_genre(&self, id: i32) -> AppResult<()> {
        let result = sqlx::query("UPDATE genres SET deleted_at = NOW() WHERE id = $1 AND deleted_at IS NULL")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Genre {} not found", id)));
        }
        Ok(())
    }
}
