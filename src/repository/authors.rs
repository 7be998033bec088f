//! Authors repository

use async_trait::async_trait;

use super::{AuthorStore, Repository};
use crate::{
    error::{AppError, AppResult},
    models::{
        author::{AuthorQuery, CreateAuthor, UpdateAuthor},
        Author,
    },
};

#[async_trait]
impl AuthorStore for Repository {
    async fn create_author(&self, data: &CreateAuthor) -> AppResult<Author> {
        let author = sqlx::query_as::<_, Author>(
            r#"
            INSERT INTO authors (first_name, last_name, details, image_path)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(&data.first_name)
        .bind(&data.last_name)
        .bind(&data.details)
        .bind(&data.image_path)
        .fetch_one(&self.pool)
        .await?;
        Ok(author)
    }

    async fn get_author(&self, id: i32, include_deleted: bool) -> AppResult<Author> {
        sqlx::query_as::<_, Author>("SELECT * FROM authors WHERE id = $1 AND ($2 OR deleted_at IS NULL)")
            .bind(id)
            .bind(include_deleted)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Author {} not found", id)))
    }

    async fn list_authors(&self, query: &AuthorQuery) -> AppResult<Vec<Author>> {
        let authors = sqlx::query_as::<_, Author>(
            r#"
            SELECT * FROM authors
            WHERE ($1 OR deleted_at IS NULL)
              AND ($2::text IS NULL OR position(lower($2) in lower(first_name || ' ' || last_name)) > 0)
            ORDER BY last_name, first_name
            "#,
        )
        .bind(query.include_deleted.unwrap_or(false))
        .bind(&query.search)
        .fetch_all(&self.pool)
        .await?;
        Ok(authors)
    }

    async fn update_author(&self, id: i32, data: &UpdateAuthor) -> AppResult<Author> {
        sqlx::query_as::<_, Author>(
            r#"
            UPDATE authors SET
                first_name = COALESCE($2, first_name),
                last_name = COALESCE($3, last_name),
                details = COALESCE($4, details),
                image_path = COALESCE($5, image_path),
                updated_at = NOW()
            WHERE id = $1 AND deleted_at IS NULL
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&data.first_name)
        .bind(&data.last_name)
        .bind(&data.details)
        .bind(&data.image_path)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Author {} not found", id)))
    }

    async fn delete_author(&self, id: i32) -> AppResult<()> {
        let result = sqlx::query("UPDATE authors SET deleted_at = NOW() WHERE id = $1 AND deleted_at IS NULL")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Author {} not found", id)));
        }
        Ok(())
    }
}
