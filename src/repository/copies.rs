//! Book copies repository. Status is written only by `borrows.rs`.

use async_trait::async_trait;

use super::{CopyStore, Repository};
use crate::{
    circulation,
    error::{AppError, AppResult},
    models::{
        copy::{CreateBookCopy, UpdateBookCopy},
        BookCopy,
    },
};

#[async_trait]
impl CopyStore for Repository {
    async fn create_copy(&self, book_id: i32, data: &CreateBookCopy) -> AppResult<BookCopy> {
        let status = circulation::initial_copy_status(data.status)?;

        sqlx::query_as::<_, BookCopy>(
            r#"
            INSERT INTO book_copies (book_id, copy_code, status)
            SELECT b.id, $2, $3 FROM books b WHERE b.id = $1 AND b.deleted_at IS NULL
            RETURNING *
            "#,
        )
        .bind(book_id)
        .bind(&data.copy_code)
        .bind(status)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Book {} not found", book_id)))
    }

    async fn get_copy(&self, id: i32, include_deleted: bool) -> AppResult<BookCopy> {
        sqlx::query_as::<_, BookCopy>("SELECT * FROM book_copies WHERE id = $1 AND ($2 OR deleted_at IS NULL)")
            .bind(id)
            .bind(include_deleted)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Copy {} not found", id)))
    }

    async fn list_copies(&self, book_id: i32, include_deleted: bool) -> AppResult<Vec<BookCopy>> {
        let copies = sqlx::query_as::<_, BookCopy>(
            "SELECT * FROM book_copies WHERE book_id = $1 AND ($2 OR deleted_at IS NULL) ORDER BY id",
        )
        .bind(book_id)
        .bind(include_deleted)
        .fetch_all(&self.pool)
        .await?;
        Ok(copies)
    }

    async fn update_copy(&self, id: i32, data: &UpdateBookCopy) -> AppResult<BookCopy> {
        sqlx::query_as::<_, BookCopy>(
            r#"
            UPDATE book_copies SET copy_code = $2, updated_at = NOW()
            WHERE id = $1 AND deleted_at IS NULL
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&data.copy_code)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Copy {} not found", id)))
    }

    async fn delete_copy(&self, id: i32) -> AppResult<()> {
        let mut tx = self.begin().await?;

        let copy = sqlx::query_as::<_, BookCopy>(
            "SELECT * FROM book_copies WHERE id = $1 AND deleted_at IS NULL FOR UPDATE",
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Copy {} not found", id)))?;

        let lent_out: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM borrows WHERE book_copy_id = $1 AND date_returned IS NULL AND deleted_at IS NULL)",
        )
        .bind(copy.id)
        .fetch_one(&mut *tx)
        .await?;
        if lent_out {
            return Err(AppError::Conflict(format!("Copy {} is out on loan", copy.copy_code)));
        }

        sqlx::query("UPDATE book_copies SET deleted_at = NOW(), updated_at = NOW() WHERE id = $1")
            .bind(copy.id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(())
    }
}
