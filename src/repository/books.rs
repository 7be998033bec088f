//! Books repository

use async_trait::async_trait;
use sqlx::{Postgres, Transaction};

use super::{BookStore, Repository};
use crate::{
    error::{AppError, AppResult},
    models::{
        book::{BookQuery, CreateBook, UpdateBook},
        Book, CopyStatus,
    },
};

/// Book columns plus relation ids and the live available-copy count
const BOOK_SELECT: &str = r#"
    SELECT b.*,
           ARRAY(SELECT ba.author_id FROM book_authors ba WHERE ba.book_id = b.id ORDER BY ba.author_id) AS author_ids,
           ARRAY(SELECT bg.genre_id FROM book_genres bg WHERE bg.book_id = b.id ORDER BY bg.genre_id) AS genre_ids,
           (SELECT COUNT(*) FROM book_copies c
             WHERE c.book_id = b.id AND c.deleted_at IS NULL AND c.status = 'available') AS available_copies
    FROM books b
"#;

impl Repository {
    async fn replace_book_relations(
        tx: &mut Transaction<'_, Postgres>,
        book_id: i32,
        author_ids: Option<&[i32]>,
        genre_ids: Option<&[i32]>,
    ) -> AppResult<()> {
        if let Some(author_ids) = author_ids {
            sqlx::query("DELETE FROM book_authors WHERE book_id = $1")
                .bind(book_id)
                .execute(&mut **tx)
                .await?;
            sqlx::query(
                r#"
                INSERT INTO book_authors (book_id, author_id)
                SELECT $1, a.id FROM authors a WHERE a.id = ANY($2) AND a.deleted_at IS NULL
                "#,
            )
            .bind(book_id)
            .bind(author_ids)
            .execute(&mut **tx)
            .await?;
        }

        if let Some(genre_ids) = genre_ids {
            sqlx::query("DELETE FROM book_genres WHERE book_id = $1")
                .bind(book_id)
                .execute(&mut **tx)
                .await?;
            sqlx::query(
                r#"
                INSERT INTO book_genres (book_id, genre_id)
                SELECT $1, g.id FROM genres g WHERE g.id = ANY($2) AND g.deleted_at IS NULL
                "#,
            )
            .bind(book_id)
            .bind(genre_ids)
            .execute(&mut **tx)
            .await?;
        }

        Ok(())
    }

    /// Every requested id must name a live author/genre
    async fn check_relation_ids(&self, author_ids: &[i32], genre_ids: &[i32]) -> AppResult<()> {
        let authors: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM authors WHERE id = ANY($1) AND deleted_at IS NULL",
        )
        .bind(author_ids)
        .fetch_one(&self.pool)
        .await?;
        if authors != distinct_len(author_ids) {
            return Err(AppError::NotFound("One or more authors not found".to_string()));
        }

        let genres: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM genres WHERE id = ANY($1) AND deleted_at IS NULL",
        )
        .bind(genre_ids)
        .fetch_one(&self.pool)
        .await?;
        if genres != distinct_len(genre_ids) {
            return Err(AppError::NotFound("One or more genres not found".to_string()));
        }
        Ok(())
    }
}

fn distinct_len(ids: &[i32]) -> i64 {
    let mut ids = ids.to_vec();
    ids.sort_unstable();
    ids.dedup();
    ids.len() as i64
}

#[async_trait]
impl BookStore for Repository {
    async fn create_book(&self, data: &CreateBook) -> AppResult<Book> {
        self.check_relation_ids(&data.author_ids, &data.genre_ids).await?;

        let mut tx = self.begin().await?;
        let book_id: i32 = sqlx::query_scalar(
            r#"
            INSERT INTO books (title, isbn, description, published_year, image_path)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            "#,
        )
        .bind(&data.title)
        .bind(&data.isbn)
        .bind(&data.description)
        .bind(data.published_year)
        .bind(&data.image_path)
        .fetch_one(&mut *tx)
        .await?;

        Self::replace_book_relations(&mut tx, book_id, Some(&data.author_ids), Some(&data.genre_ids)).await?;
        tx.commit().await?;

        self.get_book(book_id, false).await
    }

    async fn get_book(&self, id: i32, include_deleted: bool) -> AppResult<Book> {
        let query = format!("{} WHERE b.id = $1 AND ($2 OR b.deleted_at IS NULL)", BOOK_SELECT);
        sqlx::query_as::<_, Book>(&query)
            .bind(id)
            .bind(include_deleted)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book {} not found", id)))
    }

    async fn list_books(&self, query: &BookQuery) -> AppResult<Vec<Book>> {
        let sql = format!(
            r#"{}
            WHERE ($1 OR b.deleted_at IS NULL)
              AND ($2::int IS NULL OR EXISTS (
                    SELECT 1 FROM book_authors ba WHERE ba.book_id = b.id AND ba.author_id = $2))
              AND ($3::int IS NULL OR EXISTS (
                    SELECT 1 FROM book_genres bg WHERE bg.book_id = b.id AND bg.genre_id = $3))
              AND ($4::text IS NULL OR position(lower($4) in lower(b.title)) > 0)
              AND (NOT $5 OR EXISTS (
                    SELECT 1 FROM book_copies c
                    WHERE c.book_id = b.id AND c.deleted_at IS NULL AND c.status = $6))
            ORDER BY b.title, b.id
            "#,
            BOOK_SELECT
        );

        let books = sqlx::query_as::<_, Book>(&sql)
            .bind(query.include_deleted.unwrap_or(false))
            .bind(query.author_id)
            .bind(query.genre_id)
            .bind(&query.search)
            .bind(query.available_only.unwrap_or(false))
            .bind(CopyStatus::Available)
            .fetch_all(&self.pool)
            .await?;
        Ok(books)
    }

    async fn update_book(&self, id: i32, data: &UpdateBook) -> AppResult<Book> {
        self.check_relation_ids(
            data.author_ids.as_deref().unwrap_or_default(),
            data.genre_ids.as_deref().unwrap_or_default(),
        )
        .await?;

        let mut tx = self.begin().await?;
        let updated = sqlx::query(
            r#"
            UPDATE books SET
                title = COALESCE($2, title),
                isbn = COALESCE($3, isbn),
                description = COALESCE($4, description),
                published_year = COALESCE($5, published_year),
                image_path = COALESCE($6, image_path),
                updated_at = NOW()
            WHERE id = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(id)
        .bind(&data.title)
        .bind(&data.isbn)
        .bind(&data.description)
        .bind(data.published_year)
        .bind(&data.image_path)
        .execute(&mut *tx)
        .await?;

        if updated.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Book {} not found", id)));
        }

        Self::replace_book_relations(&mut tx, id, data.author_ids.as_deref(), data.genre_ids.as_deref()).await?;
        tx.commit().await?;

        self.get_book(id, false).await
    }

    async fn delete_book(&self, id: i32) -> AppResult<()> {
        let mut tx = self.begin().await?;

        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM books WHERE id = $1 AND deleted_at IS NULL)",
        )
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;
        if !exists {
            return Err(AppError::NotFound(format!("Book {} not found", id)));
        }

        // Hold the copies so no borrow slips in between the check and the delete
        sqlx::query("SELECT id FROM book_copies WHERE book_id = $1 AND deleted_at IS NULL FOR UPDATE")
            .bind(id)
            .fetch_all(&mut *tx)
            .await?;

        let lent_out: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM borrows br JOIN book_copies c ON c.id = br.book_copy_id
                WHERE c.book_id = $1 AND br.date_returned IS NULL AND br.deleted_at IS NULL
            )
            "#,
        )
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;
        if lent_out {
            return Err(AppError::Conflict(format!("Book {} has copies out on loan", id)));
        }

        sqlx::query("UPDATE book_copies SET deleted_at = NOW() WHERE book_id = $1 AND deleted_at IS NULL")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("UPDATE books SET deleted_at = NOW() WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }
}
