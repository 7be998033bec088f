//! Borrows repository: the transactional borrow/return lifecycle.
//!
//! `apply_copy_transition` is the only statement in the code base that writes
//! `book_copies.status`.

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::{Postgres, Transaction};

use super::{CirculationStore, Repository};
use crate::{
    circulation::{self, CopyTransition},
    error::{AppError, AppResult},
    models::{borrow::BorrowQuery, BookAvailability, BookCopy, Borrow, BorrowStatus, CopyStatus},
};

const BORROW_SELECT: &str = r#"
    SELECT br.*,
           c.book_id, c.copy_code, b.title AS book_title,
           s.student_number, CONCAT(u.first_name, ' ', u.last_name) AS student_name
    FROM borrows br
    JOIN book_copies c ON c.id = br.book_copy_id
    JOIN books b ON b.id = c.book_id
    JOIN students s ON s.id = br.student_id
    JOIN users u ON u.id = s.user_id
"#;

impl Repository {
    async fn apply_copy_transition(
        tx: &mut Transaction<'_, Postgres>,
        copy: &BookCopy,
        transition: CopyTransition,
    ) -> AppResult<CopyStatus> {
        let next = transition.apply(copy)?;
        sqlx::query("UPDATE book_copies SET status = $2, updated_at = NOW() WHERE id = $1")
            .bind(copy.id)
            .bind(next)
            .execute(&mut **tx)
            .await?;
        Ok(next)
    }
}

#[async_trait]
impl CirculationStore for Repository {
    async fn create_borrow(&self, student_id: i32, book_id: i32, date_borrowed: NaiveDate) -> AppResult<Borrow> {
        let mut tx = self.begin().await?;

        // FOR SHARE keeps the student from being removed mid-borrow
        sqlx::query_scalar::<_, i32>("SELECT id FROM students WHERE id = $1 AND deleted_at IS NULL FOR SHARE")
            .bind(student_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Student {} not found", student_id)))?;

        sqlx::query_scalar::<_, i32>("SELECT id FROM books WHERE id = $1 AND deleted_at IS NULL FOR SHARE")
            .bind(book_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book {} not found", book_id)))?;

        // A concurrent borrow holding one of these rows makes us wait; once it
        // commits the row is re-checked and dropped if no longer available.
        let candidates = sqlx::query_as::<_, BookCopy>(
            r#"
            SELECT * FROM book_copies
            WHERE book_id = $1 AND status = $2 AND deleted_at IS NULL
            ORDER BY id
            FOR UPDATE
            "#,
        )
        .bind(book_id)
        .bind(CopyStatus::Available)
        .fetch_all(&mut *tx)
        .await?;

        let copy = circulation::select_copy(book_id, &candidates)?;

        let borrow_id: i32 = sqlx::query_scalar(
            r#"
            INSERT INTO borrows (student_id, book_copy_id, date_borrowed, return_status)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            "#,
        )
        .bind(student_id)
        .bind(copy.id)
        .bind(date_borrowed)
        .bind(BorrowStatus::Borrowed)
        .fetch_one(&mut *tx)
        .await?;

        Self::apply_copy_transition(&mut tx, copy, CopyTransition::CheckOut).await?;
        tx.commit().await?;

        tracing::debug!(borrow_id, copy_id = copy.id, "borrow committed");
        self.get_borrow(borrow_id, false).await
    }

    async fn return_borrow(&self, id: i32, date_returned: NaiveDate) -> AppResult<Borrow> {
        let mut tx = self.begin().await?;

        let borrow = sqlx::query_as::<_, Borrow>("SELECT * FROM borrows WHERE id = $1 AND deleted_at IS NULL FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Borrow {} not found", id)))?;

        let returned = circulation::returned(&borrow, date_returned)?;

        let copy = sqlx::query_as::<_, BookCopy>("SELECT * FROM book_copies WHERE id = $1 FOR UPDATE")
            .bind(borrow.book_copy_id)
            .fetch_one(&mut *tx)
            .await?;

        sqlx::query(
            "UPDATE borrows SET date_returned = $2, return_status = $3, updated_at = NOW() WHERE id = $1",
        )
        .bind(returned.id)
        .bind(returned.date_returned)
        .bind(returned.return_status)
        .execute(&mut *tx)
        .await?;

        Self::apply_copy_transition(&mut tx, &copy, CopyTransition::CheckIn).await?;
        tx.commit().await?;

        self.get_borrow(id, false).await
    }

    async fn get_borrow(&self, id: i32, include_deleted: bool) -> AppResult<Borrow> {
        let query = format!("{} WHERE br.id = $1 AND ($2 OR br.deleted_at IS NULL)", BORROW_SELECT);
        sqlx::query_as::<_, Borrow>(&query)
            .bind(id)
            .bind(include_deleted)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Borrow {} not found", id)))
    }

    async fn list_borrows(&self, query: &BorrowQuery) -> AppResult<Vec<Borrow>> {
        let sql = format!(
            r#"{}
            WHERE ($1 OR br.deleted_at IS NULL)
              AND ($2::int IS NULL OR br.student_id = $2)
              AND ($3::int IS NULL OR c.book_id = $3)
              AND ($4::borrow_status IS NULL OR br.return_status = $4)
            ORDER BY br.date_borrowed DESC, br.id DESC
            "#,
            BORROW_SELECT
        );

        let borrows = sqlx::query_as::<_, Borrow>(&sql)
            .bind(query.include_deleted.unwrap_or(false))
            .bind(query.student_id)
            .bind(query.book_id)
            .bind(query.status)
            .fetch_all(&self.pool)
            .await?;
        Ok(borrows)
    }

    async fn delete_borrow(&self, id: i32) -> AppResult<()> {
        let mut tx = self.begin().await?;

        let borrow = sqlx::query_as::<_, Borrow>("SELECT * FROM borrows WHERE id = $1 AND deleted_at IS NULL FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Borrow {} not found", id)))?;

        if borrow.is_active() {
            return Err(AppError::Conflict(format!(
                "Borrow {} is still active; return it before removing it",
                id
            )));
        }

        sqlx::query("UPDATE borrows SET deleted_at = NOW(), updated_at = NOW() WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(())
    }

    async fn book_availability(&self, book_id: i32) -> AppResult<BookAvailability> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM books WHERE id = $1 AND deleted_at IS NULL)")
            .bind(book_id)
            .fetch_one(&self.pool)
            .await?;
        if !exists {
            return Err(AppError::NotFound(format!("Book {} not found", book_id)));
        }

        let (available, total): (i64, i64) = sqlx::query_as(
            r#"
            SELECT COUNT(*) FILTER (WHERE status = $2), COUNT(*)
            FROM book_copies
            WHERE book_id = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(book_id)
        .bind(CopyStatus::Available)
        .fetch_one(&self.pool)
        .await?;

        Ok(BookAvailability::new(book_id, available, total))
    }
}
