//! Statistics repository

use async_trait::async_trait;

use super::{Repository, StatsStore};
use crate::{error::AppResult, models::LibraryStats};

#[async_trait]
impl StatsStore for Repository {
    async fn library_stats(&self) -> AppResult<LibraryStats> {
        let stats = sqlx::query_as::<_, LibraryStats>(
            r#"
            SELECT
                (SELECT COUNT(*) FROM students WHERE deleted_at IS NULL) AS students,
                (SELECT COUNT(*) FROM books WHERE deleted_at IS NULL) AS books,
                (SELECT COUNT(*) FROM book_copies WHERE deleted_at IS NULL) AS copies,
                (SELECT COUNT(*) FROM book_copies
                  WHERE deleted_at IS NULL AND status = 'available') AS available_copies,
                (SELECT COUNT(*) FROM borrows
                  WHERE deleted_at IS NULL AND date_returned IS NULL) AS active_borrows,
                (SELECT COUNT(DISTINCT student_id) FROM borrows
                  WHERE deleted_at IS NULL AND date_returned IS NULL) AS borrowing_students
            "#,
        )
        .fetch_one(&self.pool)
        .await?;
        Ok(stats)
    }
}
