//! Borrow/return service

use std::{sync::Arc, time::Duration};

use chrono::NaiveDate;

use super::bounded;
use crate::{
    circulation,
    clock::Clock,
    error::AppResult,
    models::{borrow::BorrowQuery, BookAvailability, Borrow},
    repository::{CirculationStore, LibraryStore},
};

#[derive(Clone)]
pub struct CirculationService {
    store: Arc<dyn LibraryStore>,
    clock: Arc<dyn Clock>,
    limit: Duration,
}

impl CirculationService {
    pub fn new(store: Arc<dyn LibraryStore>, clock: Arc<dyn Clock>, limit: Duration) -> Self {
        Self { store, clock, limit }
    }

    /// Lend one available copy of `book_id` to `student_id`.
    ///
    /// The copy is picked by the store (lowest id among available copies).
    /// `date_borrowed` defaults to today and may not lie in the future.
    pub async fn borrow_book(
        &self,
        student_id: i32,
        book_id: i32,
        date_borrowed: Option<NaiveDate>,
    ) -> AppResult<Borrow> {
        let today = self.clock.today();
        let date_borrowed = date_borrowed.unwrap_or(today);
        circulation::check_borrow_date(date_borrowed, today)?;

        let result = bounded(
            self.limit,
            "create_borrow",
            self.store.create_borrow(student_id, book_id, date_borrowed),
        )
        .await;

        match result {
            Ok(borrow) => {
                tracing::info!(
                    borrow_id = borrow.id,
                    student_id,
                    book_id,
                    copy_id = borrow.book_copy_id,
                    "book borrowed"
                );
                Ok(borrow)
            }
            Err(err) => {
                if err.is_retryable() {
                    tracing::warn!(student_id, book_id, "borrow contended: {}", err);
                }
                Err(err)
            }
        }
    }

    /// Close a borrow and put its copy back on the shelf.
    ///
    /// `date_returned` defaults to today.
    pub async fn return_borrow(&self, borrow_id: i32, date_returned: Option<NaiveDate>) -> AppResult<Borrow> {
        let date_returned = date_returned.unwrap_or_else(|| self.clock.today());

        let result = bounded(
            self.limit,
            "return_borrow",
            self.store.return_borrow(borrow_id, date_returned),
        )
        .await;

        match result {
            Ok(borrow) => {
                tracing::info!(borrow_id, copy_id = borrow.book_copy_id, "book returned");
                Ok(borrow)
            }
            Err(err) => {
                if err.is_retryable() {
                    tracing::warn!(borrow_id, "return contended: {}", err);
                }
                Err(err)
            }
        }
    }

    pub async fn availability(&self, book_id: i32) -> AppResult<BookAvailability> {
        bounded(self.limit, "book_availability", self.store.book_availability(book_id)).await
    }

    pub async fn get_borrow(&self, id: i32, include_deleted: bool) -> AppResult<Borrow> {
        bounded(self.limit, "get_borrow", self.store.get_borrow(id, include_deleted)).await
    }

    pub async fn list_borrows(&self, query: BorrowQuery) -> AppResult<Vec<Borrow>> {
        bounded(self.limit, "list_borrows", self.store.list_borrows(&query)).await
    }

    /// Soft-delete a closed borrow
    pub async fn delete_borrow(&self, id: i32) -> AppResult<()> {
        bounded(self.limit, "delete_borrow", self.store.delete_borrow(id)).await?;
        tracing::info!(borrow_id = id, "borrow deleted");
        Ok(())
    }
}
