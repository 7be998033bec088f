//! Borrow/return lifecycle over the in-memory state

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};

use super::{InMemoryStore, State};
use crate::{
    circulation::{self, CopyTransition},
    error::{AppError, AppResult},
    models::{borrow::BorrowQuery, BookAvailability, BookCopy, Borrow, BorrowStatus, CopyStatus, User},
    repository::CirculationStore,
};

impl State {
    /// Borrow with the joined copy/book/student columns filled in
    fn borrow_view(&self, borrow: &Borrow) -> Borrow {
        let copy = self.copies.get(&borrow.book_copy_id);
        let book = copy.and_then(|c| self.books.get(&c.book_id));
        let student = self.students.get(&borrow.student_id);
        let user = student.and_then(|s| self.users.get(&s.user_id));

        Borrow {
            book_id: copy.map(|c| c.book_id),
            copy_code: copy.map(|c| c.copy_code.clone()),
            book_title: book.map(|b| b.title.clone()),
            student_number: student.map(|s| s.student_number.clone()),
            student_name: user.map(User::display_name),
            ..borrow.clone()
        }
    }

    fn live_borrow(&self, id: i32) -> AppResult<&Borrow> {
        self.borrows
            .get(&id)
            .filter(|b| b.deleted_at.is_none())
            .ok_or_else(|| AppError::NotFound(format!("Borrow {} not found", id)))
    }
}

#[async_trait]
impl CirculationStore for InMemoryStore {
    async fn create_borrow(&self, student_id: i32, book_id: i32, date_borrowed: NaiveDate) -> AppResult<Borrow> {
        let mut state = self.lock().await?;
        state.live_student(student_id)?;
        state.live_book(book_id)?;

        let candidates: Vec<BookCopy> = state.live_copies(book_id).cloned().collect();
        let copy_id = circulation::select_copy(book_id, &candidates)?.id;

        // The transition is the last fallible step, so a refusal leaves no borrow behind
        state.apply_copy_transition(copy_id, CopyTransition::CheckOut)?;

        let now = Utc::now();
        let borrow = Borrow {
            id: state.next_id("borrows"),
            student_id,
            book_copy_id: copy_id,
            date_borrowed,
            date_returned: None,
            return_status: BorrowStatus::Borrowed,
            created_at: now,
            updated_at: now,
            deleted_at: None,
            book_id: None,
            book_title: None,
            copy_code: None,
            student_number: None,
            student_name: None,
        };
        state.borrows.insert(borrow.id, borrow.clone());

        tracing::debug!(borrow_id = borrow.id, copy_id, "borrow committed");
        Ok(state.borrow_view(&borrow))
    }

    async fn return_borrow(&self, id: i32, date_returned: NaiveDate) -> AppResult<Borrow> {
        let mut state = self.lock().await?;
        let mut returned = circulation::returned(state.live_borrow(id)?, date_returned)?;

        state.apply_copy_transition(returned.book_copy_id, CopyTransition::CheckIn)?;

        returned.updated_at = Utc::now();
        state.borrows.insert(id, returned.clone());
        Ok(state.borrow_view(&returned))
    }

    async fn get_borrow(&self, id: i32, include_deleted: bool) -> AppResult<Borrow> {
        let state = self.lock().await?;
        state
            .borrows
            .get(&id)
            .filter(|b| include_deleted || b.deleted_at.is_none())
            .map(|b| state.borrow_view(b))
            .ok_or_else(|| AppError::NotFound(format!("Borrow {} not found", id)))
    }

    async fn list_borrows(&self, query: &BorrowQuery) -> AppResult<Vec<Borrow>> {
        let state = self.lock().await?;
        let include_deleted = query.include_deleted.unwrap_or(false);

        let mut borrows: Vec<Borrow> = state
            .borrows
            .values()
            .filter(|b| include_deleted || b.deleted_at.is_none())
            .filter(|b| query.student_id.map_or(true, |s| b.student_id == s))
            .filter(|b| query.status.map_or(true, |s| b.return_status == s))
            .map(|b| state.borrow_view(b))
            .filter(|b| query.book_id.map_or(true, |id| b.book_id == Some(id)))
            .collect();
        borrows.sort_by(|a, b| (b.date_borrowed, b.id).cmp(&(a.date_borrowed, a.id)));
        Ok(borrows)
    }

    async fn delete_borrow(&self, id: i32) -> AppResult<()> {
        let mut state = self.lock().await?;
        if state.live_borrow(id)?.is_active() {
            return Err(AppError::Conflict(format!(
                "Borrow {} is still active; return it before removing it",
                id
            )));
        }

        if let Some(borrow) = state.borrows.get_mut(&id) {
            let now = Utc::now();
            borrow.deleted_at = Some(now);
            borrow.updated_at = now;
        }
        Ok(())
    }

    async fn book_availability(&self, book_id: i32) -> AppResult<BookAvailability> {
        let state = self.lock().await?;
        state.live_book(book_id)?;

        let (available, total) = state.live_copies(book_id).fold((0, 0), |(available, total), copy| {
            (available + i64::from(copy.status == CopyStatus::Available), total + 1)
        });
        Ok(BookAvailability::new(book_id, available, total))
    }
}
