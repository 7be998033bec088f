//! In-memory store for development, demos and tests.
//!
//! The whole state sits behind one `tokio::sync::Mutex`, so every operation is
//! serialized. Operations validate everything before their first write, which
//! keeps a failed call from leaving partial state behind.

mod catalog;
mod circulation;
mod favorites;
mod people;

use std::{
    collections::{BTreeMap, BTreeSet},
    sync::Arc,
    time::Duration,
};

use tokio::sync::{Mutex, MutexGuard};

use crate::{
    circulation::CopyTransition,
    config::DatabaseConfig,
    error::{AppError, AppResult},
    models::{Author, Book, BookCopy, Borrow, CopyStatus, Favorite, Genre, Student, User},
};

#[derive(Debug, Default)]
pub(super) struct State {
    sequences: BTreeMap<&'static str, i32>,
    users: BTreeMap<i32, User>,
    authors: BTreeMap<i32, Author>,
    genres: BTreeMap<i32, Genre>,
    books: BTreeMap<i32, Book>,
    /// (book_id, author_id)
    book_authors: BTreeSet<(i32, i32)>,
    /// (book_id, genre_id)
    book_genres: BTreeSet<(i32, i32)>,
    copies: BTreeMap<i32, BookCopy>,
    students: BTreeMap<i32, Student>,
    borrows: BTreeMap<i32, Borrow>,
    favorites: BTreeMap<i32, Favorite>,
}

impl State {
    /// Per-table id sequence, starting at 1 like SERIAL
    fn next_id(&mut self, table: &'static str) -> i32 {
        let id = self.sequences.entry(table).or_insert(0);
        *id += 1;
        *id
    }

    fn live_book(&self, id: i32) -> AppResult<&Book> {
        self.books
            .get(&id)
            .filter(|b| b.deleted_at.is_none())
            .ok_or_else(|| AppError::NotFound(format!("Book {} not found", id)))
    }

    fn live_student(&self, id: i32) -> AppResult<&Student> {
        self.students
            .get(&id)
            .filter(|s| s.deleted_at.is_none())
            .ok_or_else(|| AppError::NotFound(format!("Student {} not found", id)))
    }

    fn live_copies(&self, book_id: i32) -> impl Iterator<Item = &BookCopy> {
        self.copies
            .values()
            .filter(move |c| c.book_id == book_id && !c.is_deleted())
    }

    fn active_borrows(&self) -> impl Iterator<Item = &Borrow> {
        self.borrows
            .values()
            .filter(|b| b.deleted_at.is_none() && b.is_active())
    }

    /// The only place this store writes `BookCopy::status`
    fn apply_copy_transition(&mut self, copy_id: i32, transition: CopyTransition) -> AppResult<CopyStatus> {
        let copy = self
            .copies
            .get_mut(&copy_id)
            .ok_or_else(|| AppError::NotFound(format!("Copy {} not found", copy_id)))?;
        let next = transition.apply(copy)?;
        copy.status = next;
        copy.updated_at = chrono::Utc::now();
        Ok(next)
    }
}

/// Process-local store implementing every store trait
#[derive(Clone)]
pub struct InMemoryStore {
    state: Arc<Mutex<State>>,
    lock_timeout: Duration,
}

impl InMemoryStore {
    pub fn new(config: &DatabaseConfig) -> Self {
        Self {
            state: Arc::new(Mutex::new(State::default())),
            lock_timeout: config.lock_timeout(),
        }
    }

    /// Acquire the state, giving up after the configured lock timeout
    async fn lock(&self) -> AppResult<MutexGuard<'_, State>> {
        tokio::time::timeout(self.lock_timeout, self.state.lock())
            .await
            .map_err(|_| {
                tracing::warn!("in-memory store lock wait exceeded {:?}", self.lock_timeout);
                AppError::Timeout("Timed out waiting for the store lock".to_string())
            })
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new(&DatabaseConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sequences_are_per_table() {
        let mut state = State::default();
        assert_eq!(state.next_id("books"), 1);
        assert_eq!(state.next_id("books"), 2);
        assert_eq!(state.next_id("authors"), 1);
    }

    #[tokio::test]
    async fn lock_wait_is_bounded() {
        let config = DatabaseConfig {
            lock_timeout_ms: 20,
            ..DatabaseConfig::default()
        };
        let store = InMemoryStore::new(&config);
        let _held = store.state.lock().await;

        assert!(matches!(store.lock().await, Err(AppError::Timeout(_))));
    }
}
