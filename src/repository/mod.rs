//! Storage layer.
//!
//! The store traits are implemented by [`Repository`] (PostgreSQL) and by
//! [`memory::InMemoryStore`]. Every mutating circulation/favorite operation is a
//! single transaction in either backend.

pub mod authors;
pub mod books;
pub mod borrows;
pub mod copies;
pub mod favorites;
pub mod genres;
pub mod memory;
pub mod stats;
pub mod students;
pub mod users;

use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::{Pool, Postgres, Transaction};

use crate::{
    config::DatabaseConfig,
    error::AppResult,
    models::{
        author::{AuthorQuery, CreateAuthor, UpdateAuthor},
        book::{BookQuery, CreateBook, UpdateBook},
        borrow::BorrowQuery,
        copy::{CreateBookCopy, UpdateBookCopy},
        genre::{CreateGenre, GenreQuery, UpdateGenre},
        student::{CreateStudent, UpdateStudent},
        user::CreateUser,
        Author, Book, BookAvailability, BookCopy, Borrow, Favorite, FavoriteTarget, Genre,
        LibraryStats, Student, ToggleOutcome, User,
    },
};

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn create_user(&self, data: &CreateUser) -> AppResult<User>;
    async fn get_user(&self, id: i32) -> AppResult<User>;
    async fn list_users(&self) -> AppResult<Vec<User>>;
}

#[async_trait]
pub trait AuthorStore: Send + Sync {
    async fn create_author(&self, data: &CreateAuthor) -> AppResult<Author>;
    async fn get_author(&self, id: i32, include_deleted: bool) -> AppResult<Author>;
    async fn list_authors(&self, query: &AuthorQuery) -> AppResult<Vec<Author>>;
    async fn update_author(&self, id: i32, data: &UpdateAuthor) -> AppResult<Author>;
    async fn delete_author(&self, id: i32) -> AppResult<()>;
}

#[async_trait]
pub trait GenreStore: Send + Sync {
    async fn create_genre(&self, data: &CreateGenre) -> AppResult<Genre>;
    async fn get_genre(&self, id: i32, include_deleted: bool) -> AppResult<Genre>;
    async fn list_genres(&self, query: &GenreQuery) -> AppResult<Vec<Genre>>;
    async fn update_genre(&self, id: i32, data: &UpdateGenre) -> AppResult<Genre>;
    async fn delete_genre(&self, id: i32) -> AppResult<()>;
}

#[async_trait]
pub trait BookStore: Send + Sync {
    async fn create_book(&self, data: &CreateBook) -> AppResult<Book>;
    async fn get_book(&self, id: i32, include_deleted: bool) -> AppResult<Book>;
    async fn list_books(&self, query: &BookQuery) -> AppResult<Vec<Book>>;
    async fn update_book(&self, id: i32, data: &UpdateBook) -> AppResult<Book>;
    async fn delete_book(&self, id: i32) -> AppResult<()>;
}

#[async_trait]
pub trait CopyStore: Send + Sync {
    async fn create_copy(&self, book_id: i32, data: &CreateBookCopy) -> AppResult<BookCopy>;
    async fn get_copy(&self, id: i32, include_deleted: bool) -> AppResult<BookCopy>;
    async fn list_copies(&self, book_id: i32, include_deleted: bool) -> AppResult<Vec<BookCopy>>;
    async fn update_copy(&self, id: i32, data: &UpdateBookCopy) -> AppResult<BookCopy>;
    /// Refused with `Conflict` while the copy is out on an active borrow
    async fn delete_copy(&self, id: i32) -> AppResult<()>;
}

#[async_trait]
pub trait StudentStore: Send + Sync {
    async fn create_student(&self, data: &CreateStudent) -> AppResult<Student>;
    async fn get_student(&self, id: i32, include_deleted: bool) -> AppResult<Student>;
    async fn get_student_by_user(&self, user_id: i32) -> AppResult<Student>;
    async fn list_students(&self, include_deleted: bool) -> AppResult<Vec<Student>>;
    async fn update_student(&self, id: i32, data: &UpdateStudent) -> AppResult<Student>;
    /// Refused with `Conflict` while the student holds active borrows
    async fn delete_student(&self, id: i32) -> AppResult<()>;
}

#[async_trait]
pub trait CirculationStore: Send + Sync {
    /// Lend the lowest-id available copy of `book_id` to `student_id`
    async fn create_borrow(&self, student_id: i32, book_id: i32, date_borrowed: NaiveDate) -> AppResult<Borrow>;
    /// Close the borrow and put its copy back on the shelf
    async fn return_borrow(&self, id: i32, date_returned: NaiveDate) -> AppResult<Borrow>;
    async fn get_borrow(&self, id: i32, include_deleted: bool) -> AppResult<Borrow>;
    async fn list_borrows(&self, query: &BorrowQuery) -> AppResult<Vec<Borrow>>;
    /// Refused with `Conflict` while the borrow is active
    async fn delete_borrow(&self, id: i32) -> AppResult<()>;
    async fn book_availability(&self, book_id: i32) -> AppResult<BookAvailability>;
}

#[async_trait]
pub trait FavoriteStore: Send + Sync {
    async fn toggle_favorite(&self, user_id: i32, target: FavoriteTarget) -> AppResult<ToggleOutcome>;
    async fn list_favorites(&self, user_id: i32) -> AppResult<Vec<Favorite>>;
    /// Users currently holding `target` as a favorite, most recent first
    async fn favorited_by(&self, target: FavoriteTarget, limit: i64) -> AppResult<Vec<User>>;
}

#[async_trait]
pub trait StatsStore: Send + Sync {
    async fn library_stats(&self) -> AppResult<LibraryStats>;
}

/// Everything the services need from storage
pub trait LibraryStore:
    UserStore + AuthorStore + GenreStore + BookStore + CopyStore + StudentStore + CirculationStore + FavoriteStore + StatsStore
{
}

impl<T> LibraryStore for T where
    T: UserStore
        + AuthorStore
        + GenreStore
        + BookStore
        + CopyStore
        + StudentStore
        + CirculationStore
        + FavoriteStore
        + StatsStore
{
}

/// PostgreSQL store
#[derive(Clone)]
pub struct Repository {
    pub pool: Pool<Postgres>,
    lock_timeout: Duration,
    statement_timeout: Duration,
}

impl Repository {
    /// Create a new repository with the given database pool
    pub fn new(pool: Pool<Postgres>, config: &DatabaseConfig) -> Self {
        Self {
            pool,
            lock_timeout: config.lock_timeout(),
            statement_timeout: config.transaction_timeout(),
        }
    }

    /// Begin a transaction whose lock waits and statements are bounded
    pub(crate) async fn begin(&self) -> AppResult<Transaction<'static, Postgres>> {
        let mut tx = self.pool.begin().await?;
        // SET does not take bind parameters; both values are integers from config
        sqlx::query(&format!("SET LOCAL lock_timeout = {}", self.lock_timeout.as_millis()))
            .execute(&mut *tx)
            .await?;
        sqlx::query(&format!("SET LOCAL statement_timeout = {}", self.statement_timeout.as_millis()))
            .execute(&mut *tx)
            .await?;
        Ok(tx)
    }
}
