//! Catalog management: authors, genres, books and their copies

use std::{sync::Arc, time::Duration};

use validator::Validate;

use super::bounded;
use crate::{
    error::AppResult,
    models::{
        author::{AuthorQuery, CreateAuthor, UpdateAuthor},
        book::{BookQuery, CreateBook, UpdateBook},
        copy::{CreateBookCopy, UpdateBookCopy},
        genre::{CreateGenre, GenreQuery, UpdateGenre},
        Author, Book, BookCopy, Genre,
    },
    repository::{AuthorStore, BookStore, CopyStore, GenreStore, LibraryStore},
};

#[derive(Clone)]
pub struct CatalogService {
    store: Arc<dyn LibraryStore>,
    limit: Duration,
}

impl CatalogService {
    pub fn new(store: Arc<dyn LibraryStore>, limit: Duration) -> Self {
        Self { store, limit }
    }

    // Authors

    pub async fn create_author(&self, data: CreateAuthor) -> AppResult<Author> {
        data.validate()?;
        let author = bounded(self.limit, "create_author", self.store.create_author(&data)).await?;
        tracing::info!(author_id = author.id, "author created");
        Ok(author)
    }

    pub async fn get_author(&self, id: i32, include_deleted: bool) -> AppResult<Author> {
        bounded(self.limit, "get_author", self.store.get_author(id, include_deleted)).await
    }

    pub async fn list_authors(&self, query: AuthorQuery) -> AppResult<Vec<Author>> {
        bounded(self.limit, "list_authors", self.store.list_authors(&query)).await
    }

    pub async fn update_author(&self, id: i32, data: UpdateAuthor) -> AppResult<Author> {
        data.validate()?;
        bounded(self.limit, "update_author", self.store.update_author(id, &data)).await
    }

    pub async fn delete_author(&self, id: i32) -> AppResult<()> {
        bounded(self.limit, "delete_author", self.store.delete_author(id)).await?;
        tracing::info!(author_id = id, "author deleted");
        Ok(())
    }

    /// Books credited to an author
    pub async fn books_by_author(&self, author_id: i32, include_deleted: bool) -> AppResult<Vec<Book>> {
        self.get_author(author_id, include_deleted).await?;
        self.list_books(BookQuery {
            author_id: Some(author_id),
            include_deleted: Some(include_deleted),
            ..BookQuery::default()
        })
        .await
    }

    // Genres

    pub async fn create_genre(&self, data: CreateGenre) -> AppResult<Genre> {
        data.validate()?;
        let genre = bounded(self.limit, "create_genre", self.store.create_genre(&data)).await?;
        tracing::info!(genre_id = genre.id, "genre created");
        Ok(genre)
    }

    pub async fn get_genre(&self, id: i32, include_deleted: bool) -> AppResult<Genre> {
        bounded(self.limit, "get_genre", self.store.get_genre(id, include_deleted)).await
    }

    pub async fn list_genres(&self, query: GenreQuery) -> AppResult<Vec<Genre>> {
        bounded(self.limit, "list_genres", self.store.list_genres(&query)).await
    }

    pub async fn update_genre(&self, id: i32, data: UpdateGenre) -> AppResult<Genre> {
        data.validate()?;
        bounded(self.limit, "update_genre", self.store.update_genre(id, &data)).await
    }

    pub async fn delete_genre(&self, id: i32) -> AppResult<()> {
        bounded(self.limit, "delete_genre", self.store.delete_genre(id)).await?;
        tracing::info!(genre_id = id, "genre deleted");
        Ok(())
    }

    pub async fn books_by_genre(&self, genre_id: i32, include_deleted: bool) -> AppResult<Vec<Book>> {
        self.get_genre(genre_id, include_deleted).await?;
        self.list_books(BookQuery {
            genre_id: Some(genre_id),
            include_deleted: Some(include_deleted),
            ..BookQuery::default()
        })
        .await
    }

    // Books

    pub async fn create_book(&self, data: CreateBook) -> AppResult<Book> {
        data.validate()?;
        let book = bounded(self.limit, "create_book", self.store.create_book(&data)).await?;
        tracing::info!(book_id = book.id, title = %book.title, "book created");
        Ok(book)
    }

    pub async fn get_book(&self, id: i32, include_deleted: bool) -> AppResult<Book> {
        bounded(self.limit, "get_book", self.store.get_book(id, include_deleted)).await
    }

    /// Books matching `query`, each carrying its available-copy count
    pub async fn list_books(&self, query: BookQuery) -> AppResult<Vec<Book>> {
        bounded(self.limit, "list_books", self.store.list_books(&query)).await
    }

    pub async fn update_book(&self, id: i32, data: UpdateBook) -> AppResult<Book> {
        data.validate()?;
        bounded(self.limit, "update_book", self.store.update_book(id, &data)).await
    }

    /// Soft-deletes the book with its copies; refused while a copy is lent out
    pub async fn delete_book(&self, id: i32) -> AppResult<()> {
        bounded(self.limit, "delete_book", self.store.delete_book(id)).await?;
        tracing::info!(book_id = id, "book deleted");
        Ok(())
    }

    // Copies

    pub async fn create_copy(&self, book_id: i32, data: CreateBookCopy) -> AppResult<BookCopy> {
        data.validate()?;
        let copy = bounded(self.limit, "create_copy", self.store.create_copy(book_id, &data)).await?;
        tracing::info!(book_id, copy_id = copy.id, status = %copy.status, "copy catalogued");
        Ok(copy)
    }

    pub async fn get_copy(&self, id: i32, include_deleted: bool) -> AppResult<BookCopy> {
        bounded(self.limit, "get_copy", self.store.get_copy(id, include_deleted)).await
    }

    pub async fn list_copies(&self, book_id: i32, include_deleted: bool) -> AppResult<Vec<BookCopy>> {
        self.get_book(book_id, include_deleted).await?;
        bounded(self.limit, "list_copies", self.store.list_copies(book_id, include_deleted)).await
    }

    pub async fn update_copy(&self, id: i32, data: UpdateBookCopy) -> AppResult<BookCopy> {
        data.validate()?;
        bounded(self.limit, "update_copy", self.store.update_copy(id, &data)).await
    }

    pub async fn delete_copy(&self, id: i32) -> AppResult<()> {
        bounded(self.limit, "delete_copy", self.store.delete_copy(id)).await?;
        tracing::info!(copy_id = id, "copy deleted");
        Ok(())
    }
}
