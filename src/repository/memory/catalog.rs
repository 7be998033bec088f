//! Authors, genres, books and copies

use async_trait::async_trait;
use chrono::Utc;

use super::{InMemoryStore, State};
use crate::{
    circulation,
    error::{AppError, AppResult},
    models::{
        author::{AuthorQuery, CreateAuthor, UpdateAuthor},
        book::{BookQuery, CreateBook, UpdateBook},
        copy::{CreateBookCopy, UpdateBookCopy},
        genre::{CreateGenre, GenreQuery, UpdateGenre},
        Author, Book, BookCopy, CopyStatus, Genre,
    },
    repository::{AuthorStore, BookStore, CopyStore, GenreStore},
};

/// Case-insensitive substring match; no search matches everything
fn matches_search(haystack: &str, search: Option<&str>) -> bool {
    search.map_or(true, |s| haystack.to_lowercase().contains(&s.to_lowercase()))
}

impl State {
    /// Book with its relation ids and live available-copy count filled in
    fn book_view(&self, book: &Book) -> Book {
        let available = self
            .live_copies(book.id)
            .filter(|c| c.status == CopyStatus::Available)
            .count() as i64;
        Book {
            author_ids: self
                .book_authors
                .iter()
                .filter(|(b, _)| *b == book.id)
                .map(|(_, a)| *a)
                .collect(),
            genre_ids: self
                .book_genres
                .iter()
                .filter(|(b, _)| *b == book.id)
                .map(|(_, g)| *g)
                .collect(),
            available_copies: Some(available),
            ..book.clone()
        }
    }

    fn check_relation_ids(&self, author_ids: &[i32], genre_ids: &[i32]) -> AppResult<()> {
        let live_author = |id: &i32| self.authors.get(id).is_some_and(|a| a.deleted_at.is_none());
        if !author_ids.iter().all(live_author) {
            return Err(AppError::NotFound("One or more authors not found".to_string()));
        }
        let live_genre = |id: &i32| self.genres.get(id).is_some_and(|g| g.deleted_at.is_none());
        if !genre_ids.iter().all(live_genre) {
            return Err(AppError::NotFound("One or more genres not found".to_string()));
        }
        Ok(())
    }

    fn replace_book_relations(&mut self, book_id: i32, author_ids: Option<&[i32]>, genre_ids: Option<&[i32]>) {
        if let Some(author_ids) = author_ids {
            self.book_authors.retain(|(b, _)| *b != book_id);
            self.book_authors.extend(author_ids.iter().map(|a| (book_id, *a)));
        }
        if let Some(genre_ids) = genre_ids {
            self.book_genres.retain(|(b, _)| *b != book_id);
            self.book_genres.extend(genre_ids.iter().map(|g| (book_id, *g)));
        }
    }

    fn check_copy_code(&self, copy_code: &str, except: Option<i32>) -> AppResult<()> {
        // Unique across deleted copies too, like the table constraint
        if self
            .copies
            .values()
            .any(|c| c.copy_code == copy_code && Some(c.id) != except)
        {
            return Err(AppError::ConstraintViolation(format!(
                "Copy code {} is already in use",
                copy_code
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl AuthorStore for InMemoryStore {
    async fn create_author(&self, data: &CreateAuthor) -> AppResult<Author> {
        let mut state = self.lock().await?;
        let now = Utc::now();
        let author = Author {
            id: state.next_id("authors"),
            first_name: data.first_name.clone(),
            last_name: data.last_name.clone(),
            details: data.details.clone(),
            image_path: data.image_path.clone(),
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };
        state.authors.insert(author.id, author.clone());
        Ok(author)
    }

    async fn get_author(&self, id: i32, include_deleted: bool) -> AppResult<Author> {
        let state = self.lock().await?;
        state
            .authors
            .get(&id)
            .filter(|a| include_deleted || a.deleted_at.is_none())
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("Author {} not found", id)))
    }

    async fn list_authors(&self, query: &AuthorQuery) -> AppResult<Vec<Author>> {
        let include_deleted = query.include_deleted.unwrap_or(false);
        let state = self.lock().await?;
        let mut authors: Vec<Author> = state
            .authors
            .values()
            .filter(|a| include_deleted || a.deleted_at.is_none())
            .filter(|a| matches_search(&a.full_name(), query.search.as_deref()))
            .cloned()
            .collect();
        authors.sort_by(|a, b| (&a.last_name, &a.first_name).cmp(&(&b.last_name, &b.first_name)));
        Ok(authors)
    }

    async fn update_author(&self, id: i32, data: &UpdateAuthor) -> AppResult<Author> {
        let mut state = self.lock().await?;
        let author = state
            .authors
            .get_mut(&id)
            .filter(|a| a.deleted_at.is_none())
            .ok_or_else(|| AppError::NotFound(format!("Author {} not found", id)))?;

        if let Some(first_name) = &data.first_name {
            author.first_name = first_name.clone();
        }
        if let Some(last_name) = &data.last_name {
            author.last_name = last_name.clone();
        }
        if let Some(details) = &data.details {
            author.details = details.clone();
        }
        if let Some(image_path) = &data.image_path {
            author.image_path = Some(image_path.clone());
        }
        author.updated_at = Utc::now();
        Ok(author.clone())
    }

    async fn delete_author(&self, id: i32) -> AppResult<()> {
        let mut state = self.lock().await?;
        let author = state
            .authors
            .get_mut(&id)
            .filter(|a| a.deleted_at.is_none())
            .ok_or_else(|| AppError::NotFound(format!("Author {} not found", id)))?;
        author.deleted_at = Some(Utc::now());
        Ok(())
    }
}

#[async_trait]
impl GenreStore for InMemoryStore {
    async fn create_genre(&self, data: &CreateGenre) -> AppResult<Genre> {
        let mut state = self.lock().await?;
        let now = Utc::now();
        let genre = Genre {
            id: state.next_id("genres"),
            title: data.title.clone(),
            slug: data.slug.clone(),
            description: data.description.clone(),
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };
        state.genres.insert(genre.id, genre.clone());
        Ok(genre)
    }

    async fn get_genre(&self, id: i32, include_deleted: bool) -> AppResult<Genre> {
        let state = self.lock().await?;
        state
            .genres
            .get(&id)
            .filter(|g| include_deleted || g.deleted_at.is_none())
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("Genre {} not found", id)))
    }

    async fn list_genres(&self, query: &GenreQuery) -> AppResult<Vec<Genre>> {
        let include_deleted = query.include_deleted.unwrap_or(false);
        let state = self.lock().await?;
        let mut genres: Vec<Genre> = state
            .genres
            .values()
            .filter(|g| include_deleted || g.deleted_at.is_none())
            .filter(|g| matches_search(&g.title, query.search.as_deref()))
            .cloned()
            .collect();
        genres.sort_by(|a, b| a.title.cmp(&b.title));
        Ok(genres)
    }

    async fn update_genre(&self, id: i32, data: &UpdateGenre) -> AppResult<Genre> {
        let mut state = self.lock().await?;
        let genre = state
            .genres
            .get_mut(&id)
            .filter(|g| g.deleted_at.is_none())
            .ok_or_else(|| AppError::NotFound(format!("Genre {} not found", id)))?;

        if let Some(title) = &data.title {
            genre.title = title.clone();
        }
        if let Some(slug) = &data.slug {
            genre.slug = Some(slug.clone());
        }
        if let Some(description) = &data.description {
            genre.description = description.clone();
        }
        genre.updated_at = Utc::now();
        Ok(genre.clone())
    }

    async fn delete_genre(&self, id: i32) -> AppResult<()> {
        let mut state = self.lock().await?;
        let genre = state
            .genres
            .get_mut(&id)
            .filter(|g| g.deleted_at.is_none())
            .ok_or_else(|| AppError::NotFound(format!("Genre {} not found", id)))?;
        genre.deleted_at = Some(Utc::now());
        Ok(())
    }
}

#[async_trait]
impl BookStore for InMemoryStore {
    async fn create_book(&self, data: &CreateBook) -> AppResult<Book> {
        let mut state = self.lock().await?;
        state.check_relation_ids(&data.author_ids, &data.genre_ids)?;

        let now = Utc::now();
        let book = Book {
            id: state.next_id("books"),
            title: data.title.clone(),
            isbn: data.isbn.clone(),
            description: data.description.clone(),
            published_year: data.published_year,
            image_path: data.image_path.clone(),
            created_at: now,
            updated_at: now,
            deleted_at: None,
            author_ids: Vec::new(),
            genre_ids: Vec::new(),
            available_copies: None,
        };
        state.books.insert(book.id, book.clone());
        state.replace_book_relations(book.id, Some(&data.author_ids), Some(&data.genre_ids));
        Ok(state.book_view(&book))
    }

    async fn get_book(&self, id: i32, include_deleted: bool) -> AppResult<Book> {
        let state = self.lock().await?;
        state
            .books
            .get(&id)
            .filter(|b| include_deleted || b.deleted_at.is_none())
            .map(|b| state.book_view(b))
            .ok_or_else(|| AppError::NotFound(format!("Book {} not found", id)))
    }

    async fn list_books(&self, query: &BookQuery) -> AppResult<Vec<Book>> {
        let state = self.lock().await?;
        let include_deleted = query.include_deleted.unwrap_or(false);

        let mut books: Vec<Book> = state
            .books
            .values()
            .filter(|b| include_deleted || b.deleted_at.is_none())
            .map(|b| state.book_view(b))
            .filter(|b| query.author_id.map_or(true, |a| b.author_ids.contains(&a)))
            .filter(|b| query.genre_id.map_or(true, |g| b.genre_ids.contains(&g)))
            .filter(|b| matches_search(&b.title, query.search.as_deref()))
            .filter(|b| !query.available_only.unwrap_or(false) || b.available_copies.unwrap_or(0) > 0)
            .collect();
        books.sort_by(|a, b| (&a.title, a.id).cmp(&(&b.title, b.id)));
        Ok(books)
    }

    async fn update_book(&self, id: i32, data: &UpdateBook) -> AppResult<Book> {
        let mut state = self.lock().await?;
        state.check_relation_ids(
            data.author_ids.as_deref().unwrap_or_default(),
            data.genre_ids.as_deref().unwrap_or_default(),
        )?;

        let book = state
            .books
            .get_mut(&id)
            .filter(|b| b.deleted_at.is_none())
            .ok_or_else(|| AppError::NotFound(format!("Book {} not found", id)))?;

        if let Some(title) = &data.title {
            book.title = title.clone();
        }
        if let Some(isbn) = &data.isbn {
            book.isbn = Some(isbn.clone());
        }
        if let Some(description) = &data.description {
            book.description = Some(description.clone());
        }
        if let Some(year) = data.published_year {
            book.published_year = Some(year);
        }
        if let Some(image_path) = &data.image_path {
            book.image_path = Some(image_path.clone());
        }
        book.updated_at = Utc::now();
        let book = book.clone();

        state.replace_book_relations(id, data.author_ids.as_deref(), data.genre_ids.as_deref());
        Ok(state.book_view(&book))
    }

    async fn delete_book(&self, id: i32) -> AppResult<()> {
        let mut state = self.lock().await?;
        state.live_book(id)?;

        let lent_out = state.active_borrows().any(|borrow| {
            state
                .copies
                .get(&borrow.book_copy_id)
                .is_some_and(|c| c.book_id == id)
        });
        if lent_out {
            return Err(AppError::Conflict(format!("Book {} has copies out on loan", id)));
        }

        let now = Utc::now();
        for copy in state
            .copies
            .values_mut()
            .filter(|c| c.book_id == id && c.deleted_at.is_none())
        {
            copy.deleted_at = Some(now);
        }
        if let Some(book) = state.books.get_mut(&id) {
            book.deleted_at = Some(now);
        }
        Ok(())
    }
}

#[async_trait]
impl CopyStore for InMemoryStore {
    async fn create_copy(&self, book_id: i32, data: &CreateBookCopy) -> AppResult<BookCopy> {
        let status = circulation::initial_copy_status(data.status)?;

        let mut state = self.lock().await?;
        state.live_book(book_id)?;
        state.check_copy_code(&data.copy_code, None)?;

        let now = Utc::now();
        let copy = BookCopy {
            id: state.next_id("book_copies"),
            book_id,
            copy_code: data.copy_code.clone(),
            status,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };
        state.copies.insert(copy.id, copy.clone());
        Ok(copy)
    }

    async fn get_copy(&self, id: i32, include_deleted: bool) -> AppResult<BookCopy> {
        let state = self.lock().await?;
        state
            .copies
            .get(&id)
            .filter(|c| include_deleted || !c.is_deleted())
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("Copy {} not found", id)))
    }

    async fn list_copies(&self, book_id: i32, include_deleted: bool) -> AppResult<Vec<BookCopy>> {
        let state = self.lock().await?;
        Ok(state
            .copies
            .values()
            .filter(|c| c.book_id == book_id && (include_deleted || !c.is_deleted()))
            .cloned()
            .collect())
    }

    async fn update_copy(&self, id: i32, data: &UpdateBookCopy) -> AppResult<BookCopy> {
        let mut state = self.lock().await?;
        state.check_copy_code(&data.copy_code, Some(id))?;

        let copy = state
            .copies
            .get_mut(&id)
            .filter(|c| !c.is_deleted())
            .ok_or_else(|| AppError::NotFound(format!("Copy {} not found", id)))?;
        copy.copy_code = data.copy_code.clone();
        copy.updated_at = Utc::now();
        Ok(copy.clone())
    }

    async fn delete_copy(&self, id: i32) -> AppResult<()> {
        let mut state = self.lock().await?;
        let copy_code = state
            .copies
            .get(&id)
            .filter(|c| !c.is_deleted())
            .map(|c| c.copy_code.clone())
            .ok_or_else(|| AppError::NotFound(format!("Copy {} not found", id)))?;

        if state.active_borrows().any(|b| b.book_copy_id == id) {
            return Err(AppError::Conflict(format!("Copy {} is out on loan", copy_code)));
        }

        if let Some(copy) = state.copies.get_mut(&id) {
            copy.deleted_at = Some(Utc::now());
        }
        Ok(())
    }
}
