//! Shared fixtures for the integration tests

#![allow(dead_code)]

use std::sync::Arc;

use chrono::NaiveDate;

use libraria_server::{
    clock::FixedClock,
    config::AppConfig,
    models::{
        book::CreateBook,
        borrow::BorrowQuery,
        copy::CreateBookCopy,
        student::CreateStudent,
        user::{CreateUser, Role, UserClaims},
        Book, BookCopy, BorrowStatus, CopyStatus, Student, User,
    },
    repository::{memory::InMemoryStore, CirculationStore, CopyStore, LibraryStore},
    services::Services,
    AppState,
};

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// "Today" for every test that does not pick its own date
pub fn today() -> NaiveDate {
    date(2024, 3, 15)
}

pub fn store() -> Arc<InMemoryStore> {
    Arc::new(InMemoryStore::default())
}

pub fn services(store: Arc<InMemoryStore>) -> Services {
    Services::new(store, Arc::new(FixedClock(today())), &AppConfig::default().database)
}

pub async fn seed_user(services: &Services, first_name: &str) -> User {
    services
        .students
        .create_user(CreateUser {
            first_name: first_name.to_string(),
            last_name: "Tester".to_string(),
            email: format!("{}@example.org", first_name.to_lowercase()),
            avatar_url: None,
        })
        .await
        .unwrap()
}

pub async fn seed_student(services: &Services, first_name: &str) -> Student {
    let user = seed_user(services, first_name).await;
    services
        .students
        .create_student(CreateStudent {
            user_id: user.id,
            student_number: format!("S-{}", first_name.to_uppercase()),
        })
        .await
        .unwrap()
}

pub async fn seed_book(services: &Services, title: &str) -> Book {
    services
        .catalog
        .create_book(CreateBook {
            title: title.to_string(),
            isbn: None,
            description: None,
            published_year: None,
            image_path: None,
            author_ids: vec![],
            genre_ids: vec![],
        })
        .await
        .unwrap()
}

pub async fn add_copy(services: &Services, book_id: i32, copy_code: &str, status: Option<CopyStatus>) -> BookCopy {
    services
        .catalog
        .create_copy(
            book_id,
            CreateBookCopy {
                copy_code: copy_code.to_string(),
                status,
            },
        )
        .await
        .unwrap()
}

/// Copies of a book currently marked borrowed, and active borrows of it
pub async fn borrowed_vs_active(store: &dyn LibraryStore, book_id: i32) -> (usize, usize) {
    let borrowed = store
        .list_copies(book_id, false)
        .await
        .unwrap()
        .iter()
        .filter(|c| c.status == CopyStatus::Borrowed)
        .count();
    let active = store
        .list_borrows(&BorrowQuery {
            book_id: Some(book_id),
            status: Some(BorrowStatus::Borrowed),
            ..BorrowQuery::default()
        })
        .await
        .unwrap()
        .len();
    (borrowed, active)
}

pub fn app_state(services: Services) -> AppState {
    AppState {
        config: Arc::new(AppConfig::default()),
        services: Arc::new(services),
    }
}

pub fn bearer(user_id: i32, role: Role) -> String {
    let token = UserClaims::new(user_id, role, 3600)
        .create_token(&AppConfig::default().auth.jwt_secret)
        .unwrap();
    format!("Bearer {}", token)
}
