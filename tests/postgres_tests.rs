//! Circulation against a live Postgres
//!
//! Run with `DATABASE_URL=postgres://... cargo test -- --ignored`.

mod common;

use std::sync::Arc;

use chrono::Utc;
use sqlx::postgres::PgPoolOptions;

use common::*;
use libraria_server::{
    clock::FixedClock,
    config::AppConfig,
    error::AppError,
    models::{book::BookQuery, CopyStatus, FavoriteTarget, ToggleOutcome},
    repository::{CopyStore, Repository},
    services::Services,
};

async fn pg_services() -> (Arc<Repository>, Services) {
    let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set for Postgres tests");
    let config = AppConfig::default().database;
    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(&url)
        .await
        .expect("Failed to connect to Postgres");
    sqlx::migrate!("./migrations").run(&pool).await.expect("Failed to migrate");

    let repository = Arc::new(Repository::new(pool, &config));
    let services = Services::new(repository.clone(), Arc::new(FixedClock(today())), &config);
    (repository, services)
}

/// Suffix keeping rows of repeated runs apart
fn unique(name: &str) -> String {
    format!("{}{}", name, Utc::now().timestamp_nanos_opt().unwrap_or_default())
}

#[tokio::test]
#[ignore]
async fn borrow_then_return_moves_the_copy_through_its_states() {
    let (repository, services) = pg_services().await;
    let student = seed_student(&services, &unique("pg")).await;
    let book = seed_book(&services, "Dune").await;
    let copy = add_copy(&services, book.id, &unique("DUNE-"), None).await;

    let borrow = services.circulation.borrow_book(student.id, book.id, None).await.unwrap();
    assert_eq!(borrow.book_copy_id, copy.id);
    assert_eq!(repository.get_copy(copy.id, false).await.unwrap().status, CopyStatus::Borrowed);
    assert_eq!(borrowed_vs_active(repository.as_ref(), book.id).await, (1, 1));

    let err = services.circulation.borrow_book(student.id, book.id, None).await.unwrap_err();
    assert!(matches!(err, AppError::NoAvailableCopy(_)));

    services.circulation.return_borrow(borrow.id, None).await.unwrap();
    assert_eq!(repository.get_copy(copy.id, false).await.unwrap().status, CopyStatus::Available);
    assert_eq!(borrowed_vs_active(repository.as_ref(), book.id).await, (0, 0));

    let err = services.circulation.return_borrow(borrow.id, None).await.unwrap_err();
    assert!(matches!(err, AppError::AlreadyReturned(_)));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
#[ignore]
async fn racing_borrows_take_each_copy_once() {
    let (repository, services) = pg_services().await;
    let services = Arc::new(services);
    let book = seed_book(&services, "Contended").await;
    add_copy(&services, book.id, &unique("C1-"), None).await;
    add_copy(&services, book.id, &unique("C2-"), None).await;

    let mut students = Vec::new();
    for i in 0..8 {
        students.push(seed_student(&services, &unique(&format!("race{}x", i))).await);
    }

    let handles: Vec<_> = students
        .iter()
        .map(|student| {
            let services = services.clone();
            let (student_id, book_id) = (student.id, book.id);
            tokio::spawn(async move { services.circulation.borrow_book(student_id, book_id, None).await })
        })
        .collect();

    let mut winners = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => winners += 1,
            Err(err) => assert!(
                matches!(err, AppError::NoAvailableCopy(_)) || err.is_retryable(),
                "unexpected error: {err}"
            ),
        }
    }

    assert_eq!(winners, 2);
    assert_eq!(borrowed_vs_active(repository.as_ref(), book.id).await, (2, 2));
}

#[tokio::test]
#[ignore]
async fn favorite_toggle_keeps_one_row() {
    let (_, services) = pg_services().await;
    let user = seed_user(&services, &unique("fav")).await;
    let book = seed_book(&services, "Favorite").await;
    let target = FavoriteTarget::Book(book.id);

    let first = services.favorites.toggle(user.id, target).await.unwrap();
    assert_eq!(first.outcome, ToggleOutcome::Added);
    let id = services.favorites.list_for_user(user.id).await.unwrap()[0].id;

    let second = services.favorites.toggle(user.id, target).await.unwrap();
    assert_eq!(second.outcome, ToggleOutcome::Removed);
    services.favorites.toggle(user.id, target).await.unwrap();

    let favorites = services.favorites.list_for_user(user.id).await.unwrap();
    assert_eq!(favorites.len(), 1);
    assert_eq!(favorites[0].id, id);
}

#[tokio::test]
#[ignore]
async fn search_text_is_matched_literally() {
    let (_, services) = pg_services().await;
    let marker = unique("lit");
    seed_book(&services, &format!("100% {}", marker)).await;
    seed_book(&services, &format!("1000 {}", marker)).await;

    let search = |text: String| BookQuery {
        search: Some(text),
        ..BookQuery::default()
    };
    let percent = services.catalog.list_books(search(format!("0% {}", marker))).await.unwrap();
    assert_eq!(percent.len(), 1);
    assert!(percent[0].title.starts_with("100%"));

    let underscore = services.catalog.list_books(search(format!("10_0 {}", marker))).await.unwrap();
    assert!(underscore.is_empty());
}
