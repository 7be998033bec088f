//! Catalog, copies and people rules over the in-memory store

mod common;

use common::*;
use libraria_server::{
    error::AppError,
    models::{
        author::{AuthorQuery, CreateAuthor, UpdateAuthor},
        book::{BookQuery, CreateBook, UpdateBook},
        copy::{CreateBookCopy, UpdateBookCopy},
        genre::{CreateGenre, GenreQuery},
        student::CreateStudent,
        CopyStatus, LibraryStats,
    },
};
use tokio_test::{assert_err, assert_ok};

fn author(first_name: &str, last_name: &str) -> CreateAuthor {
    CreateAuthor {
        first_name: first_name.to_string(),
        last_name: last_name.to_string(),
        details: "Novelist".to_string(),
        image_path: None,
    }
}

#[tokio::test]
async fn soft_deleted_authors_are_hidden_unless_requested() {
    let services = services(store());
    let le_guin = services.catalog.create_author(author("Ursula", "Le Guin")).await.unwrap();
    services.catalog.create_author(author("Iain", "Banks")).await.unwrap();

    services.catalog.delete_author(le_guin.id).await.unwrap();

    let visible = services.catalog.list_authors(AuthorQuery::default()).await.unwrap();
    assert_eq!(visible.len(), 1);
    assert_eq!(visible[0].last_name, "Banks");
    let everything = AuthorQuery {
        include_deleted: Some(true),
        ..AuthorQuery::default()
    };
    assert_eq!(services.catalog.list_authors(everything).await.unwrap().len(), 2);

    assert_err!(services.catalog.get_author(le_guin.id, false).await);
    assert_ok!(services.catalog.get_author(le_guin.id, true).await);

    // Deleting twice reports the row as gone
    assert!(matches!(
        services.catalog.delete_author(le_guin.id).await,
        Err(AppError::NotFound(_))
    ));
    assert!(matches!(
        services.catalog.update_author(le_guin.id, UpdateAuthor::default()).await,
        Err(AppError::NotFound(_))
    ));
}

#[tokio::test]
async fn authors_and_genres_are_searchable() {
    let services = services(store());
    services.catalog.create_author(author("Ursula", "Le Guin")).await.unwrap();
    services.catalog.create_author(author("Iain", "Banks")).await.unwrap();
    for title in ["Science Fiction", "Fantasy", "Hard SF"] {
        services
            .catalog
            .create_genre(CreateGenre {
                title: title.into(),
                slug: None,
                description: "Shelf".into(),
            })
            .await
            .unwrap();
    }

    let authors = |search: &str| AuthorQuery {
        search: Some(search.to_string()),
        ..AuthorQuery::default()
    };
    // Matches across first and last name
    let found = services.catalog.list_authors(authors("ula le")).await.unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].last_name, "Le Guin");
    assert_eq!(services.catalog.list_authors(authors("BANKS")).await.unwrap().len(), 1);
    assert!(services.catalog.list_authors(authors("Tolkien")).await.unwrap().is_empty());

    let genres = |search: &str| GenreQuery {
        search: Some(search.to_string()),
        ..GenreQuery::default()
    };
    let titles: Vec<String> = services
        .catalog
        .list_genres(genres("f"))
        .await
        .unwrap()
        .into_iter()
        .map(|g| g.title)
        .collect();
    assert_eq!(titles, vec!["Fantasy", "Hard SF", "Science Fiction"]);
    assert_eq!(services.catalog.list_genres(genres("fiction")).await.unwrap().len(), 1);
    // Wildcard characters are plain text
    assert!(services.catalog.list_genres(genres("%")).await.unwrap().is_empty());
    assert_eq!(services.catalog.list_genres(GenreQuery::default()).await.unwrap().len(), 3);
}

#[tokio::test]
async fn books_carry_relations_and_filter_by_them() {
    let services = services(store());
    let banks = services.catalog.create_author(author("Iain", "Banks")).await.unwrap();
    let genre = services
        .catalog
        .create_genre(CreateGenre {
            title: "Space Opera".into(),
            slug: Some("space-opera".into()),
            description: "Big ships".into(),
        })
        .await
        .unwrap();

    let excession = services
        .catalog
        .create_book(CreateBook {
            title: "Excession".into(),
            isbn: None,
            description: None,
            published_year: Some(1996),
            image_path: None,
            author_ids: vec![banks.id],
            genre_ids: vec![genre.id],
        })
        .await
        .unwrap();
    assert_eq!(excession.author_ids, vec![banks.id]);
    assert_eq!(excession.genre_ids, vec![genre.id]);
    assert_eq!(excession.available_copies, Some(0));
    seed_book(&services, "Unrelated").await;

    let by_author = services.catalog.books_by_author(banks.id, false).await.unwrap();
    assert_eq!(by_author.len(), 1);
    assert_eq!(by_author[0].id, excession.id);
    let by_genre = services.catalog.books_by_genre(genre.id, false).await.unwrap();
    assert_eq!(by_genre.len(), 1);

    let searched = services
        .catalog
        .list_books(BookQuery {
            search: Some("excess".into()),
            ..BookQuery::default()
        })
        .await
        .unwrap();
    assert_eq!(searched.len(), 1);

    // Replacing relations drops the genre
    let updated = services
        .catalog
        .update_book(
            excession.id,
            UpdateBook {
                genre_ids: Some(vec![]),
                ..UpdateBook::default()
            },
        )
        .await
        .unwrap();
    assert!(updated.genre_ids.is_empty());
    assert_eq!(updated.author_ids, vec![banks.id]);
    assert!(services.catalog.books_by_genre(genre.id, false).await.unwrap().is_empty());
}

#[tokio::test]
async fn unknown_relations_and_bad_input_are_rejected() {
    let services = services(store());

    let err = services
        .catalog
        .create_book(CreateBook {
            title: "Orphan".into(),
            isbn: None,
            description: None,
            published_year: None,
            image_path: None,
            author_ids: vec![99],
            genre_ids: vec![],
        })
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));

    let err = services
        .catalog
        .create_author(author("", "Nobody"))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    assert!(services.catalog.list_books(BookQuery::default()).await.unwrap().is_empty());
}

#[tokio::test]
async fn copy_status_is_never_set_to_borrowed_by_hand() {
    let services = services(store());
    let book = seed_book(&services, "Blindsight").await;

    let err = services
        .catalog
        .create_copy(
            book.id,
            CreateBookCopy {
                copy_code: "BLD-1".into(),
                status: Some(CopyStatus::Borrowed),
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    add_copy(&services, book.id, "BLD-2", Some(CopyStatus::Damaged)).await;
    let available = add_copy(&services, book.id, "BLD-3", None).await;
    assert_eq!(available.status, CopyStatus::Available);

    let availability = services.circulation.availability(book.id).await.unwrap();
    assert_eq!((availability.available_copies, availability.total_copies), (1, 2));

    let only_available = services
        .catalog
        .list_books(BookQuery {
            available_only: Some(true),
            ..BookQuery::default()
        })
        .await
        .unwrap();
    assert_eq!(only_available.len(), 1);
    assert_eq!(only_available[0].available_copies, Some(1));

    // Renaming keeps the status
    let renamed = services
        .catalog
        .update_copy(available.id, UpdateBookCopy { copy_code: "BLD-3A".into() })
        .await
        .unwrap();
    assert_eq!(renamed.status, CopyStatus::Available);
}

#[tokio::test]
async fn copy_codes_are_unique() {
    let services = services(store());
    let book = seed_book(&services, "Anathem").await;
    add_copy(&services, book.id, "ANA-1", None).await;

    let err = services
        .catalog
        .create_copy(
            book.id,
            CreateBookCopy {
                copy_code: "ANA-1".into(),
                status: None,
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::ConstraintViolation(_)));

    let err = services
        .catalog
        .create_copy(
            999,
            CreateBookCopy {
                copy_code: "NOPE".into(),
                status: None,
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test]
async fn lent_out_rows_cannot_be_deleted() {
    let services = services(store());
    let student = seed_student(&services, "Ana").await;
    let book = seed_book(&services, "Diaspora").await;
    let copy = add_copy(&services, book.id, "DIA-1", None).await;

    let borrow = services.circulation.borrow_book(student.id, book.id, None).await.unwrap();

    assert!(matches!(services.catalog.delete_copy(copy.id).await, Err(AppError::Conflict(_))));
    assert!(matches!(services.catalog.delete_book(book.id).await, Err(AppError::Conflict(_))));
    assert!(matches!(
        services.students.delete_student(student.id).await,
        Err(AppError::Conflict(_))
    ));

    services.circulation.return_borrow(borrow.id, None).await.unwrap();

    services.catalog.delete_book(book.id).await.unwrap();
    assert!(services.catalog.list_copies(book.id, true).await.unwrap()[0].is_deleted());
    assert!(matches!(
        services.catalog.get_copy(copy.id, false).await,
        Err(AppError::NotFound(_))
    ));
    assert_ok!(services.students.delete_student(student.id).await);
}

#[tokio::test]
async fn students_are_unique_per_user_and_number() {
    let services = services(store());
    let student = seed_student(&services, "Bea").await;
    assert_eq!(student.display_name.as_deref(), Some("Bea Tester"));

    let err = services
        .students
        .create_student(CreateStudent {
            user_id: student.user_id,
            student_number: "S-OTHER".into(),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::ConstraintViolation(_)));

    let other = seed_user(&services, "Cal").await;
    let err = services
        .students
        .create_student(CreateStudent {
            user_id: other.id,
            student_number: student.student_number.clone(),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::ConstraintViolation(_)));

    let err = services
        .students
        .create_student(CreateStudent {
            user_id: 4242,
            student_number: "S-GHOST".into(),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));

    let found = services.students.student_for_user(student.user_id).await.unwrap();
    assert_eq!(found.id, student.id);
}

#[tokio::test]
async fn stats_count_live_rows() {
    let services = services(store());
    let student = seed_student(&services, "Dov").await;
    seed_student(&services, "Eda").await;
    let book = seed_book(&services, "Permutation City").await;
    add_copy(&services, book.id, "PC-1", None).await;
    add_copy(&services, book.id, "PC-2", None).await;
    add_copy(&services, book.id, "PC-3", Some(CopyStatus::Lost)).await;

    services.circulation.borrow_book(student.id, book.id, None).await.unwrap();
    services.circulation.borrow_book(student.id, book.id, None).await.unwrap();

    let stats = services.stats.library_stats().await.unwrap();
    assert_eq!(
        stats,
        LibraryStats {
            students: 2,
            books: 1,
            copies: 3,
            available_copies: 0,
            active_borrows: 2,
            borrowing_students: 1,
        }
    );
}
