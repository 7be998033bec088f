//! Borrow/return lifecycle over the in-memory store

mod common;

use std::sync::Arc;

use common::*;
use libraria_server::{
    error::AppError,
    models::{borrow::BorrowQuery, BorrowStatus, CopyStatus},
    repository::CopyStore,
};

#[tokio::test]
async fn dune_scenario_selects_the_remaining_available_copy() {
    let store = store();
    let services = services(store.clone());
    let alice = seed_student(&services, "Alice").await;
    let bob = seed_student(&services, "Bob").await;
    let carol = seed_student(&services, "Carol").await;
    let dune = seed_book(&services, "Dune").await;

    // C2 gets the lower id and goes out first
    let c2 = add_copy(&services, dune.id, "C2", None).await;
    let first = services.circulation.borrow_book(alice.id, dune.id, None).await.unwrap();
    assert_eq!(first.book_copy_id, c2.id);

    let c1 = add_copy(&services, dune.id, "C1", None).await;
    let second = services.circulation.borrow_book(bob.id, dune.id, None).await.unwrap();
    assert_eq!(second.book_copy_id, c1.id);
    assert_eq!(second.copy_code.as_deref(), Some("C1"));
    assert_eq!(second.return_status, BorrowStatus::Borrowed);
    assert_eq!(second.date_returned, None);

    let err = services
        .circulation
        .borrow_book(carol.id, dune.id, None)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NoAvailableCopy(id) if id == dune.id));

    let availability = services.circulation.availability(dune.id).await.unwrap();
    assert_eq!(availability.available_copies, 0);
    assert_eq!(availability.total_copies, 2);
    assert!(!availability.is_available);
}

#[tokio::test]
async fn no_available_copy_leaves_nothing_behind() {
    let store = store();
    let services = services(store.clone());
    let student = seed_student(&services, "Dana").await;
    let book = seed_book(&services, "Solaris").await;
    add_copy(&services, book.id, "SOL-LOST", Some(CopyStatus::Lost)).await;
    add_copy(&services, book.id, "SOL-DMG", Some(CopyStatus::Damaged)).await;

    let err = services
        .circulation
        .borrow_book(student.id, book.id, None)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NoAvailableCopy(_)));

    let borrows = services
        .circulation
        .list_borrows(BorrowQuery::default())
        .await
        .unwrap();
    assert!(borrows.is_empty());

    let statuses: Vec<CopyStatus> = store
        .list_copies(book.id, false)
        .await
        .unwrap()
        .into_iter()
        .map(|c| c.status)
        .collect();
    assert_eq!(statuses, vec![CopyStatus::Lost, CopyStatus::Damaged]);
}

#[tokio::test]
async fn borrow_then_return_restores_the_copy() {
    let store = store();
    let services = services(store.clone());
    let student = seed_student(&services, "Eve").await;
    let book = seed_book(&services, "Neuromancer").await;
    let copy = add_copy(&services, book.id, "NEU-1", None).await;

    let borrow = services
        .circulation
        .borrow_book(student.id, book.id, Some(date(2024, 3, 1)))
        .await
        .unwrap();
    assert_eq!(store.get_copy(copy.id, false).await.unwrap().status, CopyStatus::Borrowed);

    let returned = services
        .circulation
        .return_borrow(borrow.id, Some(date(2024, 3, 10)))
        .await
        .unwrap();
    assert_eq!(returned.return_status, BorrowStatus::Returned);
    assert_eq!(returned.date_returned, Some(date(2024, 3, 10)));
    assert_eq!(store.get_copy(copy.id, false).await.unwrap().status, CopyStatus::Available);
    assert!(services.circulation.availability(book.id).await.unwrap().is_available);
}

#[tokio::test]
async fn second_return_changes_nothing() {
    let store = store();
    let services = services(store.clone());
    let student = seed_student(&services, "Finn").await;
    let book = seed_book(&services, "Hyperion").await;
    let copy = add_copy(&services, book.id, "HYP-1", None).await;

    let borrow = services.circulation.borrow_book(student.id, book.id, None).await.unwrap();
    let first = services
        .circulation
        .return_borrow(borrow.id, Some(date(2024, 3, 14)))
        .await
        .unwrap();

    // Someone else borrows the copy; a stale second return must not free it
    let other = seed_student(&services, "Gina").await;
    services.circulation.borrow_book(other.id, book.id, None).await.unwrap();

    let err = services
        .circulation
        .return_borrow(borrow.id, Some(date(2024, 3, 15)))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::AlreadyReturned(id) if id == borrow.id));

    let unchanged = services.circulation.get_borrow(borrow.id, false).await.unwrap();
    assert_eq!(unchanged.date_returned, first.date_returned);
    assert_eq!(store.get_copy(copy.id, false).await.unwrap().status, CopyStatus::Borrowed);
}

#[tokio::test]
async fn dates_are_checked_against_today_and_the_borrow() {
    let store = store();
    let services = services(store.clone());
    let student = seed_student(&services, "Hugo").await;
    let book = seed_book(&services, "Ubik").await;
    add_copy(&services, book.id, "UBK-1", None).await;

    let tomorrow = today().succ_opt().unwrap();
    let err = services
        .circulation
        .borrow_book(student.id, book.id, Some(tomorrow))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::InvalidDate(_)));
    assert_eq!(borrowed_vs_active(store.as_ref(), book.id).await, (0, 0));

    let borrow = services
        .circulation
        .borrow_book(student.id, book.id, Some(date(2024, 3, 10)))
        .await
        .unwrap();
    let err = services
        .circulation
        .return_borrow(borrow.id, Some(date(2024, 3, 9)))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::InvalidDate(_)));

    // Still out on loan after the refused return
    assert_eq!(borrowed_vs_active(store.as_ref(), book.id).await, (1, 1));

    // Same-day return is fine
    services
        .circulation
        .return_borrow(borrow.id, Some(date(2024, 3, 10)))
        .await
        .unwrap();
}

#[tokio::test]
async fn borrowed_copies_track_active_borrows() {
    let store = store();
    let services = services(store.clone());
    let book = seed_book(&services, "Foundation").await;
    for code in ["FND-1", "FND-2", "FND-3"] {
        add_copy(&services, book.id, code, None).await;
    }
    let students = [
        seed_student(&services, "Ivy").await,
        seed_student(&services, "Jack").await,
        seed_student(&services, "Kim").await,
    ];

    let mut open = Vec::new();
    for student in &students {
        open.push(services.circulation.borrow_book(student.id, book.id, None).await.unwrap());
        let (borrowed, active) = borrowed_vs_active(store.as_ref(), book.id).await;
        assert_eq!(borrowed, active);
    }
    assert_eq!(borrowed_vs_active(store.as_ref(), book.id).await, (3, 3));

    services.circulation.return_borrow(open[1].id, None).await.unwrap();
    assert_eq!(borrowed_vs_active(store.as_ref(), book.id).await, (2, 2));

    // The freed copy is the one handed out next
    let again = services.circulation.borrow_book(students[1].id, book.id, None).await.unwrap();
    assert_eq!(again.book_copy_id, open[1].book_copy_id);
    assert_eq!(borrowed_vs_active(store.as_ref(), book.id).await, (3, 3));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_borrows_of_the_last_copy_have_one_winner() {
    let store = store();
    let services = Arc::new(services(store.clone()));
    let book = seed_book(&services, "Snow Crash").await;
    add_copy(&services, book.id, "SNOW-1", None).await;

    let mut students = Vec::new();
    for name in ["Lea", "Max", "Nia", "Oto", "Pia", "Quin"] {
        students.push(seed_student(&services, name).await);
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
            Err(AppError::NoAvailableCopy(_)) | Err(AppError::Conflict(_)) | Err(AppError::Timeout(_)) => {}
            Err(other) => panic!("unexpected error: {:?}", other),
        }
    }

    assert_eq!(winners, 1);
    assert_eq!(borrowed_vs_active(store.as_ref(), book.id).await, (1, 1));
}

#[tokio::test]
async fn deleted_students_and_books_cannot_borrow() {
    let store = store();
    let services = services(store.clone());
    let student = seed_student(&services, "Rae").await;
    let book = seed_book(&services, "Kindred").await;
    add_copy(&services, book.id, "KIN-1", None).await;

    services.students.delete_student(student.id).await.unwrap();
    let err = services
        .circulation
        .borrow_book(student.id, book.id, None)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));

    let other = seed_student(&services, "Sol").await;
    services.catalog.delete_book(book.id).await.unwrap();
    let err = services
        .circulation
        .borrow_book(other.id, book.id, None)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));

    assert!(matches!(
        services.circulation.availability(book.id).await,
        Err(AppError::NotFound(_))
    ));
}

#[tokio::test]
async fn only_closed_borrows_can_be_deleted() {
    let store = store();
    let services = services(store.clone());
    let student = seed_student(&services, "Tao").await;
    let book = seed_book(&services, "Embassytown").await;
    add_copy(&services, book.id, "EMB-1", None).await;

    let borrow = services.circulation.borrow_book(student.id, book.id, None).await.unwrap();
    let err = services.circulation.delete_borrow(borrow.id).await.unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));

    services.circulation.return_borrow(borrow.id, None).await.unwrap();
    services.circulation.delete_borrow(borrow.id).await.unwrap();

    assert!(matches!(
        services.circulation.get_borrow(borrow.id, false).await,
        Err(AppError::NotFound(_))
    ));
    let deleted = services.circulation.get_borrow(borrow.id, true).await.unwrap();
    assert!(deleted.deleted_at.is_some());

    let visible = services.circulation.list_borrows(BorrowQuery::default()).await.unwrap();
    assert!(visible.is_empty());
    let all = services
        .circulation
        .list_borrows(BorrowQuery {
            include_deleted: Some(true),
            ..BorrowQuery::default()
        })
        .await
        .unwrap();
    assert_eq!(all.len(), 1);
}

#[tokio::test]
async fn borrow_listing_filters_by_student_and_status() {
    let store = store();
    let services = services(store.clone());
    let uma = seed_student(&services, "Uma").await;
    let vic = seed_student(&services, "Vic").await;
    let book = seed_book(&services, "Accelerando").await;
    add_copy(&services, book.id, "ACC-1", None).await;
    add_copy(&services, book.id, "ACC-2", None).await;

    let closed = services
        .circulation
        .borrow_book(uma.id, book.id, Some(date(2024, 3, 1)))
        .await
        .unwrap();
    services.circulation.return_borrow(closed.id, None).await.unwrap();
    services
        .circulation
        .borrow_book(uma.id, book.id, Some(date(2024, 3, 5)))
        .await
        .unwrap();
    services.circulation.borrow_book(vic.id, book.id, None).await.unwrap();

    let umas = services
        .circulation
        .list_borrows(BorrowQuery {
            student_id: Some(uma.id),
            ..BorrowQuery::default()
        })
        .await
        .unwrap();
    assert_eq!(umas.len(), 2);
    // Most recent first
    assert_eq!(umas[0].date_borrowed, date(2024, 3, 5));
    assert_eq!(umas[1].id, closed.id);
    assert_eq!(umas[0].student_name.as_deref(), Some("Uma Tester"));

    let returned = services
        .circulation
        .list_borrows(BorrowQuery {
            status: Some(BorrowStatus::Returned),
            ..BorrowQuery::default()
        })
        .await
        .unwrap();
    assert_eq!(returned.len(), 1);
    assert_eq!(returned[0].id, closed.id);
}
