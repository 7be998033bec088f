//! Favorite toggling over the in-memory store

mod common;

use std::sync::Arc;

use common::*;
use libraria_server::{
    error::AppError,
    models::{author::CreateAuthor, genre::CreateGenre, FavorableType, FavoriteTarget, Genre, ToggleOutcome},
    repository::FavoriteStore,
    services::Services,
};

async fn seed_genre(services: &Services, title: &str) -> Genre {
    services
        .catalog
        .create_genre(CreateGenre {
            title: title.to_string(),
            slug: None,
            description: format!("All about {}", title),
        })
        .await
        .unwrap()
}

#[tokio::test]
async fn toggle_is_its_own_inverse() {
    let services = services(store());
    let user = seed_user(&services, "Ada").await;
    let genre = seed_genre(&services, "Science Fiction").await;
    let target = FavoriteTarget::Genre(genre.id);

    let added = services.favorites.toggle(user.id, target).await.unwrap();
    assert_eq!(added.outcome, ToggleOutcome::Added);
    assert_eq!(added.message, "Science Fiction added to favorites");
    assert_eq!(added.favorable_type, FavorableType::Genre);

    let first_row = services.favorites.list_for_user(user.id).await.unwrap();
    assert_eq!(first_row.len(), 1);

    let removed = services.favorites.toggle(user.id, target).await.unwrap();
    assert_eq!(removed.outcome, ToggleOutcome::Removed);
    assert_eq!(removed.message, "Science Fiction removed from favorites");
    assert!(services.favorites.list_for_user(user.id).await.unwrap().is_empty());

    // Re-adding revives the same row instead of inserting a second one
    services.favorites.toggle(user.id, target).await.unwrap();
    let revived = services.favorites.list_for_user(user.id).await.unwrap();
    assert_eq!(revived.len(), 1);
    assert_eq!(revived[0].id, first_row[0].id);
    assert_eq!(revived[0].target(), target);
}

#[tokio::test]
async fn missing_or_deleted_targets_are_not_found() {
    let services = services(store());
    let user = seed_user(&services, "Bo").await;

    let err = services
        .favorites
        .toggle(user.id, FavoriteTarget::Book(404))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));

    let genre = seed_genre(&services, "Horror").await;
    services.catalog.delete_genre(genre.id).await.unwrap();
    let err = services
        .favorites
        .toggle(user.id, FavoriteTarget::Genre(genre.id))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
    assert!(services.favorites.list_for_user(user.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn the_store_refuses_targets_deleted_after_the_title_lookup() {
    let store = store();
    let services = services(store.clone());
    let user = seed_user(&services, "Ned").await;
    let book = seed_book(&services, "Roadside Picnic").await;
    let genre = seed_genre(&services, "Weird").await;

    services.catalog.delete_book(book.id).await.unwrap();
    services.catalog.delete_genre(genre.id).await.unwrap();

    for target in [FavoriteTarget::Book(book.id), FavoriteTarget::Genre(genre.id), FavoriteTarget::Author(77)] {
        let err = store.toggle_favorite(user.id, target).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)), "{target}: {err:?}");
    }
    assert!(store.list_favorites(user.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn books_and_authors_are_favorable_too() {
    let services = services(store());
    let user = seed_user(&services, "Cy").await;
    let book = seed_book(&services, "Dune").await;
    let author = services
        .catalog
        .create_author(CreateAuthor {
            first_name: "Frank".into(),
            last_name: "Herbert".into(),
            details: "Author of Dune".into(),
            image_path: None,
        })
        .await
        .unwrap();

    let result = services
        .favorites
        .toggle(user.id, FavoriteTarget::Author(author.id))
        .await
        .unwrap();
    assert_eq!(result.message, "Frank Herbert added to favorites");
    services
        .favorites
        .toggle(user.id, FavoriteTarget::Book(book.id))
        .await
        .unwrap();

    // Same numeric id under different kinds are different favorites
    let kinds: Vec<FavorableType> = services
        .favorites
        .list_for_user(user.id)
        .await
        .unwrap()
        .iter()
        .map(|f| f.favorable_type)
        .collect();
    assert_eq!(kinds, vec![FavorableType::Book, FavorableType::Author]);
}

#[tokio::test]
async fn favorited_by_lists_recent_users_up_to_the_limit() {
    let services = services(store());
    let genre = seed_genre(&services, "Fantasy").await;
    let target = FavoriteTarget::Genre(genre.id);

    let mut users = Vec::new();
    for name in ["Dee", "Eli", "Fay", "Gus"] {
        let user = seed_user(&services, name).await;
        services.favorites.toggle(user.id, target).await.unwrap();
        users.push(user);
    }
    // Eli drops out
    services.favorites.toggle(users[1].id, target).await.unwrap();

    let shown = services.favorites.favorited_by(target, None).await.unwrap();
    let names: Vec<&str> = shown.iter().map(|u| u.first_name.as_str()).collect();
    assert_eq!(names, vec!["Gus", "Fay", "Dee"]);

    let one = services.favorites.favorited_by(target, Some(1)).await.unwrap();
    assert_eq!(one.len(), 1);
    assert_eq!(one[0].id, users[3].id);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_toggles_never_duplicate_the_row() {
    let services = Arc::new(services(store()));
    let user = seed_user(&services, "Hal").await;
    let genre = seed_genre(&services, "Mystery").await;
    let target = FavoriteTarget::Genre(genre.id);

    let handles: Vec<_> = (0..10)
        .map(|_| {
            let services = services.clone();
            let user_id = user.id;
            tokio::spawn(async move { services.favorites.toggle(user_id, target).await })
        })
        .collect();

    let mut added = 0;
    let mut removed = 0;
    for handle in handles {
        match handle.await.unwrap().unwrap().outcome {
            ToggleOutcome::Added => added += 1,
            ToggleOutcome::Removed => removed += 1,
        }
    }

    assert_eq!(added, 5);
    assert_eq!(removed, 5);
    assert!(services.favorites.list_for_user(user.id).await.unwrap().is_empty());

    services.favorites.toggle(user.id, target).await.unwrap();
    assert_eq!(services.favorites.list_for_user(user.id).await.unwrap().len(), 1);
}
