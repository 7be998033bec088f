//! Favorite endpoints. Toggles always act on the caller's own favorites.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use utoipa::IntoParams;

use super::AuthenticatedUser;
use crate::{
    error::AppResult,
    models::{favorite::ToggleResult, Favorite, FavoriteTarget, User},
    AppState,
};

#[derive(Debug, Deserialize, IntoParams)]
pub struct FavoritedByParams {
    /// Maximum number of users returned (default 3)
    pub limit: Option<i64>,
}

async fn toggle(state: &AppState, user_id: i32, target: FavoriteTarget) -> AppResult<Json<ToggleResult>> {
    let result = state.services.favorites.toggle(user_id, target).await?;
    Ok(Json(result))
}

/// Add or remove a genre from the caller's favorites
#[utoipa::path(
    post,
    path = "/genres/{id}/favorite",
    tag = "favorites",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Genre ID")),
    responses(
        (status = 200, description = "Toggle outcome with notification text", body = ToggleResult),
        (status = 404, description = "Genre not found")
    )
)]
pub async fn toggle_genre(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<ToggleResult>> {
    toggle(&state, claims.user_id, FavoriteTarget::Genre(id)).await
}

/// Add or remove a book from the caller's favorites
#[utoipa::path(
    post,
    path = "/books/{id}/favorite",
    tag = "favorites",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Book ID")),
    responses(
        (status = 200, description = "Toggle outcome with notification text", body = ToggleResult),
        (status = 404, description = "Book not found")
    )
)]
pub async fn toggle_book(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<ToggleResult>> {
    toggle(&state, claims.user_id, FavoriteTarget::Book(id)).await
}

/// Add or remove an author from the caller's favorites
#[utoipa::path(
    post,
    path = "/authors/{id}/favorite",
    tag = "favorites",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Author ID")),
    responses(
        (status = 200, description = "Toggle outcome with notification text", body = ToggleResult),
        (status = 404, description = "Author not found")
    )
)]
pub async fn toggle_author(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<ToggleResult>> {
    toggle(&state, claims.user_id, FavoriteTarget::Author(id)).await
}

/// The caller's current favorites
#[utoipa::path(
    get,
    path = "/me/favorites",
    tag = "favorites",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Active favorites", body = Vec<Favorite>),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn my_favorites(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<Vec<Favorite>>> {
    let favorites = state.services.favorites.list_for_user(claims.user_id).await?;
    Ok(Json(favorites))
}

async fn favorited_by(state: &AppState, target: FavoriteTarget, limit: Option<i64>) -> AppResult<Json<Vec<User>>> {
    let users = state.services.favorites.favorited_by(target, limit).await?;
    Ok(Json(users))
}

/// Users who recently favorited a genre
#[utoipa::path(
    get,
    path = "/genres/{id}/favorited-by",
    tag = "favorites",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Genre ID"),
        FavoritedByParams
    ),
    responses(
        (status = 200, description = "Most recent users first", body = Vec<User>),
        (status = 404, description = "Genre not found")
    )
)]
pub async fn genre_favorited_by(
    State(state): State<AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Path(id): Path<i32>,
    Query(params): Query<FavoritedByParams>,
) -> AppResult<Json<Vec<User>>> {
    favorited_by(&state, FavoriteTarget::Genre(id), params.limit).await
}

/// Users who recently favorited a book
#[utoipa::path(
    get,
    path = "/books/{id}/favorited-by",
    tag = "favorites",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Book ID"),
        FavoritedByParams
    ),
    responses(
        (status = 200, description = "Most recent users first", body = Vec<User>),
        (status = 404, description = "Book not found")
    )
)]
pub async fn book_favorited_by(
    State(state): State<AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Path(id): Path<i32>,
    Query(params): Query<FavoritedByParams>,
) -> AppResult<Json<Vec<User>>> {
    favorited_by(&state, FavoriteTarget::Book(id), params.limit).await
}

/// Users who recently favorited an author
#[utoipa::path(
    get,
    path = "/authors/{id}/favorited-by",
    tag = "favorites",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Author ID"),
        FavoritedByParams
    ),
    responses(
        (status = 200, description = "Most recent users first", body = Vec<User>),
        (status = 404, description = "Author not found")
    )
)]
pub async fn author_favorited_by(
    State(state): State<AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Path(id): Path<i32>,
    Query(params): Query<FavoritedByParams>,
) -> AppResult<Json<Vec<User>>> {
    favorited_by(&state, FavoriteTarget::Author(id), params.limit).await
}
