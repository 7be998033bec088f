//! OpenAPI documentation

use axum::Router;
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{authors, books, borrows, favorites, genres, health, stats, students, users};

/// Registers the `bearer_auth` scheme referenced by the handlers
struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Libraria API",
        version = "1.0.0",
        description = "Library back-office REST API: catalog, students, borrows and favorites"
    ),
    servers(
        (url = "/api/v1", description = "API v1")
    ),
    modifiers(&BearerAuth),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Authors
        authors::list_authors,
        authors::get_author,
        authors::create_author,
        authors::update_author,
        authors::delete_author,
        authors::list_author_books,
        // Genres
        genres::list_genres,
        genres::get_genre,
        genres::create_genre,
        genres::update_genre,
        genres::delete_genre,
        genres::list_genre_books,
        // Books and copies
        books::list_books,
        books::get_book,
        books::create_book,
        books::update_book,
        books::delete_book,
        books::get_availability,
        books::list_copies,
        books::create_copy,
        books::update_copy,
        books::delete_copy,
        // Favorites
        favorites::toggle_genre,
        favorites::toggle_book,
        favorites::toggle_author,
        favorites::my_favorites,
        favorites::genre_favorited_by,
        favorites::book_favorited_by,
        favorites::author_favorited_by,
        // Users and students
        users::list_users,
        users::get_user,
        users::create_user,
        students::list_students,
        students::get_student,
        students::create_student,
        students::update_student,
        students::delete_student,
        // Borrows
        borrows::list_borrows,
        borrows::list_student_borrows,
        borrows::create_borrow,
        borrows::get_borrow,
        borrows::return_borrow,
        borrows::delete_borrow,
        // Stats
        stats::get_stats,
    ),
    components(
        schemas(
            crate::models::Author,
            crate::models::author::CreateAuthor,
            crate::models::author::UpdateAuthor,
            crate::models::author::AuthorQuery,
            crate::models::Genre,
            crate::models::genre::CreateGenre,
            crate::models::genre::UpdateGenre,
            crate::models::genre::GenreQuery,
            crate::models::Book,
            crate::models::book::CreateBook,
            crate::models::book::UpdateBook,
            crate::models::BookCopy,
            crate::models::copy::CreateBookCopy,
            crate::models::copy::UpdateBookCopy,
            crate::models::CopyStatus,
            crate::models::BookAvailability,
            crate::models::User,
            crate::models::user::CreateUser,
            crate::models::Student,
            crate::models::student::CreateStudent,
            crate::models::student::UpdateStudent,
            crate::models::Borrow,
            crate::models::BorrowStatus,
            crate::models::borrow::CreateBorrow,
            crate::models::borrow::ReturnBorrow,
            crate::models::Favorite,
            crate::models::FavorableType,
            crate::models::ToggleOutcome,
            crate::models::favorite::ToggleResult,
            crate::models::LibraryStats,
            health::HealthResponse,
            crate::error::ErrorResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "authors", description = "Author management"),
        (name = "genres", description = "Genre management"),
        (name = "books", description = "Books, copies and availability"),
        (name = "favorites", description = "Favorite genres, books and authors"),
        (name = "users", description = "User accounts"),
        (name = "students", description = "Student management"),
        (name = "borrows", description = "Borrowing and returns"),
        (name = "stats", description = "Statistics")
    )
)]
pub struct ApiDoc;

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new().merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_circulation_routes_and_bearer_scheme() {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key("/borrows/{id}/return"));
        assert!(doc.paths.paths.contains_key("/genres/{id}/favorite"));
        for kind in ["genres", "books", "authors"] {
            assert!(doc.paths.paths.contains_key(&format!("/{}/{{id}}/favorited-by", kind)));
        }

        let components = doc.components.expect("components");
        assert!(components.security_schemes.contains_key("bearer_auth"));
    }
}
