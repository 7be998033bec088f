//! Borrow (circulation) endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

use super::{AuthenticatedUser, ListParams, OptionalJson};
use crate::{
    error::AppResult,
    models::{
        borrow::{BorrowQuery, CreateBorrow, ReturnBorrow},
        Borrow,
    },
    AppState,
};

/// List borrows; students only ever see their own
#[utoipa::path(
    get,
    path = "/borrows",
    tag = "borrows",
    security(("bearer_auth" = [])),
    params(BorrowQuery),
    responses(
        (status = 200, description = "Borrows, most recent first", body = Vec<Borrow>),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn list_borrows(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Query(mut query): Query<BorrowQuery>,
) -> AppResult<Json<Vec<Borrow>>> {
    query.include_deleted = Some(claims.include_deleted(query.include_deleted)?);

    if !claims.is_admin() {
        let student = state.services.students.student_for_user(claims.user_id).await?;
        query.student_id = Some(student.id);
    }

    let borrows = state.services.circulation.list_borrows(query).await?;
    Ok(Json(borrows))
}

/// Borrows of one student
#[utoipa::path(
    get,
    path = "/students/{id}/borrows",
    tag = "borrows",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Student ID"),
        ListParams
    ),
    responses(
        (status = 200, description = "The student's borrows", body = Vec<Borrow>),
        (status = 403, description = "Another student's records"),
        (status = 404, description = "Student not found")
    )
)]
pub async fn list_student_borrows(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
    Query(params): Query<ListParams>,
) -> AppResult<Json<Vec<Borrow>>> {
    let include_deleted = claims.include_deleted(params.include_deleted)?;
    let student = state.services.students.get_student(id, false).await?;
    claims.require_self_or_admin(student.user_id)?;

    let borrows = state
        .services
        .circulation
        .list_borrows(BorrowQuery {
            student_id: Some(student.id),
            include_deleted: Some(include_deleted),
            ..BorrowQuery::default()
        })
        .await?;
    Ok(Json(borrows))
}

/// Lend a book to a student
#[utoipa::path(
    post,
    path = "/borrows",
    tag = "borrows",
    security(("bearer_auth" = [])),
    request_body = CreateBorrow,
    responses(
        (status = 201, description = "Borrow created; the copy is picked by the server", body = Borrow),
        (status = 404, description = "Student or book not found"),
        (status = 409, description = "No available copy, or contention", body = crate::error::ErrorResponse),
        (status = 422, description = "Borrow date in the future", body = crate::error::ErrorResponse),
        (status = 503, description = "Timed out", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_borrow(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(data): Json<CreateBorrow>,
) -> AppResult<(StatusCode, Json<Borrow>)> {
    claims.require_admin()?;

    let borrow = state
        .services
        .circulation
        .borrow_book(data.student_id, data.book_id, data.date_borrowed)
        .await?;
    Ok((StatusCode::CREATED, Json(borrow)))
}

/// Get borrow by ID
#[utoipa::path(
    get,
    path = "/borrows/{id}",
    tag = "borrows",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Borrow ID"),
        ListParams
    ),
    responses(
        (status = 200, description = "Borrow details", body = Borrow),
        (status = 404, description = "Borrow not found")
    )
)]
pub async fn get_borrow(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
    Query(params): Query<ListParams>,
) -> AppResult<Json<Borrow>> {
    claims.require_admin()?;

    let borrow = state
        .services
        .circulation
        .get_borrow(id, params.include_deleted.unwrap_or(false))
        .await?;
    Ok(Json(borrow))
}

/// Record the return of a borrowed book
#[utoipa::path(
    post,
    path = "/borrows/{id}/return",
    tag = "borrows",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Borrow ID")),
    request_body(content = ReturnBorrow, description = "Return date, defaults to today"),
    responses(
        (status = 200, description = "Borrow closed", body = Borrow),
        (status = 400, description = "Body present but not a valid return request", body = crate::error::ErrorResponse),
        (status = 404, description = "Borrow not found"),
        (status = 409, description = "Already returned", body = crate::error::ErrorResponse),
        (status = 422, description = "Return date precedes the borrow date", body = crate::error::ErrorResponse)
    )
)]
pub async fn return_borrow(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
    OptionalJson(body): OptionalJson<ReturnBorrow>,
) -> AppResult<Json<Borrow>> {
    claims.require_admin()?;

    let date_returned = body.and_then(|data| data.date_returned);
    let borrow = state.services.circulation.return_borrow(id, date_returned).await?;
    Ok(Json(borrow))
}

/// Soft-delete a closed borrow
#[utoipa::path(
    delete,
    path = "/borrows/{id}",
    tag = "borrows",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Borrow ID")),
    responses(
        (status = 204, description = "Borrow deleted"),
        (status = 404, description = "Borrow not found"),
        (status = 409, description = "Borrow still active", body = crate::error::ErrorResponse)
    )
)]
pub async fn delete_borrow(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    claims.require_admin()?;

    state.services.circulation.delete_borrow(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
