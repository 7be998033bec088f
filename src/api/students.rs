//! Student endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

use super::{AuthenticatedUser, ListParams};
use crate::{
    error::AppResult,
    models::{
        student::{CreateStudent, UpdateStudent},
        Student,
    },
    AppState,
};

/// List students
#[utoipa::path(
    get,
    path = "/students",
    tag = "students",
    security(("bearer_auth" = [])),
    params(ListParams),
    responses(
        (status = 200, description = "Students with their display name", body = Vec<Student>),
        (status = 403, description = "Administrator rights required")
    )
)]
pub async fn list_students(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Query(params): Query<ListParams>,
) -> AppResult<Json<Vec<Student>>> {
    claims.require_admin()?;

    let students = state
        .services
        .students
        .list_students(params.include_deleted.unwrap_or(false))
        .await?;
    Ok(Json(students))
}

/// Get student by ID
#[utoipa::path(
    get,
    path = "/students/{id}",
    tag = "students",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Student ID"),
        ListParams
    ),
    responses(
        (status = 200, description = "Student details", body = Student),
        (status = 404, description = "Student not found")
    )
)]
pub async fn get_student(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
    Query(params): Query<ListParams>,
) -> AppResult<Json<Student>> {
    claims.require_admin()?;

    let student = state
        .services
        .students
        .get_student(id, params.include_deleted.unwrap_or(false))
        .await?;
    Ok(Json(student))
}

/// Enroll a user as a student
#[utoipa::path(
    post,
    path = "/students",
    tag = "students",
    security(("bearer_auth" = [])),
    request_body = CreateStudent,
    responses(
        (status = 201, description = "Student created", body = Student),
        (status = 404, description = "User not found"),
        (status = 409, description = "Student number or user already enrolled")
    )
)]
pub async fn create_student(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(data): Json<CreateStudent>,
) -> AppResult<(StatusCode, Json<Student>)> {
    claims.require_admin()?;

    let student = state.services.students.create_student(data).await?;
    Ok((StatusCode::CREATED, Json(student)))
}

/// Update a student
#[utoipa::path(
    put,
    path = "/students/{id}",
    tag = "students",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Student ID")),
    request_body = UpdateStudent,
    responses(
        (status = 200, description = "Student updated", body = Student),
        (status = 404, description = "Student not found")
    )
)]
pub async fn update_student(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
    Json(data): Json<UpdateStudent>,
) -> AppResult<Json<Student>> {
    claims.require_admin()?;

    let student = state.services.students.update_student(id, data).await?;
    Ok(Json(student))
}

/// Soft-delete a student
#[utoipa::path(
    delete,
    path = "/students/{id}",
    tag = "students",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Student ID")),
    responses(
        (status = 204, description = "Student deleted"),
        (status = 404, description = "Student not found"),
        (status = 409, description = "Student still holds borrowed books", body = crate::error::ErrorResponse)
    )
)]
pub async fn delete_student(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    claims.require_admin()?;

    state.services.students.delete_student(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
