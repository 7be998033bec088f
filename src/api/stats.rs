//! Statistics endpoints

use axum::{extract::State, Json};

use super::AuthenticatedUser;
use crate::{error::AppResult, models::LibraryStats, AppState};

/// Get library statistics
#[utoipa::path(
    get,
    path = "/stats",
    tag = "stats",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Library statistics", body = LibraryStats),
        (status = 403, description = "Administrator rights required")
    )
)]
pub async fn get_stats(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<LibraryStats>> {
    claims.require_admin()?;

    let stats = state.services.stats.library_stats().await?;
    Ok(Json(stats))
}
