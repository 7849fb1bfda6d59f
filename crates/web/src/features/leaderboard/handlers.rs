use axum::{
    Json,
    extract::{Path, Query, State},
    response::{IntoResponse, Response},
};
use storage::{
    dto::leaderboard::{LeaderboardQuery, LeaderboardResponse},
    models::RankedProfile,
};
use uuid::Uuid;

use crate::error::{ApiResult, WebError};
use crate::middleware::session::Session;
use crate::state::AppState;

use super::services;

#[utoipa::path(
    get,
    path = "/api/leaderboard",
    params(LeaderboardQuery),
    responses(
        (status = 200, description = "Users ordered by points, then by profile age", body = LeaderboardResponse),
        (status = 400, description = "Invalid query parameters")
    ),
    tag = "leaderboard"
)]
pub async fn get_leaderboard(
    State(state): State<AppState>,
    Query(query): Query<LeaderboardQuery>,
) -> ApiResult<Response> {
    query.validate().map_err(WebError::BadRequest)?;

    let entries = services::top(state.store.as_ref(), query.limit).await?;

    Ok(Json(LeaderboardResponse { entries }).into_response())
}

#[utoipa::path(
    get,
    path = "/api/leaderboard/me",
    responses(
        (status = 200, description = "The caller's totals and rank", body = RankedProfile),
        (status = 401, description = "Missing or invalid session"),
        (status = 404, description = "The caller has no profile yet")
    ),
    tag = "leaderboard",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn get_my_standing(
    State(state): State<AppState>,
    Session(user): Session,
) -> ApiResult<Response> {
    let standing = services::standing(state.store.as_ref(), user.user_id()).await?;

    Ok(Json(standing).into_response())
}

#[utoipa::path(
    get,
    path = "/api/leaderboard/users/{user_id}",
    params(
        ("user_id" = Uuid, Path, description = "User id")
    ),
    responses(
        (status = 200, description = "The user's totals and rank", body = RankedProfile),
        (status = 404, description = "User has no profile")
    ),
    tag = "leaderboard"
)]
pub async fn get_user_standing(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> ApiResult<Response> {
    let standing = services::standing(state.store.as_ref(), user_id).await?;

    Ok(Json(standing).into_response())
}
