use axum::{
    Json,
    extract::{Path, State},
    response::{IntoResponse, Response},
};
use storage::{dto::leaderboard::UpdateProfileRequest, models::UserProfile};
use uuid::Uuid;
use validator::Validate;

use crate::error::{ApiResult, WebError};
use crate::middleware::session::Session;
use crate::state::AppState;

use super::services;

#[utoipa::path(
    put,
    path = "/api/profiles/me",
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "Display name updated", body = UserProfile),
        (status = 400, description = "Invalid input"),
        (status = 401, description = "Missing or invalid session")
    ),
    tag = "profiles",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn update_my_profile(
    State(state): State<AppState>,
    Session(user): Session,
    Json(request): Json<UpdateProfileRequest>,
) -> ApiResult<Response> {
    request.validate()?;
    if request.username.trim().is_empty() {
        return Err(WebError::BadRequest("Username cannot be blank".to_string()));
    }

    let profile = services::rename(state.store.as_ref(), &user, &request.username).await?;

    Ok(Json(profile).into_response())
}

#[utoipa::path(
    post,
    path = "/api/profiles/{user_id}/reconcile",
    params(
        ("user_id" = Uuid, Path, description = "User id")
    ),
    responses(
        (status = 200, description = "Totals rebuilt from the user's scans", body = UserProfile),
        (status = 401, description = "Unauthorized - Invalid or missing API key"),
        (status = 404, description = "User has no scans and no profile")
    ),
    tag = "profiles",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn reconcile_profile(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> ApiResult<Response> {
    let profile = services::reconcile(state.store.as_ref(), user_id).await?;

    Ok(Json(profile).into_response())
}
