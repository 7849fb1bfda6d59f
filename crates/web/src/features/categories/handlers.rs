use axum::{
    Json,
    extract::{Path, State},
    response::{IntoResponse, Response},
};
use storage::{dto::category::UpsertCategoryRequest, models::WasteCategory};
use validator::Validate;

use crate::error::ApiResult;
use crate::state::AppState;

use super::services;

#[utoipa::path(
    get,
    path = "/api/categories",
    responses(
        (status = 200, description = "List all waste categories", body = Vec<WasteCategory>)
    ),
    tag = "categories"
)]
pub async fn list_categories(State(state): State<AppState>) -> ApiResult<Response> {
    let categories = services::list_categories(state.store.as_ref()).await?;

    Ok(Json(categories).into_response())
}

#[utoipa::path(
    get,
    path = "/api/categories/{name}",
    params(
        ("name" = String, Path, description = "Category name, as emitted by the classifier")
    ),
    responses(
        (status = 200, description = "Category found", body = WasteCategory),
        (status = 404, description = "Category not found")
    ),
    tag = "categories"
)]
pub async fn get_category(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> ApiResult<Response> {
    let category = services::get_category(state.store.as_ref(), &name).await?;

    Ok(Json(category).into_response())
}

#[utoipa::path(
    post,
    path = "/api/categories",
    request_body = UpsertCategoryRequest,
    responses(
        (status = 200, description = "Category created or updated", body = WasteCategory),
        (status = 400, description = "Invalid input"),
        (status = 401, description = "Unauthorized - Invalid or missing API key")
    ),
    tag = "categories",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn upsert_category(
    State(state): State<AppState>,
    Json(request): Json<UpsertCategoryRequest>,
) -> ApiResult<Response> {
    request.validate()?;

    let category = services::upsert_category(state.store.as_ref(), &request).await?;

    Ok(Json(category).into_response())
}
