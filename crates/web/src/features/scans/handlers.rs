use axum::{
    Json,
    extract::{Multipart, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use ingest::{ImagePayload, ScanContext};
use storage::{
    dto::{
        common::{Page, PageRequest},
        scan::{
            CaptureScanFields, CapturedScan, PendingScanResponse, ScanReceipt, SubmitScanRequest,
            WastePrediction,
        },
    },
    models::WasteScan,
};
use validator::Validate;

use crate::error::{ApiResult, WebError};
use crate::middleware::session::{CurrentUser, Session};
use crate::state::AppState;

use super::services;

/// Image upload plus the optional text fields accepted next to it
struct ScanUpload {
    image: ImagePayload,
    context: ScanContext,
}

async fn read_upload(mut multipart: Multipart) -> ApiResult<ScanUpload> {
    let mut image = None;
    let mut fields = CaptureScanFields::default();

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "file" => {
                let file_name = field.file_name().unwrap_or("upload").to_string();
                let content_type = field.content_type().map(str::to_string);
                let bytes = field.bytes().await?;

                let mut payload = ImagePayload::new(bytes.to_vec(), file_name);
                if let Some(content_type) = content_type {
                    payload = payload.with_content_type(content_type);
                }
                image = Some(payload);
            }
            "image_url" | "location" | "idempotency_key" => {
                let value = field.text().await?;
                fields.set(&name, &value);
            }
            other => tracing::debug!(field = other, "Ignoring unknown multipart field"),
        }
    }

    let image = image.ok_or_else(|| WebError::BadRequest("missing 'file' field".to_string()))?;
    if image.bytes.is_empty() {
        return Err(WebError::BadRequest("uploaded file is empty".to_string()));
    }

    fields.validate()?;

    let context = ScanContext {
        image_url: fields.image_url,
        location: fields.location,
        idempotency_key: fields.idempotency_key,
        ..Default::default()
    };

    Ok(ScanUpload { image, context })
}

#[utoipa::path(
    post,
    path = "/api/predictions",
    request_body(content_type = "multipart/form-data", description = "Image in the 'file' field"),
    responses(
        (status = 200, description = "Image classified, nothing recorded", body = WastePrediction),
        (status = 400, description = "Missing or empty image"),
        (status = 422, description = "Label has no waste category"),
        (status = 502, description = "Classification service failed")
    ),
    tag = "scans"
)]
pub async fn predict(State(state): State<AppState>, multipart: Multipart) -> ApiResult<Response> {
    let upload = read_upload(multipart).await?;

    let prediction = services::predict(&state, &upload.image).await?;

    Ok(Json(prediction).into_response())
}

#[utoipa::path(
    post,
    path = "/api/scans/capture",
    request_body(content_type = "multipart/form-data", description = "Image in the 'file' field, with optional 'location', 'image_url' and 'idempotency_key' fields"),
    responses(
        (status = 201, description = "Scan recorded and points applied", body = CapturedScan),
        (status = 202, description = "Scan recorded, points pending reconciliation", body = PendingScanResponse),
        (status = 400, description = "Missing image or invalid text field"),
        (status = 401, description = "Missing or invalid session"),
        (status = 409, description = "Idempotency key already used"),
        (status = 422, description = "Label has no waste category"),
        (status = 502, description = "Classification service failed")
    ),
    tag = "scans",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn capture_scan(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    multipart: Multipart,
) -> ApiResult<Response> {
    let upload = read_upload(multipart).await?;

    let captured = services::capture(&state, user.as_ref(), &upload.image, upload.context).await?;

    Ok((StatusCode::CREATED, Json(captured)).into_response())
}

#[utoipa::path(
    post,
    path = "/api/scans",
    request_body = SubmitScanRequest,
    responses(
        (status = 201, description = "Scan recorded and points applied", body = ScanReceipt),
        (status = 202, description = "Scan recorded, points pending reconciliation", body = PendingScanResponse),
        (status = 400, description = "Invalid input"),
        (status = 401, description = "Missing or invalid session"),
        (status = 409, description = "Idempotency key already used"),
        (status = 422, description = "Label has no waste category")
    ),
    tag = "scans",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn submit_scan(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(request): Json<SubmitScanRequest>,
) -> ApiResult<Response> {
    request.validate()?;

    let context = ScanContext {
        confidence: request.confidence,
        image_url: request.image_url,
        location: request.location,
        idempotency_key: request.idempotency_key,
    };
    let receipt = services::record_label(&state, user.as_ref(), &request.label, context).await?;

    Ok((StatusCode::CREATED, Json(receipt)).into_response())
}

#[utoipa::path(
    get,
    path = "/api/scans",
    params(PageRequest),
    responses(
        (status = 200, description = "The caller's scans, newest first", body = Page<WasteScan>),
        (status = 400, description = "Invalid query parameters"),
        (status = 401, description = "Missing or invalid session")
    ),
    tag = "scans",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn list_scans(
    State(state): State<AppState>,
    Session(user): Session,
    Query(page): Query<PageRequest>,
) -> ApiResult<Response> {
    page.validate().map_err(WebError::BadRequest)?;

    let (scans, total_items) = services::list_scans(&state, &user, page).await?;

    Ok(Json(Page::new(scans, page, total_items)).into_response())
}
