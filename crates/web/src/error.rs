use axum::{
    Json,
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use ingest::ScanError;
use serde_json::json;
use std::fmt;
use storage::dto::scan::PendingScanResponse;
use storage::error::StorageError;
use storage::models::WasteScan;
use storage::services::session::SessionError;
use validator::ValidationErrors;

/// Web layer errors
#[derive(Debug)]
pub enum WebError {
    Storage(StorageError),
    Validation(ValidationErrors),
    BadRequest(String),
    Unauthorized(String),
    NotFound,
    Conflict(String),
    UnknownCategory(String),
    ClassificationFailed(String),
    /// The scan is stored but the owner's totals are not updated yet
    PartialCommit(Box<WasteScan>),
}

impl fmt::Display for WebError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Storage(e) => write!(f, "Storage error: {}", e),
            Self::Validation(e) => write!(f, "Validation error: {}", e),
            Self::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            Self::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            Self::NotFound => write!(f, "Resource not found"),
            Self::Conflict(msg) => write!(f, "Conflict: {}", msg),
            Self::UnknownCategory(label) => write!(f, "Unknown waste category: {}", label),
            Self::ClassificationFailed(msg) => write!(f, "Classification failed: {}", msg),
            Self::PartialCommit(scan) => write!(f, "Scan {} pending reconciliation", scan.scan_id),
        }
    }
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        let status_code = match &self {
            Self::Storage(StorageError::NotFound) => StatusCode::NOT_FOUND,
            Self::Storage(StorageError::ConstraintViolation(_) | StorageError::DuplicateKey(_)) => {
                StatusCode::CONFLICT
            }
            Self::Storage(e) if e.is_transient() => StatusCode::SERVICE_UNAVAILABLE,
            Self::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::UnknownCategory(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::ClassificationFailed(_) => StatusCode::BAD_GATEWAY,
            Self::PartialCommit(_) => StatusCode::ACCEPTED,
        };

        let body = match self {
            Self::Storage(StorageError::NotFound) | Self::NotFound => {
                json!({
                    "error": "Resource not found"
                })
            }
            Self::Storage(
                StorageError::ConstraintViolation(msg) | StorageError::DuplicateKey(msg),
            ) => {
                json!({
                    "error": msg
                })
            }
            Self::Storage(e) if e.is_transient() => {
                tracing::warn!("Storage temporarily unavailable: {}", e);
                json!({
                    "error": "Service temporarily unavailable, retry later"
                })
            }
            Self::Storage(e) => {
                tracing::error!("Storage error: {:?}", e);
                json!({
                    "error": "An internal error occurred"
                })
            }
            Self::Validation(errors) => {
                let field_errors: Vec<String> = errors
                    .field_errors()
                    .iter()
                    .flat_map(|(field, errors)| {
                        errors.iter().map(move |e| {
                            format!(
                                "{}: {}",
                                field,
                                e.message
                                    .as_ref()
                                    .map(|m| m.to_string())
                                    .unwrap_or_else(|| e.code.to_string())
                            )
                        })
                    })
                    .collect();

                json!({
                    "error": "Validation failed",
                    "details": field_errors
                })
            }
            Self::BadRequest(msg) | Self::Conflict(msg) => {
                json!({
                    "error": msg
                })
            }
            Self::Unauthorized(msg) => {
                tracing::debug!("Rejected request: {}", msg);
                json!({
                    "error": "Unauthorized"
                })
            }
            Self::UnknownCategory(label) => {
                json!({
                    "error": format!("No waste category matches '{}'", label),
                    "label": label
                })
            }
            Self::ClassificationFailed(msg) => {
                json!({
                    "error": "Classification failed",
                    "details": msg
                })
            }
            Self::PartialCommit(scan) => {
                let pending = PendingScanResponse {
                    status: "partial_commit".to_string(),
                    message: "Scan recorded; points will be applied after reconciliation"
                        .to_string(),
                    scan: *scan,
                };
                return (status_code, Json(pending)).into_response();
            }
        };

        (status_code, Json(body)).into_response()
    }
}

impl From<StorageError> for WebError {
    fn from(error: StorageError) -> Self {
        Self::Storage(error)
    }
}

impl From<ValidationErrors> for WebError {
    fn from(error: ValidationErrors) -> Self {
        Self::Validation(error)
    }
}

impl From<SessionError> for WebError {
    fn from(error: SessionError) -> Self {
        Self::Unauthorized(error.to_string())
    }
}

impl From<MultipartError> for WebError {
    fn from(error: MultipartError) -> Self {
        Self::BadRequest(format!("Invalid multipart body: {}", error.body_text()))
    }
}

impl From<ScanError> for WebError {
    fn from(error: ScanError) -> Self {
        match error {
            ScanError::ClassificationFailed(e) => {
                tracing::warn!(timeout = e.is_timeout(), "Classifier call failed: {}", e);
                Self::ClassificationFailed(e.to_string())
            }
            ScanError::UnknownCategory(label) => Self::UnknownCategory(label),
            ScanError::Unauthenticated => Self::Unauthorized("no authenticated user".to_string()),
            ScanError::Invalid(msg) => Self::BadRequest(msg),
            ScanError::DuplicateScan(msg) => Self::Conflict(msg),
            ScanError::PartialCommit { scan, .. } => Self::PartialCommit(scan),
            ScanError::Storage(e) => Self::Storage(e),
        }
    }
}

pub type ApiResult<T> = Result<T, WebError>;
