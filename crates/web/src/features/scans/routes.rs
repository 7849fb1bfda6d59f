use axum::{
    Router,
    routing::{get, post},
};

use super::handlers::{capture_scan, list_scans, predict, submit_scan};
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_scans).post(submit_scan))
        .route("/capture", post(capture_scan))
}

pub fn prediction_routes() -> Router<AppState> {
    Router::new().route("/", post(predict))
}
