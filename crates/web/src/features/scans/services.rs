use ingest::{Classifier, ImagePayload, ScanContext, ScanError, ScanPipeline};
use storage::{
    dto::{
        common::PageRequest,
        scan::{CapturedScan, ScanReceipt, WastePrediction},
    },
    error::Result,
    models::WasteScan,
    services::{ledger::RewardLedger, session::AuthenticatedUser},
    store::LedgerStore,
};

use crate::state::AppState;

fn pipeline(state: &AppState) -> ScanPipeline<'_, dyn LedgerStore, dyn Classifier> {
    ScanPipeline::new(state.store.as_ref(), state.classifier.as_ref(), state.policy)
}

/// Classify an image and resolve its category without recording anything
pub async fn predict(
    state: &AppState,
    image: &ImagePayload,
) -> std::result::Result<WastePrediction, ScanError> {
    pipeline(state).predict(image).await
}

/// Classify an image and record the scan for the caller
pub async fn capture(
    state: &AppState,
    user: Option<&AuthenticatedUser>,
    image: &ImagePayload,
    context: ScanContext,
) -> std::result::Result<CapturedScan, ScanError> {
    pipeline(state).capture(user, image, context).await
}

/// Record a scan for a label the client already has
pub async fn record_label(
    state: &AppState,
    user: Option<&AuthenticatedUser>,
    label: &str,
    context: ScanContext,
) -> std::result::Result<ScanReceipt, ScanError> {
    pipeline(state).record_label(user, label, context).await
}

/// The caller's scan history, newest first
pub async fn list_scans(
    state: &AppState,
    user: &AuthenticatedUser,
    page: PageRequest,
) -> Result<(Vec<WasteScan>, i64)> {
    RewardLedger::new(state.store.as_ref())
        .list_scans(user, page)
        .await
}
