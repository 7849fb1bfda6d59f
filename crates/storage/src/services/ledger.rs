use rust_decimal::Decimal;
use thiserror::Error;
use uuid::Uuid;

use crate::dto::common::PageRequest;
use crate::dto::scan::ScanReceipt;
use crate::error::StorageError;
use crate::models::{CategoryDetails, NewWasteScan, UserProfile, WasteScan};
use crate::services::session::AuthenticatedUser;
use crate::store::{ProfileStore, ScanStore};

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("Scan submitted without an authenticated user")]
    Unauthenticated,

    #[error("Invalid scan submission: {0}")]
    InvalidSubmission(String),

    #[error("Duplicate scan: {0}")]
    DuplicateScan(String),

    #[error("Failed to record scan: {0}")]
    Storage(#[source] StorageError),

    /// The scan row exists but the owner's totals do not include it yet.
    #[error("Scan recorded but profile totals were not updated: {source}")]
    PartialCommit {
        scan: Box<WasteScan>,
        source: StorageError,
    },
}

/// Everything needed to record one scan, apart from the user.
#[derive(Debug, Clone)]
pub struct ScanSubmission {
    pub details: CategoryDetails,
    pub confidence: f64,
    pub image_url: Option<String>,
    pub location: Option<String>,
    pub idempotency_key: Option<String>,
}

impl ScanSubmission {
    pub fn new(details: CategoryDetails, confidence: f64) -> Self {
        Self {
            details,
            confidence,
            image_url: None,
            location: None,
            idempotency_key: None,
        }
    }

    fn validate(&self) -> Result<(), LedgerError> {
        if !(0.0..=1.0).contains(&self.confidence) {
            return Err(LedgerError::InvalidSubmission(format!(
                "confidence {} is outside [0, 1]",
                self.confidence
            )));
        }
        if self.details.points_value < 0 || self.details.co2_impact_kg < Decimal::ZERO {
            return Err(LedgerError::InvalidSubmission(format!(
                "category '{}' carries negative rewards",
                self.details.name
            )));
        }
        Ok(())
    }
}

/// Append-only scan ledger plus the per-user aggregate derived from it.
pub struct RewardLedger<'a, S: ?Sized> {
    store: &'a S,
}

impl<'a, S: ScanStore + ProfileStore + ?Sized> RewardLedger<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Insert the scan, then credit its rewards to the owner in one atomic step.
    ///
    /// Nothing is written when `user` is `None` or the submission is invalid.
    /// If the insert fails the increment is never attempted. If the increment
    /// fails after the insert, the stored scan is returned inside
    /// [`LedgerError::PartialCommit`] and must be reconciled, not resubmitted.
    pub async fn submit_scan(
        &self,
        user: Option<&AuthenticatedUser>,
        submission: ScanSubmission,
    ) -> Result<ScanReceipt, LedgerError> {
        let user = user.ok_or(LedgerError::Unauthenticated)?;
        submission.validate()?;

        let new_scan = NewWasteScan {
            user_id: user.user_id(),
            category_id: submission.details.category_id,
            category_name: submission.details.name,
            confidence: submission.confidence,
            points_awarded: submission.details.points_value,
            co2_saved_kg: submission.details.co2_impact_kg,
            image_url: submission.image_url,
            location: submission.location,
            disposal_confirmed: true,
            idempotency_key: submission.idempotency_key,
        };

        let scan = self
            .store
            .insert_scan(&new_scan)
            .await
            .map_err(|e| match e {
                StorageError::DuplicateKey(msg) => LedgerError::DuplicateScan(msg),
                other => LedgerError::Storage(other),
            })?;

        tracing::info!(
            scan_id = %scan.scan_id,
            user_id = %scan.user_id,
            category = %scan.category_name,
            points = scan.points_awarded,
            "Scan recorded"
        );

        match self.store.credit_scan(scan.user_id, scan.scan_id).await {
            Ok(profile) => Ok(ScanReceipt { scan, profile }),
            Err(source) => {
                tracing::error!(
                    scan_id = %scan.scan_id,
                    user_id = %scan.user_id,
                    error = %source,
                    "Scan recorded but profile totals were not updated, reconciliation required"
                );
                Err(LedgerError::PartialCommit {
                    scan: Box::new(scan),
                    source,
                })
            }
        }
    }

    pub async fn list_scans(
        &self,
        user: &AuthenticatedUser,
        page: PageRequest,
    ) -> Result<(Vec<WasteScan>, i64), StorageError> {
        self.store.list_scans_for_user(user.user_id(), page).await
    }

    /// Rebuild a user's totals from their scan rows. Safe to run while
    /// submissions for the same user are in flight: a scan counted here is
    /// marked credited and its pending increment becomes a no-op.
    pub async fn reconcile(&self, user_id: Uuid) -> Result<UserProfile, StorageError> {
        let profile = self.store.recompute_totals(user_id).await?;

        tracing::info!(
            user_id = %user_id,
            total_points = profile.total_points,
            total_co2_saved_kg = %profile.total_co2_saved_kg,
            "Profile totals reconciled"
        );

        Ok(profile)
    }
}
