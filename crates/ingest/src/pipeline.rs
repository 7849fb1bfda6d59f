//! End-to-end scan flow: classify, resolve, record.

use storage::dto::scan::{CapturedScan, ScanReceipt, WastePrediction};
use storage::error::StorageError;
use storage::models::WasteScan;
use storage::services::ledger::{LedgerError, RewardLedger, ScanSubmission};
use storage::services::resolver::{CategoryResolver, ResolveError, UnknownCategoryPolicy};
use storage::services::session::AuthenticatedUser;
use storage::store::{CategoryStore, ProfileStore, ScanStore};
use thiserror::Error;

use crate::classifier::{Classifier, ClassifierError, ImagePayload};

/// The classification service does not report a usable certainty yet, so
/// every prediction carries this value.
pub const PLACEHOLDER_CONFIDENCE: f64 = 0.9;

#[derive(Debug, Error)]
pub enum ScanError {
    #[error("Classification failed: {0}")]
    ClassificationFailed(#[from] ClassifierError),

    #[error("Unknown waste category: '{0}'")]
    UnknownCategory(String),

    #[error("Scan submitted without an authenticated user")]
    Unauthenticated,

    #[error("Invalid scan: {0}")]
    Invalid(String),

    #[error("Duplicate scan: {0}")]
    DuplicateScan(String),

    #[error("Scan recorded but points are pending: {source}")]
    PartialCommit {
        scan: Box<WasteScan>,
        source: StorageError,
    },

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

impl From<ResolveError> for ScanError {
    fn from(error: ResolveError) -> Self {
        match error {
            ResolveError::UnknownCategory(label) => Self::UnknownCategory(label),
            ResolveError::Storage(e) => Self::Storage(e),
        }
    }
}

impl From<LedgerError> for ScanError {
    fn from(error: LedgerError) -> Self {
        match error {
            LedgerError::Unauthenticated => Self::Unauthenticated,
            LedgerError::InvalidSubmission(msg) => Self::Invalid(msg),
            LedgerError::DuplicateScan(msg) => Self::DuplicateScan(msg),
            LedgerError::Storage(e) => Self::Storage(e),
            LedgerError::PartialCommit { scan, source } => Self::PartialCommit { scan, source },
        }
    }
}

/// Optional data attached to a scan by the caller
#[derive(Debug, Clone, Default)]
pub struct ScanContext {
    pub confidence: Option<f64>,
    pub image_url: Option<String>,
    pub location: Option<String>,
    pub idempotency_key: Option<String>,
}

pub struct ScanPipeline<'a, S: ?Sized, C: ?Sized> {
    store: &'a S,
    classifier: &'a C,
    policy: UnknownCategoryPolicy,
}

impl<'a, S, C> ScanPipeline<'a, S, C>
where
    S: CategoryStore + ScanStore + ProfileStore + ?Sized,
    C: Classifier + ?Sized,
{
    pub fn new(store: &'a S, classifier: &'a C, policy: UnknownCategoryPolicy) -> Self {
        Self {
            store,
            classifier,
            policy,
        }
    }

    /// Classify and resolve an image without recording anything
    pub async fn predict(&self, image: &ImagePayload) -> Result<WastePrediction, ScanError> {
        let label = self.classifier.classify(image).await?;
        self.resolve_prediction(label).await
    }

    /// Full flow for an authenticated user. The user is checked before the
    /// classifier is called, and a classification or resolution failure
    /// leaves the ledger untouched.
    pub async fn capture(
        &self,
        user: Option<&AuthenticatedUser>,
        image: &ImagePayload,
        context: ScanContext,
    ) -> Result<CapturedScan, ScanError> {
        let user = user.ok_or(ScanError::Unauthenticated)?;

        let prediction = self.predict(image).await?;
        let receipt = self
            .submit(
                user,
                ScanSubmission {
                    details: prediction.category_details.clone(),
                    confidence: prediction.confidence,
                    image_url: context.image_url,
                    location: context.location,
                    idempotency_key: context.idempotency_key,
                },
            )
            .await?;

        Ok(CapturedScan {
            prediction,
            receipt,
        })
    }

    /// Record a scan for a label that was classified earlier
    pub async fn record_label(
        &self,
        user: Option<&AuthenticatedUser>,
        label: &str,
        context: ScanContext,
    ) -> Result<ScanReceipt, ScanError> {
        let user = user.ok_or(ScanError::Unauthenticated)?;

        let resolver = CategoryResolver::new(self.store, self.policy);
        let (details, _) = resolver.resolve(label).await?;

        self.submit(
            user,
            ScanSubmission {
                details,
                confidence: context.confidence.unwrap_or(PLACEHOLDER_CONFIDENCE),
                image_url: context.image_url,
                location: context.location,
                idempotency_key: context.idempotency_key,
            },
        )
        .await
    }

    async fn resolve_prediction(&self, label: String) -> Result<WastePrediction, ScanError> {
        let resolver = CategoryResolver::new(self.store, self.policy);
        let (category_details, resolution) = resolver.resolve(&label).await?;

        Ok(WastePrediction {
            category: label,
            confidence: PLACEHOLDER_CONFIDENCE,
            category_details,
            resolution,
        })
    }

    async fn submit(
        &self,
        user: &AuthenticatedUser,
        submission: ScanSubmission,
    ) -> Result<ScanReceipt, ScanError> {
        let ledger = RewardLedger::new(self.store);
        Ok(ledger.submit_scan(Some(user), submission).await?)
    }
}
