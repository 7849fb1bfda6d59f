//! Storage boundary used by the scan pipeline.
//!
//! Any backend offering these primitives can host the ledger. The two
//! implementations in this crate are [`crate::Database`] (PostgreSQL) and
//! [`crate::memory::InMemoryStore`].

use uuid::Uuid;

use crate::dto::category::UpsertCategoryRequest;
use crate::dto::common::PageRequest;
use crate::error::Result;
use crate::models::{NewWasteScan, RankedProfile, UserProfile, WasteCategory, WasteScan};

#[async_trait::async_trait]
pub trait CategoryStore: Send + Sync {
    /// Exact, case-sensitive lookup by category name.
    async fn find_category_by_name(&self, name: &str) -> Result<Option<WasteCategory>>;

    async fn list_categories(&self) -> Result<Vec<WasteCategory>>;

    /// Inserts a category, or replaces the metadata of the one with the same name.
    async fn upsert_category(&self, request: &UpsertCategoryRequest) -> Result<WasteCategory>;
}

#[async_trait::async_trait]
pub trait ScanStore: Send + Sync {
    /// Appends an uncredited scan row. A repeated `(user_id, idempotency_key)`
    /// pair fails with `StorageError::DuplicateKey`.
    async fn insert_scan(&self, scan: &NewWasteScan) -> Result<WasteScan>;

    /// Scans of one user, newest first, plus the total number of rows.
    async fn list_scans_for_user(
        &self,
        user_id: Uuid,
        page: PageRequest,
    ) -> Result<(Vec<WasteScan>, i64)>;
}

#[async_trait::async_trait]
pub trait ProfileStore: Send + Sync {
    /// Marks the scan as credited and adds its points and CO2 to the owner's
    /// totals in one atomic operation, creating the profile if needed. A scan
    /// that is already credited leaves the totals unchanged. Fails with
    /// `StorageError::NotFound` when the user has no such scan.
    async fn credit_scan(&self, user_id: Uuid, scan_id: Uuid) -> Result<UserProfile>;

    async fn find_profile(&self, user_id: Uuid) -> Result<Option<UserProfile>>;

    /// Sets the display name without touching the totals.
    async fn set_username(&self, user_id: Uuid, username: &str) -> Result<UserProfile>;

    /// Profiles ordered by points desc, created_at asc, user_id asc.
    async fn top_profiles(&self, limit: i64) -> Result<Vec<RankedProfile>>;

    /// Position of the user under the leaderboard ordering, `None` without a profile.
    async fn rank_of(&self, user_id: Uuid) -> Result<Option<RankedProfile>>;

    /// Overwrites the totals with the sums over the user's scans and marks every
    /// scan as credited, in one atomic operation. Serialized with
    /// [`ProfileStore::credit_scan`] for the same user. Fails with
    /// `StorageError::NotFound` when the user has neither a profile nor scans.
    async fn recompute_totals(&self, user_id: Uuid) -> Result<UserProfile>;
}

/// Everything the HTTP layer needs from a single backend.
pub trait LedgerStore: CategoryStore + ScanStore + ProfileStore {}

impl<T> LedgerStore for T where T: CategoryStore + ScanStore + ProfileStore {}
