#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, Ordering};

use rust_decimal::Decimal;
use storage::dto::category::UpsertCategoryRequest;
use storage::dto::common::PageRequest;
use storage::error::{Result, StorageError};
use storage::memory::InMemoryStore;
use storage::models::{CategoryDetails, NewWasteScan, RankedProfile, UserProfile, WasteScan};
use storage::services::ledger::RewardLedger;
use storage::store::{CategoryStore, ProfileStore, ScanStore};
use uuid::Uuid;

pub fn category(name: &str, points: i32, co2_tenths: i64) -> UpsertCategoryRequest {
    UpsertCategoryRequest {
        name: name.to_string(),
        description: None,
        disposal_instructions: format!("Put {} in the right bin", name),
        environmental_impact: "Medium".to_string(),
        points_value: points,
        co2_impact_kg: Decimal::new(co2_tenths, 1),
        icon_name: "recycle".to_string(),
        color: "#34D399".to_string(),
    }
}

pub async fn seeded_store() -> InMemoryStore {
    let store = InMemoryStore::new();
    store.upsert_category(&category("plastic", 50, 12)).await.unwrap();
    store.upsert_category(&category("glass", 30, 8)).await.unwrap();
    store.upsert_category(&category("trash", 0, 0)).await.unwrap();
    store
}

pub async fn details(store: &InMemoryStore, name: &str) -> CategoryDetails {
    store
        .find_category_by_name(name)
        .await
        .unwrap()
        .expect("category seeded")
        .into()
}

/// Inserts an uncategorised scan and credits it, returning the scan.
pub async fn credit(store: &InMemoryStore, user_id: Uuid, points: i32) -> WasteScan {
    let scan = store
        .insert_scan(&NewWasteScan {
            user_id,
            category_id: None,
            category_name: "trash".to_string(),
            confidence: 0.9,
            points_awarded: points,
            co2_saved_kg: Decimal::ONE,
            image_url: None,
            location: None,
            disposal_confirmed: true,
            idempotency_key: None,
        })
        .await
        .unwrap();
    store.credit_scan(user_id, scan.scan_id).await.unwrap();
    scan
}

/// Wraps the in-memory store and fails selected operations on demand.
#[derive(Default)]
pub struct FaultyStore {
    pub inner: InMemoryStore,
    pub fail_insert: AtomicBool,
    pub fail_increment: AtomicBool,
}

impl FaultyStore {
    pub fn new(inner: InMemoryStore) -> Self {
        Self {
            inner,
            ..Default::default()
        }
    }

    pub fn fail_inserts(&self, fail: bool) {
        self.fail_insert.store(fail, Ordering::SeqCst);
    }

    pub fn fail_increments(&self, fail: bool) {
        self.fail_increment.store(fail, Ordering::SeqCst);
    }
}

#[async_trait::async_trait]
impl ScanStore for FaultyStore {
    async fn insert_scan(&self, scan: &NewWasteScan) -> Result<WasteScan> {
        if self.fail_insert.load(Ordering::SeqCst) {
            return Err(StorageError::Unavailable("insert rejected".to_string()));
        }
        self.inner.insert_scan(scan).await
    }

    async fn list_scans_for_user(
        &self,
        user_id: Uuid,
        page: PageRequest,
    ) -> Result<(Vec<WasteScan>, i64)> {
        self.inner.list_scans_for_user(user_id, page).await
    }
}

#[async_trait::async_trait]
impl ProfileStore for FaultyStore {
    async fn credit_scan(&self, user_id: Uuid, scan_id: Uuid) -> Result<UserProfile> {
        if self.fail_increment.load(Ordering::SeqCst) {
            return Err(StorageError::Unavailable("increment timed out".to_string()));
        }
        self.inner.credit_scan(user_id, scan_id).await
    }

    async fn find_profile(&self, user_id: Uuid) -> Result<Option<UserProfile>> {
        self.inner.find_profile(user_id).await
    }

    async fn set_username(&self, user_id: Uuid, username: &str) -> Result<UserProfile> {
        self.inner.set_username(user_id, username).await
    }

    async fn top_profiles(&self, limit: i64) -> Result<Vec<RankedProfile>> {
        self.inner.top_profiles(limit).await
    }

    async fn rank_of(&self, user_id: Uuid) -> Result<Option<RankedProfile>> {
        self.inner.rank_of(user_id).await
    }

    async fn recompute_totals(&self, user_id: Uuid) -> Result<UserProfile> {
        self.inner.recompute_totals(user_id).await
    }
}

/// Runs a full reconcile for the user right before each credit is applied,
/// the way an operator could while a submission is in flight.
pub struct ReconcilingStore {
    pub inner: InMemoryStore,
}

#[async_trait::async_trait]
impl ScanStore for ReconcilingStore {
    async fn insert_scan(&self, scan: &NewWasteScan) -> Result<WasteScan> {
        self.inner.insert_scan(scan).await
    }

    async fn list_scans_for_user(
        &self,
        user_id: Uuid,
        page: PageRequest,
    ) -> Result<(Vec<WasteScan>, i64)> {
        self.inner.list_scans_for_user(user_id, page).await
    }
}

#[async_trait::async_trait]
impl ProfileStore for ReconcilingStore {
    async fn credit_scan(&self, user_id: Uuid, scan_id: Uuid) -> Result<UserProfile> {
        RewardLedger::new(&self.inner).reconcile(user_id).await?;
        self.inner.credit_scan(user_id, scan_id).await
    }

    async fn find_profile(&self, user_id: Uuid) -> Result<Option<UserProfile>> {
        self.inner.find_profile(user_id).await
    }

    async fn set_username(&self, user_id: Uuid, username: &str) -> Result<UserProfile> {
        self.inner.set_username(user_id, username).await
    }

    async fn top_profiles(&self, limit: i64) -> Result<Vec<RankedProfile>> {
        self.inner.top_profiles(limit).await
    }

    async fn rank_of(&self, user_id: Uuid) -> Result<Option<RankedProfile>> {
        self.inner.rank_of(user_id).await
    }

    async fn recompute_totals(&self, user_id: Uuid) -> Result<UserProfile> {
        self.inner.recompute_totals(user_id).await
    }
}
