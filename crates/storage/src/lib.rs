pub mod dto;
pub mod error;
pub mod memory;
pub mod models;
pub mod repository;
pub mod services;
pub mod store;

use sqlx::{PgPool, postgres::PgPoolOptions};
use uuid::Uuid;

use crate::dto::category::UpsertCategoryRequest;
use crate::dto::common::PageRequest;
use crate::error::Result;
use crate::models::{NewWasteScan, RankedProfile, UserProfile, WasteCategory, WasteScan};
use crate::repository::{
    category::CategoryRepository, profile::ProfileRepository, ranking::RankingRepository,
    scan::ScanRepository,
};
use crate::store::{CategoryStore, ProfileStore, ScanStore};

/// PostgreSQL-backed store
#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    pub async fn new(database_url: &str) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(database_url)
            .await?;

        Ok(Self { pool })
    }

    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl CategoryStore for Database {
    async fn find_category_by_name(&self, name: &str) -> Result<Option<WasteCategory>> {
        CategoryRepository::new(&self.pool).find_by_name(name).await
    }

    async fn list_categories(&self) -> Result<Vec<WasteCategory>> {
        CategoryRepository::new(&self.pool).list().await
    }

    async fn upsert_category(&self, request: &UpsertCategoryRequest) -> Result<WasteCategory> {
        CategoryRepository::new(&self.pool).upsert(request).await
    }
}

#[async_trait::async_trait]
impl ScanStore for Database {
    async fn insert_scan(&self, scan: &NewWasteScan) -> Result<WasteScan> {
        ScanRepository::new(&self.pool).insert(scan).await
    }

    async fn list_scans_for_user(
        &self,
        user_id: Uuid,
        page: PageRequest,
    ) -> Result<(Vec<WasteScan>, i64)> {
        ScanRepository::new(&self.pool)
            .list_for_user(user_id, page)
            .await
    }
}

#[async_trait::async_trait]
impl ProfileStore for Database {
    async fn credit_scan(&self, user_id: Uuid, scan_id: Uuid) -> Result<UserProfile> {
        ProfileRepository::new(&self.pool)
            .credit_scan(user_id, scan_id)
            .await
    }

    async fn find_profile(&self, user_id: Uuid) -> Result<Option<UserProfile>> {
        ProfileRepository::new(&self.pool).find_by_user(user_id).await
    }

    async fn set_username(&self, user_id: Uuid, username: &str) -> Result<UserProfile> {
        ProfileRepository::new(&self.pool)
            .set_username(user_id, username)
            .await
    }

    async fn top_profiles(&self, limit: i64) -> Result<Vec<RankedProfile>> {
        RankingRepository::new(&self.pool).top(limit).await
    }

    async fn rank_of(&self, user_id: Uuid) -> Result<Option<RankedProfile>> {
        RankingRepository::new(&self.pool).rank_of(user_id).await
    }

    async fn recompute_totals(&self, user_id: Uuid) -> Result<UserProfile> {
        ProfileRepository::new(&self.pool)
            .recompute_totals(user_id)
            .await
    }
}
