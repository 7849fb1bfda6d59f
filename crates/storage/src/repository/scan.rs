use sqlx::PgPool;
use uuid::Uuid;

use crate::dto::common::PageRequest;
use crate::error::{Result, StorageError};
use crate::models::{NewWasteScan, WasteScan};

pub struct ScanRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ScanRepository<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Append a scan to the ledger. Rows are never updated afterwards.
    pub async fn insert(&self, scan: &NewWasteScan) -> Result<WasteScan> {
        let inserted = sqlx::query_as::<_, WasteScan>(
            r#"
            INSERT INTO waste_scans (
                user_id, category_id, category_name, confidence, points_awarded,
                co2_saved_kg, image_url, location, disposal_confirmed, idempotency_key
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING scan_id, user_id, category_id, category_name, confidence, points_awarded,
                      co2_saved_kg, image_url, location, disposal_confirmed, idempotency_key,
                      created_at
            "#,
        )
        .bind(scan.user_id)
        .bind(scan.category_id)
        .bind(&scan.category_name)
        .bind(scan.confidence)
        .bind(scan.points_awarded)
        .bind(scan.co2_saved_kg)
        .bind(&scan.image_url)
        .bind(&scan.location)
        .bind(scan.disposal_confirmed)
        .bind(&scan.idempotency_key)
        .fetch_one(self.pool)
        .await
        .map_err(|e| {
            let error = StorageError::from(e);
            if error.is_unique_violation() {
                StorageError::DuplicateKey(format!(
                    "Scan with idempotency key '{}' already recorded",
                    scan.idempotency_key.as_deref().unwrap_or_default()
                ))
            } else {
                error
            }
        })?;

        Ok(inserted)
    }

    pub async fn list_for_user(
        &self,
        user_id: Uuid,
        page: PageRequest,
    ) -> Result<(Vec<WasteScan>, i64)> {
        let total_items = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM waste_scans WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_one(self.pool)
        .await?;

        let scans = sqlx::query_as::<_, WasteScan>(
            r#"
            SELECT scan_id, user_id, category_id, category_name, confidence, points_awarded,
                   co2_saved_kg, image_url, location, disposal_confirmed, idempotency_key,
                   created_at
            FROM waste_scans
            WHERE user_id = $1
            ORDER BY created_at DESC, scan_id
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(user_id)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(self.pool)
        .await?;

        Ok((scans, total_items))
    }
}
