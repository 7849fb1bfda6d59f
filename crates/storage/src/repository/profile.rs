use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::error::{Result, StorageError};
use crate::models::UserProfile;

pub struct ProfileRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProfileRepository<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_user(&self, user_id: Uuid) -> Result<Option<UserProfile>> {
        let profile = sqlx::query_as::<_, UserProfile>(
            r#"
            SELECT user_id, username, total_points, total_co2_saved_kg, created_at, updated_at
            FROM user_profiles
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(self.pool)
        .await?;

        Ok(profile)
    }

    /// Credit one scan to its owner. The `credited` flag flips at most once,
    /// so a scan is added to the totals at most once.
    pub async fn credit_scan(&self, user_id: Uuid, scan_id: Uuid) -> Result<UserProfile> {
        let mut tx = self.pool.begin().await?;
        lock_user(&mut *tx, user_id).await?;

        let credited = sqlx::query_as::<_, UserProfile>(
            r#"
            WITH credited AS (
                UPDATE waste_scans
                SET credited = TRUE
                WHERE scan_id = $1 AND user_id = $2 AND NOT credited
                RETURNING user_id, points_awarded, co2_saved_kg
            )
            INSERT INTO user_profiles (user_id, total_points, total_co2_saved_kg)
            SELECT user_id, points_awarded, co2_saved_kg FROM credited
            ON CONFLICT (user_id)
            DO UPDATE SET
                total_points = user_profiles.total_points + EXCLUDED.total_points,
                total_co2_saved_kg = user_profiles.total_co2_saved_kg + EXCLUDED.total_co2_saved_kg,
                updated_at = NOW()
            RETURNING user_id, username, total_points, total_co2_saved_kg, created_at, updated_at
            "#,
        )
        .bind(scan_id)
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await?;

        let profile = match credited {
            Some(profile) => profile,
            None => {
                let exists = sqlx::query_scalar::<_, bool>(
                    "SELECT EXISTS (SELECT 1 FROM waste_scans WHERE scan_id = $1 AND user_id = $2)",
                )
                .bind(scan_id)
                .bind(user_id)
                .fetch_one(&mut *tx)
                .await?;
                if !exists {
                    return Err(StorageError::NotFound);
                }

                sqlx::query_as::<_, UserProfile>(
                    r#"
                    SELECT user_id, username, total_points, total_co2_saved_kg, created_at, updated_at
                    FROM user_profiles
                    WHERE user_id = $1
                    "#,
                )
                .bind(user_id)
                .fetch_optional(&mut *tx)
                .await?
                .ok_or(StorageError::NotFound)?
            }
        };

        tx.commit().await?;
        Ok(profile)
    }

    pub async fn set_username(&self, user_id: Uuid, username: &str) -> Result<UserProfile> {
        let profile = sqlx::query_as::<_, UserProfile>(
            r#"
            INSERT INTO user_profiles (user_id, username)
            VALUES ($1, $2)
            ON CONFLICT (user_id)
            DO UPDATE SET
                username = EXCLUDED.username,
                updated_at = NOW()
            RETURNING user_id, username, total_points, total_co2_saved_kg, created_at, updated_at
            "#,
        )
        .bind(user_id)
        .bind(username)
        .fetch_one(self.pool)
        .await?;

        Ok(profile)
    }

    /// Rebuild the totals from the scan rows and mark them all credited
    pub async fn recompute_totals(&self, user_id: Uuid) -> Result<UserProfile> {
        let mut tx = self.pool.begin().await?;
        lock_user(&mut *tx, user_id).await?;

        let profile = sqlx::query_as::<_, UserProfile>(
            r#"
            WITH marked AS (
                UPDATE waste_scans
                SET credited = TRUE
                WHERE user_id = $1 AND NOT credited
                RETURNING scan_id
            ),
            sums AS (
                SELECT
                    COALESCE(SUM(points_awarded), 0)::BIGINT AS total_points,
                    COALESCE(SUM(co2_saved_kg), 0) AS total_co2_saved_kg,
                    COUNT(*) AS scan_count
                FROM waste_scans
                WHERE user_id = $1
            )
            INSERT INTO user_profiles (user_id, total_points, total_co2_saved_kg)
            SELECT $1, sums.total_points, sums.total_co2_saved_kg
            FROM sums
            WHERE sums.scan_count > 0
               OR EXISTS (SELECT 1 FROM user_profiles WHERE user_id = $1)
            ON CONFLICT (user_id)
            DO UPDATE SET
                total_points = EXCLUDED.total_points,
                total_co2_saved_kg = EXCLUDED.total_co2_saved_kg,
                updated_at = NOW()
            RETURNING user_id, username, total_points, total_co2_saved_kg, created_at, updated_at
            "#,
        )
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(StorageError::NotFound)?;

        tx.commit().await?;
        Ok(profile)
    }
}

/// Per-user transaction lock shared by crediting and reconciliation
async fn lock_user(conn: &mut PgConnection, user_id: Uuid) -> Result<()> {
    sqlx::query("SELECT pg_advisory_xact_lock(hashtext($1::text))")
        .bind(user_id)
        .execute(conn)
        .await?;
    Ok(())
}
