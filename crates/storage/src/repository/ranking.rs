use sqlx::PgPool;
use uuid::Uuid;

use crate::error::Result;
use crate::models::RankedProfile;

// Shared by every ranking query so that top-N positions and single-user ranks
// always agree.
const RANKED_PROFILES: &str = r#"
    SELECT
        ROW_NUMBER() OVER (
            ORDER BY total_points DESC, created_at ASC, user_id ASC
        ) AS rank,
        user_id, username, total_points, total_co2_saved_kg, created_at, updated_at
    FROM user_profiles
"#;

pub struct RankingRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> RankingRepository<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    pub async fn top(&self, limit: i64) -> Result<Vec<RankedProfile>> {
        let query = format!(
            "SELECT * FROM ({}) ranked ORDER BY rank LIMIT $1",
            RANKED_PROFILES
        );

        let entries = sqlx::query_as::<_, RankedProfile>(&query)
            .bind(limit)
            .fetch_all(self.pool)
            .await?;

        Ok(entries)
    }

    pub async fn rank_of(&self, user_id: Uuid) -> Result<Option<RankedProfile>> {
        let query = format!(
            "SELECT * FROM ({}) ranked WHERE user_id = $1",
            RANKED_PROFILES
        );

        let entry = sqlx::query_as::<_, RankedProfile>(&query)
            .bind(user_id)
            .fetch_optional(self.pool)
            .await?;

        Ok(entry)
    }
}
