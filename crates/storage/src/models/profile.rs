use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

/// Per-user running totals, materialized from the user's scans.
///
/// Rank is not stored here; it is always derived from the live ordering of
/// totals (see `services::leaderboard`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct UserProfile {
    pub user_id: Uuid,
    pub username: Option<String>,
    pub total_points: i64,
    pub total_co2_saved_kg: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct RankedProfile {
    pub rank: i64,
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub profile: UserProfile,
}
