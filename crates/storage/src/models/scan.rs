use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

/// One recorded classification-and-disposal event. Rows are append-only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct WasteScan {
    pub scan_id: Uuid,
    pub user_id: Uuid,
    pub category_id: Option<Uuid>,
    pub category_name: String,
    pub confidence: f64,
    pub points_awarded: i32,
    pub co2_saved_kg: Decimal,
    pub image_url: Option<String>,
    pub location: Option<String>,
    pub disposal_confirmed: bool,
    pub idempotency_key: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Row to be inserted into the scan ledger
#[derive(Debug, Clone, PartialEq)]
pub struct NewWasteScan {
    pub user_id: Uuid,
    pub category_id: Option<Uuid>,
    pub category_name: String,
    pub confidence: f64,
    pub points_awarded: i32,
    pub co2_saved_kg: Decimal,
    pub image_url: Option<String>,
    pub location: Option<String>,
    pub disposal_confirmed: bool,
    pub idempotency_key: Option<String>,
}
