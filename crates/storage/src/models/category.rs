use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

/// Reference data describing how one class of waste is disposed of and what it earns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct WasteCategory {
    pub category_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub disposal_instructions: String,
    pub environmental_impact: String,
    pub points_value: i32,
    pub co2_impact_kg: Decimal,
    pub icon_name: String,
    pub color: String,
    pub created_at: DateTime<Utc>,
}

/// Disposal metadata attached to a prediction or a scan submission.
///
/// Either a copy of a stored [`WasteCategory`] or the fallback record, in which
/// case `category_id` is `None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CategoryDetails {
    pub category_id: Option<Uuid>,
    pub name: String,
    pub description: Option<String>,
    pub disposal_instructions: String,
    pub environmental_impact: String,
    pub points_value: i32,
    pub co2_impact_kg: Decimal,
    pub icon_name: String,
    pub color: String,
}

impl From<WasteCategory> for CategoryDetails {
    fn from(category: WasteCategory) -> Self {
        Self {
            category_id: Some(category.category_id),
            name: category.name,
            description: category.description,
            disposal_instructions: category.disposal_instructions,
            environmental_impact: category.environmental_impact,
            points_value: category.points_value,
            co2_impact_kg: category.co2_impact_kg,
            icon_name: category.icon_name,
            color: category.color,
        }
    }
}
