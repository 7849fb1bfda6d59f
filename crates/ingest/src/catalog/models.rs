use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use storage::dto::category::UpsertCategoryRequest;

pub const CATALOG_FORMAT_VERSION: &str = "1.0.0";

/// Labels emitted by the deployed classification model
pub const CLASSIFIER_LABELS: &[&str] = &["cardboard", "glass", "metal", "paper", "plastic", "trash"];

/// Versioned file describing the waste categories to seed
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryCatalog {
    pub format_version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generated_at: Option<DateTime<Utc>>,
    pub categories: Vec<UpsertCategoryRequest>,
}
