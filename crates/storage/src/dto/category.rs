use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

/// Request payload for creating or replacing a waste category
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpsertCategoryRequest {
    #[validate(length(
        min = 1,
        max = 100,
        message = "Name must be between 1 and 100 characters"
    ))]
    pub name: String,

    pub description: Option<String>,

    #[validate(length(min = 1, message = "Disposal instructions are required"))]
    pub disposal_instructions: String,

    #[validate(length(min = 1, message = "Environmental impact is required"))]
    pub environmental_impact: String,

    #[validate(range(min = 0, message = "Points value cannot be negative"))]
    pub points_value: i32,

    #[validate(custom(function = "validate_non_negative"))]
    pub co2_impact_kg: Decimal,

    #[validate(length(min = 1, max = 50))]
    pub icon_name: String,

    #[validate(custom(function = "validate_hex_color"))]
    pub color: String,
}

fn validate_non_negative(value: &Decimal) -> Result<(), validator::ValidationError> {
    if value.is_sign_negative() && !value.is_zero() {
        Err(validator::ValidationError::new("negative_amount"))
    } else {
        Ok(())
    }
}

/// Accepts `#rgb` and `#rrggbb` colors.
pub fn validate_hex_color(color: &str) -> Result<(), validator::ValidationError> {
    let digits = color.strip_prefix('#').unwrap_or("");
    let valid_len = digits.len() == 3 || digits.len() == 6;

    if valid_len && digits.chars().all(|c| c.is_ascii_hexdigit()) {
        Ok(())
    } else {
        Err(validator::ValidationError::new("invalid_color"))
    }
}
