use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::models::{CategoryDetails, UserProfile, WasteScan};

/// Request payload for recording a scan from an already classified label
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct SubmitScanRequest {
    #[validate(length(min = 1, max = 100, message = "Label is required"))]
    pub label: String,

    #[validate(range(min = 0.0, max = 1.0, message = "Confidence must be within [0, 1]"))]
    pub confidence: Option<f64>,

    #[validate(url)]
    #[validate(length(max = 500))]
    pub image_url: Option<String>,

    #[validate(length(max = 255))]
    pub location: Option<String>,

    #[validate(length(min = 1, max = 128))]
    pub idempotency_key: Option<String>,
}

/// Optional text fields sent alongside a captured image. Blank fields are
/// treated as absent.
#[derive(Debug, Clone, Default, Validate)]
pub struct CaptureScanFields {
    #[validate(url)]
    #[validate(length(max = 500))]
    pub image_url: Option<String>,

    #[validate(length(max = 255))]
    pub location: Option<String>,

    #[validate(length(min = 1, max = 128))]
    pub idempotency_key: Option<String>,
}

impl CaptureScanFields {
    /// Stores a multipart text field, trimming it and dropping it when blank.
    /// Returns `false` for field names this struct does not carry.
    pub fn set(&mut self, name: &str, value: &str) -> bool {
        let value = Some(value.trim())
            .filter(|v| !v.is_empty())
            .map(str::to_string);
        match name {
            "image_url" => self.image_url = value,
            "location" => self.location = value,
            "idempotency_key" => self.idempotency_key = value,
            _ => return false,
        }
        true
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Resolution {
    Found,
    Defaulted,
}

/// Result of classifying an image, before anything is recorded
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct WastePrediction {
    pub category: String,
    pub confidence: f64,
    pub category_details: CategoryDetails,
    pub resolution: Resolution,
}

/// A committed scan together with the owner's updated totals
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ScanReceipt {
    pub scan: WasteScan,
    pub profile: UserProfile,
}

/// Body returned when the scan was stored but the totals could not be updated
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PendingScanResponse {
    pub status: String,
    pub message: String,
    pub scan: WasteScan,
}

/// Response to a capture: what the image was classified as, and what was recorded
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CapturedScan {
    pub prediction: WastePrediction,
    pub receipt: ScanReceipt,
}
