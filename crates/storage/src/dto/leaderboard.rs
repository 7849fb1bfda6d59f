use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::models::RankedProfile;

pub const DEFAULT_LEADERBOARD_SIZE: u32 = 10;
pub const MAX_LEADERBOARD_SIZE: u32 = 100;

#[derive(Debug, Clone, Copy, Deserialize, IntoParams)]
pub struct LeaderboardQuery {
    #[serde(default = "default_limit")]
    pub limit: u32,
}

fn default_limit() -> u32 {
    DEFAULT_LEADERBOARD_SIZE
}

impl LeaderboardQuery {
    pub fn validate(&self) -> Result<(), String> {
        if self.limit < 1 || self.limit > MAX_LEADERBOARD_SIZE {
            return Err(format!(
                "limit must be between 1 and {}",
                MAX_LEADERBOARD_SIZE
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LeaderboardResponse {
    pub entries: Vec<RankedProfile>,
}

/// Request payload for setting the caller's display name
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateProfileRequest {
    #[validate(length(
        min = 1,
        max = 100,
        message = "Username must be between 1 and 100 characters"
    ))]
    pub username: String,
}

