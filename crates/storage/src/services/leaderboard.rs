use uuid::Uuid;

use crate::dto::leaderboard::MAX_LEADERBOARD_SIZE;
use crate::error::{Result, StorageError};
use crate::models::RankedProfile;
use crate::store::ProfileStore;

/// Rankings over user totals.
///
/// Order is `total_points` descending, then profile `created_at` ascending,
/// then `user_id`. The same ordering defines [`LeaderboardService::rank_of`],
/// so a user's rank always equals their position in [`LeaderboardService::top_n`].
pub struct LeaderboardService<'a, S: ?Sized> {
    store: &'a S,
}

impl<'a, S: ProfileStore + ?Sized> LeaderboardService<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    pub async fn top_n(&self, n: u32) -> Result<Vec<RankedProfile>> {
        let limit = n.min(MAX_LEADERBOARD_SIZE);
        if limit == 0 {
            return Ok(Vec::new());
        }
        self.store.top_profiles(i64::from(limit)).await
    }

    /// 1-based rank, or `StorageError::NotFound` when the user has no profile
    pub async fn rank_of(&self, user_id: Uuid) -> Result<i64> {
        Ok(self.standing(user_id).await?.rank)
    }

    pub async fn standing(&self, user_id: Uuid) -> Result<RankedProfile> {
        self.store
            .rank_of(user_id)
            .await?
            .ok_or(StorageError::NotFound)
    }
}
