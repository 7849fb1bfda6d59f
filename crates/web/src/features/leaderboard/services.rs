use storage::{
    error::Result, models::RankedProfile, services::leaderboard::LeaderboardService,
    store::LedgerStore,
};
use uuid::Uuid;

/// Top `limit` users by points
pub async fn top(store: &dyn LedgerStore, limit: u32) -> Result<Vec<RankedProfile>> {
    LeaderboardService::new(store).top_n(limit).await
}

/// A user's profile together with their current rank
pub async fn standing(store: &dyn LedgerStore, user_id: Uuid) -> Result<RankedProfile> {
    LeaderboardService::new(store).standing(user_id).await
}
