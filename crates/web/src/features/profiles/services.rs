use storage::{
    error::Result,
    models::UserProfile,
    services::{ledger::RewardLedger, session::AuthenticatedUser},
    store::LedgerStore,
};
use uuid::Uuid;

/// Set the caller's display name. Totals are left as they are.
pub async fn rename(
    store: &dyn LedgerStore,
    user: &AuthenticatedUser,
    username: &str,
) -> Result<UserProfile> {
    store.set_username(user.user_id(), username.trim()).await
}

/// Rebuild a user's totals from their scans
pub async fn reconcile(store: &dyn LedgerStore, user_id: Uuid) -> Result<UserProfile> {
    RewardLedger::new(store).reconcile(user_id).await
}
