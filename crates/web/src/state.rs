use std::sync::Arc;

use ingest::Classifier;
use storage::services::resolver::UnknownCategoryPolicy;
use storage::services::session::IdentityProvider;
use storage::store::LedgerStore;

/// Shared handles for every request
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn LedgerStore>,
    pub classifier: Arc<dyn Classifier>,
    pub identity: Arc<dyn IdentityProvider>,
    pub policy: UnknownCategoryPolicy,
}
