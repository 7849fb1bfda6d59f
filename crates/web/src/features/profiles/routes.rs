use axum::{
    Router, middleware,
    routing::{post, put},
};

use super::handlers::{reconcile_profile, update_my_profile};
use crate::middleware::auth::{ApiKeys, require_auth};
use crate::state::AppState;

pub fn routes(api_keys: ApiKeys) -> Router<AppState> {
    let protected = Router::new()
        .route("/:user_id/reconcile", post(reconcile_profile))
        .route_layer(middleware::from_fn_with_state(api_keys, require_auth));

    Router::new()
        .route("/me", put(update_my_profile))
        .merge(protected)
}
