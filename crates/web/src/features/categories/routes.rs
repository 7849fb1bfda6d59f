use axum::{
    Router, middleware,
    routing::{get, post},
};

use super::handlers::{get_category, list_categories, upsert_category};
use crate::middleware::auth::{ApiKeys, require_auth};
use crate::state::AppState;

pub fn routes(api_keys: ApiKeys) -> Router<AppState> {
    let protected = Router::new()
        .route("/", post(upsert_category))
        .route_layer(middleware::from_fn_with_state(api_keys, require_auth));

    Router::new()
        .route("/", get(list_categories))
        .route("/:name", get(get_category))
        .merge(protected)
}
