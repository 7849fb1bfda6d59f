use axum::{Router, routing::get};

use super::handlers::{get_leaderboard, get_my_standing, get_user_standing};
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(get_leaderboard))
        .route("/me", get(get_my_standing))
        .route("/users/:user_id", get(get_user_standing))
}
