use axum::{Router, routing::get};
use tower_http::cors::{Any, CorsLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub mod config;
pub mod error;
pub mod features;
pub mod middleware;
pub mod state;

use features::{categories, leaderboard, profiles, scans};
use middleware::auth::ApiKeys;
pub use state::AppState;

#[derive(OpenApi)]
#[openapi(
    paths(
        health,
        scans::handlers::predict,
        scans::handlers::capture_scan,
        scans::handlers::submit_scan,
        scans::handlers::list_scans,
        leaderboard::handlers::get_leaderboard,
        leaderboard::handlers::get_my_standing,
        leaderboard::handlers::get_user_standing,
        profiles::handlers::update_my_profile,
        profiles::handlers::reconcile_profile,
        categories::handlers::list_categories,
        categories::handlers::get_category,
        categories::handlers::upsert_category,
    ),
    components(
        schemas(
            storage::dto::category::UpsertCategoryRequest,
            storage::dto::scan::SubmitScanRequest,
            storage::dto::scan::Resolution,
            storage::dto::scan::WastePrediction,
            storage::dto::scan::ScanReceipt,
            storage::dto::scan::CapturedScan,
            storage::dto::scan::PendingScanResponse,
            storage::dto::leaderboard::LeaderboardResponse,
            storage::dto::leaderboard::UpdateProfileRequest,
            storage::dto::common::PageMeta,
            storage::models::WasteCategory,
            storage::models::CategoryDetails,
            storage::models::WasteScan,
            storage::models::UserProfile,
            storage::models::RankedProfile,
        )
    ),
    tags(
        (name = "scans", description = "Image classification and scan recording"),
        (name = "leaderboard", description = "Public rankings"),
        (name = "profiles", description = "User profile endpoints"),
        (name = "categories", description = "Waste category catalog"),
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                utoipa::openapi::security::SecurityScheme::Http(
                    utoipa::openapi::security::HttpBuilder::new()
                        .scheme(utoipa::openapi::security::HttpAuthScheme::Bearer)
                        .bearer_format("JWT or API Key")
                        .build(),
                ),
            )
        }
    }
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is up", body = String)
    ),
    tag = "scans"
)]
pub async fn health() -> &'static str {
    "OK"
}

/// Build the full application router
pub fn create_app(state: AppState, api_keys: ApiKeys) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any)
        .max_age(std::time::Duration::from_secs(3600));

    let api = Router::new()
        .nest("/predictions", scans::routes::prediction_routes())
        .nest("/scans", scans::routes::routes())
        .nest("/leaderboard", leaderboard::routes::routes())
        .nest("/profiles", profiles::routes::routes(api_keys.clone()))
        .nest("/categories", categories::routes::routes(api_keys));

    Router::new()
        .route("/health", get(health))
        .nest("/api", api)
        .with_state(state)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(cors)
}
