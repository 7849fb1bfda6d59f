use std::sync::Arc;

use anyhow::Context;
use ingest::ClassifierClient;
use storage::Database;
use web::{
    AppState, config::Config, create_app, middleware::auth::ApiKeys,
    middleware::session::JwtIdentityProvider,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .init();

    tracing::info!("Starting GreenCity API");

    let config = Config::from_env().context("Failed to load API configuration")?;
    tracing::info!(
        policy = %config.unknown_category_policy,
        "Configuration loaded successfully"
    );

    tracing::info!(
        "Connecting to database at: {}",
        config
            .database_url
            .split('@')
            .next_back()
            .unwrap_or("unknown")
    );
    let db = Database::new(&config.database_url)
        .await
        .context("Failed to initialize database")?;
    tracing::info!("Database connection established");

    tracing::info!("Running database migrations");
    db.run_migrations()
        .await
        .context("Failed to run migrations")?;
    tracing::info!("Database migrations completed successfully");

    let classifier = ClassifierClient::new(&config.classifier_url, config.classifier_timeout)
        .context("Failed to build classifier client")?;
    match classifier.health_check().await {
        Ok(true) => tracing::info!("Classifier reachable at {}", classifier.base_url()),
        _ => tracing::warn!(
            "Classifier at {} is not reachable yet; scans will fail until it is",
            classifier.base_url()
        ),
    }

    let api_keys = ApiKeys::from_comma_separated(&config.api_keys);
    if api_keys.is_empty() {
        tracing::warn!("No API_KEYS configured; operator endpoints will reject every request");
    }

    let state = AppState {
        store: Arc::new(db),
        classifier: Arc::new(classifier),
        identity: Arc::new(JwtIdentityProvider::new(&config.jwt_secret)),
        policy: config.unknown_category_policy,
    };

    let app = create_app(state, api_keys);

    let bind_address = format!("{}:{}", config.host, config.port);
    tracing::info!("Starting server at http://{}", bind_address);
    tracing::info!(
        "Swagger UI available at http://{}/swagger-ui/",
        bind_address
    );

    let listener = tokio::net::TcpListener::bind(&bind_address)
        .await
        .with_context(|| format!("Failed to bind {}", bind_address))?;
    axum::serve(listener, app).await?;

    Ok(())
}
