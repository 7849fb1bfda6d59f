use clap::{Parser, Subcommand};
use ingest::{
    Classifier, ClassifierClient, ImagePayload, IngestError, Result,
    catalog::{CatalogImporter, CatalogValidator, CategoryCatalog},
};
use sqlx::postgres::PgPoolOptions;
use std::path::{Path, PathBuf};
use storage::Database;
use storage::services::ledger::RewardLedger;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

#[derive(Parser)]
#[command(name = "greencity-ingest")]
#[command(about = "GreenCity waste category and scan ledger tooling", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(long, env = "DATABASE_URL")]
    database_url: Option<String>,

    #[arg(long, env = "CLASSIFIER_URL", default_value = "http://127.0.0.1:8000")]
    classifier_url: String,

    #[arg(long, env = "CLASSIFIER_TIMEOUT_SECS", default_value_t = 10)]
    classifier_timeout_secs: u64,

    #[arg(short, long)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Load a category catalog into the database
    Seed {
        #[arg(long, default_value = "./data/categories.json")]
        file: PathBuf,

        #[arg(long)]
        validate_only: bool,
    },
    /// Send an image to the classifier and print the label
    Classify {
        #[arg(long)]
        image: PathBuf,
    },
    /// Rebuild a user's totals from their recorded scans
    Reconcile {
        #[arg(long)]
        user: Uuid,
    },
}

#[tokio::main]
async fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!(
                    "greencity_ingest={},ingest={},storage={}",
                    log_level, log_level, log_level
                )
                .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    match cli.command {
        Commands::Seed {
            ref file,
            validate_only,
        } => {
            handle_seed(file, validate_only, cli.database_url.as_deref()).await?;
        }
        Commands::Classify { ref image } => {
            let timeout = std::time::Duration::from_secs(cli.classifier_timeout_secs);
            handle_classify(image, &cli.classifier_url, timeout).await?;
        }
        Commands::Reconcile { user } => {
            handle_reconcile(user, cli.database_url.as_deref()).await?;
        }
    }

    Ok(())
}

async fn connect(database_url: Option<&str>) -> Result<Database> {
    let database_url = database_url.ok_or_else(|| {
        IngestError::Configuration("DATABASE_URL must be set for this command".to_string())
    })?;

    tracing::info!("Connecting to database...");
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(database_url)
        .await?;

    let database = Database::from_pool(pool);
    database.run_migrations().await?;
    Ok(database)
}

async fn handle_seed(
    file: &Path,
    validate_only: bool,
    database_url: Option<&str>,
) -> Result<()> {
    tracing::info!("Loading category catalog from: {}", file.display());

    let json_content = tokio::fs::read_to_string(file).await?;
    let catalog: CategoryCatalog = serde_json::from_str(&json_content)?;

    tracing::info!(
        "Loaded {} categories (v{})",
        catalog.categories.len(),
        catalog.format_version
    );

    let validation_report = CatalogValidator::validate(&catalog)?;
    validation_report.log_warnings();
    tracing::info!("✓ Validation successful!");

    if validate_only {
        return Ok(());
    }

    let database = connect(database_url).await?;
    let imported = CatalogImporter::new(&database).import(&catalog).await?;

    tracing::info!("✓ Seeded {} categories", imported.len());

    Ok(())
}

async fn handle_classify(
    image: &Path,
    classifier_url: &str,
    timeout: std::time::Duration,
) -> Result<()> {
    let payload = ImagePayload::from_path(image).await?;
    let client = ClassifierClient::new(classifier_url, timeout)?;

    if !client.health_check().await.unwrap_or(false) {
        tracing::warn!("Classifier at {} did not answer its health check", client.base_url());
    }

    let label = client.classify(&payload).await?;
    println!("{}", label);

    Ok(())
}

async fn handle_reconcile(
    user: Uuid,
    database_url: Option<&str>,
) -> Result<()> {
    let database = connect(database_url).await?;
    let profile = RewardLedger::new(&database).reconcile(user).await?;

    tracing::info!(
        "✓ {} now has {} points and {} kg CO2 saved",
        profile.user_id,
        profile.total_points,
        profile.total_co2_saved_kg
    );

    Ok(())
}
