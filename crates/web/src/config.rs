use std::time::Duration;

use anyhow::{Context, Result};
use storage::services::resolver::UnknownCategoryPolicy;

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub api_keys: String,
    pub jwt_secret: String,
    pub classifier_url: String,
    pub classifier_timeout: Duration,
    pub unknown_category_policy: UnknownCategoryPolicy,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let classifier_timeout_secs = match std::env::var("CLASSIFIER_TIMEOUT_SECS") {
            Ok(value) => value
                .parse()
                .context("CLASSIFIER_TIMEOUT_SECS must be a number of seconds")?,
            Err(_) => ingest::classifier::DEFAULT_TIMEOUT.as_secs(),
        };

        let unknown_category_policy = match std::env::var("UNKNOWN_CATEGORY_POLICY") {
            Ok(value) => value.parse().map_err(anyhow::Error::msg)?,
            Err(_) => UnknownCategoryPolicy::default(),
        };

        Ok(Self {
            host: std::env::var("HOST").context("Cannot load HOST env variable")?,
            port: std::env::var("PORT")
                .context("PORT must be a number")?
                .parse()?,
            database_url: std::env::var("DATABASE_URL")
                .context("Cannot load DATABASE_URL env variable")?,
            api_keys: std::env::var("API_KEYS").unwrap_or_default(),
            jwt_secret: std::env::var("JWT_SECRET")
                .context("Cannot load JWT_SECRET env variable")?,
            classifier_url: std::env::var("CLASSIFIER_URL")
                .unwrap_or_else(|_| "http://127.0.0.1:8000".to_string()),
            classifier_timeout: Duration::from_secs(classifier_timeout_secs),
            unknown_category_policy,
        })
    }
}
