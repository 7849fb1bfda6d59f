use std::path::Path;
use std::time::Duration;

use reqwest::{Client, multipart};
use serde::Deserialize;
use thiserror::Error;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Error)]
pub enum ClassifierError {
    #[error("Classifier request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Classifier API error ({status}): {body}")]
    Service { status: u16, body: String },

    #[error("Classifier could not process the image: {0}")]
    Rejected(String),

    #[error("Classifier response did not contain a label")]
    MissingLabel,

    #[error("Image payload is empty")]
    EmptyImage,
}

impl ClassifierError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Request(e) if e.is_timeout())
    }
}

/// Binary image as received from the caller
#[derive(Debug, Clone)]
pub struct ImagePayload {
    pub bytes: Vec<u8>,
    pub file_name: String,
    pub content_type: Option<String>,
}

impl ImagePayload {
    pub fn new(bytes: Vec<u8>, file_name: impl Into<String>) -> Self {
        Self {
            bytes,
            file_name: file_name.into(),
            content_type: None,
        }
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    pub async fn from_path(path: &Path) -> std::io::Result<Self> {
        let bytes = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "image".to_string());

        let content_type = match path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase)
            .as_deref()
        {
            Some("jpg") | Some("jpeg") => Some("image/jpeg"),
            Some("png") => Some("image/png"),
            Some("webp") => Some("image/webp"),
            _ => None,
        };

        Ok(Self {
            bytes,
            file_name,
            content_type: content_type.map(String::from),
        })
    }
}

/// Turns an image into a waste label
#[async_trait::async_trait]
pub trait Classifier: Send + Sync {
    async fn classify(&self, image: &ImagePayload) -> Result<String, ClassifierError>;
}

#[derive(Debug, Deserialize)]
struct PredictResponse {
    predicted_class: Option<String>,
    error: Option<String>,
}

/// HTTP client for the waste classification service
pub struct ClassifierClient {
    client: Client,
    base_url: String,
}

impl ClassifierClient {
    /// Create a new classifier client
    ///
    /// # Arguments
    /// * `base_url` - Base URL of the service (e.g., "http://127.0.0.1:8000")
    /// * `timeout` - Upper bound for a whole request, including the upload
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ClassifierError> {
        let client = Client::builder().timeout(timeout).build()?;
        let base_url = base_url.into().trim_end_matches('/').to_string();

        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Check if the classification service is reachable
    pub async fn health_check(&self) -> Result<bool, ClassifierError> {
        let response = self
            .client
            .get(format!("{}/openapi.json", self.base_url))
            .send()
            .await?;

        Ok(response.status().is_success())
    }
}

#[async_trait::async_trait]
impl Classifier for ClassifierClient {
    async fn classify(&self, image: &ImagePayload) -> Result<String, ClassifierError> {
        if image.bytes.is_empty() {
            return Err(ClassifierError::EmptyImage);
        }

        let mut part =
            multipart::Part::bytes(image.bytes.clone()).file_name(image.file_name.clone());
        if let Some(ref content_type) = image.content_type {
            part = part.mime_str(content_type)?;
        }
        let form = multipart::Form::new().part("file", part);

        tracing::debug!(
            file_name = %image.file_name,
            size = image.bytes.len(),
            "Sending image to classifier"
        );

        let response = self
            .client
            .post(format!("{}/predict/", self.base_url))
            .multipart(form)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ClassifierError::Service {
                status: status.as_u16(),
                body,
            });
        }

        let prediction: PredictResponse = response.json().await?;

        if let Some(error) = prediction.error {
            return Err(ClassifierError::Rejected(error));
        }

        let label = prediction
            .predicted_class
            .map(|label| label.trim().to_string())
            .filter(|label| !label.is_empty())
            .ok_or(ClassifierError::MissingLabel)?;

        tracing::info!(label = %label, "Image classified");

        Ok(label)
    }
}
