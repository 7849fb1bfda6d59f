pub mod catalog;
pub mod classifier;
pub mod error;
pub mod pipeline;

pub use classifier::{Classifier, ClassifierClient, ClassifierError, ImagePayload};
pub use error::{IngestError, Result};
pub use pipeline::{PLACEHOLDER_CONFIDENCE, ScanContext, ScanError, ScanPipeline};
