pub mod importer;
pub mod models;
pub mod validator;

pub use importer::CatalogImporter;
pub use models::CategoryCatalog;
pub use validator::{CatalogValidator, ValidationReport};
