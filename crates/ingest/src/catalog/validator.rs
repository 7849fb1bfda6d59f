use std::collections::HashSet;

use tracing::warn;
use validator::Validate;

use super::models::{CATALOG_FORMAT_VERSION, CLASSIFIER_LABELS, CategoryCatalog};
use crate::{IngestError, Result};

pub struct CatalogValidator;

impl CatalogValidator {
    pub fn validate(catalog: &CategoryCatalog) -> Result<ValidationReport> {
        let mut report = ValidationReport::default();

        if catalog.format_version != CATALOG_FORMAT_VERSION {
            report.errors.push(format!(
                "Unsupported format version: {}. Expected {}",
                catalog.format_version, CATALOG_FORMAT_VERSION
            ));
        }

        if catalog.categories.is_empty() {
            report
                .errors
                .push("At least one category is required".to_string());
        }

        let mut names = HashSet::new();
        for category in &catalog.categories {
            if category.name.trim() != category.name {
                report.errors.push(format!(
                    "Category name '{}' has surrounding whitespace and would never match a label",
                    category.name
                ));
            }

            if !names.insert(category.name.as_str()) {
                report
                    .errors
                    .push(format!("Duplicate category name: '{}'", category.name));
            }

            if let Err(errors) = category.validate() {
                let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
                fields.sort_by(|a, b| a.0.cmp(&b.0));
                for (field, field_errors) in fields {
                    for error in field_errors {
                        let reason = error
                            .message
                            .as_ref()
                            .map(|m| m.to_string())
                            .unwrap_or_else(|| error.code.to_string());
                        report.errors.push(format!(
                            "Category '{}' has invalid {}: {}",
                            category.name, field, reason
                        ));
                    }
                }
            }

            if category.description.is_none() {
                report
                    .warnings
                    .push(format!("Category '{}' has no description", category.name));
            }
            if category.points_value == 0 {
                report
                    .warnings
                    .push(format!("Category '{}' awards no points", category.name));
            }
        }

        for label in CLASSIFIER_LABELS {
            if !names.contains(label) {
                report.warnings.push(format!(
                    "No category for classifier label '{}'; such scans fall back to the unknown-category policy",
                    label
                ));
            }
        }

        if !report.errors.is_empty() {
            Err(IngestError::ValidationError(format!(
                "Validation failed with {} error(s): {}",
                report.errors.len(),
                report.errors.join("; ")
            )))
        } else {
            Ok(report)
        }
    }
}

#[derive(Debug, Default)]
pub struct ValidationReport {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl ValidationReport {
    pub fn log_warnings(&self) {
        for warning in &self.warnings {
            warn!("{}", warning);
        }
    }
}
