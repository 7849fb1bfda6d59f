use storage::models::WasteCategory;
use storage::store::CategoryStore;
use tracing::info;

use super::models::CategoryCatalog;
use crate::Result;

/// Writes a validated catalog through the storage boundary
pub struct CatalogImporter<'a, S: ?Sized> {
    store: &'a S,
}

impl<'a, S: CategoryStore + ?Sized> CatalogImporter<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    pub async fn import(&self, catalog: &CategoryCatalog) -> Result<Vec<WasteCategory>> {
        let mut imported = Vec::with_capacity(catalog.categories.len());

        for category in &catalog.categories {
            let stored = self.store.upsert_category(category).await?;
            info!(
                "Upserted category '{}' ({} points, {} kg CO2)",
                stored.name, stored.points_value, stored.co2_impact_kg
            );
            imported.push(stored);
        }

        Ok(imported)
    }
}
