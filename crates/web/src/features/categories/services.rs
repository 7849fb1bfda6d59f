use storage::{
    dto::category::UpsertCategoryRequest,
    error::{Result, StorageError},
    models::WasteCategory,
    store::LedgerStore,
};

/// List all categories, ordered by name
pub async fn list_categories(store: &dyn LedgerStore) -> Result<Vec<WasteCategory>> {
    store.list_categories().await
}

/// Get a category by its exact name
pub async fn get_category(store: &dyn LedgerStore, name: &str) -> Result<WasteCategory> {
    store
        .find_category_by_name(name)
        .await?
        .ok_or(StorageError::NotFound)
}

/// Create a category or replace the one with the same name
pub async fn upsert_category(
    store: &dyn LedgerStore,
    request: &UpsertCategoryRequest,
) -> Result<WasteCategory> {
    let category = store.upsert_category(request).await?;
    tracing::info!(
        name = %category.name,
        points = category.points_value,
        "Category upserted"
    );
    Ok(category)
}
