use sqlx::PgPool;

use crate::dto::category::UpsertCategoryRequest;
use crate::error::Result;
use crate::models::WasteCategory;

pub struct CategoryRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CategoryRepository<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List all categories
    pub async fn list(&self) -> Result<Vec<WasteCategory>> {
        let categories = sqlx::query_as::<_, WasteCategory>(
            r#"
            SELECT category_id, name, description, disposal_instructions, environmental_impact,
                   points_value, co2_impact_kg, icon_name, color, created_at
            FROM waste_categories
            ORDER BY name
            "#,
        )
        .fetch_all(self.pool)
        .await?;

        Ok(categories)
    }

    /// Find category by its exact name
    pub async fn find_by_name(&self, name: &str) -> Result<Option<WasteCategory>> {
        let category = sqlx::query_as::<_, WasteCategory>(
            r#"
            SELECT category_id, name, description, disposal_instructions, environmental_impact,
                   points_value, co2_impact_kg, icon_name, color, created_at
            FROM waste_categories
            WHERE name = $1
            "#,
        )
        .bind(name)
        .fetch_optional(self.pool)
        .await?;

        Ok(category)
    }

    pub async fn upsert(&self, request: &UpsertCategoryRequest) -> Result<WasteCategory> {
        let category = sqlx::query_as::<_, WasteCategory>(
            r#"
            INSERT INTO waste_categories (
                name, description, disposal_instructions, environmental_impact,
                points_value, co2_impact_kg, icon_name, color
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (name)
            DO UPDATE SET
                description = EXCLUDED.description,
                disposal_instructions = EXCLUDED.disposal_instructions,
                environmental_impact = EXCLUDED.environmental_impact,
                points_value = EXCLUDED.points_value,
                co2_impact_kg = EXCLUDED.co2_impact_kg,
                icon_name = EXCLUDED.icon_name,
                color = EXCLUDED.color
            RETURNING category_id, name, description, disposal_instructions, environmental_impact,
                      points_value, co2_impact_kg, icon_name, color, created_at
            "#,
        )
        .bind(&request.name)
        .bind(&request.description)
        .bind(&request.disposal_instructions)
        .bind(&request.environmental_impact)
        .bind(request.points_value)
        .bind(request.co2_impact_kg)
        .bind(&request.icon_name)
        .bind(&request.color)
        .fetch_one(self.pool)
        .await?;

        Ok(category)
    }
}
