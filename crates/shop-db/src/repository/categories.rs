//! Category operations

use chrono::Utc;

use crate::error::DbError;
use crate::models::{Category, NewCategory};
use crate::repository::Database;
use crate::utils::new_id;

impl Database {
    /// Insert a new category
    pub async fn insert_category(&self, category: NewCategory) -> Result<Category, DbError> {
        let now = Utc::now();
        let id = new_id();

        sqlx::query(
            r#"
            INSERT INTO categories (id, name, image, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(&category.name)
        .bind(&category.image)
        .bind(now.to_rfc3339())
        .bind(now.to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(Category {
            id,
            name: category.name,
            image: category.image,
            created_at: now,
            updated_at: now,
        })
    }

    /// Get a category by ID
    pub async fn get_category(&self, id: &str) -> Result<Option<Category>, DbError> {
        let result = sqlx::query(
            r#"
            SELECT id, name, image, created_at, updated_at
            FROM categories
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        result.map(|row| Category::try_from(&row).map_err(DbError::from)).transpose()
    }

    /// List all categories
    pub async fn list_categories(&self) -> Result<Vec<Category>, DbError> {
        let rows = sqlx::query(
            r#"
            SELECT id, name, image, created_at, updated_at
            FROM categories
            ORDER BY name
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| Category::try_from(row).map_err(DbError::from))
            .collect()
    }
}
