//! Product operations

use chrono::Utc;

use crate::error::DbError;
use crate::models::{NewProduct, Product, UpdateProduct};
use crate::repository::Database;
use crate::utils::new_id;

impl Database {
    /// Insert a new product
    pub async fn insert_product(&self, product: NewProduct) -> Result<Product, DbError> {
        let now = Utc::now();
        let id = new_id();

        sqlx::query(
            r#"
            INSERT INTO products (id, name, image, price, description, stock, weight, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(&product.name)
        .bind(&product.image)
        .bind(&product.price)
        .bind(&product.description)
        .bind(&product.stock)
        .bind(&product.weight)
        .bind(now.to_rfc3339())
        .bind(now.to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(Product {
            id,
            name: product.name,
            image: product.image,
            price: product.price,
            description: product.description,
            stock: product.stock,
            weight: product.weight,
            created_at: now,
            updated_at: now,
        })
    }

    /// Get a product by ID
    pub async fn get_product(&self, id: &str) -> Result<Option<Product>, DbError> {
        let result = sqlx::query(
            r#"
            SELECT id, name, image, price, description, stock, weight, created_at, updated_at
            FROM products
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        result.map(|row| Product::try_from(&row).map_err(DbError::from)).transpose()
    }

    /// List all products
    pub async fn list_products(&self) -> Result<Vec<Product>, DbError> {
        let rows = sqlx::query(
            r#"
            SELECT id, name, image, price, description, stock, weight, created_at, updated_at
            FROM products
            ORDER BY name
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| Product::try_from(row).map_err(DbError::from))
            .collect()
    }

    /// Update a product and return the stored result
    pub async fn update_product(
        &self,
        id: &str,
        update: UpdateProduct,
    ) -> Result<Option<Product>, DbError> {
        let now = Utc::now();
        let result = sqlx::query(
            r#"
            UPDATE products
            SET name = ?,
                image = COALESCE(?, image),
                price = ?,
                description = COALESCE(?, description),
                stock = ?,
                weight = ?,
                updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(update.name)
        .bind(update.image)
        .bind(update.price)
        .bind(update.description)
        .bind(update.stock)
        .bind(update.weight)
        .bind(now.to_rfc3339())
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.get_product(id).await
    }

    /// Delete a product
    pub async fn delete_product(&self, id: &str) -> Result<bool, DbError> {
        let result = sqlx::query("DELETE FROM products WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use crate::models::{NewCategory, NewProduct, UpdateProduct};
    use crate::repository::test_support::temp_db;

    #[tokio::test]
    async fn test_product_lifecycle() {
        let (_dir, db) = temp_db().await;

        let product = db
            .insert_product(NewProduct {
                name: "Mug".to_string(),
                image: "a1-mug.png".to_string(),
                price: "12000".to_string(),
                description: "ceramic".to_string(),
                stock: "5".to_string(),
                weight: "300".to_string(),
            })
            .await
            .unwrap();

        let updated = db
            .update_product(
                &product.id,
                UpdateProduct {
                    name: "Big Mug".to_string(),
                    image: None,
                    price: "15000".to_string(),
                    description: None,
                    stock: "4".to_string(),
                    weight: "450".to_string(),
                },
            )
            .await
            .unwrap()
            .unwrap();

        assert_eq!(updated.name, "Big Mug");
        assert_eq!(updated.image, "a1-mug.png");
        assert_eq!(updated.description, "ceramic");
        assert_eq!(updated.stock, "4");

        assert_eq!(db.list_products().await.unwrap().len(), 1);
        assert!(db.delete_product(&product.id).await.unwrap());
        assert!(db.get_product(&product.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_category_insert_and_list() {
        let (_dir, db) = temp_db().await;

        let shoes = db
            .insert_category(NewCategory {
                name: "Shoes".to_string(),
                image: "b2-shoes.jpg".to_string(),
            })
            .await
            .unwrap();
        db.insert_category(NewCategory {
            name: "Bags".to_string(),
            image: "c3-bags.jpg".to_string(),
        })
        .await
        .unwrap();

        let all = db.list_categories().await.unwrap();
        assert_eq!(
            all.iter().map(|c| c.name.as_str()).collect::<Vec<_>>(),
            vec!["Bags", "Shoes"]
        );
        assert_eq!(db.get_category(&shoes.id).await.unwrap().unwrap().image, "b2-shoes.jpg");
    }
}
