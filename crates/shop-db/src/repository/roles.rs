//! Role operations

use chrono::Utc;

use crate::error::DbError;
use crate::models::{Role, UserRole};
use crate::repository::Database;
use crate::utils::new_id;

impl Database {
    /// Insert a new role; role names are unique
    pub async fn insert_role(&self, name: UserRole) -> Result<Role, DbError> {
        let now = Utc::now();
        let id = new_id();

        sqlx::query(
            r#"
            INSERT INTO roles (id, name, created_at, updated_at)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(name.as_str())
        .bind(now.to_rfc3339())
        .bind(now.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| DbError::from_insert(e, || format!("Role '{}' already exists", name)))?;

        Ok(Role {
            id,
            name,
            created_at: now,
            updated_at: now,
        })
    }

    /// Get a role by ID
    pub async fn get_role_by_id(&self, id: &str) -> Result<Option<Role>, DbError> {
        let result = sqlx::query(
            r#"
            SELECT id, name, created_at, updated_at
            FROM roles
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        result.map(|row| Role::try_from(&row).map_err(DbError::from)).transpose()
    }

    /// Get a role by name
    pub async fn get_role_by_name(&self, name: UserRole) -> Result<Option<Role>, DbError> {
        let result = sqlx::query(
            r#"
            SELECT id, name, created_at, updated_at
            FROM roles
            WHERE name = ?
            "#,
        )
        .bind(name.as_str())
        .fetch_optional(&self.pool)
        .await?;

        result.map(|row| Role::try_from(&row).map_err(DbError::from)).transpose()
    }

    /// List all roles
    pub async fn list_roles(&self) -> Result<Vec<Role>, DbError> {
        let rows = sqlx::query(
            r#"
            SELECT id, name, created_at, updated_at
            FROM roles
            ORDER BY created_at, name
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| Role::try_from(row).map_err(DbError::from))
            .collect()
    }

    /// Create any missing role from the closed role set
    pub async fn ensure_roles(&self) -> Result<Vec<Role>, DbError> {
        let mut roles = Vec::new();
        for name in UserRole::all() {
            let role = match self.get_role_by_name(name).await? {
                Some(role) => role,
                None => self.insert_role(name).await?,
            };
            roles.push(role);
        }
        Ok(roles)
    }
}
