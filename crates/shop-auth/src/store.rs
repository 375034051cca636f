//! Record store contracts used by the auth service

use async_trait::async_trait;
use shop_db::{Database, DbError, NewUser, Role, User};

/// Lookup and creation of user credentials
#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, DbError>;

    /// Insert a user; a taken username yields `DbError::Duplicate`
    async fn insert_user(&self, user: NewUser) -> Result<User, DbError>;
}

/// Role lookup by id
#[async_trait]
pub trait RoleStore: Send + Sync {
    async fn find_role_by_id(&self, id: &str) -> Result<Option<Role>, DbError>;
}

#[async_trait]
impl CredentialStore for Database {
    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, DbError> {
        self.get_user_by_username(username).await
    }

    async fn insert_user(&self, user: NewUser) -> Result<User, DbError> {
        Database::insert_user(self, user).await
    }
}

#[async_trait]
impl RoleStore for Database {
    async fn find_role_by_id(&self, id: &str) -> Result<Option<Role>, DbError> {
        self.get_role_by_id(id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shop_db::UserRole;

    async fn database() -> (tempfile::TempDir, Database) {
        let dir = tempfile::tempdir().unwrap();
        let url = format!("sqlite:{}?mode=rwc", dir.path().join("auth.db").display());
        let db = Database::new(&url).await.unwrap();
        db.ensure_roles().await.unwrap();
        (dir, db)
    }

    #[tokio::test]
    async fn test_database_backs_both_stores() {
        let (_dir, db) = database().await;
        let role = db.get_role_by_name(UserRole::Customer).await.unwrap().unwrap();

        let users: &dyn CredentialStore = &db;
        let roles: &dyn RoleStore = &db;

        let new_user = || NewUser {
            username: "grace".to_string(),
            password_hash: "hash".to_string(),
            name: "Grace".to_string(),
            role_id: role.id.clone(),
        };
        let created = users.insert_user(new_user()).await.unwrap();
        assert!(matches!(
            users.insert_user(new_user()).await,
            Err(DbError::Duplicate(_))
        ));

        let found = users.find_user_by_username("grace").await.unwrap().unwrap();
        assert_eq!(found.id, created.id);
        assert!(users.find_user_by_username("nobody").await.unwrap().is_none());

        let found_role = roles.find_role_by_id(&found.role_id).await.unwrap().unwrap();
        assert_eq!(found_role.name, UserRole::Customer);
        assert!(roles.find_role_by_id("missing").await.unwrap().is_none());
    }
}
