//! Login and registration orchestration

use std::sync::Arc;

use shop_db::{DbError, NewUser, Role, User};
use tracing::{debug, info, warn};

use crate::error::AuthError;
use crate::jwt::JwtManager;
use crate::password::PasswordHasher;
use crate::store::{CredentialStore, RoleStore};

/// Result of a successful login
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub user: User,
    pub role: Role,
    pub token: String,
    /// Token lifetime in seconds
    pub expires_in: i64,
}

/// Input for creating a new account
#[derive(Debug, Clone)]
pub struct Registration {
    pub username: String,
    pub password: String,
    pub name: String,
    pub role_id: String,
}

/// Authentication service over injected stores
pub struct AuthService {
    users: Arc<dyn CredentialStore>,
    roles: Arc<dyn RoleStore>,
    hasher: Arc<PasswordHasher>,
    jwt: Arc<JwtManager>,
    /// Verified against when the username is unknown, to keep timing uniform
    dummy_hash: String,
}

impl AuthService {
    pub fn new(
        users: Arc<dyn CredentialStore>,
        roles: Arc<dyn RoleStore>,
        hasher: Arc<PasswordHasher>,
        jwt: Arc<JwtManager>,
    ) -> Result<Self, AuthError> {
        let dummy_hash = hasher.hash("dummy-password-for-unknown-users")?;
        Ok(Self {
            users,
            roles,
            hasher,
            jwt,
            dummy_hash,
        })
    }

    pub fn jwt(&self) -> &Arc<JwtManager> {
        &self.jwt
    }

    pub fn hasher(&self) -> &Arc<PasswordHasher> {
        &self.hasher
    }

    /// Authenticate a username/password pair and issue a token
    pub async fn login(&self, username: &str, password: &str) -> Result<LoginOutcome, AuthError> {
        let Some(user) = self.users.find_user_by_username(username).await? else {
            self.hasher.verify(password, &self.dummy_hash);
            debug!("Login rejected: unknown user {}", username);
            return Err(AuthError::InvalidCredentials);
        };

        let role = self
            .roles
            .find_role_by_id(&user.role_id)
            .await?
            .ok_or_else(|| AuthError::RoleNotFound(user.id.clone()))?;

        if !self.hasher.verify(password, &user.password_hash) {
            debug!("Login rejected: wrong password for {}", username);
            return Err(AuthError::InvalidCredentials);
        }

        let token = self.jwt.generate_token(&user.id, role.name)?;
        info!("User {} logged in as {}", user.username, role.name);

        Ok(LoginOutcome {
            user,
            role,
            token,
            expires_in: self.jwt.token_ttl().num_seconds(),
        })
    }

    /// Create an account under an existing role
    pub async fn register(&self, registration: Registration) -> Result<User, AuthError> {
        let role = self
            .roles
            .find_role_by_id(&registration.role_id)
            .await?
            .ok_or_else(|| AuthError::UnknownRole(registration.role_id.clone()))?;

        let password_hash = self.hasher.hash(&registration.password)?;
        let new_user = NewUser {
            username: registration.username,
            password_hash,
            name: registration.name,
            role_id: role.id,
        };

        match self.users.insert_user(new_user).await {
            Ok(user) => {
                info!("Registered user {} with role {}", user.username, role.name);
                Ok(user)
            }
            Err(DbError::Duplicate(msg)) => {
                warn!("Registration conflict: {}", msg);
                Err(AuthError::UsernameTaken(msg))
            }
            Err(e) => Err(e.into()),
        }
    }
}
