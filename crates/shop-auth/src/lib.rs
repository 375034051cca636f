//! Shop Admin Authentication and Authorization
//!
//! Password hashing, JWT issuance and validation, the login/registration
//! service, and the role gate used in front of privileged routes.

pub mod cookie;
pub mod error;
pub mod jwt;
pub mod middleware;
pub mod password;
pub mod service;
pub mod store;

pub use cookie::CookieSettings;
pub use error::AuthError;
pub use jwt::{Claims, DEFAULT_TOKEN_TTL_HOURS, JwtManager, MAX_TOKEN_TTL_HOURS};
pub use middleware::{AuthGate, AuthUser, authorize, require_role};
pub use password::{HashParams, PasswordHasher};
pub use service::{AuthService, LoginOutcome, Registration};
pub use store::{CredentialStore, RoleStore};
