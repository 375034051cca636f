//! JWT token management

use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use shop_db::UserRole;
use tracing::debug;

use crate::error::AuthError;

/// Token lifetime used when none is configured
pub const DEFAULT_TOKEN_TTL_HOURS: i64 = 3;

/// Longest accepted token lifetime (one year)
pub const MAX_TOKEN_TTL_HOURS: i64 = 24 * 365;

/// JWT claims
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Claims {
    /// User ID
    pub subject_id: String,
    /// Role name at the time of issuance
    pub role_name: String,
    /// Expiration time (Unix timestamp)
    pub expires_at: i64,
    /// Issued at (Unix timestamp)
    pub issued_at: i64,
}

/// JWT manager for token generation and validation
#[derive(Clone)]
pub struct JwtManager {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    token_ttl: Duration,
}

impl JwtManager {
    /// Create a new JWT manager
    ///
    /// An empty secret or a lifetime outside `1..=MAX_TOKEN_TTL_HOURS`
    /// is a configuration error.
    pub fn new(secret: &str, token_ttl_hours: i64) -> Result<Self, AuthError> {
        if secret.is_empty() {
            return Err(AuthError::MissingSigningKey);
        }
        if !(1..=MAX_TOKEN_TTL_HOURS).contains(&token_ttl_hours) {
            return Err(AuthError::InvalidTokenLifetime(token_ttl_hours));
        }

        // Expiry is checked against `expiresAt` below, without leeway.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.required_spec_claims.clear();

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            token_ttl: Duration::hours(token_ttl_hours),
        })
    }

    /// Lifetime of newly issued tokens
    pub fn token_ttl(&self) -> Duration {
        self.token_ttl
    }

    /// Generate a token for a user
    pub fn generate_token(&self, subject_id: &str, role: UserRole) -> Result<String, AuthError> {
        let now = Utc::now();
        let claims = Claims {
            subject_id: subject_id.to_string(),
            role_name: role.as_str().to_string(),
            expires_at: (now + self.token_ttl).timestamp(),
            issued_at: now.timestamp(),
        };

        debug!("Generating token for user: {}", subject_id);
        self.encode(&claims)
    }

    /// Sign an explicit set of claims
    pub fn encode(&self, claims: &Claims) -> Result<String, AuthError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key)
            .map_err(AuthError::TokenSigning)
    }

    /// Validate a token and return its claims
    pub fn validate_token(&self, token: &str) -> Result<Claims, AuthError> {
        self.validate_token_at(token, Utc::now().timestamp())
    }

    /// Validate a token against an explicit clock reading
    ///
    /// A token is still valid at exactly `expiresAt`.
    pub fn validate_token_at(&self, token: &str, now: i64) -> Result<Claims, AuthError> {
        // Header problems are format errors, not claim errors
        jsonwebtoken::decode_header(token).map_err(|_| AuthError::InvalidToken)?;

        let token_data =
            decode::<Claims>(token, &self.decoding_key, &self.validation).map_err(|e| {
                match e.kind() {
                    ErrorKind::Json(_) => AuthError::MalformedClaims,
                    _ => AuthError::InvalidToken,
                }
            })?;

        if now > token_data.claims.expires_at {
            return Err(AuthError::TokenExpired);
        }

        Ok(token_data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claims_expiring_at(expires_at: i64) -> Claims {
        Claims {
            subject_id: "user-1".to_string(),
            role_name: "admin".to_string(),
            expires_at,
            issued_at: expires_at - 3 * 3600,
        }
    }

    #[test]
    fn test_token_generation_and_validation() {
        let manager = JwtManager::new("test-secret-key", DEFAULT_TOKEN_TTL_HOURS).unwrap();

        let token = manager.generate_token("user-1", UserRole::Admin).unwrap();
        let claims = manager.validate_token(&token).unwrap();

        assert_eq!(claims.subject_id, "user-1");
        assert_eq!(claims.role_name, "admin");
        assert_eq!(claims.expires_at - claims.issued_at, 3 * 3600);
    }

    #[test]
    fn test_wire_format_uses_camel_case_fields() {
        let json = serde_json::to_value(claims_expiring_at(100)).unwrap();
        assert_eq!(json["subjectId"], "user-1");
        assert_eq!(json["roleName"], "admin");
        assert_eq!(json["expiresAt"], 100);
    }

    #[test]
    fn test_expiry_boundary() {
        let manager = JwtManager::new("test-secret-key", DEFAULT_TOKEN_TTL_HOURS).unwrap();
        let t = 1_900_000_000;
        let token = manager.encode(&claims_expiring_at(t)).unwrap();

        assert!(manager.validate_token_at(&token, t - 1).is_ok());
        assert!(manager.validate_token_at(&token, t).is_ok());
        assert!(matches!(
            manager.validate_token_at(&token, t + 1),
            Err(AuthError::TokenExpired)
        ));
    }

    #[test]
    fn test_token_from_other_secret_rejected() {
        let ours = JwtManager::new("our-secret", DEFAULT_TOKEN_TTL_HOURS).unwrap();
        let theirs = JwtManager::new("their-secret", DEFAULT_TOKEN_TTL_HOURS).unwrap();

        let forged = theirs.encode(&claims_expiring_at(i64::MAX / 2)).unwrap();
        assert!(matches!(
            ours.validate_token(&forged),
            Err(AuthError::InvalidToken)
        ));

        // Expired and forged: the signature failure wins
        let forged_expired = theirs.encode(&claims_expiring_at(1)).unwrap();
        assert!(matches!(
            ours.validate_token(&forged_expired),
            Err(AuthError::InvalidToken)
        ));
    }

    #[test]
    fn test_invalid_token() {
        let manager = JwtManager::new("test-secret-key", DEFAULT_TOKEN_TTL_HOURS).unwrap();

        assert!(matches!(
            manager.validate_token("invalid-token"),
            Err(AuthError::InvalidToken)
        ));
        assert!(matches!(
            manager.validate_token(""),
            Err(AuthError::InvalidToken)
        ));
    }

    #[test]
    fn test_signed_token_without_role_is_malformed() {
        #[derive(Serialize)]
        struct Partial {
            #[serde(rename = "subjectId")]
            subject_id: &'static str,
            #[serde(rename = "expiresAt")]
            expires_at: i64,
        }

        let secret = "test-secret-key";
        let manager = JwtManager::new(secret, DEFAULT_TOKEN_TTL_HOURS).unwrap();
        let token = encode(
            &Header::new(Algorithm::HS256),
            &Partial {
                subject_id: "user-1",
                expires_at: i64::MAX / 2,
            },
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap();

        assert!(matches!(
            manager.validate_token(&token),
            Err(AuthError::MalformedClaims)
        ));
    }

    #[test]
    fn test_empty_secret_is_rejected() {
        assert!(matches!(
            JwtManager::new("", DEFAULT_TOKEN_TTL_HOURS),
            Err(AuthError::MissingSigningKey)
        ));
    }

    #[test]
    fn test_token_lifetime_bounds() {
        for hours in [0, -1, MAX_TOKEN_TTL_HOURS + 1, i64::MAX] {
            assert!(
                matches!(
                    JwtManager::new("test-secret-key", hours),
                    Err(AuthError::InvalidTokenLifetime(h)) if h == hours
                ),
                "{}",
                hours
            );
        }

        let manager = JwtManager::new("test-secret-key", MAX_TOKEN_TTL_HOURS).unwrap();
        assert_eq!(manager.token_ttl(), Duration::hours(MAX_TOKEN_TTL_HOURS));
        let token = manager.generate_token("user-1", UserRole::Customer).unwrap();
        let claims = manager.validate_token(&token).unwrap();
        assert_eq!(claims.expires_at - claims.issued_at, MAX_TOKEN_TTL_HOURS * 3600);
    }
}
