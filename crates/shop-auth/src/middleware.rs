//! Role gate for Axum routes

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{HeaderMap, header::AUTHORIZATION, request::Parts},
    middleware::Next,
    response::Response,
};
use serde::{Deserialize, Serialize};
use shop_db::UserRole;
use std::sync::Arc;
use tracing::debug;

use crate::cookie::token_cookie;
use crate::error::AuthError;
use crate::jwt::JwtManager;

/// Identity decoded from a validated token
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AuthUser {
    pub id: String,
    pub role: UserRole,
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthUser>()
            .cloned()
            .ok_or(AuthError::MissingCredentials)
    }
}

/// Gate state: the verifier and the one role a route requires
#[derive(Clone)]
pub struct AuthGate {
    pub jwt: Arc<JwtManager>,
    pub required: UserRole,
}

impl AuthGate {
    pub fn new(jwt: Arc<JwtManager>, required: UserRole) -> Self {
        Self { jwt, required }
    }
}

/// Pull the token from `Authorization: Bearer`, falling back to the `jwt` cookie
fn extract_token(headers: &HeaderMap) -> Result<String, AuthError> {
    if let Some(header) = headers.get(AUTHORIZATION) {
        let value = header.to_str().map_err(|_| AuthError::InvalidAuthHeader)?;
        let token = value
            .strip_prefix("Bearer ")
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or(AuthError::InvalidAuthHeader)?;
        return Ok(token.to_string());
    }

    token_cookie(headers).ok_or(AuthError::MissingCredentials)
}

/// Decide whether a request may proceed to a route requiring `required`
pub fn authorize(
    headers: &HeaderMap,
    jwt: &JwtManager,
    required: UserRole,
) -> Result<AuthUser, AuthError> {
    let token = extract_token(headers)?;
    let claims = jwt.validate_token(&token)?;

    let role: UserRole = claims
        .role_name
        .parse()
        .map_err(|_| AuthError::MalformedClaims)?;

    if role != required {
        debug!(
            "Rejected user {}: role {} where {} is required",
            claims.subject_id, role, required
        );
        return Err(AuthError::InsufficientPermissions);
    }

    Ok(AuthUser {
        id: claims.subject_id,
        role,
    })
}

/// Middleware enforcing the gate's required role
///
/// Rejected requests never reach the inner handler.
pub async fn require_role(
    State(gate): State<AuthGate>,
    mut request: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let user = authorize(request.headers(), &gate.jwt, gate.required)?;
    debug!("Authenticated user: {} ({})", user.id, user.role);

    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cookie::CookieSettings;
    use crate::jwt::{Claims, DEFAULT_TOKEN_TTL_HOURS};
    use axum::{
        Router,
        body::Body,
        http::{StatusCode, header::COOKIE},
        middleware::from_fn_with_state,
        routing::get,
    };
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tower::ServiceExt;

    fn jwt() -> Arc<JwtManager> {
        Arc::new(JwtManager::new("gate-secret", DEFAULT_TOKEN_TTL_HOURS).unwrap())
    }

    fn app(jwt: Arc<JwtManager>, hits: Arc<AtomicUsize>) -> Router {
        Router::new()
            .route(
                "/admin",
                get(move |user: AuthUser| {
                    let hits = hits.clone();
                    async move {
                        hits.fetch_add(1, Ordering::SeqCst);
                        user.id
                    }
                }),
            )
            .layer(from_fn_with_state(
                AuthGate::new(jwt, UserRole::Admin),
                require_role,
            ))
    }

    async fn send(app: Router, request: axum::http::Request<Body>) -> StatusCode {
        app.oneshot(request).await.unwrap().status()
    }

    fn request_with(header: (&str, String)) -> axum::http::Request<Body> {
        axum::http::Request::builder()
            .uri("/admin")
            .header(header.0, header.1)
            .body(Body::empty())
            .unwrap()
    }

    #[tokio::test]
    async fn test_admin_token_passes_once() {
        let jwt = jwt();
        let hits = Arc::new(AtomicUsize::new(0));
        let token = jwt.generate_token("admin-1", UserRole::Admin).unwrap();

        let response = app(jwt, hits.clone())
            .oneshot(request_with(("authorization", format!("Bearer {}", token))))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&body[..], b"admin-1");
    }

    #[tokio::test]
    async fn test_cookie_fallback() {
        let jwt = jwt();
        let hits = Arc::new(AtomicUsize::new(0));
        let token = jwt.generate_token("admin-1", UserRole::Admin).unwrap();

        let status = send(
            app(jwt, hits.clone()),
            request_with((COOKIE.as_str(), format!("jwt={}", token))),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_login_cookie_is_accepted_by_gate() {
        let jwt = jwt();
        let hits = Arc::new(AtomicUsize::new(0));
        let token = jwt.generate_token("admin-1", UserRole::Admin).unwrap();

        // Echo back the name=value pair a browser would store
        let set_cookie = CookieSettings::new(Some("localhost".into()), true, 10800).build(&token);
        let (pair, _) = set_cookie.split_once(';').unwrap();

        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, format!("theme=dark; {}", pair).parse().unwrap());
        assert_eq!(authorize(&headers, &jwt, UserRole::Admin).unwrap().id, "admin-1");

        let status = send(
            app(jwt, hits.clone()),
            request_with((COOKIE.as_str(), pair.to_string())),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_rejections_never_reach_handler() {
        let jwt = jwt();
        let hits = Arc::new(AtomicUsize::new(0));
        let other = JwtManager::new("other-secret", DEFAULT_TOKEN_TTL_HOURS).unwrap();
        let customer = jwt.generate_token("cust-1", UserRole::Customer).unwrap();
        let forged = other.generate_token("admin-1", UserRole::Admin).unwrap();
        let expired = jwt
            .encode(&Claims {
                subject_id: "admin-1".into(),
                role_name: "admin".into(),
                expires_at: 1,
                issued_at: 0,
            })
            .unwrap();
        let unknown_role = jwt
            .encode(&Claims {
                subject_id: "admin-1".into(),
                role_name: "superuser".into(),
                expires_at: i64::MAX / 2,
                issued_at: 0,
            })
            .unwrap();

        let cases = vec![
            request_with(("x-nothing", "1".to_string())),
            request_with(("authorization", "Basic abc".to_string())),
            request_with(("authorization", "Bearer ".to_string())),
            request_with(("authorization", "Bearer not-a-token".to_string())),
            request_with(("authorization", format!("Bearer {}", customer))),
            request_with(("authorization", format!("Bearer {}", forged))),
            request_with(("authorization", format!("Bearer {}", expired))),
            request_with(("authorization", format!("Bearer {}", unknown_role))),
        ];

        for request in cases {
            let status = send(app(jwt.clone(), hits.clone()), request).await;
            assert_eq!(status, StatusCode::UNAUTHORIZED);
        }
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_authorize_error_kinds() {
        let jwt = jwt();
        let mut headers = HeaderMap::new();
        assert!(matches!(
            authorize(&headers, &jwt, UserRole::Admin),
            Err(AuthError::MissingCredentials)
        ));

        let token = jwt.generate_token("cust-1", UserRole::Customer).unwrap();
        headers.insert(AUTHORIZATION, format!("Bearer {}", token).parse().unwrap());
        assert!(matches!(
            authorize(&headers, &jwt, UserRole::Admin),
            Err(AuthError::InsufficientPermissions)
        ));
        assert_eq!(
            authorize(&headers, &jwt, UserRole::Customer).unwrap(),
            AuthUser {
                id: "cust-1".into(),
                role: UserRole::Customer
            }
        );
    }
}
