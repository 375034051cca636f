//! Session cookie carrying the access token

use axum::http::HeaderMap;
use axum::http::header::COOKIE;

/// Cookie name the token is delivered under and read back from
pub const TOKEN_COOKIE: &str = "jwt";

/// Attributes of the token cookie set on login
#[derive(Debug, Clone)]
pub struct CookieSettings {
    pub domain: Option<String>,
    pub secure: bool,
    /// Lifetime in seconds; matches the token lifetime
    pub max_age_secs: i64,
}

impl CookieSettings {
    pub fn new(domain: Option<String>, secure: bool, max_age_secs: i64) -> Self {
        Self {
            domain: domain.filter(|d| !d.is_empty()),
            secure,
            max_age_secs,
        }
    }

    /// Render a `Set-Cookie` value for the given token
    pub fn build(&self, token: &str) -> String {
        let mut cookie = format!(
            "{}={}; Max-Age={}; Path=/",
            TOKEN_COOKIE, token, self.max_age_secs
        );
        if let Some(domain) = &self.domain {
            cookie.push_str("; Domain=");
            cookie.push_str(domain);
        }
        cookie.push_str("; HttpOnly");
        if self.secure {
            cookie.push_str("; Secure");
        }
        cookie
    }
}

/// Read the token cookie from request headers
pub fn token_cookie(headers: &HeaderMap) -> Option<String> {
    cookie_value(headers, TOKEN_COOKIE)
}

/// Find a non-empty cookie by name across all `Cookie` headers
fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, value)| *key == name && !value.is_empty())
        .map(|(_, value)| value.to_string())
}

impl Default for CookieSettings {
    fn default() -> Self {
        Self::new(None, false, crate::jwt::DEFAULT_TOKEN_TTL_HOURS * 3600)
    }
}
