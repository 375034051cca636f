//! Application state

use shop_auth::{AuthService, CookieSettings, JwtManager};
use shop_db::Database;
use shop_storage::BlobStore;
use std::sync::Arc;

/// Prometheus recorder handle used to render `/metrics`
pub type MetricsHandle = metrics_exporter_prometheus::PrometheusHandle;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub storage: Arc<dyn BlobStore>,
    pub auth: Arc<AuthService>,
    pub jwt: Arc<JwtManager>,
    pub cookie: CookieSettings,
}

impl AppState {
    pub fn new(
        db: Database,
        storage: Arc<dyn BlobStore>,
        auth: Arc<AuthService>,
        cookie: CookieSettings,
    ) -> Self {
        let jwt = auth.jwt().clone();
        Self {
            db,
            storage,
            auth,
            jwt,
            cookie,
        }
    }
}
