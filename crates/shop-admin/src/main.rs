//! Shop Admin - e-commerce administration backend

use anyhow::{Context, Result};
use clap::Parser;
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

mod config;

use config::{Config, ConfigSource, LoggingConfig, StorageConfig};
use shop_api::{AppState, create_router};
use shop_auth::{AuthService, CookieSettings, HashParams, JwtManager, PasswordHasher};
use shop_db::{Database, NewUser, UserRole};
use shop_storage::{BlobStore, LocalStorage, S3Config, S3Storage};

/// Shop Admin - e-commerce administration backend
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short, long, default_value = "config/default.toml", env = "SHOP_ADMIN_CONFIG")]
    config: String,

    /// Bind address
    #[arg(long, env = "SHOP_ADMIN_BIND")]
    bind: Option<String>,

    /// Port
    #[arg(short, long, env = "SHOP_ADMIN_PORT")]
    port: Option<u16>,

    /// Token signing secret
    #[arg(long, env = "SHOP_ADMIN_JWT_SECRET", hide_env_values = true)]
    jwt_secret: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let (mut config, source) = Config::load(&args.config)?;
    if let Some(secret) = args.jwt_secret {
        config.auth.jwt_secret = secret;
    }

    init_logging(&config.logging);

    info!("Starting Shop Admin v{}", env!("CARGO_PKG_VERSION"));
    match source {
        ConfigSource::File => info!("Loaded configuration from {}", args.config),
        ConfigSource::Defaults => info!("Config file not found at {}, using defaults", args.config),
    }
    config.validate()?;

    // Initialize database
    if let Some(parent) = Path::new(&config.database.path).parent()
        && !parent.as_os_str().is_empty()
    {
        tokio::fs::create_dir_all(parent)
            .await
            .with_context(|| format!("Failed to create database directory {:?}", parent))?;
    }
    let db_url = format!("sqlite:{}?mode=rwc", config.database.path);
    let db = Database::new(&db_url)
        .await
        .context("Failed to open database")?;

    let roles = db.ensure_roles().await?;
    info!("Roles available: {}", roles.len());

    let hasher = PasswordHasher::new(HashParams::from(&config.auth.argon2))
        .context("Invalid argon2 parameters")?;
    seed_admin(&db, &hasher, config.auth.admin_password.as_deref()).await?;

    let storage = init_storage(&config.storage).await?;

    let jwt = JwtManager::new(&config.auth.jwt_secret, config.auth.token_ttl_hours)
        .context("Failed to initialize token issuer")?;
    let auth = AuthService::new(
        Arc::new(db.clone()),
        Arc::new(db.clone()),
        Arc::new(hasher),
        Arc::new(jwt),
    )?;

    let cookie = CookieSettings::new(
        Some(config.auth.cookie_domain.clone()),
        config.auth.cookie_secure,
        config.token_ttl_secs(),
    );

    let state = AppState::new(db, storage, Arc::new(auth), cookie);

    let metrics_handle = PrometheusBuilder::new()
        .install_recorder()
        .context("Failed to install metrics recorder")?;

    let app = create_router(state, Some(Arc::new(metrics_handle)))
        .layer(TraceLayer::new_for_http());

    // Determine bind address
    let bind_addr = args.bind.unwrap_or(config.server.bind_address);
    let port = args.port.unwrap_or(config.server.port);
    let addr: SocketAddr = format!("{}:{}", bind_addr, port)
        .parse()
        .with_context(|| format!("Invalid bind address {}:{}", bind_addr, port))?;

    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

/// Create the `admin` account when the database has no users yet
async fn seed_admin(db: &Database, hasher: &PasswordHasher, password: Option<&str>) -> Result<()> {
    if db.has_users().await? {
        return Ok(());
    }

    let Some(password) = password.filter(|p| !p.is_empty()) else {
        warn!("No users exist and auth.admin_password is not set; skipping admin bootstrap");
        return Ok(());
    };

    let role = db
        .get_role_by_name(UserRole::Admin)
        .await?
        .context("admin role missing after seeding")?;

    info!("Creating default admin user");
    db.insert_user(NewUser {
        username: "admin".to_string(),
        password_hash: hasher.hash(password)?,
        name: "Administrator".to_string(),
        role_id: role.id,
    })
    .await?;
    info!("Default admin user created (username: admin)");
    Ok(())
}

/// Select the blob store backend
async fn init_storage(config: &StorageConfig) -> Result<Arc<dyn BlobStore>> {
    match config.backend.as_str() {
        "s3" => {
            let s3 = &config.s3;
            let defaults = S3Config::default();
            let storage = S3Storage::new(S3Config {
                bucket: s3.bucket.clone().unwrap_or(defaults.bucket),
                region: s3.region.clone().unwrap_or(defaults.region),
                endpoint: s3.endpoint.clone(),
                access_key_id: s3.access_key.clone(),
                secret_access_key: s3.secret_key.clone(),
                prefix: s3.prefix.clone(),
                allow_http: s3.allow_http,
            })?;
            Ok(Arc::new(storage))
        }
        _ => {
            let storage = LocalStorage::new(&config.local.path)
                .await
                .with_context(|| format!("Failed to initialize storage at {}", config.local.path))?;
            Ok(Arc::new(storage))
        }
    }
}

/// Initialize logging
fn init_logging(config: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    let registry = tracing_subscriber::registry().with(filter);
    if config.format == "json" {
        registry.with(fmt::layer().json()).init();
    } else {
        registry.with(fmt::layer()).init();
    }
}

/// Wait for shutdown signal
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
