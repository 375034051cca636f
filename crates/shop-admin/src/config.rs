//! Configuration loading

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use shop_auth::{HashParams, MAX_TOKEN_TTL_HOURS};
use std::path::Path;
use tracing::warn;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            port: default_port(),
        }
    }
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_db_path")]
    pub path: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

/// Storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// `local` or `s3`
    #[serde(default = "default_backend")]
    pub backend: String,
    #[serde(default)]
    pub local: LocalStorageConfig,
    #[serde(default)]
    pub s3: S3StorageConfig,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            local: LocalStorageConfig::default(),
            s3: S3StorageConfig::default(),
        }
    }
}

/// Local storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocalStorageConfig {
    #[serde(default = "default_local_path")]
    pub path: String,
}

impl Default for LocalStorageConfig {
    fn default() -> Self {
        Self {
            path: default_local_path(),
        }
    }
}

/// S3 storage configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct S3StorageConfig {
    pub bucket: Option<String>,
    pub region: Option<String>,
    pub endpoint: Option<String>,
    pub access_key: Option<String>,
    pub secret_key: Option<String>,
    pub prefix: Option<String>,
    #[serde(default)]
    pub allow_http: bool,
}

/// Authentication configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    #[serde(default = "default_jwt_secret")]
    pub jwt_secret: String,
    #[serde(default = "default_token_ttl_hours")]
    pub token_ttl_hours: i64,
    #[serde(default = "default_cookie_domain")]
    pub cookie_domain: String,
    #[serde(default)]
    pub cookie_secure: bool,
    /// Password for the `admin` account seeded into an empty database
    #[serde(default)]
    pub admin_password: Option<String>,
    #[serde(default)]
    pub argon2: Argon2Config,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: default_jwt_secret(),
            token_ttl_hours: default_token_ttl_hours(),
            cookie_domain: default_cookie_domain(),
            cookie_secure: false,
            admin_password: None,
            argon2: Argon2Config::default(),
        }
    }
}

/// Argon2 work factor
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Argon2Config {
    #[serde(default = "default_memory_kib")]
    pub memory_kib: u32,
    #[serde(default = "default_iterations")]
    pub iterations: u32,
    #[serde(default = "default_parallelism")]
    pub parallelism: u32,
}

impl Default for Argon2Config {
    fn default() -> Self {
        Self {
            memory_kib: default_memory_kib(),
            iterations: default_iterations(),
            parallelism: default_parallelism(),
        }
    }
}

impl From<&Argon2Config> for HashParams {
    fn from(config: &Argon2Config) -> Self {
        HashParams {
            memory_kib: config.memory_kib,
            iterations: config.iterations,
            parallelism: config.parallelism,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    /// `pretty` or `json`
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_bind_address() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_db_path() -> String {
    "./data/shop-admin.db".to_string()
}

fn default_backend() -> String {
    "local".to_string()
}

fn default_local_path() -> String {
    "./data/images".to_string()
}

const DEFAULT_JWT_SECRET: &str = "change-me-in-production";

fn default_jwt_secret() -> String {
    DEFAULT_JWT_SECRET.to_string()
}

fn default_token_ttl_hours() -> i64 {
    shop_auth::DEFAULT_TOKEN_TTL_HOURS
}

fn default_cookie_domain() -> String {
    "localhost".to_string()
}

fn default_memory_kib() -> u32 {
    HashParams::default().memory_kib
}

fn default_iterations() -> u32 {
    HashParams::default().iterations
}

fn default_parallelism() -> u32 {
    HashParams::default().parallelism
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

/// Where a loaded configuration came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigSource {
    File,
    Defaults,
}

impl Config {
    /// Load configuration from a file
    ///
    /// A missing file yields the defaults. Runs before logging is set up, so
    /// the caller reports the source.
    pub fn load(path: &str) -> Result<(Self, ConfigSource)> {
        let config_path = Path::new(path);

        if !config_path.exists() {
            return Ok((Self::default(), ConfigSource::Defaults));
        }

        let content = std::fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read config file: {}", path))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path))?;

        Ok((config, ConfigSource::File))
    }

    /// Reject settings the server cannot start with
    pub fn validate(&self) -> Result<()> {
        if self.auth.jwt_secret.is_empty() {
            bail!("auth.jwt_secret must not be empty");
        }
        if self.auth.jwt_secret == DEFAULT_JWT_SECRET {
            warn!("auth.jwt_secret is the built-in default; set a real secret for production");
        }
        if !(1..=MAX_TOKEN_TTL_HOURS).contains(&self.auth.token_ttl_hours) {
            bail!(
                "auth.token_ttl_hours must be between 1 and {}",
                MAX_TOKEN_TTL_HOURS
            );
        }
        match self.storage.backend.as_str() {
            "local" => {}
            "s3" => {
                if self.storage.s3.bucket.as_deref().unwrap_or_default().is_empty() {
                    bail!("storage.s3.bucket is required for the s3 backend");
                }
            }
            other => bail!("Unknown storage backend: {}", other),
        }
        match self.logging.format.as_str() {
            "pretty" | "json" => {}
            other => bail!("Unknown logging format: {}", other),
        }
        Ok(())
    }

    /// Token lifetime in seconds, also used as the cookie Max-Age
    pub fn token_ttl_secs(&self) -> i64 {
        self.auth.token_ttl_hours * 3600
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.toml");
        let (config, source) = Config::load(path.to_str().unwrap()).unwrap();

        assert_eq!(source, ConfigSource::Defaults);
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.auth.token_ttl_hours, 3);
        assert_eq!(config.auth.cookie_domain, "localhost");
        assert!(!config.auth.cookie_secure);
        assert_eq!(config.storage.backend, "local");
        assert_eq!(config.token_ttl_secs(), 10800);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("shop.toml");
        std::fs::write(
            &path,
            r#"
[server]
port = 9000

[auth]
jwt_secret = "s3cr3t"
cookie_secure = true
admin_password = "first-admin-pass"

[auth.argon2]
memory_kib = 8192

[storage]
backend = "s3"

[storage.s3]
bucket = "images"
endpoint = "http://minio:9000"
allow_http = true

[logging]
format = "json"
"#,
        )
        .unwrap();

        let (config, source) = Config::load(path.to_str().unwrap()).unwrap();
        assert_eq!(source, ConfigSource::File);
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.bind_address, "0.0.0.0");
        assert_eq!(config.auth.jwt_secret, "s3cr3t");
        assert!(config.auth.cookie_secure);
        assert_eq!(config.auth.admin_password.as_deref(), Some("first-admin-pass"));
        assert_eq!(config.auth.argon2.memory_kib, 8192);
        assert_eq!(
            config.auth.argon2.iterations,
            HashParams::default().iterations
        );
        assert_eq!(config.storage.s3.bucket.as_deref(), Some("images"));
        assert!(config.storage.s3.allow_http);
        assert_eq!(config.logging.level, "info");
        config.validate().unwrap();
    }

    #[test]
    fn test_validation_failures() {
        let mut config = Config::default();
        config.validate().unwrap();

        config.auth.jwt_secret = String::new();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.storage.backend = "ftp".to_string();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.storage.backend = "s3".to_string();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.logging.format = "xml".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_token_lifetime_bounds() {
        let mut config = Config::default();
        for hours in [0, -3, MAX_TOKEN_TTL_HOURS + 1, i64::MAX] {
            config.auth.token_ttl_hours = hours;
            assert!(config.validate().is_err(), "{}", hours);
        }

        config.auth.token_ttl_hours = MAX_TOKEN_TTL_HOURS;
        config.validate().unwrap();
        assert_eq!(config.token_ttl_secs(), MAX_TOKEN_TTL_HOURS * 3600);
    }

    #[test]
    fn test_invalid_toml_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "[server\nport = ").unwrap();
        assert!(Config::load(path.to_str().unwrap()).is_err());
    }
}
