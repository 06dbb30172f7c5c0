use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::env;
use std::path::Path;
use validator::Validate;

const DEFAULT_LOG_LEVEL: &str = "info";
const DEFAULT_ENV: &str = "development";
const DEFAULT_PORT: u16 = 8080;
const CONFIG_DIR: &str = "config";

/// Application configuration, loaded from layered files plus `APP__`-prefixed
/// environment variables.
#[derive(Clone, Debug, Deserialize, Validate)]
pub struct AppConfig {
    /// Database connection URL
    pub database_url: String,

    /// Secret used to validate incoming bearer tokens (issuance is handled
    /// by the identity service, not this API)
    #[validate(length(min = 32))]
    pub jwt_secret: String,

    /// Expected `iss` claim on incoming tokens
    #[serde(default = "default_auth_issuer")]
    pub auth_issuer: String,

    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Application environment ("development", "test", "production")
    #[serde(default = "default_environment")]
    pub environment: String,

    /// Logging level
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Log in JSON format (structured logging)
    #[serde(default)]
    pub log_json: bool,

    /// Whether to run database migrations on startup
    #[serde(default)]
    pub auto_migrate: bool,

    /// Per-request timeout in seconds
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    #[serde(default = "default_db_max_connections")]
    pub db_max_connections: u32,

    #[serde(default = "default_db_min_connections")]
    pub db_min_connections: u32,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    DEFAULT_PORT
}
fn default_environment() -> String {
    DEFAULT_ENV.to_string()
}
fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}
fn default_auth_issuer() -> String {
    "ev-sales-portal".to_string()
}
fn default_request_timeout_secs() -> u64 {
    30
}
fn default_db_max_connections() -> u32 {
    10
}
fn default_db_min_connections() -> u32 {
    1
}

impl AppConfig {
    /// Programmatic constructor, used by the test harness.
    pub fn new(database_url: String, jwt_secret: String, host: String, port: u16) -> Self {
        Self {
            database_url,
            jwt_secret,
            auth_issuer: default_auth_issuer(),
            host,
            port,
            environment: "test".to_string(),
            log_level: default_log_level(),
            log_json: false,
            auto_migrate: false,
            request_timeout_secs: default_request_timeout_secs(),
            db_max_connections: default_db_max_connections(),
            db_min_connections: default_db_min_connections(),
        }
    }

    pub fn is_production(&self) -> bool {
        self.environment.eq_ignore_ascii_case("production")
    }

    pub fn log_level(&self) -> &str {
        &self.log_level
    }
}

/// Load configuration from `config/default.toml`, an optional
/// environment-specific file, and `APP__*` environment variables, in that
/// order of increasing precedence.
pub fn load_config() -> Result<AppConfig, ConfigError> {
    let run_env = env::var("APP_ENV").unwrap_or_else(|_| DEFAULT_ENV.to_string());

    let mut builder = Config::builder();
    let default_path = Path::new(CONFIG_DIR).join("default.toml");
    if default_path.exists() {
        builder = builder.add_source(File::from(default_path));
    }
    let env_path = Path::new(CONFIG_DIR).join(format!("{run_env}.toml"));
    if env_path.exists() {
        builder = builder.add_source(File::from(env_path));
    }
    builder = builder.add_source(Environment::with_prefix("APP").separator("__"));

    let cfg: AppConfig = builder.build()?.try_deserialize()?;
    cfg.validate()
        .map_err(|e| ConfigError::Message(format!("invalid configuration: {e}")))?;
    Ok(cfg)
}

/// Initialize the tracing subscriber. `RUST_LOG` overrides the configured
/// level when set.
pub fn init_tracing(level: &str, json: bool) {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let default_directive = format!("ev_sales_api={level},tower_http=info");
    let filter = env::var("RUST_LOG")
        .ok()
        .filter(|s| !s.trim().is_empty())
        .unwrap_or(default_directive);

    let registry = tracing_subscriber::registry().with(EnvFilter::new(filter));
    if json {
        let _ = registry.with(fmt::layer().json()).try_init();
    } else {
        let _ = registry.with(fmt::layer()).try_init();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_jwt_secret_fails_validation() {
        let cfg = AppConfig::new(
            "sqlite::memory:".to_string(),
            "short".to_string(),
            "127.0.0.1".to_string(),
            0,
        );
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn programmatic_config_is_valid() {
        let cfg = AppConfig::new(
            "sqlite::memory:".to_string(),
            "a_test_secret_key_that_is_long_enough_for_validation".to_string(),
            "127.0.0.1".to_string(),
            18080,
        );
        assert!(cfg.validate().is_ok());
        assert!(!cfg.is_production());
    }
}
