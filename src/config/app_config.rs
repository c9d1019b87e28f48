use serde::Deserialize;

use crate::infrastructure::auth::JwtConfig;
use crate::infrastructure::observability::ObservabilityConfig;
use crate::infrastructure::storage::{PostgresConfig, StorageConfig, StorageType};

/// Application configuration
#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub storage: StorageSettings,
    #[serde(default)]
    pub auth: AuthSettings,
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// `[storage]` section
#[derive(Debug, Clone, Deserialize)]
pub struct StorageSettings {
    /// `memory` or `postgres`
    #[serde(default = "default_backend")]
    pub backend: String,
    #[serde(default)]
    pub database_url: Option<String>,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Seconds to wait for a pooled connection
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
    /// Apply pending migrations on startup
    #[serde(default = "default_true")]
    pub run_migrations: bool,
}

/// `[auth]` section
#[derive(Debug, Clone, Deserialize)]
pub struct AuthSettings {
    #[serde(default)]
    pub jwt_secret: Option<String>,
    #[serde(default = "default_expiration_hours")]
    pub expiration_hours: u64,
}

/// Raised when the loaded configuration cannot be turned into runtime settings
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("Unknown storage backend '{0}'")]
    UnknownBackend(String),

    #[error("storage.database_url is required for the postgres backend")]
    MissingDatabaseUrl,
}

fn default_backend() -> String {
    "memory".to_string()
}

fn default_max_connections() -> u32 {
    10
}

fn default_connect_timeout_secs() -> u64 {
    30
}

fn default_true() -> bool {
    true
}

fn default_expiration_hours() -> u64 {
    24
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
        }
    }
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            database_url: None,
            max_connections: default_max_connections(),
            connect_timeout_secs: default_connect_timeout_secs(),
            run_migrations: true,
        }
    }
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self {
            jwt_secret: None,
            expiration_hours: default_expiration_hours(),
        }
    }
}

impl StorageSettings {
    /// Resolve the configured backend. `DATABASE_URL` is honoured when
    /// `database_url` is not set.
    pub fn to_storage_config(&self) -> Result<StorageConfig, SettingsError> {
        let backend = StorageType::parse(&self.backend)
            .ok_or_else(|| SettingsError::UnknownBackend(self.backend.clone()))?;

        match backend {
            StorageType::InMemory => Ok(StorageConfig::in_memory()),
            StorageType::Postgres => {
                let url = self
                    .database_url
                    .clone()
                    .or_else(|| std::env::var("DATABASE_URL").ok())
                    .ok_or(SettingsError::MissingDatabaseUrl)?;

                Ok(StorageConfig::postgres(self.postgres_config(url)))
            }
        }
    }

    /// Pool settings for `url` with the configured limits
    pub fn postgres_config(&self, url: String) -> PostgresConfig {
        PostgresConfig::new(url)
            .with_max_connections(self.max_connections)
            .with_connect_timeout(self.connect_timeout_secs)
    }
}

impl AuthSettings {
    /// JWT settings, falling back to `JWT_SECRET` and then a random secret
    pub fn to_jwt_config(&self) -> JwtConfig {
        self.jwt_config_with(std::env::var("JWT_SECRET").ok())
    }

    fn jwt_config_with(&self, env_secret: Option<String>) -> JwtConfig {
        match self.jwt_secret.clone().or(env_secret) {
            Some(secret) => JwtConfig::new(secret, self.expiration_hours),
            None => {
                tracing::warn!(
                    "No JWT secret configured. Generating a random secret; \
                     sessions will not persist across restarts. \
                     Set APP__AUTH__JWT_SECRET for persistent sessions."
                );
                JwtConfig::with_random_secret(self.expiration_hours)
            }
        }
    }
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(
                config::Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Load configuration, falling back to defaults. The load error is
    /// handed back so it can be logged once a subscriber is installed.
    pub fn load_or_default() -> (Self, Option<config::ConfigError>) {
        match Self::load() {
            Ok(config) => (config, None),
            Err(e) => (Self::default(), Some(e)),
        }
    }
}
