use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub cache: CacheConfig,
    pub rate_limit: RateLimitConfig,
    pub cors: CorsConfig,
    pub pagination: PaginationConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
    pub request_timeout_secs: u64,
    pub shutdown_timeout_secs: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DatabaseBackend {
    Postgres,
    Memory,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub backend: DatabaseBackend,
    #[serde(skip_serializing)]
    pub url: Option<String>,
    pub max_connections: u32,
    pub connection_timeout: u64,
    pub run_migrations: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    #[serde(skip_serializing)]
    pub jwt_secret: String,
    pub jwt_issuer: String,
    pub access_token_expiry_mins: i64,
    pub refresh_token_expiry_mins: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    #[serde(skip_serializing)]
    pub redis_url: Option<String>,
    pub journal_ttl_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    pub enabled: bool,
    pub requests_per_second: f64,
    pub burst: u32,
    pub idle_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorsConfig {
    /// `*` allows any origin
    pub allow_origins: Vec<String>,
    pub max_age_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaginationConfig {
    pub default_limit: i64,
    pub max_limit: i64,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        // Set defaults based on environment, then override with specific env vars
        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        // Server overrides
        if let Ok(v) = env::var("SERVER_PORT") {
            self.server.port = v.parse().unwrap_or(self.server.port);
        }
        if let Ok(v) = env::var("SERVER_REQUEST_TIMEOUT_SECS") {
            self.server.request_timeout_secs = v.parse().unwrap_or(self.server.request_timeout_secs);
        }
        if let Ok(v) = env::var("SERVER_SHUTDOWN_TIMEOUT_SECS") {
            self.server.shutdown_timeout_secs = v.parse().unwrap_or(self.server.shutdown_timeout_secs);
        }

        // Database overrides
        if let Ok(v) = env::var("DATABASE_BACKEND") {
            self.database.backend = match v.to_ascii_lowercase().as_str() {
                "memory" => DatabaseBackend::Memory,
                "postgres" | "postgresql" => DatabaseBackend::Postgres,
                _ => self.database.backend,
            };
        }
        if let Ok(v) = env::var("DATABASE_URL") {
            self.database.url = Some(v).filter(|s| !s.is_empty());
        }
        if let Ok(v) = env::var("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = v.parse().unwrap_or(self.database.max_connections);
        }
        if let Ok(v) = env::var("DATABASE_CONNECTION_TIMEOUT") {
            self.database.connection_timeout = v.parse().unwrap_or(self.database.connection_timeout);
        }
        if let Ok(v) = env::var("DATABASE_RUN_MIGRATIONS") {
            self.database.run_migrations = v.parse().unwrap_or(self.database.run_migrations);
        }

        // Auth overrides
        if let Ok(v) = env::var("JWT_SECRET") {
            self.auth.jwt_secret = v;
        }
        if let Ok(v) = env::var("JWT_ISSUER") {
            self.auth.jwt_issuer = v;
        }
        if let Ok(v) = env::var("JWT_ACCESS_TOKEN_EXPIRY") {
            self.auth.access_token_expiry_mins = v.parse().unwrap_or(self.auth.access_token_expiry_mins);
        }
        if let Ok(v) = env::var("JWT_REFRESH_TOKEN_EXPIRY") {
            self.auth.refresh_token_expiry_mins = v.parse().unwrap_or(self.auth.refresh_token_expiry_mins);
        }

        // Cache overrides
        if let Ok(v) = env::var("REDIS_URL") {
            self.cache.redis_url = Some(v).filter(|s| !s.is_empty());
        }
        if let Ok(v) = env::var("CACHE_JOURNAL_TTL_SECS") {
            self.cache.journal_ttl_secs = v.parse().unwrap_or(self.cache.journal_ttl_secs);
        }

        // Rate limit overrides
        if let Ok(v) = env::var("RATE_LIMIT_ENABLED") {
            self.rate_limit.enabled = v.parse().unwrap_or(self.rate_limit.enabled);
        }
        if let Ok(v) = env::var("RATE_LIMIT_RPS") {
            self.rate_limit.requests_per_second = v.parse().unwrap_or(self.rate_limit.requests_per_second);
        }
        if let Ok(v) = env::var("RATE_LIMIT_BURST") {
            self.rate_limit.burst = v.parse().unwrap_or(self.rate_limit.burst);
        }
        if let Ok(v) = env::var("RATE_LIMIT_IDLE_SECS") {
            self.rate_limit.idle_secs = v.parse().unwrap_or(self.rate_limit.idle_secs);
        }

        // CORS overrides
        if let Ok(v) = env::var("CORS_ALLOW_ORIGINS") {
            self.cors.allow_origins = v
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }
        if let Ok(v) = env::var("CORS_MAX_AGE") {
            self.cors.max_age_secs = v.parse().unwrap_or(self.cors.max_age_secs);
        }

        self
    }

    pub fn development() -> Self {
        Self {
            environment: Environment::Development,
            server: ServerConfig {
                port: 8080,
                request_timeout_secs: 30,
                shutdown_timeout_secs: 10,
            },
            database: DatabaseConfig {
                backend: DatabaseBackend::Postgres,
                url: None,
                max_connections: 10,
                connection_timeout: 30,
                run_migrations: true,
            },
            auth: AuthConfig {
                jwt_secret: String::new(),
                jwt_issuer: "tradejournal".to_string(),
                access_token_expiry_mins: 15,
                refresh_token_expiry_mins: 60 * 24 * 7,
            },
            cache: CacheConfig {
                redis_url: None,
                journal_ttl_secs: 15 * 60,
            },
            rate_limit: RateLimitConfig {
                enabled: false,
                requests_per_second: 10.0,
                burst: 20,
                idle_secs: 600,
            },
            cors: CorsConfig {
                allow_origins: vec!["*".to_string()],
                max_age_secs: 12 * 60 * 60,
            },
            pagination: PaginationConfig {
                default_limit: 20,
                max_limit: 100,
            },
        }
    }

    pub fn staging() -> Self {
        let mut config = Self::development();
        config.environment = Environment::Staging;
        config.server.request_timeout_secs = 15;
        config.database.max_connections = 20;
        config.database.connection_timeout = 10;
        config.rate_limit.enabled = true;
        config.cors.allow_origins = vec!["https://staging.example.com".to_string()];
        config
    }

    pub fn production() -> Self {
        let mut config = Self::development();
        config.environment = Environment::Production;
        config.server.request_timeout_secs = 10;
        config.database.max_connections = 50;
        config.database.connection_timeout = 5;
        config.database.run_migrations = false;
        config.rate_limit.enabled = true;
        config.cors.allow_origins = vec!["https://app.example.com".to_string()];
        config
    }

    pub fn is_production(&self) -> bool {
        matches!(self.environment, Environment::Production)
    }
}

// Global singleton config - initialized once at startup
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

// Convenience function for accessing config
pub fn config() -> &'static AppConfig {
    &CONFIG
}
