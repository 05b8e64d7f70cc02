use std::env;
use std::fmt;

use regex::Regex;

/// Where users and tasks are persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Storage {
    Postgres { database_url: String },
    Memory,
}

#[derive(Debug)]
pub enum ConfigError {
    Missing(&'static str),
    Invalid { key: &'static str, reason: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ConfigError::Missing(key) => write!(f, "{} must be set", key),
            ConfigError::Invalid { key, reason } => write!(f, "{} is invalid: {}", key, reason),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Process-wide settings, read once at startup and shared read-only afterwards.
#[derive(Debug, Clone)]
pub struct Config {
    pub storage: Storage,
    pub server_host: String,
    pub server_port: u16,
    pub jwt_secret: String,
    pub session_ttl_days: i64,
    pub cookie_secure: bool,
    pub bcrypt_cost: u32,
    pub client_url: String,
    pub allowed_origins: Vec<String>,
    pub origin_pattern: Option<Regex>,
    pub rate_limit_max: u32,
    pub rate_limit_window_secs: u64,
    /// Key the rate limiter on the hop appended by a reverse proxy instead of the peer.
    pub trust_proxy: bool,
    pub log_requests: bool,
}

fn var(key: &'static str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parsed<T>(key: &'static str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: fmt::Display,
{
    match var(key) {
        Some(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            key,
            reason: e.to_string(),
        }),
        None => Ok(default),
    }
}

impl Config {
    /// Defaults for everything except the signing secret; storage is in-memory.
    pub fn with_defaults(jwt_secret: &str) -> Self {
        Self {
            storage: Storage::Memory,
            server_host: "127.0.0.1".to_string(),
            server_port: 5000,
            jwt_secret: jwt_secret.to_string(),
            session_ttl_days: 7,
            cookie_secure: true,
            bcrypt_cost: bcrypt::DEFAULT_COST,
            client_url: "http://localhost:3000".to_string(),
            allowed_origins: Vec::new(),
            origin_pattern: None,
            rate_limit_max: 100,
            rate_limit_window_secs: 15 * 60,
            trust_proxy: false,
            log_requests: true,
        }
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        let jwt_secret = var("JWT_SECRET").ok_or(ConfigError::Missing("JWT_SECRET"))?;
        let mut config = Self::with_defaults(&jwt_secret);

        config.storage = match var("STORAGE").as_deref() {
            Some("memory") => Storage::Memory,
            None | Some("postgres") => Storage::Postgres {
                database_url: var("DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?,
            },
            Some(other) => {
                return Err(ConfigError::Invalid {
                    key: "STORAGE",
                    reason: format!("expected `postgres` or `memory`, got `{}`", other),
                })
            }
        };

        if let Some(host) = var("SERVER_HOST") {
            config.server_host = host;
        }
        config.server_port = parsed("SERVER_PORT", config.server_port)?;
        config.session_ttl_days = parsed("SESSION_TTL_DAYS", config.session_ttl_days)?;
        config.cookie_secure = parsed("COOKIE_SECURE", config.cookie_secure)?;
        config.bcrypt_cost = parsed("BCRYPT_COST", config.bcrypt_cost)?;
        if let Some(url) = var("CLIENT_URL") {
            config.client_url = url.trim_end_matches('/').to_string();
        }
        config.allowed_origins = var("CORS_ALLOWED_ORIGINS")
            .map(|raw| {
                raw.split(',')
                    .map(|o| o.trim().trim_end_matches('/').to_string())
                    .filter(|o| !o.is_empty())
                    .collect()
            })
            .unwrap_or_default();
        config.origin_pattern = var("CORS_ORIGIN_PATTERN")
            .map(|raw| Regex::new(&raw))
            .transpose()
            .map_err(|e| ConfigError::Invalid {
                key: "CORS_ORIGIN_PATTERN",
                reason: e.to_string(),
            })?;
        config.rate_limit_max = parsed("RATE_LIMIT_MAX", config.rate_limit_max)?;
        config.rate_limit_window_secs =
            parsed("RATE_LIMIT_WINDOW_SECS", config.rate_limit_window_secs)?;
        config.trust_proxy = parsed("TRUST_PROXY", config.trust_proxy)?;
        config.log_requests = var("APP_ENV").as_deref() != Some("production");

        Ok(config)
    }

    pub fn server_url(&self) -> String {
        format!("http://{}:{}", self.server_host, self.server_port)
    }

    /// CORS policy: the front-end URL, the extra allow-list, or the preview pattern.
    pub fn is_origin_allowed(&self, origin: &str) -> bool {
        origin == self.client_url
            || self.allowed_origins.iter().any(|o| o == origin)
            || self
                .origin_pattern
                .as_ref()
                .map_or(false, |pattern| pattern.is_match(origin))
    }
}
