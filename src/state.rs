use std::sync::Arc;

use crate::auth::{Credentials, SessionIssuer};
use crate::config::{Config, Storage};
use crate::error::AppError;
use crate::mail::{LogMailer, Mailer};
use crate::rate_limit::RateLimiter;
use crate::store::{MemoryStore, PgStore, TaskStore, UserStore};
use crate::tasks::TaskService;

/// Everything a handler needs, shared across workers via `web::Data`.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub sessions: SessionIssuer,
    pub credentials: Credentials,
    pub tasks: TaskService,
    pub mailer: Arc<dyn Mailer>,
    pub rate_limiter: RateLimiter,
}

impl AppState {
    pub fn new(
        config: Config,
        users: Arc<dyn UserStore>,
        tasks: Arc<dyn TaskStore>,
        mailer: Arc<dyn Mailer>,
    ) -> Self {
        Self {
            sessions: SessionIssuer::from_config(&config),
            credentials: Credentials::new(users, config.bcrypt_cost),
            tasks: TaskService::new(tasks),
            mailer,
            rate_limiter: RateLimiter::from_config(&config),
            config: Arc::new(config),
        }
    }

    /// State backed by a fresh in-memory store.
    pub fn in_memory(config: Config) -> Self {
        let store = Arc::new(MemoryStore::new());
        Self::new(config, store.clone(), store, Arc::new(LogMailer))
    }

    /// Opens the configured backend; PostgreSQL migrations run here.
    pub async fn from_config(config: Config) -> Result<Self, AppError> {
        match &config.storage {
            Storage::Postgres { database_url } => {
                let store = Arc::new(PgStore::connect(database_url).await?);
                Ok(Self::new(config, store.clone(), store, Arc::new(LogMailer)))
            }
            Storage::Memory => {
                log::warn!("Using in-memory storage; data is lost on restart");
                Ok(Self::in_memory(config))
            }
        }
    }
}
