use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use actix_web::{
    body::EitherBody,
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    Error, HttpResponse,
};
use futures::future::{ready, LocalBoxFuture, Ready};

use crate::config::Config;
use crate::error::AppError;

#[derive(Debug, Clone, Copy)]
struct Window {
    started: Instant,
    hits: u32,
}

#[derive(Debug)]
struct Table {
    windows: HashMap<String, Window>,
    last_sweep: Instant,
}

/// Fixed-window request quota keyed by client address.
///
/// Clones share the same counter table, so one limiter can be handed to every worker.
/// The key is the TCP peer's IP unless the limiter trusts a reverse proxy, in which case
/// it is the rightmost `X-Forwarded-For` entry, the one that proxy appended.
#[derive(Debug, Clone)]
pub struct RateLimiter {
    table: Arc<Mutex<Table>>,
    max_requests: u32,
    window: Duration,
    trust_proxy: bool,
}

impl RateLimiter {
    pub fn new(max_requests: u32, window: Duration) -> Self {
        Self {
            table: Arc::new(Mutex::new(Table {
                windows: HashMap::new(),
                last_sweep: Instant::now(),
            })),
            max_requests,
            window,
            trust_proxy: false,
        }
    }

    pub fn trust_proxy(mut self, trust: bool) -> Self {
        self.trust_proxy = trust;
        self
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.rate_limit_max,
            Duration::from_secs(config.rate_limit_window_secs),
        )
        .trust_proxy(config.trust_proxy)
    }

    /// Counts one request from `client` at `now`; `false` once the quota is spent.
    pub fn check_at(&self, client: &str, now: Instant) -> Result<bool, AppError> {
        let mut table = self
            .table
            .lock()
            .map_err(|_| AppError::InternalServerError("Rate limiter state poisoned".into()))?;

        // Expired windows of other clients are dropped at most once per window length.
        if now.duration_since(table.last_sweep) >= self.window {
            let window = self.window;
            table
                .windows
                .retain(|_, w| now.duration_since(w.started) < window);
            table.last_sweep = now;
        }

        let entry = table
            .windows
            .entry(client.to_string())
            .or_insert(Window {
                started: now,
                hits: 0,
            });
        if now.duration_since(entry.started) >= self.window {
            *entry = Window {
                started: now,
                hits: 0,
            };
        }
        if entry.hits >= self.max_requests {
            return Ok(false);
        }
        entry.hits += 1;
        Ok(true)
    }

    pub fn check(&self, client: &str) -> Result<bool, AppError> {
        self.check_at(client, Instant::now())
    }

    #[cfg(test)]
    fn tracked_clients(&self) -> usize {
        self.table.lock().map(|t| t.windows.len()).unwrap_or(0)
    }

    /// Address the quota is charged to.
    fn client_key(&self, req: &ServiceRequest) -> String {
        if self.trust_proxy {
            let forwarded = req
                .headers()
                .get("x-forwarded-for")
                .and_then(|value| value.to_str().ok())
                .and_then(|value| value.rsplit(',').next())
                .map(str::trim)
                .filter(|hop| !hop.is_empty());
            if let Some(hop) = forwarded {
                return hop.to_string();
            }
        }
        req.peer_addr()
            .map(|addr| addr.ip().to_string())
            .unwrap_or_else(|| "unknown".to_string())
    }
}

impl<S, B> Transform<S, ServiceRequest> for RateLimiter
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Transform = RateLimiterService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RateLimiterService {
            service,
            limiter: self.clone(),
        }))
    }
}

pub struct RateLimiterService<S> {
    service: S,
    limiter: RateLimiter,
}

impl<S, B> Service<ServiceRequest> for RateLimiterService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let client = self.limiter.client_key(&req);

        let rejection = match self.limiter.check(&client) {
            Ok(true) => None,
            Ok(false) => {
                log::warn!("Rate limit exceeded for {}", client);
                Some(AppError::TooManyRequests)
            }
            Err(err) => Some(err),
        };

        match rejection {
            None => {
                let fut = self.service.call(req);
                Box::pin(async move {
                    let res = fut.await?;
                    Ok(res.map_into_left_body())
                })
            }
            Some(err) => {
                let response = HttpResponse::from_error(err).map_into_right_body();
                Box::pin(async move { Ok(req.into_response(response)) })
            }
        }
    }
}
