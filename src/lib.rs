#![doc = "The `taskflow` library crate."]
#![doc = ""]
#![doc = "Domain models, storage backends, session handling, routing and error handling for"]
#![doc = "the TaskFlow API. The `taskflow` binary serves it; the `seed` binary loads demo data."]

pub mod auth;
pub mod config;
pub mod error;
pub mod mail;
pub mod models;
pub mod rate_limit;
pub mod routes;
pub mod security;
pub mod seed;
pub mod state;
pub mod store;
pub mod tasks;
pub mod validation;

use actix_web::{
    body::MessageBody,
    dev::{ServiceFactory, ServiceRequest, ServiceResponse},
    middleware::{Condition, Logger},
    web, App,
};

pub use crate::error::AppError;
pub use crate::state::AppState;

/// Builds the application: middleware, shared state and every route.
///
/// `/health` answers at the root as well as under `/api`; only `/api` is rate limited.
pub fn build_app(
    state: AppState,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse<impl MessageBody>,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let cors = security::cors(&state.config);
    let log_requests = state.config.log_requests;
    let rate_limiter = state.rate_limiter.clone();

    App::new()
        .app_data(web::Data::new(state))
        .app_data(validation::json_config())
        .app_data(validation::query_config())
        .wrap(security::security_headers())
        .wrap(Condition::new(log_requests, Logger::default()))
        .wrap(cors)
        .service(routes::health::health)
        .service(
            web::scope("/api")
                .wrap(rate_limiter)
                .configure(routes::config)
                .default_service(web::to(routes::not_found)),
        )
        .default_service(web::to(routes::not_found))
}
