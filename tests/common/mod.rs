#![allow(dead_code)]

use actix_http::Request;
use actix_web::{
    body::MessageBody,
    cookie::Cookie,
    dev::{Service, ServiceResponse},
    test, Error,
};
use serde_json::{json, Value};
use taskflow::{config::Config, AppState};

pub const TEST_SECRET: &str = "integration-test-secret";

/// Memory-backed config with a cheap bcrypt cost and request logging off.
pub fn test_config() -> Config {
    let mut config = Config::with_defaults(TEST_SECRET);
    config.bcrypt_cost = 4;
    config.log_requests = false;
    config
}

pub fn test_state() -> AppState {
    AppState::in_memory(test_config())
}

pub fn session_cookie<B>(resp: &ServiceResponse<B>) -> Option<Cookie<'static>> {
    resp.response()
        .cookies()
        .find(|c| c.name() == "token")
        .map(|c| c.into_owned())
}

/// Registers a user and returns the session cookie from the response.
pub async fn register<S, B>(app: &S, name: &str, email: &str, password: &str) -> Cookie<'static>
where
    S: Service<Request, Response = ServiceResponse<B>, Error = Error>,
    B: MessageBody,
{
    let req = test::TestRequest::post()
        .uri("/api/auth/register")
        .set_json(json!({ "name": name, "email": email, "password": password }))
        .to_request();
    let resp = test::call_service(app, req).await;
    assert_eq!(resp.status(), 201, "registration of {} failed", email);
    session_cookie(&resp).expect("register sets the session cookie")
}

/// Creates a task as the session owner and returns the `task` object.
pub async fn create_task<S, B>(app: &S, cookie: &Cookie<'static>, body: Value) -> Value
where
    S: Service<Request, Response = ServiceResponse<B>, Error = Error>,
    B: MessageBody,
{
    let req = test::TestRequest::post()
        .uri("/api/tasks")
        .cookie(cookie.clone())
        .set_json(body)
        .to_request();
    let resp = test::call_service(app, req).await;
    assert_eq!(resp.status(), 201);
    let body: Value = test::read_body_json(resp).await;
    body["task"].clone()
}
