mod common;

use actix_web::HttpServer;
use reqwest::header::{COOKIE, SET_COOKIE};
use serde_json::{json, Value};
use taskflow::build_app;

use common::test_config;

#[actix_rt::test]
async fn test_cookie_session_over_http() {
    let mut config = test_config();
    config.cookie_secure = false;
    let state = taskflow::AppState::in_memory(config);

    let server = HttpServer::new(move || build_app(state.clone()))
        .workers(1)
        .bind(("127.0.0.1", 0))
        .unwrap();
    let addr = server.addrs()[0];
    let handle = server.run();
    let server_handle = handle.handle();
    actix_rt::spawn(handle);

    let base = format!("http://{}", addr);
    let client = reqwest::Client::new();

    let resp = client
        .post(format!("{}/api/auth/register", base))
        .json(&json!({ "name": "Ada", "email": "ada@example.com", "password": "secret1" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 201);
    let set_cookie = resp
        .headers()
        .get(SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .unwrap()
        .to_string();
    assert!(set_cookie.starts_with("token="));
    assert!(set_cookie.contains("HttpOnly"));
    assert!(set_cookie.contains("SameSite=Lax"));
    let session = set_cookie.split(';').next().unwrap().to_string();

    let resp = client
        .post(format!("{}/api/tasks", base))
        .header(COOKIE, &session)
        .json(&json!({ "title": "Over the wire" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 201);

    let body: Value = client
        .get(format!("{}/api/tasks", base))
        .header(COOKIE, &session)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["count"], 1);
    assert_eq!(body["tasks"][0]["title"], "Over the wire");

    let resp = client.get(format!("{}/api/tasks", base)).send().await.unwrap();
    assert_eq!(resp.status(), 401);

    server_handle.stop(true).await;
}
