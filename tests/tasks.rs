mod common;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use actix_web::http::StatusCode;
use actix_web::test;
use async_trait::async_trait;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use taskflow::auth::SessionIssuer;
use taskflow::build_app;
use taskflow::mail::LogMailer;
use taskflow::models::Task;
use taskflow::store::{MemoryStore, NewTask, TaskChanges, TaskFilter, TaskStore};
use taskflow::{AppError, AppState};
use uuid::Uuid;

use common::{create_task, register, session_cookie, test_config, test_state, TEST_SECRET};

#[actix_rt::test]
async fn test_demo_scenario() {
    let app = test::init_service(build_app(test_state())).await;
    register(&app, "Demo", "demo@x.test", "Demo1234!").await;

    let req = test::TestRequest::post()
        .uri("/api/auth/login")
        .set_json(json!({ "email": "demo@x.test", "password": "Demo1234!" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let cookie = session_cookie(&resp).unwrap();

    create_task(&app, &cookie, json!({ "title": "A" })).await;

    let req = test::TestRequest::get()
        .uri("/api/tasks")
        .cookie(cookie)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["count"], 1);
    assert_eq!(body["tasks"][0]["title"], "A");
    assert_eq!(body["tasks"][0]["status"], "todo");
    assert_eq!(body["tasks"][0]["priority"], "medium");
}

#[actix_rt::test]
async fn test_task_crud_lifecycle() {
    let app = test::init_service(build_app(test_state())).await;
    let cookie = register(&app, "Ada", "ada@example.com", "secret1").await;

    let task = create_task(
        &app,
        &cookie,
        json!({
            "title": "  Write spec  ",
            "description": "First draft",
            "priority": "high",
            "dueDate": "2030-01-15"
        }),
    )
    .await;
    let id = task["_id"].as_str().unwrap().to_string();
    assert_eq!(task["title"], "Write spec");
    assert_eq!(task["status"], "todo");
    assert_eq!(task["priority"], "high");
    assert!(task["dueDate"].as_str().unwrap().starts_with("2030-01-15T00:00:00"));
    assert!(task["user"].is_string());
    assert!(task["createdAt"].is_string());

    let req = test::TestRequest::get()
        .uri(&format!("/api/tasks/{}", id))
        .cookie(cookie.clone())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["task"], task);

    let req = test::TestRequest::put()
        .uri(&format!("/api/tasks/{}", id))
        .cookie(cookie.clone())
        .set_json(json!({ "status": "in-progress", "description": "" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["task"]["status"], "in-progress");
    assert_eq!(body["task"]["description"], "");
    assert_eq!(body["task"]["title"], "Write spec");

    let req = test::TestRequest::delete()
        .uri(&format!("/api/tasks/{}", id))
        .cookie(cookie.clone())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(
        body,
        json!({ "success": true, "message": "Task deleted successfully" })
    );

    let req = test::TestRequest::delete()
        .uri(&format!("/api/tasks/{}", id))
        .cookie(cookie)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "Task not found");
}

#[actix_rt::test]
async fn test_other_users_tasks_are_forbidden() {
    let app = test::init_service(build_app(test_state())).await;
    let owner = register(&app, "Owner", "owner@example.com", "secret1").await;
    let intruder = register(&app, "Intruder", "intruder@example.com", "secret1").await;

    let task = create_task(&app, &owner, json!({ "title": "Private" })).await;
    let uri = format!("/api/tasks/{}", task["_id"].as_str().unwrap());

    let requests = vec![
        (test::TestRequest::get().uri(&uri), "access"),
        (
            test::TestRequest::put()
                .uri(&uri)
                .set_json(json!({ "title": "Hijacked" })),
            "update",
        ),
        (test::TestRequest::delete().uri(&uri), "delete"),
    ];
    for (req, action) in requests {
        let resp = test::call_service(&app, req.cookie(intruder.clone()).to_request()).await;
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["success"], false);
        assert_eq!(
            body["message"],
            format!("Not authorized to {} this task", action)
        );
    }

    let req = test::TestRequest::get().uri("/api/tasks").cookie(intruder).to_request();
    let body: Value = test::read_body_json(test::call_service(&app, req).await).await;
    assert_eq!(body["count"], 0);

    let req = test::TestRequest::get().uri(&uri).cookie(owner).to_request();
    let body: Value = test::read_body_json(test::call_service(&app, req).await).await;
    assert_eq!(body["task"]["title"], "Private");
}

#[actix_rt::test]
async fn test_update_ignores_identity_fields() {
    let app = test::init_service(build_app(test_state())).await;
    let cookie = register(&app, "Ada", "ada@example.com", "secret1").await;
    let task = create_task(&app, &cookie, json!({ "title": "Mine" })).await;
    let uri = format!("/api/tasks/{}", task["_id"].as_str().unwrap());

    let req = test::TestRequest::put()
        .uri(&uri)
        .cookie(cookie)
        .set_json(json!({
            "_id": Uuid::new_v4(),
            "user": Uuid::new_v4(),
            "createdAt": "2001-01-01T00:00:00Z",
            "priority": "low"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;

    assert_eq!(body["task"]["_id"], task["_id"]);
    assert_eq!(body["task"]["user"], task["user"]);
    assert_eq!(body["task"]["createdAt"], task["createdAt"]);
    assert_eq!(body["task"]["priority"], "low");
}

#[actix_rt::test]
async fn test_list_filters_and_sorting() {
    let app = test::init_service(build_app(test_state())).await;
    let cookie = register(&app, "Ada", "ada@example.com", "secret1").await;

    create_task(&app, &cookie, json!({ "title": "b", "status": "done", "priority": "low" })).await;
    create_task(&app, &cookie, json!({ "title": "a", "priority": "high" })).await;
    create_task(&app, &cookie, json!({ "title": "c", "status": "done" })).await;

    let list = |query: &str| {
        test::TestRequest::get()
            .uri(&format!("/api/tasks{}", query))
            .cookie(cookie.clone())
            .to_request()
    };

    let body: Value = test::read_body_json(test::call_service(&app, list("?status=done")).await).await;
    assert_eq!(body["count"], 2);
    assert!(body["tasks"]
        .as_array()
        .unwrap()
        .iter()
        .all(|t| t["status"] == "done"));

    let body: Value =
        test::read_body_json(test::call_service(&app, list("?sortBy=title&order=asc")).await).await;
    let titles: Vec<&str> = body["tasks"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, vec!["a", "b", "c"]);

    let body: Value = test::read_body_json(test::call_service(&app, list("")).await).await;
    let titles: Vec<&str> = body["tasks"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, vec!["c", "a", "b"]);

    let body: Value =
        test::read_body_json(test::call_service(&app, list("?status=archived")).await).await;
    assert_eq!(body["count"], 0);
}

#[actix_rt::test]
async fn test_create_validation_errors() {
    let app = test::init_service(build_app(test_state())).await;
    let cookie = register(&app, "Ada", "ada@example.com", "secret1").await;

    let req = test::TestRequest::post()
        .uri("/api/tasks")
        .cookie(cookie.clone())
        .set_json(json!({
            "title": "",
            "status": "blocked",
            "priority": "urgent",
            "dueDate": "next tuesday"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    let fields: Vec<&str> = body["errors"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["field"].as_str().unwrap())
        .collect();
    assert_eq!(fields, vec!["dueDate", "priority", "status", "title"]);

    let req = test::TestRequest::get().uri("/api/tasks").cookie(cookie).to_request();
    let body: Value = test::read_body_json(test::call_service(&app, req).await).await;
    assert_eq!(body["count"], 0);
}

#[actix_rt::test]
async fn test_missing_and_malformed_ids() {
    let app = test::init_service(build_app(test_state())).await;
    let cookie = register(&app, "Ada", "ada@example.com", "secret1").await;

    for id in [Uuid::new_v4().to_string(), "not-an-id".to_string()] {
        let req = test::TestRequest::get()
            .uri(&format!("/api/tasks/{}", id))
            .cookie(cookie.clone())
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }
}

/// Task store that counts every call before delegating.
#[derive(Default)]
struct CountingStore {
    inner: MemoryStore,
    calls: AtomicUsize,
}

impl CountingStore {
    fn hit(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl TaskStore for CountingStore {
    async fn insert_task(&self, task: NewTask) -> Result<Task, AppError> {
        self.hit();
        self.inner.insert_task(task).await
    }

    async fn find_task(&self, id: Uuid) -> Result<Option<Task>, AppError> {
        self.hit();
        self.inner.find_task(id).await
    }

    async fn find_tasks(&self, filter: &TaskFilter) -> Result<Vec<Task>, AppError> {
        self.hit();
        self.inner.find_tasks(filter).await
    }

    async fn update_task(&self, id: Uuid, changes: TaskChanges) -> Result<Option<Task>, AppError> {
        self.hit();
        self.inner.update_task(id, changes).await
    }

    async fn delete_task(&self, id: Uuid) -> Result<bool, AppError> {
        self.hit();
        self.inner.delete_task(id).await
    }
}

#[actix_rt::test]
async fn test_unauthenticated_requests_never_reach_the_store() {
    let tasks = Arc::new(CountingStore::default());
    let state = AppState::new(
        test_config(),
        Arc::new(MemoryStore::new()),
        tasks.clone(),
        Arc::new(LogMailer),
    );
    let app = test::init_service(build_app(state)).await;

    let expired = SessionIssuer::new(TEST_SECRET, -1, true)
        .issue(Uuid::new_v4())
        .unwrap();
    let forged = SessionIssuer::new("some-other-secret", 7, true)
        .issue(Uuid::new_v4())
        .unwrap();

    let requests = vec![
        test::TestRequest::get().uri("/api/tasks"),
        test::TestRequest::get()
            .uri("/api/tasks")
            .cookie(actix_web::cookie::Cookie::new("token", expired)),
        test::TestRequest::get()
            .uri("/api/tasks")
            .cookie(actix_web::cookie::Cookie::new("token", forged)),
        test::TestRequest::post()
            .uri("/api/tasks")
            .set_json(json!({ "title": "sneaky" })),
        test::TestRequest::delete().uri(&format!("/api/tasks/{}", Uuid::new_v4())),
    ];
    for req in requests {
        let resp = test::call_service(&app, req.to_request()).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["success"], false);
    }

    assert_eq!(tasks.calls.load(Ordering::SeqCst), 0);
}
