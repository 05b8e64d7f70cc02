//! Task endpoints. Every route here sits behind `AuthMiddleware`; ownership checks live in
//! `TaskService`.

use actix_web::{delete, get, post, put, web, HttpResponse, Responder};
use serde_json::json;

use crate::{
    auth::AuthenticatedUserId,
    error::AppError,
    models::{CreateTaskRequest, TaskQuery, UpdateTaskRequest},
    state::AppState,
    validation::ValidatedJson,
};

/// Retrieves the authenticated user's tasks.
///
/// ## Query Parameters:
/// - `status` (optional): `todo`, `in-progress` or `done`.
/// - `priority` (optional): `low`, `medium` or `high`.
/// - `sortBy` (optional): `createdAt` (default), `updatedAt`, `dueDate`, `title`, `status`, `priority`.
/// - `order` (optional): `asc`, anything else sorts descending.
///
/// ## Responses:
/// - `200 OK`: `{success, count, tasks}`.
/// - `401 Unauthorized`: no valid session.
#[get("")]
pub async fn get_tasks(
    state: web::Data<AppState>,
    user_id: AuthenticatedUserId,
    query: web::Query<TaskQuery>,
) -> Result<impl Responder, AppError> {
    let tasks = state.tasks.list(user_id.0, &query).await?;
    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "count": tasks.len(),
        "tasks": tasks,
    })))
}

/// Creates a task owned by the authenticated user.
///
/// Any `user` or `_id` in the body is ignored.
///
/// ## Responses:
/// - `201 Created`: `{success, task}`.
/// - `400 Bad Request`: validation failed; `errors` lists each offending field.
#[post("")]
pub async fn create_task(
    state: web::Data<AppState>,
    user_id: AuthenticatedUserId,
    body: ValidatedJson<CreateTaskRequest>,
) -> Result<impl Responder, AppError> {
    let task = state.tasks.create(user_id.0, body.into_inner()).await?;
    Ok(HttpResponse::Created().json(json!({ "success": true, "task": task })))
}

#[get("/{id}")]
pub async fn get_task(
    state: web::Data<AppState>,
    user_id: AuthenticatedUserId,
    path: web::Path<String>,
) -> Result<impl Responder, AppError> {
    let task = state.tasks.get(user_id.0, &path).await?;
    Ok(HttpResponse::Ok().json(json!({ "success": true, "task": task })))
}

/// Updates the supplied fields of a task.
///
/// ## Responses:
/// - `200 OK`: `{success, task}` with the new state.
/// - `403 Forbidden`: the task belongs to someone else.
/// - `404 Not Found`: no such task.
#[put("/{id}")]
pub async fn update_task(
    state: web::Data<AppState>,
    user_id: AuthenticatedUserId,
    path: web::Path<String>,
    body: ValidatedJson<UpdateTaskRequest>,
) -> Result<impl Responder, AppError> {
    let task = state
        .tasks
        .update(user_id.0, &path, body.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(json!({ "success": true, "task": task })))
}

#[delete("/{id}")]
pub async fn delete_task(
    state: web::Data<AppState>,
    user_id: AuthenticatedUserId,
    path: web::Path<String>,
) -> Result<impl Responder, AppError> {
    state.tasks.delete(user_id.0, &path).await?;
    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Task deleted successfully",
    })))
}
