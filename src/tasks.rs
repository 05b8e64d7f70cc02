//! Task operations on behalf of an authenticated user.
//!
//! Every operation takes the caller's id as resolved by the auth gate. Lookups by id check
//! existence first and ownership second, so a task owned by someone else answers 403
//! while a missing one answers 404. Ids that do not parse are reported as missing.

use std::sync::Arc;

use uuid::Uuid;

use crate::error::AppError;
use crate::models::{
    CreateTaskRequest, SortBy, SortOrder, Task, TaskPriority, TaskQuery, TaskStatus,
    UpdateTaskRequest,
};
use crate::store::{NewTask, TaskChanges, TaskFilter, TaskStore};
use crate::validation::parse_due_date;

#[derive(Clone)]
pub struct TaskService {
    store: Arc<dyn TaskStore>,
}

fn not_found() -> AppError {
    AppError::NotFound("Task not found".into())
}

fn parse_task_id(raw: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw.trim()).map_err(|_| not_found())
}

fn parse_status(raw: &str) -> Result<TaskStatus, AppError> {
    raw.parse()
        .map_err(|e| AppError::BadRequest(format!("Invalid status: {}", e)))
}

fn parse_priority(raw: &str) -> Result<TaskPriority, AppError> {
    raw.parse()
        .map_err(|e| AppError::BadRequest(format!("Invalid priority: {}", e)))
}

fn parse_date(raw: &str) -> Result<chrono::DateTime<chrono::Utc>, AppError> {
    parse_due_date(raw).ok_or_else(|| AppError::BadRequest("Invalid due date".into()))
}

impl TaskService {
    pub fn new(store: Arc<dyn TaskStore>) -> Self {
        Self { store }
    }

    /// Lists the caller's tasks. A filter value outside its enumeration matches nothing.
    pub async fn list(&self, user_id: Uuid, query: &TaskQuery) -> Result<Vec<Task>, AppError> {
        let mut filter = TaskFilter::for_user(user_id);

        if let Some(raw) = query.status.as_deref() {
            match raw.parse() {
                Ok(status) => filter.status = Some(status),
                Err(_) => return Ok(Vec::new()),
            }
        }
        if let Some(raw) = query.priority.as_deref() {
            match raw.parse() {
                Ok(priority) => filter.priority = Some(priority),
                Err(_) => return Ok(Vec::new()),
            }
        }
        filter.sort_by = SortBy::parse(query.sort_by.as_deref());
        filter.order = SortOrder::parse(query.order.as_deref());

        self.store.find_tasks(&filter).await
    }

    /// Loads a task and checks it belongs to `user_id`. `action` names the attempted
    /// operation in the 403 message.
    async fn owned(&self, user_id: Uuid, task_id: &str, action: &str) -> Result<Task, AppError> {
        let id = parse_task_id(task_id)?;
        let task = self.store.find_task(id).await?.ok_or_else(not_found)?;
        if task.user_id != user_id {
            log::warn!("User {} denied {} on task {}", user_id, action, task.id);
            return Err(AppError::Forbidden(format!(
                "Not authorized to {} this task",
                action
            )));
        }
        Ok(task)
    }

    pub async fn get(&self, user_id: Uuid, task_id: &str) -> Result<Task, AppError> {
        self.owned(user_id, task_id, "access").await
    }

    /// Creates a task owned by `user_id`, whatever the body says.
    pub async fn create(&self, user_id: Uuid, input: CreateTaskRequest) -> Result<Task, AppError> {
        let title = input.title.ok_or_else(|| AppError::BadRequest("Title is required".into()))?;
        let task = NewTask {
            title,
            description: input.description,
            status: input.status.as_deref().map(parse_status).transpose()?.unwrap_or_default(),
            priority: input
                .priority
                .as_deref()
                .map(parse_priority)
                .transpose()?
                .unwrap_or_default(),
            due_date: input.due_date.as_deref().map(parse_date).transpose()?,
            user_id,
        };
        self.store.insert_task(task).await
    }

    /// Applies the supplied fields. Identity, owner and creation time never change.
    pub async fn update(
        &self,
        user_id: Uuid,
        task_id: &str,
        input: UpdateTaskRequest,
    ) -> Result<Task, AppError> {
        let task = self.owned(user_id, task_id, "update").await?;
        let changes = TaskChanges {
            title: input.title,
            description: input.description,
            status: input.status.as_deref().map(parse_status).transpose()?,
            priority: input.priority.as_deref().map(parse_priority).transpose()?,
            due_date: input.due_date.as_deref().map(parse_date).transpose()?,
        };
        self.store
            .update_task(task.id, changes)
            .await?
            .ok_or_else(not_found)
    }

    pub async fn delete(&self, user_id: Uuid, task_id: &str) -> Result<(), AppError> {
        let task = self.owned(user_id, task_id, "delete").await?;
        if !self.store.delete_task(task.id).await? {
            return Err(not_found());
        }
        Ok(())
    }
}
