//! Persistence collaborators.
//!
//! Services talk to storage only through `UserStore` and `TaskStore`. Each method maps to
//! a single-record (or single-query) operation; nothing here spans several records, so
//! backends only need per-row atomicity.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::AppError;
use crate::models::{SortBy, SortOrder, Task, TaskPriority, TaskStatus, User};

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// A user about to be inserted. The password is already hashed.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
}

/// A task about to be inserted; defaults have already been applied.
#[derive(Debug, Clone)]
pub struct NewTask {
    pub title: String,
    pub description: Option<String>,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    pub due_date: Option<DateTime<Utc>>,
    pub user_id: Uuid,
}

/// Fields an update may touch. `None` leaves the stored value unchanged.
#[derive(Debug, Clone, Default)]
pub struct TaskChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,
    pub due_date: Option<DateTime<Utc>>,
}

/// Exact-match listing filter, always scoped to one owner.
#[derive(Debug, Clone)]
pub struct TaskFilter {
    pub user_id: Uuid,
    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,
    pub sort_by: SortBy,
    pub order: SortOrder,
}

impl TaskFilter {
    pub fn for_user(user_id: Uuid) -> Self {
        Self {
            user_id,
            status: None,
            priority: None,
            sort_by: SortBy::default(),
            order: SortOrder::default(),
        }
    }
}

#[async_trait]
pub trait UserStore: Send + Sync {
    /// Fails with `AppError::DuplicateEmail` if the email is taken.
    async fn insert_user(&self, user: NewUser) -> Result<User, AppError>;
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, AppError>;
    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<User>, AppError>;
}

#[async_trait]
pub trait TaskStore: Send + Sync {
    async fn insert_task(&self, task: NewTask) -> Result<Task, AppError>;
    async fn find_task(&self, id: Uuid) -> Result<Option<Task>, AppError>;
    async fn find_tasks(&self, filter: &TaskFilter) -> Result<Vec<Task>, AppError>;
    /// Returns `None` when the task no longer exists.
    async fn update_task(&self, id: Uuid, changes: TaskChanges) -> Result<Option<Task>, AppError>;
    /// Returns whether a record was removed.
    async fn delete_task(&self, id: Uuid) -> Result<bool, AppError>;
}
