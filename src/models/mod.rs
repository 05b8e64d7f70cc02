pub mod task;
pub mod user;

pub use task::{
    CreateTaskRequest, SortBy, SortOrder, Task, TaskPriority, TaskQuery, TaskStatus,
    UpdateTaskRequest,
};
pub use user::User;
