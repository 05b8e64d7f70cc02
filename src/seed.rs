//! Demo account with a handful of sample tasks.

use chrono::{Duration, Utc};

use crate::auth::Credentials;
use crate::error::AppError;
use crate::models::{TaskPriority, TaskStatus, User};
use crate::store::{NewTask, TaskStore};

pub const DEMO_NAME: &str = "Demo User";
pub const DEMO_EMAIL: &str = "demo@taskflow.test";
pub const DEMO_PASSWORD: &str = "Demo1234!";

struct SampleTask {
    title: &'static str,
    description: &'static str,
    status: TaskStatus,
    priority: TaskPriority,
    due_in_days: i64,
}

const SAMPLE_TASKS: &[SampleTask] = &[
    SampleTask {
        title: "Complete project documentation",
        description: "Write comprehensive README with setup instructions, API documentation, and deployment guide.",
        status: TaskStatus::InProgress,
        priority: TaskPriority::High,
        due_in_days: 7,
    },
    SampleTask {
        title: "Review pull requests",
        description: "Go through pending pull requests and provide feedback to team members.",
        status: TaskStatus::Todo,
        priority: TaskPriority::Medium,
        due_in_days: 2,
    },
    SampleTask {
        title: "Set up CI/CD pipeline",
        description: "Configure GitHub Actions for automated testing and deployment.",
        status: TaskStatus::Todo,
        priority: TaskPriority::High,
        due_in_days: 5,
    },
    SampleTask {
        title: "Design system updates",
        description: "Update color palette and typography to match new brand guidelines.",
        status: TaskStatus::Done,
        priority: TaskPriority::Low,
        due_in_days: -2,
    },
    SampleTask {
        title: "Performance optimization",
        description: "Analyze and optimize database queries, implement caching where necessary.",
        status: TaskStatus::Todo,
        priority: TaskPriority::Medium,
        due_in_days: 14,
    },
];

/// Creates the demo user and its sample tasks. Expects the demo email to be free.
pub async fn seed_demo_data(
    credentials: &Credentials,
    tasks: &dyn TaskStore,
) -> Result<User, AppError> {
    let user = credentials
        .create_user(DEMO_NAME, DEMO_EMAIL, DEMO_PASSWORD)
        .await?;

    let now = Utc::now();
    for sample in SAMPLE_TASKS {
        tasks
            .insert_task(NewTask {
                title: sample.title.to_string(),
                description: Some(sample.description.to_string()),
                status: sample.status,
                priority: sample.priority,
                due_date: Some(now + Duration::days(sample.due_in_days)),
                user_id: user.id,
            })
            .await?;
    }

    log::info!(
        "Seeded demo user {} with {} tasks",
        user.email,
        SAMPLE_TASKS.len()
    );
    Ok(user)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{MemoryStore, TaskFilter};
    use std::sync::Arc;

    #[actix_rt::test]
    async fn test_seed_creates_demo_user_with_five_tasks() {
        let store = Arc::new(MemoryStore::new());
        let credentials = Credentials::new(store.clone(), 4);

        let user = seed_demo_data(&credentials, store.as_ref()).await.unwrap();
        assert_eq!(user.email, DEMO_EMAIL);

        let login = credentials.authenticate(DEMO_EMAIL, DEMO_PASSWORD).await.unwrap();
        assert_eq!(login.id, user.id);

        let tasks = store.find_tasks(&TaskFilter::for_user(user.id)).await.unwrap();
        assert_eq!(tasks.len(), 5);
        assert!(tasks.iter().any(|t| t.status == TaskStatus::Done));
    }

    #[actix_rt::test]
    async fn test_seed_twice_is_duplicate() {
        let store = Arc::new(MemoryStore::new());
        let credentials = Credentials::new(store.clone(), 4);

        seed_demo_data(&credentials, store.as_ref()).await.unwrap();
        assert!(matches!(
            seed_demo_data(&credentials, store.as_ref()).await,
            Err(AppError::DuplicateEmail)
        ));
    }
}
