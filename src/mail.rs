use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::AppError;
use crate::validation::trimmed;

/// A message submitted through the contact form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContactMessage {
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct ContactRequest {
    #[serde(default, deserialize_with = "trimmed")]
    #[validate(required(message = "Name is required"))]
    pub name: Option<String>,

    #[serde(default, deserialize_with = "trimmed")]
    #[validate(
        required(message = "Valid email is required"),
        email(message = "Valid email is required")
    )]
    pub email: Option<String>,

    #[serde(default, deserialize_with = "trimmed")]
    #[validate(required(message = "Subject is required"))]
    pub subject: Option<String>,

    #[serde(default, deserialize_with = "trimmed")]
    #[validate(required(message = "Message is required"))]
    pub message: Option<String>,
}

impl ContactRequest {
    /// Converts a validated request; a missing field is reported as a bad request.
    pub fn into_message(self) -> Result<ContactMessage, AppError> {
        let missing = |field: &str| AppError::BadRequest(format!("{} is required", field));
        Ok(ContactMessage {
            name: self.name.ok_or_else(|| missing("Name"))?,
            email: self.email.ok_or_else(|| missing("Email"))?,
            subject: self.subject.ok_or_else(|| missing("Subject"))?,
            message: self.message.ok_or_else(|| missing("Message"))?,
        })
    }
}

/// Outbound delivery of contact messages.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, message: &ContactMessage) -> Result<(), AppError>;
}

/// Writes contact messages to the application log instead of sending them.
#[derive(Debug, Default, Clone)]
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, message: &ContactMessage) -> Result<(), AppError> {
        log::info!(
            "Contact message from {} <{}>: [TaskFlow Contact] {}",
            message.name,
            message.email,
            message.subject
        );
        log::debug!("Contact message body: {}", message.message);
        Ok(())
    }
}
