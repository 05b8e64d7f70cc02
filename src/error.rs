//!
//! # Custom Error Handling
//!
//! This module defines the custom error type `AppError` used throughout the application.
//! Every failure a request can run into, from a malformed body to a lost database
//! connection, ends up as one of its variants.
//!
//! `AppError` implements `actix_web::error::ResponseError` so handlers, extractors and
//! middleware can return it directly. Responses always have the shape
//! `{"success": false, "message": ...}`; validation failures add an `errors` array of
//! `{field, message}` pairs. Server-side failures are logged and answered with a generic
//! message so no internal detail reaches the client.

use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use serde::Serialize;
use serde_json::json;
use std::fmt;
use validator::ValidationErrors;

/// A single rejected input field, reported back to the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    /// Field name as it appears on the wire (camelCase).
    pub field: String,
    /// Human readable reason.
    pub message: String,
}

/// Represents all possible errors that can occur within the application.
#[derive(Debug)]
pub enum AppError {
    /// Declarative input validation failed (HTTP 400).
    Validation(Vec<FieldError>),
    /// The request could not be understood, e.g. a body that is not JSON (HTTP 400).
    BadRequest(String),
    /// Registration with an email that already belongs to an account (HTTP 400).
    DuplicateEmail,
    /// Unknown email or wrong password on login (HTTP 401).
    InvalidCredentials,
    /// Missing, malformed or expired session (HTTP 401).
    Unauthorized(String),
    /// Authenticated, but the resource belongs to another user (HTTP 403).
    Forbidden(String),
    /// The requested resource does not exist (HTTP 404).
    NotFound(String),
    /// The client exhausted its request quota (HTTP 429).
    TooManyRequests,
    /// The mail collaborator could not deliver a message (HTTP 500).
    MailDelivery(String),
    /// Represents an unexpected server-side error (HTTP 500).
    InternalServerError(String),
    /// Represents an error originating from the persistence layer (HTTP 500).
    DatabaseError(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AppError::Validation(errors) => {
                let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
                write!(f, "Validation Error: {}", fields.join(", "))
            }
            AppError::BadRequest(msg) => write!(f, "Bad Request: {}", msg),
            AppError::DuplicateEmail => write!(f, "Duplicate Email"),
            AppError::InvalidCredentials => write!(f, "Invalid Credentials"),
            AppError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            AppError::Forbidden(msg) => write!(f, "Forbidden: {}", msg),
            AppError::NotFound(msg) => write!(f, "Not Found: {}", msg),
            AppError::TooManyRequests => write!(f, "Too Many Requests"),
            AppError::MailDelivery(msg) => write!(f, "Mail Delivery Error: {}", msg),
            AppError::InternalServerError(msg) => write!(f, "Internal Server Error: {}", msg),
            AppError::DatabaseError(msg) => write!(f, "Database Error: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}

impl AppError {
    /// Message shown to the client. Server-side variants never expose their detail.
    fn client_message(&self) -> String {
        match self {
            AppError::Validation(_) => "Validation failed".into(),
            AppError::BadRequest(msg) => msg.clone(),
            AppError::DuplicateEmail => "User already exists with this email".into(),
            AppError::InvalidCredentials => "Invalid credentials".into(),
            AppError::Unauthorized(msg) => msg.clone(),
            AppError::Forbidden(msg) => msg.clone(),
            AppError::NotFound(msg) => msg.clone(),
            AppError::TooManyRequests => "Too many requests, please try again later".into(),
            AppError::MailDelivery(_) => "Failed to send email. Please try again later.".into(),
            AppError::InternalServerError(_) | AppError::DatabaseError(_) => {
                "Internal server error".into()
            }
        }
    }
}

/// Converts `AppError` variants into `HttpResponse` objects.
impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) | AppError::BadRequest(_) | AppError::DuplicateEmail => {
                StatusCode::BAD_REQUEST
            }
            AppError::InvalidCredentials | AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::TooManyRequests => StatusCode::TOO_MANY_REQUESTS,
            AppError::MailDelivery(_)
            | AppError::InternalServerError(_)
            | AppError::DatabaseError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        if status.is_server_error() {
            log::error!("{}", self);
        }

        match self {
            AppError::Validation(errors) => HttpResponse::build(status).json(json!({
                "success": false,
                "message": self.client_message(),
                "errors": errors,
            })),
            _ => HttpResponse::build(status).json(json!({
                "success": false,
                "message": self.client_message(),
            })),
        }
    }
}

/// Converts `sqlx::Error` into `AppError`.
///
/// `RowNotFound` becomes `NotFound`; a unique violation can only come from the
/// users' email constraint and becomes `DuplicateEmail`.
impl From<sqlx::Error> for AppError {
    fn from(error: sqlx::Error) -> AppError {
        match error {
            sqlx::Error::RowNotFound => AppError::NotFound("Record not found".into()),
            sqlx::Error::Database(ref db) if db.is_unique_violation() => AppError::DuplicateEmail,
            _ => AppError::DatabaseError(error.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for AppError {
    fn from(error: sqlx::migrate::MigrateError) -> AppError {
        AppError::DatabaseError(format!("Migration failed: {}", error))
    }
}

/// Converts `validator::ValidationErrors` into a flat, field-sorted list.
impl From<ValidationErrors> for AppError {
    fn from(errors: ValidationErrors) -> AppError {
        AppError::Validation(crate::validation::field_errors(&errors))
    }
}

/// Converts `jsonwebtoken::errors::Error` into `AppError::Unauthorized`.
impl From<jsonwebtoken::errors::Error> for AppError {
    fn from(error: jsonwebtoken::errors::Error) -> AppError {
        log::debug!("Rejected session token: {}", error);
        AppError::Unauthorized("Not authorized, invalid or expired session".into())
    }
}

/// Converts `bcrypt::BcryptError` into `AppError::InternalServerError`.
impl From<bcrypt::BcryptError> for AppError {
    fn from(error: bcrypt::BcryptError) -> AppError {
        AppError::InternalServerError(error.to_string())
    }
}
