//! Request validation.
//!
//! Input structs derive `validator::Validate`; `ValidatedJson<T>` deserializes a body and
//! runs those rules before the handler sees it, so a rejected request never reaches a
//! service or store. Failures are flattened into `{field, message}` pairs.

use std::borrow::Cow;

use actix_web::{dev::Payload, web, FromRequest, HttpRequest};
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use futures::future::LocalBoxFuture;
use serde::{de::DeserializeOwned, Deserialize, Deserializer};
use validator::{Validate, ValidationError, ValidationErrors};

use crate::error::{AppError, FieldError};
use crate::models::{TaskPriority, TaskStatus};

/// JSON body extractor that rejects invalid input with `AppError::Validation`.
#[derive(Debug)]
pub struct ValidatedJson<T>(pub T);

impl<T> ValidatedJson<T> {
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> FromRequest for ValidatedJson<T>
where
    T: DeserializeOwned + Validate + 'static,
{
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let body = web::Json::<T>::from_request(req, payload);
        Box::pin(async move {
            let web::Json(value) = body.await?;
            value.validate().map_err(AppError::from)?;
            Ok(ValidatedJson(value))
        })
    }
}

/// Body parsing configuration: malformed JSON is a 400 with our error shape.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(64 * 1024)
        .error_handler(|err, _req| {
            AppError::BadRequest(format!("Invalid request body: {}", err)).into()
        })
}

pub fn query_config() -> web::QueryConfig {
    web::QueryConfig::default().error_handler(|err, _req| {
        AppError::BadRequest(format!("Invalid query string: {}", err)).into()
    })
}

/// Flattens validator output into wire-named field errors, sorted by field.
pub fn field_errors(errors: &ValidationErrors) -> Vec<FieldError> {
    let mut flat: Vec<FieldError> = errors
        .field_errors()
        .into_iter()
        .flat_map(|(field, errs)| {
            let field = camel_case(field);
            errs.iter()
                .map(|err| FieldError {
                    field: field.clone(),
                    message: err
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| format!("Invalid value for {}", field)),
                })
                .collect::<Vec<_>>()
        })
        .collect();
    flat.sort_by(|a, b| a.field.cmp(&b.field));
    flat
}

fn camel_case(field: &str) -> String {
    let mut out = String::with_capacity(field.len());
    let mut upper = false;
    for c in field.chars() {
        if c == '_' {
            upper = true;
        } else if upper {
            out.extend(c.to_uppercase());
            upper = false;
        } else {
            out.push(c);
        }
    }
    out
}

/// Trims a string field; blank strings count as absent.
pub fn trimmed<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty()))
}

/// Trims a string field but keeps an explicit empty string.
pub fn trimmed_keep_empty<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.map(|s| s.trim().to_string()))
}

/// Empty strings count as absent; the value is otherwise kept verbatim.
pub fn non_empty<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.is_empty()))
}

fn rejection(code: &'static str, message: &'static str) -> ValidationError {
    let mut err = ValidationError::new(code);
    err.message = Some(Cow::Borrowed(message));
    err
}

pub fn validate_status(value: &str) -> Result<(), ValidationError> {
    value
        .parse::<TaskStatus>()
        .map(|_| ())
        .map_err(|_| rejection("status", "Status must be todo, in-progress, or done"))
}

pub fn validate_priority(value: &str) -> Result<(), ValidationError> {
    value
        .parse::<TaskPriority>()
        .map(|_| ())
        .map_err(|_| rejection("priority", "Priority must be low, medium, or high"))
}

pub fn validate_due_date(value: &str) -> Result<(), ValidationError> {
    parse_due_date(value)
        .map(|_| ())
        .ok_or_else(|| rejection("due_date", "Due date must be a valid date"))
}

pub fn validate_title_not_empty(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(rejection("title", "Title cannot be empty"));
    }
    Ok(())
}

/// Accepts an RFC 3339 timestamp or a bare `YYYY-MM-DD` date (midnight UTC).
pub fn parse_due_date(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(value) {
        return Some(ts.with_timezone(&Utc));
    }
    let date = NaiveDate::parse_from_str(value, "%Y-%m-%d").ok()?;
    let midnight = date.and_hms_opt(0, 0, 0)?;
    Utc.from_local_datetime(&midnight).single()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[derive(Debug, Deserialize, Validate)]
    struct Probe {
        #[serde(default, deserialize_with = "trimmed")]
        #[validate(required(message = "Name is required"))]
        name: Option<String>,
        #[serde(default, rename = "dueDate")]
        #[validate(custom = "validate_due_date")]
        due_date: Option<String>,
    }

    #[test]
    fn test_trimmed_blank_is_absent() {
        let probe: Probe = serde_json::from_str(r#"{"name": "   "}"#).unwrap();
        assert_eq!(probe.name, None);

        let probe: Probe = serde_json::from_str(r#"{"name": "  Ada "}"#).unwrap();
        assert_eq!(probe.name.as_deref(), Some("Ada"));
    }

    #[test]
    fn test_field_errors_use_wire_names() {
        let probe: Probe = serde_json::from_str(r#"{"dueDate": "not-a-date"}"#).unwrap();
        let errors = field_errors(&probe.validate().unwrap_err());

        assert_eq!(
            errors,
            vec![
                FieldError {
                    field: "dueDate".into(),
                    message: "Due date must be a valid date".into(),
                },
                FieldError {
                    field: "name".into(),
                    message: "Name is required".into(),
                },
            ]
        );
    }

    #[test]
    fn test_parse_due_date_formats() {
        let date = parse_due_date("2025-03-01").unwrap();
        assert_eq!(date.to_rfc3339(), "2025-03-01T00:00:00+00:00");

        let ts = parse_due_date("2025-03-01T12:30:00+02:00").unwrap();
        assert_eq!(ts.to_rfc3339(), "2025-03-01T10:30:00+00:00");

        assert!(parse_due_date("2025-02-30").is_none());
        assert!(parse_due_date("tomorrow").is_none());
    }

    #[test]
    fn test_enum_validators() {
        assert!(validate_status("in-progress").is_ok());
        assert!(validate_status("review").is_err());
        assert!(validate_priority("high").is_ok());
        assert!(validate_priority("urgent").is_err());
    }

    #[test]
    fn test_camel_case() {
        assert_eq!(camel_case("due_date"), "dueDate");
        assert_eq!(camel_case("dueDate"), "dueDate");
        assert_eq!(camel_case("title"), "title");
    }
}
