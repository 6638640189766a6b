//!
//! # Custom Error Handling
//!
//! This module defines the custom error type `AppError` used throughout the application.
//! Every failure a request can hit is folded into one of its variants, and
//! `AppError` implements `actix_web::error::ResponseError` so handlers, extractors and
//! middleware can all return it directly.
//!
//! All error responses share one JSON shape:
//!
//! ```json
//! { "message": "Validation error", "details": [{ "field": "body.title", "message": "Field required" }] }
//! ```
//!
//! `details` is `null` for everything except validation failures. Server-side faults
//! never expose their cause to the client; the detail is logged instead.

use actix_web::{
    error::{JsonPayloadError, QueryPayloadError, ResponseError},
    http::{header, StatusCode},
    HttpResponse,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use validator::ValidationErrors;

/// A single field-level validation problem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    /// Location of the offending input, e.g. `body.title` or `query.limit`.
    pub field: String,
    /// Human readable description of the problem.
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// The JSON body of every non-2xx response.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub message: String,
    pub details: Option<Vec<FieldError>>,
}

/// Represents all possible errors that can occur within the application.
///
/// Each variant corresponds to a specific type of error, often carrying a message
/// detailing the issue. These errors are then converted into appropriate HTTP responses.
#[derive(Debug)]
pub enum AppError {
    /// Missing, malformed or expired credentials (HTTP 401).
    Unauthorized(String),
    /// A well-formed request that cannot be honoured, e.g. a duplicate email (HTTP 400).
    BadRequest(String),
    /// The resource does not exist or is not owned by the caller (HTTP 404).
    NotFound(String),
    /// An unexpected server-side error (HTTP 500).
    InternalServerError(String),
    /// An error originating from database operations (HTTP 500).
    DatabaseError(String),
    /// Input failed schema or field validation (HTTP 422).
    ValidationError(Vec<FieldError>),
}

impl AppError {
    /// Shorthand for a validation failure on a single field.
    pub fn invalid_field(field: impl Into<String>, message: impl Into<String>) -> Self {
        AppError::ValidationError(vec![FieldError::new(field, message)])
    }

    fn body(&self) -> ErrorResponse {
        match self {
            AppError::Unauthorized(msg) | AppError::BadRequest(msg) | AppError::NotFound(msg) => {
                ErrorResponse {
                    message: msg.clone(),
                    details: None,
                }
            }
            AppError::InternalServerError(_) | AppError::DatabaseError(_) => ErrorResponse {
                message: "Internal server error".into(),
                details: None,
            },
            AppError::ValidationError(details) => ErrorResponse {
                message: "Validation error".into(),
                details: Some(details.clone()),
            },
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AppError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            AppError::BadRequest(msg) => write!(f, "Bad Request: {}", msg),
            AppError::NotFound(msg) => write!(f, "Not Found: {}", msg),
            AppError::InternalServerError(msg) => write!(f, "Internal Server Error: {}", msg),
            AppError::DatabaseError(msg) => write!(f, "Database Error: {}", msg),
            AppError::ValidationError(details) => {
                let fields: Vec<&str> = details.iter().map(|d| d.field.as_str()).collect();
                write!(f, "Validation Error: {}", fields.join(", "))
            }
        }
    }
}

impl std::error::Error for AppError {}

/// Converts `AppError` variants into `HttpResponse` objects.
impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::InternalServerError(_) | AppError::DatabaseError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            AppError::ValidationError(_) => StatusCode::UNPROCESSABLE_ENTITY,
        }
    }

    fn error_response(&self) -> HttpResponse {
        match self {
            AppError::InternalServerError(detail) | AppError::DatabaseError(detail) => {
                log::error!("request failed: {}", detail);
            }
            _ => {}
        }

        let mut builder = HttpResponse::build(self.status_code());
        if let AppError::Unauthorized(_) = self {
            builder.insert_header((header::WWW_AUTHENTICATE, "Bearer"));
        }
        builder.json(self.body())
    }
}

/// Converts `sqlx::Error` into `AppError::DatabaseError`.
///
/// Not-found conditions are expressed as `Option`s by the store, so a stray
/// `RowNotFound` here is a fault like any other.
impl From<sqlx::Error> for AppError {
    fn from(error: sqlx::Error) -> AppError {
        AppError::DatabaseError(error.to_string())
    }
}

/// Converts `validator::ValidationErrors` into field-level details.
impl From<ValidationErrors> for AppError {
    fn from(errors: ValidationErrors) -> AppError {
        let mut details: Vec<FieldError> = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, errs)| {
                errs.iter().map(move |err| {
                    let message = err
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| format!("Invalid value ({})", err.code));
                    FieldError::new(format!("body.{}", field), message)
                })
            })
            .collect();
        details.sort_by(|a, b| a.field.cmp(&b.field));
        AppError::ValidationError(details)
    }
}

/// Converts `jsonwebtoken::errors::Error` into `AppError::Unauthorized`.
///
/// The underlying reason is logged but never returned to the client.
impl From<jsonwebtoken::errors::Error> for AppError {
    fn from(error: jsonwebtoken::errors::Error) -> AppError {
        log::debug!("token rejected: {}", error);
        AppError::Unauthorized("Could not validate credentials".into())
    }
}

/// Converts `bcrypt::BcryptError` into `AppError::InternalServerError`.
impl From<bcrypt::BcryptError> for AppError {
    fn from(error: bcrypt::BcryptError) -> AppError {
        AppError::InternalServerError(format!("password hashing failed: {}", error))
    }
}

/// Converts JSON body extraction failures into validation errors.
///
/// Bodies are first read as untyped JSON, so a deserialize error here means the
/// payload is not JSON at all. Typed failures arrive through the
/// `serde_path_to_error` conversion below.
impl From<JsonPayloadError> for AppError {
    fn from(error: JsonPayloadError) -> AppError {
        match error {
            JsonPayloadError::Deserialize(_) => {
                AppError::invalid_field("body", "Input should be valid JSON")
            }
            other => AppError::invalid_field("body", other.to_string()),
        }
    }
}

/// Converts a typed body failure into a validation error on the offending field.
impl From<serde_path_to_error::Error<serde_json::Error>> for AppError {
    fn from(error: serde_path_to_error::Error<serde_json::Error>) -> AppError {
        let path: Vec<String> = error
            .path()
            .iter()
            .filter(|segment| !matches!(segment, serde_path_to_error::Segment::Unknown))
            .map(|segment| segment.to_string())
            .collect();
        let location = std::iter::once("body".to_string())
            .chain(path)
            .collect::<Vec<_>>()
            .join(".");
        AppError::ValidationError(vec![describe_serde_error(&location, &error.inner().to_string())])
    }
}

/// Converts query string extraction failures into validation errors.
impl From<QueryPayloadError> for AppError {
    fn from(error: QueryPayloadError) -> AppError {
        match error {
            QueryPayloadError::Deserialize(err) => AppError::ValidationError(vec![describe_serde_error(
                "query",
                &err.to_string(),
            )]),
            other => AppError::invalid_field("query", other.to_string()),
        }
    }
}

// serde names missing and unknown fields in backticks; those are appended to
// `location`. Anything else is reported on `location` itself.
fn describe_serde_error(location: &str, text: &str) -> FieldError {
    let field = |name: &str| {
        if location.ends_with(&format!(".{}", name)) {
            location.to_string()
        } else {
            format!("{}.{}", location, name)
        }
    };
    let quoted = text.split('`').nth(1);
    match quoted {
        Some(name) if text.starts_with("missing field") => {
            FieldError::new(field(name), "Field required")
        }
        Some(name) if text.starts_with("unknown field") => {
            FieldError::new(field(name), "Extra inputs are not permitted")
        }
        _ => FieldError::new(location, expectation(text)),
    }
}

/// Rewrites serde's "..., expected X" messages as "Input should be X".
fn expectation(text: &str) -> String {
    let text = match text.find(" at line ") {
        Some(position) => &text[..position],
        None => text,
    };
    let Some((_, expected)) = text.split_once(", expected ") else {
        return text.to_string();
    };

    if text.starts_with("unknown variant") {
        let variants: Vec<String> = expected
            .split('`')
            .skip(1)
            .step_by(2)
            .map(|variant| format!("'{}'", variant))
            .collect();
        return match variants.split_last() {
            Some((last, [])) => format!("Input should be {}", last),
            Some((last, rest)) => format!("Input should be {} or {}", rest.join(", "), last),
            None => format!("Input should be {}", expected),
        };
    }
    format!("Input should be {}", expected)
}
