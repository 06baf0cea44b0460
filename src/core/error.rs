//! Typed error handling for payload-guard
//!
//! # Error Categories
//!
//! - [`ConfigError`]: malformed validator sets or options, raised once at
//!   registration time
//! - [`RequestError`]: the request body could not be turned into a payload
//! - [`ValidationRejection`]: the aggregated field errors of one request
//!
//! [`GuardError`] unifies the three and renders them as HTTP responses.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use indexmap::IndexMap;
use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;

/// Field name to error message, in evaluation order
pub type ErrorMap = IndexMap<String, String>;

/// Message recorded for a required field that was not supplied
pub const MISSING_FIELD_MESSAGE: &str = "Required element is missing or undefined";

/// Message recorded for a payload key that no validator declares
pub const UNDECLARED_FIELD_MESSAGE: &str = "Element does not exist in validator";

/// The main error type for payload-guard
#[derive(Debug, Error)]
pub enum GuardError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Request(#[from] RequestError),

    #[error(transparent)]
    Validation(#[from] ValidationRejection),
}

impl GuardError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            GuardError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
            GuardError::Request(e) => e.status_code(),
            GuardError::Validation(_) => StatusCode::BAD_REQUEST,
        }
    }

    /// Get the error code for this error
    pub fn error_code(&self) -> &'static str {
        match self {
            GuardError::Config(_) => "CONFIG_ERROR",
            GuardError::Request(e) => e.error_code(),
            GuardError::Validation(_) => "VALIDATION_ERROR",
        }
    }
}

impl IntoResponse for GuardError {
    fn into_response(self) -> Response {
        match self {
            GuardError::Validation(rejection) => rejection.into_response(),
            GuardError::Request(e) => e.into_response(),
            GuardError::Config(e) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Validator misconfigured".to_string(),
                    details: Some(e.to_string()),
                }),
            )
                .into_response(),
        }
    }
}

/// Body of adapter-level error responses
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Short summary
    pub error: String,
    /// Underlying reason
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

// =============================================================================
// Configuration Errors
// =============================================================================

/// Construction-time errors
///
/// These abort route registration; they never surface per request.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Validator field names must not be empty")]
    EmptyFieldName,

    #[error("Field '{field}' is declared more than once")]
    DuplicateField { field: String },

    #[error("Error group key must not be empty")]
    EmptyErrorGroupKey,

    #[error("Maximum body size must be greater than zero")]
    ZeroBodyLimit,

    #[error("Failed to parse configuration{}: {message}", file_suffix(.file))]
    Parse {
        file: Option<String>,
        message: String,
    },

    #[error("Failed to read configuration '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

fn file_suffix(file: &Option<String>) -> String {
    file.as_ref()
        .map(|f| format!(" '{}'", f))
        .unwrap_or_default()
}

// =============================================================================
// Request Errors
// =============================================================================

/// The request could not be turned into payload sources
#[derive(Debug, Error)]
pub enum RequestError {
    #[error("Failed to read request body: {message}")]
    UnreadableBody { message: String },

    #[error("Invalid JSON: {message}")]
    InvalidJson { message: String },
}

impl RequestError {
    pub fn status_code(&self) -> StatusCode {
        StatusCode::BAD_REQUEST
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            RequestError::UnreadableBody { .. } => "UNREADABLE_BODY",
            RequestError::InvalidJson { .. } => "INVALID_JSON",
        }
    }

    fn summary(&self) -> &'static str {
        match self {
            RequestError::UnreadableBody { .. } => "Unreadable body",
            RequestError::InvalidJson { .. } => "Invalid JSON",
        }
    }
}

impl IntoResponse for RequestError {
    fn into_response(self) -> Response {
        let details = match &self {
            RequestError::UnreadableBody { message } | RequestError::InvalidJson { message } => {
                message.clone()
            }
        };
        let body = ErrorResponse {
            error: self.summary().to_string(),
            details: Some(details),
        };
        (self.status_code(), Json(body)).into_response()
    }
}

// =============================================================================
// Validation Errors
// =============================================================================

/// Why a single field failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldErrorKind {
    /// Declared, not optional, and absent from the payload
    MissingRequiredField,
    /// Present but rejected by the field's predicate
    TypeMismatch,
    /// Present in the payload but not declared
    UndeclaredField,
}

/// Aggregated validation failure for one request
///
/// Renders as `400 Bad Request` with body `{ "<group_key>": { field: message } }`.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("Payload validation failed for {} field(s)", .errors.len())]
pub struct ValidationRejection {
    group_key: String,
    errors: ErrorMap,
}

impl ValidationRejection {
    pub fn new(group_key: impl Into<String>, errors: ErrorMap) -> Self {
        Self {
            group_key: group_key.into(),
            errors,
        }
    }

    /// Key under which the error map is nested
    pub fn group_key(&self) -> &str {
        &self.group_key
    }

    pub fn errors(&self) -> &ErrorMap {
        &self.errors
    }

    pub fn into_errors(self) -> ErrorMap {
        self.errors
    }

    /// JSON body of the rejection response
    pub fn body(&self) -> Value {
        let errors: Map<String, Value> = self
            .errors
            .iter()
            .map(|(field, message)| (field.clone(), Value::String(message.clone())))
            .collect();
        let mut body = Map::new();
        body.insert(self.group_key.clone(), Value::Object(errors));
        Value::Object(body)
    }
}

impl IntoResponse for ValidationRejection {
    fn into_response(self) -> Response {
        (StatusCode::BAD_REQUEST, Json(self.body())).into_response()
    }
}
