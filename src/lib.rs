//! # payload-guard
//!
//! Declarative request-payload validation for axum services.
//!
//! ## Features
//!
//! - **Method-agnostic**: validates the JSON or form body, the query string or the
//!   path parameters, whichever is the first non-empty source
//! - **Required/optional fields**: every validator comes in both forms
//! - **Custom predicates and messages**: any `Fn(&Value) -> bool` is a validator
//! - **Closed payloads**: optionally reject fields no validator declares
//! - **Aggregated errors**: one `400` response lists every failing field
//! - **Configuration-Based**: validator sets can be loaded from YAML
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use payload_guard::prelude::*;
//!
//! let set = ValidatorSet::builder()
//!     .field("name", string().required())
//!     .field("age", number().optional())
//!     .build()?;
//! let guard = PayloadValidator::new(set, ValidationOptions::default())?;
//!
//! let app = Router::new()
//!     .route("/users", post(create_user))
//!     .route_layer(guard.into_layer());
//!
//! // POST /users {} -> 400 {"errors": {"name": "Required element is missing or undefined"}}
//! ```

pub mod config;
pub mod core;
pub mod server;

/// Re-exports of commonly used types and functions
pub mod prelude {
    // === Validators ===
    pub use crate::core::validation::definition::{
        FieldValidator, Validator, array, boolean, date_format, integer, max_value, number,
        object, one_of, pattern, positive, string, string_length, uuid,
    };

    // === Engine ===
    pub use crate::core::validation::{
        Fields, PayloadSource, PayloadSources, PayloadValidator, ValidatorSet,
    };

    // === Errors ===
    pub use crate::core::error::{
        ConfigError, ErrorMap, FieldErrorKind, GuardError, MISSING_FIELD_MESSAGE, RequestError,
        UNDECLARED_FIELD_MESSAGE, ValidationRejection,
    };

    // === Config ===
    pub use crate::config::{FieldRule, FieldType, ValidationOptions, ValidatorConfig};

    // === Server ===
    pub use crate::server::{ValidationLayer, validate_payload};

    // === External dependencies ===
    pub use serde_json::{Value, json};

    // === Axum ===
    pub use axum::{
        Router,
        routing::{delete, get, post, put},
    };
}
