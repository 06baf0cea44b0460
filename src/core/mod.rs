//! Core module containing the validation engine and its error types

pub mod error;
pub mod validation;

pub use error::{
    ConfigError, ErrorMap, FieldErrorKind, GuardError, RequestError, ValidationRejection,
};
pub use validation::{
    FieldValidator, PayloadSource, PayloadSources, PayloadValidator, Validator, ValidatorSet,
};
