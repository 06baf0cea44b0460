//! Validation system
//!
//! This module provides a declarative approach to validating request payloads
//! before they reach the handlers:
//! - [`definition`]: single-field rules and the built-in validators
//! - [`payload`]: selection of the body, query or path source
//! - [`engine`]: evaluation of a validator set and error aggregation

pub mod definition;
pub mod engine;
pub mod payload;

pub use definition::{FieldValidator, Predicate, Validator};
pub use engine::{PayloadValidator, ValidatorSet, ValidatorSetBuilder};
pub use payload::{Fields, PayloadSource, PayloadSources, SelectedPayload};
