//! Validation engine
//!
//! Evaluates a [`ValidatorSet`] against a selected payload and aggregates every
//! violation into a single [`ErrorMap`]. The engine never stops at the first
//! failing field.

use super::definition::FieldValidator;
use super::payload::{Fields, PayloadSources};
use crate::config::ValidationOptions;
use crate::core::error::{
    ConfigError, ErrorMap, FieldErrorKind, MISSING_FIELD_MESSAGE, UNDECLARED_FIELD_MESSAGE,
    ValidationRejection,
};
use indexmap::IndexMap;

/// Declared fields of an endpoint, in declaration order
#[derive(Debug, Clone, Default)]
pub struct ValidatorSet {
    fields: IndexMap<String, FieldValidator>,
}

impl ValidatorSet {
    /// Create an empty set (every payload passes unless undeclared fields are rejected)
    pub fn new() -> Self {
        Self::default()
    }

    pub fn builder() -> ValidatorSetBuilder {
        ValidatorSetBuilder::default()
    }

    /// Build a set from `(field, validator)` pairs
    ///
    /// Empty or duplicated field names are configuration errors.
    pub fn try_from_iter<I, K>(iter: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (K, FieldValidator)>,
        K: Into<String>,
    {
        let mut fields = IndexMap::new();
        for (field, validator) in iter {
            let field = field.into();
            if field.is_empty() {
                return Err(ConfigError::EmptyFieldName);
            }
            if fields.contains_key(&field) {
                return Err(ConfigError::DuplicateField { field });
            }
            fields.insert(field, validator);
        }
        Ok(Self { fields })
    }

    pub fn get(&self, field: &str) -> Option<&FieldValidator> {
        self.fields.get(field)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValidator)> {
        self.fields.iter().map(|(field, v)| (field.as_str(), v))
    }
}

/// Fluent builder for [`ValidatorSet`]
///
/// # Example
///
/// ```ignore
/// let set = ValidatorSet::builder()
///     .field("name", string().required())
///     .field("age", number().optional())
///     .build()?;
/// ```
#[derive(Debug, Default)]
pub struct ValidatorSetBuilder {
    fields: Vec<(String, FieldValidator)>,
}

impl ValidatorSetBuilder {
    pub fn field(mut self, name: impl Into<String>, validator: FieldValidator) -> Self {
        self.fields.push((name.into(), validator));
        self
    }

    pub fn build(self) -> Result<ValidatorSet, ConfigError> {
        ValidatorSet::try_from_iter(self.fields)
    }
}

/// A validator set bound to its options, ready to guard requests
///
/// Immutable after construction and safe to share across requests.
#[derive(Debug, Clone)]
pub struct PayloadValidator {
    validators: ValidatorSet,
    options: ValidationOptions,
}

impl PayloadValidator {
    /// Bind a validator set to options, rejecting malformed options up front
    pub fn new(validators: ValidatorSet, options: ValidationOptions) -> Result<Self, ConfigError> {
        options.check()?;
        Ok(Self {
            validators,
            options,
        })
    }

    /// Bind a validator set to default options
    pub fn with_defaults(validators: ValidatorSet) -> Self {
        Self {
            validators,
            options: ValidationOptions::default(),
        }
    }

    pub fn validators(&self) -> &ValidatorSet {
        &self.validators
    }

    pub fn options(&self) -> &ValidationOptions {
        &self.options
    }

    /// Collect every violation of `payload`
    ///
    /// `None` stands for a request with no keys in any source: required fields
    /// are all reported missing and optional ones are skipped.
    pub fn evaluate(&self, payload: Option<&Fields>) -> ErrorMap {
        let mut errors = ErrorMap::new();

        for (field, validator) in self.validators.iter() {
            match payload.and_then(|fields| fields.get(field)) {
                None if validator.is_optional() => {}
                None => record(
                    &mut errors,
                    field,
                    FieldErrorKind::MissingRequiredField,
                    MISSING_FIELD_MESSAGE,
                ),
                Some(value) if !validator.check(value) => record(
                    &mut errors,
                    field,
                    FieldErrorKind::TypeMismatch,
                    validator.message(),
                ),
                Some(_) => {}
            }
        }

        if self.options.reject_undeclared_fields {
            let undeclared = payload
                .into_iter()
                .flat_map(|fields| fields.keys())
                .filter(|key| !self.validators.contains(key));
            for key in undeclared {
                record(
                    &mut errors,
                    key,
                    FieldErrorKind::UndeclaredField,
                    UNDECLARED_FIELD_MESSAGE,
                );
            }
        }

        errors
    }

    /// Validate an already selected payload
    pub fn validate(&self, payload: Option<&Fields>) -> Result<(), ValidationRejection> {
        let errors = self.evaluate(payload);
        if errors.is_empty() {
            return Ok(());
        }
        Err(ValidationRejection::new(
            self.options.error_group_key.clone(),
            errors,
        ))
    }

    /// Select the payload from a request's sources and validate it
    pub fn validate_sources(&self, sources: &PayloadSources) -> Result<(), ValidationRejection> {
        let selected = sources.select();
        let result = self.validate(selected.map(|payload| payload.fields));

        if let Err(rejection) = &result {
            tracing::debug!(
                source = selected.map(|p| p.source.as_str()).unwrap_or("none"),
                failures = rejection.errors().len(),
                group_key = %rejection.group_key(),
                "payload rejected"
            );
        }

        result
    }
}

fn record(errors: &mut ErrorMap, field: &str, kind: FieldErrorKind, message: &str) {
    tracing::trace!(field, ?kind, "field failed validation");
    errors
        .entry(field.to_string())
        .or_insert_with(|| message.to_string());
}
