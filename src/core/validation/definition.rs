//! Field validator definitions
//!
//! A [`Validator`] wraps a predicate over a JSON value and an optional failure
//! message. It hands out two [`FieldValidator`] forms that share the same
//! predicate: a required one and an optional one.
//!
//! ```rust,ignore
//! use payload_guard::prelude::*;
//!
//! let name = string().required();
//! let nickname = string().optional();
//! let even = Validator::new(|v| v.as_i64().is_some_and(|n| n % 2 == 0))
//!     .with_message("Expected an even number");
//! ```

use regex::Regex;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// Message recorded when a predicate fails and no custom message was supplied
pub const DEFAULT_INVALID_MESSAGE: &str = "Invalid type";

/// Shared predicate over a present JSON value
pub type Predicate = Arc<dyn Fn(&Value) -> bool + Send + Sync>;

/// Builder for a single field rule
///
/// Cloning is cheap: the predicate and message are reference counted.
#[derive(Clone)]
pub struct Validator {
    predicate: Predicate,
    message: Option<Arc<str>>,
}

impl Validator {
    /// Create a validator from a predicate
    pub fn new<F>(predicate: F) -> Self
    where
        F: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        Self {
            predicate: Arc::new(predicate),
            message: None,
        }
    }

    /// Replace the failure message
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(Arc::from(message.into()));
        self
    }

    /// The field must be supplied and accepted by the predicate
    pub fn required(&self) -> FieldValidator {
        FieldValidator {
            predicate: Arc::clone(&self.predicate),
            optional: false,
            message: self.message.clone(),
        }
    }

    /// The field may be omitted; when supplied it must be accepted by the predicate
    pub fn optional(&self) -> FieldValidator {
        FieldValidator {
            predicate: Arc::clone(&self.predicate),
            optional: true,
            message: self.message.clone(),
        }
    }
}

impl fmt::Debug for Validator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Validator")
            .field("message", &self.message)
            .finish_non_exhaustive()
    }
}

/// Immutable rule for one declared field
///
/// Two definitions are equal when they share the same predicate, the same
/// optionality and the same message.
#[derive(Clone)]
pub struct FieldValidator {
    predicate: Predicate,
    optional: bool,
    message: Option<Arc<str>>,
}

impl FieldValidator {
    /// Whether an absent value is acceptable
    pub fn is_optional(&self) -> bool {
        self.optional
    }

    /// Message recorded when the predicate rejects a value
    pub fn message(&self) -> &str {
        self.message.as_deref().unwrap_or(DEFAULT_INVALID_MESSAGE)
    }

    /// Run the predicate against a present value
    pub fn check(&self, value: &Value) -> bool {
        (self.predicate)(value)
    }

    /// Evaluate a possibly absent value
    ///
    /// Optional definitions accept `None`; required ones reject it.
    pub fn accepts(&self, value: Option<&Value>) -> bool {
        match value {
            Some(value) => self.check(value),
            None => self.optional,
        }
    }
}

impl PartialEq for FieldValidator {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.predicate, &other.predicate)
            && self.optional == other.optional
            && self.message == other.message
    }
}

impl fmt::Debug for FieldValidator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldValidator")
            .field("optional", &self.optional)
            .field("message", &self.message())
            .finish_non_exhaustive()
    }
}

// =============================================================================
// Built-in validators
// =============================================================================

/// Validator: value is a JSON string
pub fn string() -> Validator {
    Validator::new(Value::is_string).with_message("Invalid type, expected a string")
}

/// Validator: value is a JSON number
pub fn number() -> Validator {
    Validator::new(Value::is_number).with_message("Invalid type, expected a number")
}

/// Validator: value is a JSON boolean
pub fn boolean() -> Validator {
    Validator::new(Value::is_boolean).with_message("Invalid type, expected a boolean")
}

/// Validator: value is a JSON object (not null, not an array)
pub fn object() -> Validator {
    Validator::new(Value::is_object).with_message("Invalid type, expected an object")
}

/// Validator: value is a JSON array
pub fn array() -> Validator {
    Validator::new(Value::is_array).with_message("Invalid type, expected an array")
}

/// Validator: value is a number without a fractional part
pub fn integer() -> Validator {
    Validator::new(|value| {
        value.is_i64()
            || value.is_u64()
            || value.as_f64().is_some_and(|n| n.fract() == 0.0)
    })
    .with_message("Invalid type, expected an integer")
}

/// Validator: number must be strictly positive
pub fn positive() -> Validator {
    Validator::new(|value| value.as_f64().is_some_and(|n| n > 0.0))
        .with_message("Expected a positive number")
}

/// Validator: number must not exceed maximum
pub fn max_value(max: f64) -> Validator {
    Validator::new(move |value| value.as_f64().is_some_and(|n| n <= max))
        .with_message(format!("Expected a number not greater than {}", max))
}

/// Validator: string length (in characters) must be within range
pub fn string_length(min: usize, max: usize) -> Validator {
    Validator::new(move |value| {
        value
            .as_str()
            .map(|s| s.chars().count())
            .is_some_and(|len| (min..=max).contains(&len))
    })
    .with_message(format!(
        "Expected a string between {} and {} characters",
        min, max
    ))
}

/// Validator: value must be in allowed list
pub fn one_of<I, S>(allowed: I) -> Validator
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let allowed: Vec<String> = allowed.into_iter().map(Into::into).collect();
    let message = format!("Expected one of: {}", allowed.join(", "));
    Validator::new(move |value| {
        value
            .as_str()
            .is_some_and(|s| allowed.iter().any(|a| a == s))
    })
    .with_message(message)
}

/// Validator: string must match a regular expression
pub fn pattern(regex: Regex) -> Validator {
    let message = format!("Expected a string matching {}", regex.as_str());
    Validator::new(move |value| value.as_str().is_some_and(|s| regex.is_match(s)))
        .with_message(message)
}

/// Validator: date must match format
pub fn date_format(format: &'static str) -> Validator {
    Validator::new(move |value| {
        value
            .as_str()
            .is_some_and(|s| chrono::NaiveDate::parse_from_str(s, format).is_ok())
    })
    .with_message(format!("Expected a date in the format {}", format))
}

/// Validator: string is a UUID
pub fn uuid() -> Validator {
    Validator::new(|value| {
        value
            .as_str()
            .is_some_and(|s| uuid::Uuid::parse_str(s).is_ok())
    })
    .with_message("Invalid type, expected a UUID")
}
