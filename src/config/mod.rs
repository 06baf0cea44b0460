//! Configuration loading and management

use crate::core::error::ConfigError;
use crate::core::validation::definition::{
    Validator, array, boolean, integer, number, object, string, uuid,
};
use crate::core::validation::engine::{PayloadValidator, ValidatorSet};
use indexmap::IndexMap;
use serde::de::{self, Deserializer, MapAccess, Visitor};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Default key under which field errors are nested in rejection bodies
pub const DEFAULT_ERROR_GROUP_KEY: &str = "errors";

/// Default request body buffering limit (2 MiB, same as axum's default)
pub const DEFAULT_MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

/// Per-validator options
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationOptions {
    /// Report payload keys that no validator declares
    pub reject_undeclared_fields: bool,

    /// Key wrapping the error map in rejection bodies
    pub error_group_key: String,

    /// Maximum request body size buffered by the HTTP layer
    pub max_body_bytes: usize,
}

impl Default for ValidationOptions {
    fn default() -> Self {
        Self {
            reject_undeclared_fields: false,
            error_group_key: DEFAULT_ERROR_GROUP_KEY.to_string(),
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }
}

impl ValidationOptions {
    pub fn reject_undeclared_fields(mut self, reject: bool) -> Self {
        self.reject_undeclared_fields = reject;
        self
    }

    pub fn error_group_key(mut self, key: impl Into<String>) -> Self {
        self.error_group_key = key.into();
        self
    }

    pub fn max_body_bytes(mut self, limit: usize) -> Self {
        self.max_body_bytes = limit;
        self
    }

    /// Reject options that can never produce a usable validator
    pub fn check(&self) -> Result<(), ConfigError> {
        if self.error_group_key.is_empty() {
            return Err(ConfigError::EmptyErrorGroupKey);
        }
        if self.max_body_bytes == 0 {
            return Err(ConfigError::ZeroBodyLimit);
        }
        Ok(())
    }
}

/// Built-in validator names usable from configuration files
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    String,
    Number,
    Integer,
    Boolean,
    Object,
    Array,
    Uuid,
}

impl FieldType {
    pub fn validator(&self) -> Validator {
        match self {
            FieldType::String => string(),
            FieldType::Number => number(),
            FieldType::Integer => integer(),
            FieldType::Boolean => boolean(),
            FieldType::Object => object(),
            FieldType::Array => array(),
            FieldType::Uuid => uuid(),
        }
    }
}

/// Declarative rule for one field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldRule {
    /// Built-in validator to apply
    #[serde(rename = "type")]
    pub field_type: FieldType,

    /// Whether the field may be omitted
    #[serde(default)]
    pub optional: bool,

    /// Overrides the built-in failure message
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Complete declarative configuration for one guarded endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidatorConfig {
    #[serde(default)]
    pub options: ValidationOptions,

    /// Field rules, in declaration order
    #[serde(default, deserialize_with = "deserialize_fields")]
    pub fields: IndexMap<String, FieldRule>,
}

/// Ordered field rules; a name declared twice is an error rather than last-one-wins
fn deserialize_fields<'de, D>(deserializer: D) -> Result<IndexMap<String, FieldRule>, D::Error>
where
    D: Deserializer<'de>,
{
    struct FieldsVisitor;

    impl<'de> Visitor<'de> for FieldsVisitor {
        type Value = IndexMap<String, FieldRule>;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a map of field names to rules")
        }

        fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
        where
            A: MapAccess<'de>,
        {
            let mut fields = IndexMap::with_capacity(map.size_hint().unwrap_or(0));
            while let Some((field, rule)) = map.next_entry::<String, FieldRule>()? {
                if fields.contains_key(&field) {
                    return Err(de::Error::custom(ConfigError::DuplicateField { field }));
                }
                fields.insert(field, rule);
            }
            Ok(fields)
        }
    }

    deserializer.deserialize_map(FieldsVisitor)
}

impl ValidatorConfig {
    /// Load configuration from a YAML file
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        serde_yaml::from_str(&content).map_err(|e| ConfigError::Parse {
            file: Some(path.display().to_string()),
            message: e.to_string(),
        })
    }

    /// Load configuration from a YAML string
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        serde_yaml::from_str(yaml).map_err(|e| ConfigError::Parse {
            file: None,
            message: e.to_string(),
        })
    }

    /// Build the validator set described by the field rules
    pub fn validator_set(&self) -> Result<ValidatorSet, ConfigError> {
        ValidatorSet::try_from_iter(self.fields.iter().map(|(field, rule)| {
            let mut validator = rule.field_type.validator();
            if let Some(message) = &rule.message {
                validator = validator.with_message(message.clone());
            }
            let definition = if rule.optional {
                validator.optional()
            } else {
                validator.required()
            };
            (field.clone(), definition)
        }))
    }

    /// Build a ready-to-use validator
    pub fn build(&self) -> Result<PayloadValidator, ConfigError> {
        PayloadValidator::new(self.validator_set()?, self.options.clone())
    }
}
