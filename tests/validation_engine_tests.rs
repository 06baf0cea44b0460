//! Tests for the validation engine
//!
//! These tests verify that:
//! - Payload sources are selected by precedence, never merged
//! - Required, optional and undeclared fields are reported exactly once
//! - Every violation is collected in a single pass
//! - Rejection bodies honor the configured group key

use payload_guard::prelude::*;

fn fields(value: Value) -> Fields {
    match value {
        Value::Object(map) => map,
        other => panic!("expected an object, got {}", other),
    }
}

fn body(value: Value) -> PayloadSources {
    PayloadSources::from_body(fields(value))
}

fn validator(set: ValidatorSet, options: ValidationOptions) -> PayloadValidator {
    PayloadValidator::new(set, options).expect("valid options")
}

// =============================================================================
// Reference Scenarios
// =============================================================================

mod scenario_tests {
    use super::*;

    #[test]
    fn test_scenario_a_valid_body_proceeds() {
        let set = ValidatorSet::builder()
            .field("name", string().required())
            .build()
            .unwrap();
        let v = validator(set, ValidationOptions::default());

        assert!(v.validate_sources(&body(json!({"name": "Alice"}))).is_ok());
    }

    #[test]
    fn test_scenario_b_missing_required_with_optional_absent() {
        let set = ValidatorSet::builder()
            .field("name", string().required())
            .field("age", number().optional())
            .build()
            .unwrap();
        let v = validator(set, ValidationOptions::default());

        let rejection = v.validate_sources(&body(json!({}))).unwrap_err();
        assert_eq!(
            rejection.body(),
            json!({"errors": {"name": "Required element is missing or undefined"}})
        );
    }

    #[test]
    fn test_scenario_c_type_mismatch() {
        let set = ValidatorSet::builder()
            .field("age", number().required())
            .build()
            .unwrap();
        let v = validator(set, ValidationOptions::default());

        let rejection = v.validate_sources(&body(json!({"age": "30"}))).unwrap_err();
        assert_eq!(
            rejection.body(),
            json!({"errors": {"age": "Invalid type, expected a number"}})
        );
    }

    #[test]
    fn test_scenario_d_undeclared_field_rejected() {
        let set = ValidatorSet::builder()
            .field("name", string().required())
            .build()
            .unwrap();
        let v = validator(
            set,
            ValidationOptions::default().reject_undeclared_fields(true),
        );

        let rejection = v
            .validate_sources(&body(json!({"name": "Bob", "extra": 1})))
            .unwrap_err();
        assert_eq!(
            rejection.body(),
            json!({"errors": {"extra": "Element does not exist in validator"}})
        );
    }

    #[test]
    fn test_scenario_e_query_used_when_body_empty() {
        let set = ValidatorSet::builder()
            .field("id", number().required())
            .build()
            .unwrap();
        let v = validator(set, ValidationOptions::default());

        let sources = PayloadSources::new(Fields::new(), fields(json!({"id": 5})), Fields::new());
        assert!(v.validate_sources(&sources).is_ok());
    }

    #[test]
    fn test_scenario_f_custom_group_key() {
        let set = ValidatorSet::builder()
            .field("name", string().required())
            .build()
            .unwrap();
        let v = validator(set, ValidationOptions::default().error_group_key("violations"));

        let rejection = v.validate_sources(&body(json!({"name": 1}))).unwrap_err();
        let body = rejection.body();
        assert!(body.get("violations").is_some());
        assert!(body.get("errors").is_none());
    }
}

// =============================================================================
// Properties
// =============================================================================

mod property_tests {
    use super::*;

    fn mixed_set() -> ValidatorSet {
        ValidatorSet::builder()
            .field("name", string().required())
            .field("age", number().optional())
            .field("admin", boolean().required())
            .field("tags", array().optional())
            .build()
            .unwrap()
    }

    #[test]
    fn test_error_keys_are_exactly_the_failing_fields() {
        let v = validator(
            mixed_set(),
            ValidationOptions::default().reject_undeclared_fields(true),
        );

        // name: ok, age: mismatch, admin: missing, tags: absent optional, x/y: undeclared
        let errors = v.evaluate(Some(&fields(json!({
            "name": "Alice",
            "age": "old",
            "x": 1,
            "y": null
        }))));

        let mut keys: Vec<&str> = errors.keys().map(String::as_str).collect();
        keys.sort_unstable();
        assert_eq!(keys, vec!["admin", "age", "x", "y"]);
        assert_eq!(errors["admin"], MISSING_FIELD_MESSAGE);
        assert_eq!(errors["age"], "Invalid type, expected a number");
        assert_eq!(errors["x"], UNDECLARED_FIELD_MESSAGE);
    }

    #[test]
    fn test_validation_is_idempotent() {
        let v = validator(
            mixed_set(),
            ValidationOptions::default().reject_undeclared_fields(true),
        );
        let payload = fields(json!({"age": true, "zzz": 0, "aaa": 1}));

        let first = serde_json::to_string(&v.evaluate(Some(&payload))).unwrap();
        let second = serde_json::to_string(&v.evaluate(Some(&payload))).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_optional_field_omitted_never_errors() {
        let set = ValidatorSet::builder()
            .field("age", number().optional())
            .build()
            .unwrap();
        let v = validator(set, ValidationOptions::default());

        assert!(v.validate(Some(&fields(json!({})))).is_ok());
        assert!(v.validate(None).is_ok());
    }

    #[test]
    fn test_optional_field_supplied_is_still_checked() {
        let set = ValidatorSet::builder()
            .field("age", number().optional())
            .build()
            .unwrap();
        let v = validator(set, ValidationOptions::default());

        let rejection = v.validate(Some(&fields(json!({"age": "ten"})))).unwrap_err();
        assert_eq!(rejection.errors()["age"], "Invalid type, expected a number");
    }

    #[test]
    fn test_body_precedence_ignores_query_and_path() {
        let set = ValidatorSet::builder()
            .field("id", number().required())
            .build()
            .unwrap();
        let v = validator(set, ValidationOptions::default());

        // query and path would pass, but the body is selected
        let sources = PayloadSources::new(
            fields(json!({"unrelated": true})),
            fields(json!({"id": 1})),
            fields(json!({"id": 2})),
        );
        let rejection = v.validate_sources(&sources).unwrap_err();
        assert_eq!(rejection.errors().len(), 1);
        assert_eq!(rejection.errors()["id"], MISSING_FIELD_MESSAGE);
    }

    #[test]
    fn test_path_params_used_when_body_and_query_empty() {
        let set = ValidatorSet::builder()
            .field("slug", string().required())
            .build()
            .unwrap();
        let v = validator(set, ValidationOptions::default());

        let sources =
            PayloadSources::new(Fields::new(), Fields::new(), fields(json!({"slug": "intro"})));
        assert!(v.validate_sources(&sources).is_ok());
    }

    #[test]
    fn test_undeclared_fields_ignored_when_open() {
        let v = validator(mixed_set(), ValidationOptions::default());

        let errors = v.evaluate(Some(&fields(json!({
            "name": "Alice",
            "admin": true,
            "surprise": {"nested": [1, 2]}
        }))));
        assert!(errors.is_empty());
    }

    #[test]
    fn test_no_sources_reports_every_required_field() {
        let v = validator(
            mixed_set(),
            ValidationOptions::default().reject_undeclared_fields(true),
        );

        let rejection = v.validate_sources(&PayloadSources::default()).unwrap_err();
        let keys: Vec<&str> = rejection.errors().keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["name", "admin"]);
    }

    #[test]
    fn test_errors_serialize_in_declaration_order() {
        let v = validator(mixed_set(), ValidationOptions::default());

        let rejection = v.validate(Some(&fields(json!({"age": "x"})))).unwrap_err();
        let serialized = serde_json::to_string(&rejection.body()).unwrap();
        assert_eq!(
            serialized,
            r#"{"errors":{"name":"Required element is missing or undefined","age":"Invalid type, expected a number","admin":"Required element is missing or undefined"}}"#
        );
    }
}

// =============================================================================
// Custom Validators
// =============================================================================

mod custom_validator_tests {
    use super::*;

    #[test]
    fn test_custom_predicate_with_message() {
        let even = Validator::new(|v| v.as_i64().is_some_and(|n| n % 2 == 0))
            .with_message("Expected an even number");
        let set = ValidatorSet::builder()
            .field("count", even.required())
            .field("limit", even.optional())
            .build()
            .unwrap();
        let v = validator(set, ValidationOptions::default());

        let rejection = v
            .validate(Some(&fields(json!({"count": 3, "limit": 5}))))
            .unwrap_err();
        assert_eq!(rejection.errors()["count"], "Expected an even number");
        assert_eq!(rejection.errors()["limit"], "Expected an even number");

        assert!(v.validate(Some(&fields(json!({"count": 4})))).is_ok());
    }

    #[test]
    fn test_library_validators_compose_in_a_set() {
        let set = ValidatorSet::builder()
            .field("status", one_of(["draft", "published"]).required())
            .field("title", string_length(3, 20).required())
            .field("published_on", date_format("%Y-%m-%d").optional())
            .build()
            .unwrap();
        let v = validator(set, ValidationOptions::default());

        let errors = v.evaluate(Some(&fields(json!({
            "status": "archived",
            "title": "ok",
            "published_on": "yesterday"
        }))));
        assert_eq!(errors.len(), 3);
        assert_eq!(errors["status"], "Expected one of: draft, published");
    }
}
