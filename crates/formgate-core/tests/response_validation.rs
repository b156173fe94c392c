// crates/formgate-core/tests/response_validation.rs
// ============================================================================
// Module: Submission Validation Tests
// Description: Tests for per-field response validation and normalization.
// Purpose: Ensure raw payloads normalize deterministically and fail closed.
// Dependencies: formgate-core, serde_json
// ============================================================================
//! ## Overview
//! Exercises `validate_responses` across field shapes, absence semantics,
//! rule ordering, and idempotency over its own normalized output.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only output and panic-based assertions are permitted."
)]

use formgate_core::DEFAULT_REGEX_SIZE_LIMIT;
use formgate_core::FieldId;
use formgate_core::FieldOption;
use formgate_core::FieldRules;
use formgate_core::FieldSpec;
use formgate_core::FieldType;
use formgate_core::ResponseValue;
use formgate_core::validate_responses;
use serde_json::Value;
use serde_json::json;

// ============================================================================
// SECTION: Helpers
// ============================================================================

fn field(id: &str, field_type: FieldType) -> FieldSpec {
    FieldSpec {
        id: id.into(),
        label: format!("Label for {id}"),
        field_type,
        placeholder: None,
        helper_text: None,
        options: Vec::new(),
        rules: None,
    }
}

fn required(mut spec: FieldSpec) -> FieldSpec {
    let mut rules = spec.rules.take().unwrap_or_default();
    rules.required = Some(true);
    spec.rules = Some(rules);
    spec
}

fn with_options(mut spec: FieldSpec, values: &[&str]) -> FieldSpec {
    spec.options = values.iter().map(|value| FieldOption::new(*value, *value)).collect();
    spec
}

fn validate(fields: &[FieldSpec], raw: &Value) -> formgate_core::ResponseValidation {
    validate_responses(fields, raw, DEFAULT_REGEX_SIZE_LIMIT)
}

fn fid(id: &str) -> FieldId {
    id.into()
}

// ============================================================================
// SECTION: Absence Semantics
// ============================================================================

/// Verifies required fields error on missing, null, and whitespace values.
#[test]
fn required_field_errors_on_absent_values() {
    let fields = vec![required(field("goals", FieldType::Text))];
    for raw in [json!({}), json!({"goals": null}), json!({"goals": "   "})] {
        let result = validate(&fields, &raw);
        assert_eq!(result.errors.get(&fid("goals")).map(String::as_str), Some("This field is required"));
    }
}

/// Verifies a required whitespace-only value errors required, never min_length.
#[test]
fn required_whitespace_never_reports_min_length() {
    let mut spec = required(field("goals", FieldType::Text));
    if let Some(rules) = spec.rules.as_mut() {
        rules.min_length = Some(5);
    }
    let result = validate(&[spec], &json!({"goals": "   "}));
    assert_eq!(
        result.errors.get(&fid("goals")).map(String::as_str),
        Some("This field is required")
    );
}

/// Verifies optional absent fields are skipped without a normalized entry.
#[test]
fn optional_absent_field_is_skipped() {
    let fields = vec![field("notes", FieldType::Textarea)];
    let result = validate(&fields, &json!({}));
    assert!(result.is_valid());
    assert!(result.normalized.is_empty());
}

/// Verifies a non-object payload is treated as an empty response map.
#[test]
fn non_object_payload_counts_as_empty() {
    let fields = vec![required(field("goals", FieldType::Text))];
    let result = validate(&fields, &json!(["not", "a", "map"]));
    assert!(!result.is_valid());
    assert_eq!(result.errors.len(), 1);
}

// ============================================================================
// SECTION: Text Fields
// ============================================================================

/// Verifies non-string values for text fields are rejected.
#[test]
fn text_field_rejects_non_string_value() {
    let fields = vec![field("goals", FieldType::Text)];
    let result = validate(&fields, &json!({"goals": 42}));
    assert_eq!(
        result.errors.get(&fid("goals")).map(String::as_str),
        Some("Expected a string value")
    );
}

/// Verifies text values are trimmed during normalization.
#[test]
fn text_field_trims_value() {
    let fields = vec![field("goals", FieldType::Text)];
    let result = validate(&fields, &json!({"goals": "  plan things  "}));
    assert!(result.is_valid());
    assert_eq!(
        result.normalized.get(&fid("goals")),
        Some(&ResponseValue::Text("plan things".to_string()))
    );
}

/// Verifies rule ordering: min_length fails before max_length and pattern.
#[test]
fn text_rules_apply_in_order() {
    let mut spec = field("code", FieldType::Text);
    spec.rules = Some(FieldRules {
        required: Some(true),
        min_length: Some(5),
        max_length: Some(8),
        pattern: Some("^[a-z]+$".to_string()),
    });
    let fields = vec![spec];

    let short = validate(&fields, &json!({"code": "ab"}));
    assert_eq!(
        short.errors.get(&fid("code")).map(String::as_str),
        Some("Must be at least 5 characters")
    );

    let long = validate(&fields, &json!({"code": "abcdefghij"}));
    assert_eq!(
        long.errors.get(&fid("code")).map(String::as_str),
        Some("Must be at most 8 characters")
    );

    let mismatched = validate(&fields, &json!({"code": "abc123"}));
    assert_eq!(mismatched.errors.get(&fid("code")).map(String::as_str), Some("Invalid format"));

    let ok = validate(&fields, &json!({"code": "abcdef"}));
    assert!(ok.is_valid());
}

// ============================================================================
// SECTION: Choice Fields
// ============================================================================

/// Verifies select values must be one of the allowed options.
#[test]
fn select_field_rejects_unknown_option() {
    let fields =
        vec![required(with_options(field("timeline", FieldType::Select), &["2-weeks", "1-month"]))];
    let result = validate(&fields, &json!({"timeline": "3-months"}));
    assert_eq!(
        result.errors.get(&fid("timeline")).map(String::as_str),
        Some("Invalid option selected")
    );
}

/// Verifies checkbox responses must be arrays.
#[test]
fn checkbox_field_rejects_non_array() {
    let fields = vec![with_options(field("tags", FieldType::Checkbox), &["a", "b"])];
    let result = validate(&fields, &json!({"tags": "a"}));
    assert_eq!(
        result.errors.get(&fid("tags")).map(String::as_str),
        Some("Expected an array of values")
    );
}

/// Verifies checkbox normalization deduplicates surviving values.
#[test]
fn checkbox_normalization_deduplicates() {
    let fields = vec![with_options(field("tags", FieldType::Checkbox), &["a", "b", "c"])];
    let result = validate(&fields, &json!({"tags": ["a", "a", "b"]}));
    assert!(result.is_valid());
    assert_eq!(
        result.normalized.get(&fid("tags")),
        Some(&ResponseValue::Choices(vec!["a".to_string(), "b".to_string()]))
    );
}

/// Verifies values outside the option set are rejected as invalid choices.
#[test]
fn checkbox_rejects_values_outside_options() {
    let fields = vec![with_options(field("tags", FieldType::Checkbox), &["a", "b"])];
    let result = validate(&fields, &json!({"tags": ["a", "z"]}));
    assert_eq!(
        result.errors.get(&fid("tags")).map(String::as_str),
        Some("Contains invalid choices")
    );
}

/// Verifies a required checkbox with only empty entries errors.
#[test]
fn required_checkbox_errors_when_all_entries_dropped() {
    let fields = vec![required(with_options(field("tags", FieldType::Checkbox), &["a", "b"]))];
    let result = validate(&fields, &json!({"tags": ["  ", ""]}));
    assert_eq!(
        result.errors.get(&fid("tags")).map(String::as_str),
        Some("Please choose at least one option")
    );
}

// ============================================================================
// SECTION: Unknown Keys and Idempotency
// ============================================================================

/// Verifies response keys not in the template are silently dropped.
#[test]
fn unknown_response_keys_are_dropped() {
    let fields = vec![field("goals", FieldType::Text)];
    let result = validate(&fields, &json!({"goals": "ok", "extra": "ignored"}));
    assert!(result.is_valid());
    assert_eq!(result.normalized.len(), 1);
    assert!(result.normalized.get(&fid("extra")).is_none());
}

/// Verifies re-validating normalized output yields identical values.
#[test]
fn validation_is_idempotent_over_normalized_output() {
    let fields = vec![
        required(field("goals", FieldType::Text)),
        with_options(field("tags", FieldType::Checkbox), &["a", "b", "c"]),
    ];
    let first = validate(&fields, &json!({"goals": "  plan  ", "tags": ["b", "a", "b"]}));
    assert!(first.is_valid());

    let replay = serde_json::to_value(&first.normalized).expect("normalized map serializes");
    let second = validate(&fields, &replay);
    assert!(second.is_valid());
    assert_eq!(second.normalized, first.normalized);
}

// ============================================================================
// SECTION: Scenario
// ============================================================================

/// Verifies the intake scenario: valid payload passes, invalid payload
/// reports both the required and the option error together.
#[test]
fn intake_scenario_reports_both_errors() {
    let mut goals = required(field("goals", FieldType::Textarea));
    if let Some(rules) = goals.rules.as_mut() {
        rules.min_length = Some(5);
    }
    let timeline =
        required(with_options(field("timeline", FieldType::Select), &["2-weeks", "1-month"]));
    let fields = vec![goals, timeline];

    let ok = validate(&fields, &json!({"goals": "Plan my wardrobe", "timeline": "2-weeks"}));
    assert!(ok.is_valid());
    assert_eq!(
        ok.normalized.get(&fid("timeline")),
        Some(&ResponseValue::Text("2-weeks".to_string()))
    );

    let bad = validate(&fields, &json!({"goals": "", "timeline": "3-months"}));
    assert_eq!(bad.errors.len(), 2);
    assert_eq!(
        bad.errors.get(&fid("goals")).map(String::as_str),
        Some("This field is required")
    );
    assert_eq!(
        bad.errors.get(&fid("timeline")).map(String::as_str),
        Some("Invalid option selected")
    );
}
