// crates/formgate-core/tests/schema_validation.rs
// ============================================================================
// Module: Template Schema Validation Tests
// Description: Tests for template definition invariants and accumulated errors.
// Purpose: Ensure template validation fails closed on malformed definitions.
// Dependencies: formgate-core
// ============================================================================
//! ## Overview
//! Exercises `TemplateValidator` error accumulation and the success path.

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

use formgate_core::FieldOption;
use formgate_core::FieldRules;
use formgate_core::FieldSpec;
use formgate_core::FieldType;
use formgate_core::TemplateDraft;
use formgate_core::TemplatePatch;
use formgate_core::TemplateValidator;

// ============================================================================
// SECTION: Helpers
// ============================================================================

fn text_field(id: &str) -> FieldSpec {
    FieldSpec {
        id: id.into(),
        label: format!("Label for {id}"),
        field_type: FieldType::Text,
        placeholder: None,
        helper_text: None,
        options: Vec::new(),
        rules: None,
    }
}

fn select_field(id: &str, values: &[&str]) -> FieldSpec {
    FieldSpec {
        id: id.into(),
        label: format!("Label for {id}"),
        field_type: FieldType::Select,
        placeholder: None,
        helper_text: None,
        options: values.iter().map(|value| FieldOption::new(*value, *value)).collect(),
        rules: None,
    }
}

fn base_draft() -> TemplateDraft {
    TemplateDraft {
        name: "Intake form".to_string(),
        description: Some("Collects project intake details".to_string()),
        service_id: None,
        fields: vec![text_field("goals"), select_field("timeline", &["2-weeks", "1-month"])],
        active: None,
    }
}

// ============================================================================
// SECTION: Success Path
// ============================================================================

/// Verifies a well-formed draft validates and is returned trimmed.
#[test]
fn validate_draft_accepts_valid_draft() {
    let validator = TemplateValidator::default();
    let mut draft = base_draft();
    draft.name = "  Intake form  ".to_string();
    draft.fields[0].label = "  Goals  ".to_string();

    let normalized = validator.validate_draft(&draft).expect("draft should validate");
    assert_eq!(normalized.name, "Intake form");
    assert_eq!(normalized.fields[0].label, "Goals");
}

/// Verifies option labels and values are trimmed during normalization.
#[test]
fn validate_draft_trims_option_strings() {
    let validator = TemplateValidator::default();
    let mut draft = base_draft();
    draft.fields[1].options[0] = FieldOption::new("  2 weeks  ", "  2-weeks  ");

    let normalized = validator.validate_draft(&draft).expect("draft should validate");
    assert_eq!(normalized.fields[1].options[0].label, "2 weeks");
    assert_eq!(normalized.fields[1].options[0].value, "2-weeks");
}

// ============================================================================
// SECTION: Accumulation
// ============================================================================

/// Verifies every problem is reported together rather than short-circuiting.
#[test]
fn validate_draft_accumulates_all_errors() {
    let validator = TemplateValidator::default();
    let mut draft = base_draft();
    draft.name = "x".to_string();
    draft.fields[0].label = String::new();
    draft.fields[1].options.clear();

    let errors = validator.validate_draft(&draft).expect_err("draft should fail");
    assert_eq!(errors.len(), 3);
    assert!(errors.get("name").is_some());
    assert!(errors.get("fields[0].label").is_some());
    assert!(errors.get("fields[1].options").is_some());
}

// ============================================================================
// SECTION: Structural Checks
// ============================================================================

/// Verifies an empty field list is rejected.
#[test]
fn validate_draft_rejects_empty_field_list() {
    let validator = TemplateValidator::default();
    let mut draft = base_draft();
    draft.fields.clear();

    let errors = validator.validate_draft(&draft).expect_err("draft should fail");
    assert!(errors.get("fields").is_some());
}

/// Verifies field lists above the limit are rejected.
#[test]
fn validate_draft_rejects_oversized_field_list() {
    let validator = TemplateValidator::default();
    let mut draft = base_draft();
    draft.fields = (0..51).map(|index| text_field(&format!("field-{index}"))).collect();

    let errors = validator.validate_draft(&draft).expect_err("draft should fail");
    assert!(errors.get("fields").is_some());
}

/// Verifies duplicate field ids are rejected with the duplicate's index.
#[test]
fn validate_draft_rejects_duplicate_field_ids() {
    let validator = TemplateValidator::default();
    let mut draft = base_draft();
    draft.fields.push(text_field("goals"));

    let errors = validator.validate_draft(&draft).expect_err("draft should fail");
    assert_eq!(errors.get("fields[2].id"), Some("Field IDs must be unique"));
}

/// Verifies choice fields without options are rejected.
#[test]
fn validate_draft_rejects_choice_field_without_options() {
    let validator = TemplateValidator::default();
    for field_type in [FieldType::Select, FieldType::Radio, FieldType::Checkbox] {
        let mut draft = base_draft();
        draft.fields[1] = FieldSpec {
            field_type,
            options: Vec::new(),
            ..select_field("choice", &["a"])
        };
        let errors = validator.validate_draft(&draft).expect_err("draft should fail");
        assert!(errors.get("fields[1].options").is_some(), "missing error for {field_type}");
    }
}

/// Verifies overlong field ids are rejected.
#[test]
fn validate_draft_rejects_overlong_field_id() {
    let validator = TemplateValidator::default();
    let mut draft = base_draft();
    draft.fields[0].id = "x".repeat(65).into();

    let errors = validator.validate_draft(&draft).expect_err("draft should fail");
    assert!(errors.get("fields[0].id").is_some());
}

// ============================================================================
// SECTION: Rule Checks
// ============================================================================

/// Verifies an uncompilable pattern is rejected with a field-scoped path.
#[test]
fn validate_draft_rejects_invalid_pattern() {
    let validator = TemplateValidator::default();
    let mut draft = base_draft();
    draft.fields[0].rules = Some(FieldRules {
        pattern: Some("([unclosed".to_string()),
        ..FieldRules::default()
    });

    let errors = validator.validate_draft(&draft).expect_err("draft should fail");
    assert_eq!(errors.get("fields[0].rules.pattern"), Some("Invalid regex pattern"));
}

/// Verifies a pattern above the compiled-size budget is rejected.
#[test]
fn validate_draft_rejects_pattern_over_budget() {
    let validator = TemplateValidator::new(16);
    let mut draft = base_draft();
    draft.fields[0].rules = Some(FieldRules {
        pattern: Some("(a|b|c|d|e|f)+x{1,10}".to_string()),
        ..FieldRules::default()
    });

    let errors = validator.validate_draft(&draft).expect_err("draft should fail");
    assert_eq!(errors.get("fields[0].rules.pattern"), Some("Invalid regex pattern"));
}

/// Verifies max_length below min_length is rejected.
#[test]
fn validate_draft_rejects_inverted_length_bounds() {
    let validator = TemplateValidator::default();
    let mut draft = base_draft();
    draft.fields[0].rules = Some(FieldRules {
        min_length: Some(10),
        max_length: Some(5),
        ..FieldRules::default()
    });

    let errors = validator.validate_draft(&draft).expect_err("draft should fail");
    assert_eq!(
        errors.get("fields[0].rules.max_length"),
        Some("max_length must be greater than or equal to min_length")
    );
}

/// Verifies length rules above the hard cap are rejected.
#[test]
fn validate_draft_rejects_length_rules_over_cap() {
    let validator = TemplateValidator::default();
    let mut draft = base_draft();
    draft.fields[0].rules = Some(FieldRules {
        min_length: Some(5001),
        max_length: Some(5001),
        ..FieldRules::default()
    });

    let errors = validator.validate_draft(&draft).expect_err("draft should fail");
    assert!(errors.get("fields[0].rules.min_length").is_some());
    assert!(errors.get("fields[0].rules.max_length").is_some());
}

// ============================================================================
// SECTION: Patch Validation
// ============================================================================

/// Verifies an empty patch validates without touching anything.
#[test]
fn validate_patch_accepts_empty_patch() {
    let validator = TemplateValidator::default();
    let patch = TemplatePatch::default();
    assert!(patch.is_empty());
    let normalized = validator.validate_patch(&patch).expect("patch should validate");
    assert!(normalized.is_empty());
}

/// Verifies patch members present are validated like draft members.
#[test]
fn validate_patch_rejects_short_name() {
    let validator = TemplateValidator::default();
    let patch = TemplatePatch {
        name: Some(" x ".to_string()),
        ..TemplatePatch::default()
    };
    let errors = validator.validate_patch(&patch).expect_err("patch should fail");
    assert!(errors.get("name").is_some());
}

/// Verifies a patched field list is fully validated.
#[test]
fn validate_patch_checks_replacement_fields() {
    let validator = TemplateValidator::default();
    let patch = TemplatePatch {
        fields: Some(vec![select_field("choice", &[])]),
        ..TemplatePatch::default()
    };
    let errors = validator.validate_patch(&patch).expect_err("patch should fail");
    assert!(errors.get("fields[0].options").is_some());
}
