// crates/formgate-core/tests/versioning.rs
// ============================================================================
// Module: Template Versioning Guard Tests
// Description: Tests for removal protection and version-bump decisions.
// Purpose: Ensure stored submissions stay resolvable and versions stay exact.
// Dependencies: formgate-core
// ============================================================================
//! ## Overview
//! Exercises `plan_fields_update` conflict detection and structural
//! comparison.

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

use formgate_core::FieldId;
use formgate_core::FieldRules;
use formgate_core::FieldSpec;
use formgate_core::FieldType;
use formgate_core::FormTemplate;
use formgate_core::TemplateVersion;
use formgate_core::Timestamp;
use formgate_core::runtime::plan_fields_update;

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

fn base_template() -> FormTemplate {
    FormTemplate {
        id: "tpl-1".into(),
        name: "Intake form".to_string(),
        description: None,
        service_id: None,
        fields: vec![text_field("goals"), text_field("timeline")],
        version: TemplateVersion::INITIAL,
        active: true,
        created_at: Timestamp::from_unix_millis(1_000),
        updated_at: Timestamp::from_unix_millis(1_000),
    }
}

// ============================================================================
// SECTION: Removal Protection
// ============================================================================

/// Verifies removing a field with zero submissions is permitted.
#[test]
fn removal_allowed_without_submissions() {
    let existing = base_template();
    let plan = plan_fields_update(&existing, vec![text_field("goals")], 0)
        .expect("removal should be permitted");
    assert_eq!(plan.fields.len(), 1);
    assert_eq!(plan.version, TemplateVersion::new(2));
}

/// Verifies removing a field with stored submissions is rejected with the
/// removed ids listed.
#[test]
fn removal_blocked_with_submissions() {
    let existing = base_template();
    let conflict = plan_fields_update(&existing, vec![text_field("goals")], 3)
        .expect_err("removal should conflict");
    assert_eq!(conflict.removed, vec![FieldId::from("timeline")]);
}

/// Verifies additions never conflict even with stored submissions.
#[test]
fn addition_allowed_with_submissions() {
    let existing = base_template();
    let incoming = vec![text_field("goals"), text_field("timeline"), text_field("budget")];
    let plan = plan_fields_update(&existing, incoming, 7).expect("additions should be permitted");
    assert_eq!(plan.version, TemplateVersion::new(2));
    assert!(plan.changed);
}

// ============================================================================
// SECTION: Version Decisions
// ============================================================================

/// Verifies any structural change bumps the version by exactly 1 regardless
/// of how many fields changed.
#[test]
fn structural_change_bumps_by_exactly_one() {
    let existing = base_template();
    let mut renamed_all = existing.fields.clone();
    for field in &mut renamed_all {
        field.label = format!("{} (updated)", field.label);
    }
    let plan = plan_fields_update(&existing, renamed_all, 0).expect("update should be permitted");
    assert_eq!(plan.version, TemplateVersion::new(2));
}

/// Verifies an identical field list keeps the version unchanged.
#[test]
fn identical_fields_keep_version() {
    let existing = base_template();
    let plan = plan_fields_update(&existing, existing.fields.clone(), 0)
        .expect("no-op update should be permitted");
    assert!(!plan.changed);
    assert_eq!(plan.version, TemplateVersion::INITIAL);
}

/// Verifies field reordering counts as a structural change.
#[test]
fn reordering_counts_as_structural_change() {
    let existing = base_template();
    let reordered = vec![text_field("timeline"), text_field("goals")];
    let plan = plan_fields_update(&existing, reordered, 0).expect("reorder should be permitted");
    assert!(plan.changed);
    assert_eq!(plan.version, TemplateVersion::new(2));
}

/// Verifies a rule change alone is structural.
#[test]
fn rule_change_is_structural() {
    let existing = base_template();
    let mut incoming = existing.fields.clone();
    incoming[0].rules = Some(FieldRules {
        required: Some(true),
        ..FieldRules::default()
    });
    let plan = plan_fields_update(&existing, incoming, 0).expect("update should be permitted");
    assert!(plan.changed);
    assert_eq!(plan.version, TemplateVersion::new(2));
}
