// crates/formgate-core/tests/proptest_response.rs
// ============================================================================
// Module: Submission Validator Property Tests
// Description: Property-based checks for normalization invariants.
// Purpose: Ensure idempotency and dedup hold for arbitrary inputs.
// Dependencies: formgate-core, proptest, serde_json
// ============================================================================
//! ## Overview
//! Property tests for `validate_responses`: normalization is idempotent, and
//! checkbox normalization always yields distinct values.

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

use std::collections::BTreeSet;

use formgate_core::DEFAULT_REGEX_SIZE_LIMIT;
use formgate_core::FieldOption;
use formgate_core::FieldSpec;
use formgate_core::FieldType;
use formgate_core::ResponseValue;
use formgate_core::validate_responses;
use proptest::prelude::*;
use serde_json::json;

// ============================================================================
// SECTION: Helpers
// ============================================================================

fn checkbox_field(values: &[&str]) -> FieldSpec {
    FieldSpec {
        id: "tags".into(),
        label: "Tags".to_string(),
        field_type: FieldType::Checkbox,
        placeholder: None,
        helper_text: None,
        options: values.iter().map(|value| FieldOption::new(*value, *value)).collect(),
        rules: None,
    }
}

fn text_field() -> FieldSpec {
    FieldSpec {
        id: "notes".into(),
        label: "Notes".to_string(),
        field_type: FieldType::Text,
        placeholder: None,
        helper_text: None,
        options: Vec::new(),
        rules: None,
    }
}

// ============================================================================
// SECTION: Properties
// ============================================================================

proptest! {
    /// Normalizing twice always equals normalizing once.
    #[test]
    fn text_normalization_is_idempotent(raw in ".{0,80}") {
        let fields = vec![text_field()];
        let first = validate_responses(&fields, &json!({"notes": raw}), DEFAULT_REGEX_SIZE_LIMIT);
        prop_assume!(first.is_valid());

        let replay = serde_json::to_value(&first.normalized).expect("normalized map serializes");
        let second = validate_responses(&fields, &replay, DEFAULT_REGEX_SIZE_LIMIT);
        prop_assert!(second.is_valid());
        prop_assert_eq!(second.normalized, first.normalized);
    }

    /// Checkbox normalization yields distinct allowed values in first-seen order.
    #[test]
    fn checkbox_normalization_yields_distinct_values(
        picks in proptest::collection::vec(prop_oneof!["a", "b", "c", "  a  ", ""], 0..12)
    ) {
        let fields = vec![checkbox_field(&["a", "b", "c"])];
        let result =
            validate_responses(&fields, &json!({"tags": picks}), DEFAULT_REGEX_SIZE_LIMIT);
        prop_assert!(result.is_valid());

        if let Some(ResponseValue::Choices(choices)) =
            result.normalized.get(&formgate_core::FieldId::from("tags"))
        {
            let distinct: BTreeSet<&String> = choices.iter().collect();
            prop_assert_eq!(distinct.len(), choices.len());
            for choice in choices {
                prop_assert!(["a", "b", "c"].contains(&choice.as_str()));
            }
        }
    }
}
