// crates/formgate-core/src/runtime/response.rs
// ============================================================================
// Module: Formgate Submission Validator
// Description: Per-field validation and normalization of raw response payloads.
// Purpose: Turn untrusted response maps into normalized values or field errors.
// Dependencies: crate::core, crate::runtime::schema, serde_json
// ============================================================================

//! ## Overview
//! The submission validator walks a template's fields in template order and
//! checks the raw response map against each field specification. Missing,
//! null, and all-whitespace values count as absent. Checkbox fields expect an
//! array and normalize to a deduplicated set of option values; every other
//! type expects a string and normalizes to its trimmed form. Response keys
//! that do not name a template field are silently dropped. Re-validating the
//! validator's own normalized output yields no errors and identical values.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::collections::BTreeSet;

use serde_json::Value;

use crate::core::FieldId;
use crate::core::FieldSpec;
use crate::core::ResponseMap;
use crate::core::ResponseValue;
use crate::core::ValueShape;
use crate::runtime::schema::compile_pattern;

// ============================================================================
// SECTION: Result Type
// ============================================================================

/// Outcome of validating one raw response map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseValidation {
    /// Field-level error messages keyed by field id.
    pub errors: BTreeMap<FieldId, String>,
    /// Normalized values for fields that passed.
    pub normalized: ResponseMap,
}

impl ResponseValidation {
    /// Returns true when no field produced an error.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

// ============================================================================
// SECTION: Validator
// ============================================================================

/// Validates a raw response payload against a template's field list.
///
/// `raw` may be any JSON value; anything other than an object is treated as
/// an empty response map. `regex_size_limit` bounds pattern compilation at
/// evaluation time with the same budget used during template validation.
#[must_use]
pub fn validate_responses(
    fields: &[FieldSpec],
    raw: &Value,
    regex_size_limit: usize,
) -> ResponseValidation {
    let empty = serde_json::Map::new();
    let responses = raw.as_object().unwrap_or(&empty);

    let mut errors: BTreeMap<FieldId, String> = BTreeMap::new();
    let mut normalized: ResponseMap = BTreeMap::new();

    for field in fields {
        let raw_value = responses.get(field.id.as_str());
        if is_absent(raw_value) {
            if field.is_required() {
                errors.insert(field.id.clone(), "This field is required".to_string());
            }
            continue;
        }
        // is_absent filtered the None case above.
        let Some(value) = raw_value else { continue };

        match field.field_type.behavior().value_shape {
            ValueShape::Choices => match check_choices(field, value) {
                Ok(choices) => {
                    normalized.insert(field.id.clone(), ResponseValue::Choices(choices));
                }
                Err(message) => {
                    errors.insert(field.id.clone(), message);
                }
            },
            ValueShape::Text => match check_text(field, value, regex_size_limit) {
                Ok(text) => {
                    normalized.insert(field.id.clone(), ResponseValue::Text(text));
                }
                Err(message) => {
                    errors.insert(field.id.clone(), message);
                }
            },
        }
    }

    ResponseValidation {
        errors,
        normalized,
    }
}

// ============================================================================
// SECTION: Per-Shape Checks
// ============================================================================

/// Checks a checkbox response; returns the deduplicated choice set.
///
/// An optional field whose entries were all dropped normalizes to an empty
/// set rather than being skipped; only absent inputs skip the field.
fn check_choices(field: &FieldSpec, value: &Value) -> Result<Vec<String>, String> {
    let Some(entries) = value.as_array() else {
        return Err("Expected an array of values".to_string());
    };

    let choices: Vec<&str> = entries
        .iter()
        .filter_map(Value::as_str)
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .collect();

    if field.is_required() && choices.is_empty() {
        return Err("Please choose at least one option".to_string());
    }

    if !field.options.is_empty() {
        let allowed: BTreeSet<&str> = field.allowed_values().into_iter().collect();
        if choices.iter().any(|choice| !allowed.contains(choice)) {
            return Err("Contains invalid choices".to_string());
        }
    }

    let mut seen: BTreeSet<&str> = BTreeSet::new();
    let distinct: Vec<String> = choices
        .into_iter()
        .filter(|choice| seen.insert(*choice))
        .map(ToString::to_string)
        .collect();
    Ok(distinct)
}

/// Checks a text-shaped response; returns the trimmed value.
fn check_text(field: &FieldSpec, value: &Value, regex_size_limit: usize) -> Result<String, String> {
    let Some(raw) = value.as_str() else {
        return Err("Expected a string value".to_string());
    };
    let trimmed = raw.trim();

    if field.is_required() && trimmed.is_empty() {
        return Err("This field is required".to_string());
    }

    let rules = field.rules.clone().unwrap_or_default();
    let length = trimmed.chars().count() as u64;
    if let Some(min) = rules.min_length
        && length < u64::from(min)
    {
        return Err(format!("Must be at least {min} characters"));
    }
    if let Some(max) = rules.max_length
        && length > u64::from(max)
    {
        return Err(format!("Must be at most {max} characters"));
    }
    if let Some(pattern) = &rules.pattern {
        // Fail closed when a stored pattern no longer compiles under the budget.
        let matched = compile_pattern(pattern, regex_size_limit)
            .map(|regex| regex.is_match(trimmed))
            .unwrap_or(false);
        if !matched {
            return Err("Invalid format".to_string());
        }
    }

    if field.field_type.is_choice()
        && !field.options.is_empty()
        && !field.options.iter().any(|option| option.value == trimmed)
    {
        return Err("Invalid option selected".to_string());
    }

    Ok(trimmed.to_string())
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Returns true when a raw value counts as absent.
fn is_absent(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(text)) => text.trim().is_empty(),
        Some(_) => false,
    }
}
