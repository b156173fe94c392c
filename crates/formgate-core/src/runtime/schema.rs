// crates/formgate-core/src/runtime/schema.rs
// ============================================================================
// Module: Formgate Template Schema Validator
// Description: Accumulating validation and normalization of template definitions.
// Purpose: Reject malformed templates with every problem reported together.
// Dependencies: crate::core, regex, serde, thiserror
// ============================================================================

//! ## Overview
//! The schema validator checks a candidate template definition against the
//! field type registry and the structural limits, accumulating every problem
//! into a path-keyed error map instead of stopping at the first. Passing
//! input is returned in normalized form with all display strings trimmed.
//! The validator is invoked identically for template creation and for the
//! fields portion of an update; it knows nothing about stored submissions.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::fmt;

use regex::Regex;
use regex::RegexBuilder;
use serde::Deserialize;
use serde::Serialize;

use crate::core::FieldOption;
use crate::core::FieldRules;
use crate::core::FieldSpec;
use crate::core::TemplateDraft;
use crate::core::TemplatePatch;

// ============================================================================
// SECTION: Limits
// ============================================================================

/// Minimum template name length after trimming.
pub const MIN_NAME_LENGTH: usize = 2;
/// Maximum template name length after trimming.
pub const MAX_NAME_LENGTH: usize = 120;
/// Maximum template description length after trimming.
pub const MAX_DESCRIPTION_LENGTH: usize = 1000;
/// Minimum number of fields per template.
pub const MIN_FIELDS: usize = 1;
/// Maximum number of fields per template.
pub const MAX_FIELDS: usize = 50;
/// Maximum field identifier length after trimming.
pub const MAX_FIELD_ID_LENGTH: usize = 64;
/// Maximum field label length after trimming.
pub const MAX_LABEL_LENGTH: usize = 120;
/// Maximum placeholder length after trimming.
pub const MAX_PLACEHOLDER_LENGTH: usize = 200;
/// Maximum helper text length after trimming.
pub const MAX_HELPER_TEXT_LENGTH: usize = 240;
/// Maximum option label/value length after trimming.
pub const MAX_OPTION_LENGTH: usize = 120;
/// Maximum length rule value.
pub const MAX_LENGTH_RULE: u32 = 5000;
/// Maximum pattern source length.
pub const MAX_PATTERN_LENGTH: usize = 200;
/// Default compiled-pattern size budget in bytes.
pub const DEFAULT_REGEX_SIZE_LIMIT: usize = 1024 * 1024;

// ============================================================================
// SECTION: Validation Errors
// ============================================================================

/// Path-keyed validation error map.
///
/// Keys are input paths such as `name`, `service_id`, or
/// `fields[3].rules.pattern`; values are human-readable messages. The map is
/// ordered for deterministic reporting.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ValidationErrors(BTreeMap<String, String>);

impl ValidationErrors {
    /// Creates an empty error map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records an error for the given path, keeping the first message per path.
    pub fn insert(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.0.entry(path.into()).or_insert_with(|| message.into());
    }

    /// Returns true when no errors were recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the number of recorded errors.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns the message recorded for a path.
    #[must_use]
    pub fn get(&self, path: &str) -> Option<&str> {
        self.0.get(path).map(String::as_str)
    }

    /// Iterates over recorded path/message pairs in path order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(path, message)| (path.as_str(), message.as_str()))
    }

    /// Consumes the map and returns the underlying entries.
    #[must_use]
    pub fn into_inner(self) -> BTreeMap<String, String> {
        self.0
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} invalid input path(s)", self.0.len())?;
        for (path, message) in &self.0 {
            write!(f, "; {path}: {message}")?;
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Validator
// ============================================================================

/// Template schema validator with a bounded regex compilation budget.
#[derive(Debug, Clone, Copy)]
pub struct TemplateValidator {
    /// Compiled-pattern size budget in bytes.
    regex_size_limit: usize,
}

impl Default for TemplateValidator {
    fn default() -> Self {
        Self::new(DEFAULT_REGEX_SIZE_LIMIT)
    }
}

impl TemplateValidator {
    /// Creates a validator with an explicit regex size budget.
    #[must_use]
    pub const fn new(regex_size_limit: usize) -> Self {
        Self {
            regex_size_limit,
        }
    }

    /// Returns the configured regex size budget.
    #[must_use]
    pub const fn regex_size_limit(&self) -> usize {
        self.regex_size_limit
    }

    /// Validates and normalizes a full create draft.
    ///
    /// # Errors
    ///
    /// Returns the accumulated [`ValidationErrors`] when any check fails;
    /// no partial normalization is returned.
    pub fn validate_draft(&self, draft: &TemplateDraft) -> Result<TemplateDraft, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let name = validate_name(&draft.name, &mut errors);
        let description = validate_description(draft.description.as_deref(), &mut errors);
        let fields = self.check_fields(&draft.fields, &mut errors);
        if errors.is_empty() {
            Ok(TemplateDraft {
                name,
                description,
                service_id: draft.service_id.clone(),
                fields,
                active: draft.active,
            })
        } else {
            Err(errors)
        }
    }

    /// Validates and normalizes a replacement field list.
    ///
    /// # Errors
    ///
    /// Returns the accumulated [`ValidationErrors`] when any check fails.
    pub fn validate_fields(&self, fields: &[FieldSpec]) -> Result<Vec<FieldSpec>, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let normalized = self.check_fields(fields, &mut errors);
        if errors.is_empty() { Ok(normalized) } else { Err(errors) }
    }

    /// Validates and normalizes an update patch.
    ///
    /// Only the members present in the patch are checked; absent members keep
    /// the stored values and are not validated here.
    ///
    /// # Errors
    ///
    /// Returns the accumulated [`ValidationErrors`] when any check fails.
    pub fn validate_patch(&self, patch: &TemplatePatch) -> Result<TemplatePatch, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let name = patch.name.as_deref().map(|name| validate_name(name, &mut errors));
        let description = validate_description(patch.description.as_deref(), &mut errors);
        let fields =
            patch.fields.as_deref().map(|fields| self.check_fields(fields, &mut errors));
        if errors.is_empty() {
            Ok(TemplatePatch {
                name,
                description,
                service_id: patch.service_id.clone(),
                active: patch.active,
                fields,
            })
        } else {
            Err(errors)
        }
    }

    /// Compiles a user-supplied pattern under the configured budget.
    ///
    /// # Errors
    ///
    /// Returns the underlying [`regex::Error`] when the pattern does not
    /// compile or exceeds the size budget.
    pub fn compile_pattern(&self, pattern: &str) -> Result<Regex, regex::Error> {
        compile_pattern(pattern, self.regex_size_limit)
    }

    /// Checks every field and accumulates errors; returns the trimmed list.
    fn check_fields(&self, fields: &[FieldSpec], errors: &mut ValidationErrors) -> Vec<FieldSpec> {
        if fields.len() < MIN_FIELDS {
            errors.insert("fields", "At least one field is required");
        }
        if fields.len() > MAX_FIELDS {
            errors.insert("fields", format!("At most {MAX_FIELDS} fields are allowed"));
        }

        let normalized: Vec<FieldSpec> = fields
            .iter()
            .enumerate()
            .map(|(index, field)| self.check_field(index, field, errors))
            .collect();

        let mut seen: BTreeSet<&str> = BTreeSet::new();
        for (index, field) in normalized.iter().enumerate() {
            if !seen.insert(field.id.as_str()) {
                errors.insert(format!("fields[{index}].id"), "Field IDs must be unique");
            }
        }
        normalized
    }

    /// Checks one field and accumulates errors; returns the trimmed spec.
    fn check_field(
        &self,
        index: usize,
        field: &FieldSpec,
        errors: &mut ValidationErrors,
    ) -> FieldSpec {
        let path = |leaf: &str| format!("fields[{index}].{leaf}");

        let id = field.id.as_str().trim();
        if id.is_empty() || id.len() > MAX_FIELD_ID_LENGTH {
            errors.insert(
                path("id"),
                format!("Field id must be 1-{MAX_FIELD_ID_LENGTH} characters"),
            );
        }

        let label = field.label.trim();
        if label.is_empty() || label.len() > MAX_LABEL_LENGTH {
            errors.insert(
                path("label"),
                format!("Label must be 1-{MAX_LABEL_LENGTH} characters"),
            );
        }

        let placeholder = field.placeholder.as_deref().map(str::trim);
        if placeholder.is_some_and(|value| value.len() > MAX_PLACEHOLDER_LENGTH) {
            errors.insert(
                path("placeholder"),
                format!("Placeholder must be at most {MAX_PLACEHOLDER_LENGTH} characters"),
            );
        }

        let helper_text = field.helper_text.as_deref().map(str::trim);
        if helper_text.is_some_and(|value| value.len() > MAX_HELPER_TEXT_LENGTH) {
            errors.insert(
                path("helper_text"),
                format!("Helper text must be at most {MAX_HELPER_TEXT_LENGTH} characters"),
            );
        }

        if field.field_type.behavior().options_required && field.options.is_empty() {
            errors.insert(
                path("options"),
                "Options are required for select, radio, and checkbox fields",
            );
        }
        for (option_index, option) in field.options.iter().enumerate() {
            let option_label = option.label.trim();
            if option_label.is_empty() || option_label.len() > MAX_OPTION_LENGTH {
                errors.insert(
                    format!("fields[{index}].options[{option_index}].label"),
                    format!("Option label must be 1-{MAX_OPTION_LENGTH} characters"),
                );
            }
            let option_value = option.value.trim();
            if option_value.is_empty() || option_value.len() > MAX_OPTION_LENGTH {
                errors.insert(
                    format!("fields[{index}].options[{option_index}].value"),
                    format!("Option value must be 1-{MAX_OPTION_LENGTH} characters"),
                );
            }
        }

        if let Some(rules) = &field.rules {
            self.check_rules(index, rules, errors);
        }

        FieldSpec {
            id: id.into(),
            label: label.to_string(),
            field_type: field.field_type,
            placeholder: placeholder.map(ToString::to_string),
            helper_text: helper_text.map(ToString::to_string),
            options: field
                .options
                .iter()
                .map(|option| FieldOption::new(option.label.trim(), option.value.trim()))
                .collect(),
            rules: field.rules.clone(),
        }
    }

    /// Checks the validation rules for one field.
    fn check_rules(&self, index: usize, rules: &FieldRules, errors: &mut ValidationErrors) {
        if rules.min_length.is_some_and(|value| value > MAX_LENGTH_RULE) {
            errors.insert(
                format!("fields[{index}].rules.min_length"),
                format!("min_length must be at most {MAX_LENGTH_RULE}"),
            );
        }
        if rules.max_length.is_some_and(|value| value == 0 || value > MAX_LENGTH_RULE) {
            errors.insert(
                format!("fields[{index}].rules.max_length"),
                format!("max_length must be 1-{MAX_LENGTH_RULE}"),
            );
        }
        if let (Some(min), Some(max)) = (rules.min_length, rules.max_length)
            && max < min
        {
            errors.insert(
                format!("fields[{index}].rules.max_length"),
                "max_length must be greater than or equal to min_length",
            );
        }
        if let Some(pattern) = &rules.pattern {
            if pattern.len() > MAX_PATTERN_LENGTH {
                errors.insert(
                    format!("fields[{index}].rules.pattern"),
                    format!("Pattern must be at most {MAX_PATTERN_LENGTH} characters"),
                );
            } else if compile_pattern(pattern, self.regex_size_limit).is_err() {
                errors.insert(format!("fields[{index}].rules.pattern"), "Invalid regex pattern");
            }
        }
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Validates and trims the template name.
fn validate_name(name: &str, errors: &mut ValidationErrors) -> String {
    let trimmed = name.trim();
    if trimmed.len() < MIN_NAME_LENGTH || trimmed.len() > MAX_NAME_LENGTH {
        errors.insert(
            "name",
            format!("Name must be {MIN_NAME_LENGTH}-{MAX_NAME_LENGTH} characters"),
        );
    }
    trimmed.to_string()
}

/// Validates and trims the template description.
fn validate_description(
    description: Option<&str>,
    errors: &mut ValidationErrors,
) -> Option<String> {
    let trimmed = description.map(str::trim)?;
    if trimmed.len() > MAX_DESCRIPTION_LENGTH {
        errors.insert(
            "description",
            format!("Description must be at most {MAX_DESCRIPTION_LENGTH} characters"),
        );
    }
    Some(trimmed.to_string())
}

/// Compiles a pattern with an explicit size budget.
///
/// The linear-time engine bounds matching cost; the size limit bounds the
/// compiled program so hostile patterns cannot exhaust memory.
pub(crate) fn compile_pattern(pattern: &str, size_limit: usize) -> Result<Regex, regex::Error> {
    RegexBuilder::new(pattern).size_limit(size_limit).build()
}
