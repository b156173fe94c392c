// crates/formgate-core/src/core/field.rs
// ============================================================================
// Module: Formgate Field Specifications
// Description: Field types, the field type registry, and per-field rules.
// Purpose: Define the canonical shape of one question within a form template.
// Dependencies: crate::core::identifiers, serde
// ============================================================================

//! ## Overview
//! A field specification describes one question: its stable identifier,
//! display strings, type, choice options, and validation rules. The field
//! type registry is an immutable behavior table keyed by [`FieldType`]; it
//! tells both validators whether options are mandatory for a type and which
//! submission value shape the type expects. Unrecognized type strings fail
//! deserialization and are therefore rejected at template-validation time,
//! never at submission time.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;

use crate::core::identifiers::FieldId;

// ============================================================================
// SECTION: Field Types
// ============================================================================

/// Closed set of supported field types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    /// Single-line free text.
    Text,
    /// Multi-line free text.
    Textarea,
    /// Single choice from a dropdown.
    Select,
    /// Single choice from radio buttons.
    Radio,
    /// Multiple choices from checkboxes.
    Checkbox,
}

impl FieldType {
    /// All field types in declaration order.
    pub const ALL: [Self; 5] =
        [Self::Text, Self::Textarea, Self::Select, Self::Radio, Self::Checkbox];

    /// Returns the registry entry describing this type's behavior.
    #[must_use]
    pub const fn behavior(self) -> FieldTypeBehavior {
        match self {
            Self::Text | Self::Textarea => FieldTypeBehavior {
                options_required: false,
                value_shape: ValueShape::Text,
            },
            Self::Select | Self::Radio => FieldTypeBehavior {
                options_required: true,
                value_shape: ValueShape::Text,
            },
            Self::Checkbox => FieldTypeBehavior {
                options_required: true,
                value_shape: ValueShape::Choices,
            },
        }
    }

    /// Returns true when this type carries a fixed set of choice options.
    #[must_use]
    pub const fn is_choice(self) -> bool {
        self.behavior().options_required
    }

    /// Returns the canonical label for the type.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Textarea => "textarea",
            Self::Select => "select",
            Self::Radio => "radio",
            Self::Checkbox => "checkbox",
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Shape of the normalized submission value for a field type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueShape {
    /// A single trimmed string.
    Text,
    /// An array of distinct option values.
    Choices,
}

/// Registry entry describing how a field type behaves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldTypeBehavior {
    /// Whether the field must carry a non-empty option list.
    pub options_required: bool,
    /// Which submission value shape the type expects.
    pub value_shape: ValueShape,
}

// ============================================================================
// SECTION: Options and Rules
// ============================================================================

/// One selectable option for choice-type fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldOption {
    /// Display label for the option.
    pub label: String,
    /// Stored value for the option.
    pub value: String,
}

impl FieldOption {
    /// Creates an option from a label and value.
    #[must_use]
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
        }
    }
}

/// Validation rules attached to a field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldRules {
    /// Whether a response for this field is mandatory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required: Option<bool>,
    /// Minimum trimmed length for text-like values.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_length: Option<u32>,
    /// Maximum trimmed length for text-like values.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<u32>,
    /// Regular expression the trimmed value must match.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
}

impl FieldRules {
    /// Returns true when the field requires a response.
    #[must_use]
    pub fn is_required(&self) -> bool {
        self.required.unwrap_or(false)
    }
}

// ============================================================================
// SECTION: Field Specification
// ============================================================================

/// One question within a form template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSpec {
    /// Stable identifier, unique within the template.
    pub id: FieldId,
    /// Display label shown to respondents.
    pub label: String,
    /// Field type governing options and value shape.
    #[serde(rename = "type")]
    pub field_type: FieldType,
    /// Optional placeholder hint.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    /// Optional helper text shown below the field.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub helper_text: Option<String>,
    /// Ordered choice options; required non-empty for choice types.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<FieldOption>,
    /// Optional validation rules.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rules: Option<FieldRules>,
}

impl FieldSpec {
    /// Returns true when the field requires a response.
    #[must_use]
    pub fn is_required(&self) -> bool {
        self.rules.as_ref().is_some_and(FieldRules::is_required)
    }

    /// Returns the allowed option values in declaration order.
    #[must_use]
    pub fn allowed_values(&self) -> Vec<&str> {
        self.options.iter().map(|option| option.value.as_str()).collect()
    }
}
