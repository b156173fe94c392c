// crates/formgate-core/src/core/template.rs
// ============================================================================
// Module: Formgate Template Records
// Description: Form template records, create drafts, and update patches.
// Purpose: Define the canonical, versioned template structure and its inputs.
// Dependencies: crate::core::{field, identifiers, time}, serde
// ============================================================================

//! ## Overview
//! A form template is an ordered, versioned collection of field
//! specifications plus display metadata. Templates are created at version 1,
//! mutated in place by administrators, and never hard-deleted: deletion is
//! redefined as setting `active = false`. Structural field-list changes bump
//! the version by exactly 1; metadata-only changes leave it untouched.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

use crate::core::field::FieldSpec;
use crate::core::identifiers::ServiceId;
use crate::core::identifiers::TemplateId;
use crate::core::identifiers::TemplateVersion;
use crate::core::time::Timestamp;

// ============================================================================
// SECTION: Template Record
// ============================================================================

/// Canonical stored form template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormTemplate {
    /// Template identifier.
    pub id: TemplateId,
    /// Display name.
    pub name: String,
    /// Optional description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Optional reference to an external service entity.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_id: Option<ServiceId>,
    /// Ordered field specifications, ids unique within the list.
    pub fields: Vec<FieldSpec>,
    /// Version tag, bumped only on structural field-list changes.
    pub version: TemplateVersion,
    /// Whether the template accepts public submissions.
    pub active: bool,
    /// Creation timestamp.
    pub created_at: Timestamp,
    /// Last update timestamp.
    pub updated_at: Timestamp,
}

impl FormTemplate {
    /// Returns true when the template is visible to public submission.
    #[must_use]
    pub const fn is_public(&self) -> bool {
        self.active
    }
}

// ============================================================================
// SECTION: Create Draft
// ============================================================================

/// Input for template creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateDraft {
    /// Display name.
    pub name: String,
    /// Optional description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Optional reference to an external service entity.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_id: Option<ServiceId>,
    /// Ordered field specifications.
    pub fields: Vec<FieldSpec>,
    /// Whether the template starts active; defaults to true.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
}

// ============================================================================
// SECTION: Update Patch
// ============================================================================

/// Input for template updates.
///
/// Every member is optional; `None` keeps the stored value. Matching the
/// original system there is no way to clear a value through a patch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplatePatch {
    /// Replacement display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Replacement description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Replacement service reference.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_id: Option<ServiceId>,
    /// Replacement active flag.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
    /// Full replacement field list.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fields: Option<Vec<FieldSpec>>,
}

impl TemplatePatch {
    /// Returns true when the patch contains no changes at all.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.service_id.is_none()
            && self.active.is_none()
            && self.fields.is_none()
    }
}
