// crates/formgate-core/src/runtime/versioning.rs
// ============================================================================
// Module: Formgate Template Versioning Guard
// Description: Destructive-change protection and version-bump decisions.
// Purpose: Keep stored submissions resolvable against their template fields.
// Dependencies: crate::core, thiserror
// ============================================================================

//! ## Overview
//! The versioning guard governs mutation of an existing template's field
//! list. Field removal is blocked whenever any submission references the
//! template, because stored responses are keyed by field id. Any structural
//! change to the list bumps the version by exactly 1; metadata-only changes
//! (name, description, service link, active flag) never touch the version.
//!
//! Structural difference is decided by comparing the typed, normalized field
//! lists, so serialization key order cannot force a spurious bump.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;

use thiserror::Error;

use crate::core::FieldId;
use crate::core::FieldSpec;
use crate::core::FormTemplate;
use crate::core::TemplateVersion;

// ============================================================================
// SECTION: Conflict Error
// ============================================================================

/// Destructive update blocked by existing submissions.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("cannot remove fields from a template that already has submissions: {}", removed_labels(removed))]
pub struct RemovedFieldsConflict {
    /// Field ids present in the stored template but absent from the patch.
    pub removed: Vec<FieldId>,
}

/// Joins removed field ids for the conflict message.
fn removed_labels(removed: &[FieldId]) -> String {
    removed.iter().map(FieldId::as_str).collect::<Vec<_>>().join(", ")
}

// ============================================================================
// SECTION: Update Plan
// ============================================================================

/// Resolved outcome of a fields update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldsUpdatePlan {
    /// Field list to persist.
    pub fields: Vec<FieldSpec>,
    /// Version to persist.
    pub version: TemplateVersion,
    /// Whether the list differed structurally from the stored one.
    pub changed: bool,
}

/// Plans a fields update against the stored template.
///
/// `incoming` must already have passed schema validation. `submission_count`
/// is the number of stored submissions referencing the template at the time
/// of the snapshot read; the caller is responsible for running the read and
/// the subsequent write inside one store transaction.
///
/// # Errors
///
/// Returns [`RemovedFieldsConflict`] when the patch removes field ids and the
/// template already has submissions; nothing may be applied in that case.
pub fn plan_fields_update(
    existing: &FormTemplate,
    incoming: Vec<FieldSpec>,
    submission_count: u64,
) -> Result<FieldsUpdatePlan, RemovedFieldsConflict> {
    if submission_count > 0 {
        let incoming_ids: BTreeSet<&str> =
            incoming.iter().map(|field| field.id.as_str()).collect();
        let removed: Vec<FieldId> = existing
            .fields
            .iter()
            .map(|field| &field.id)
            .filter(|id| !incoming_ids.contains(id.as_str()))
            .cloned()
            .collect();
        if !removed.is_empty() {
            return Err(RemovedFieldsConflict {
                removed,
            });
        }
    }

    let changed = existing.fields != incoming;
    let version = if changed { existing.version.bump() } else { existing.version };
    Ok(FieldsUpdatePlan {
        fields: incoming,
        version,
        changed,
    })
}
