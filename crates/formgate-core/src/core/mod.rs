// crates/formgate-core/src/core/mod.rs
// ============================================================================
// Module: Formgate Core Types
// Description: Canonical template, field, and submission structures.
// Purpose: Provide stable, serializable types for Formgate records.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! Formgate core types define field specifications, form templates, and
//! submission records. These types are the canonical source of truth for any
//! derived API surfaces (HTTP handlers or SDKs) and for the store layer.

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod field;
pub mod identifiers;
pub mod submission;
pub mod template;
pub mod time;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use field::FieldOption;
pub use field::FieldRules;
pub use field::FieldSpec;
pub use field::FieldType;
pub use field::FieldTypeBehavior;
pub use field::ValueShape;
pub use identifiers::FieldId;
pub use identifiers::ServiceId;
pub use identifiers::SubmissionId;
pub use identifiers::TemplateId;
pub use identifiers::TemplateVersion;
pub use identifiers::UserId;
pub use submission::FormSubmission;
pub use submission::NewSubmission;
pub use submission::ResponseMap;
pub use submission::ResponseValue;
pub use submission::SubmissionIdentity;
pub use submission::SubmissionMetadata;
pub use submission::normalize_email;
pub use template::FormTemplate;
pub use template::TemplateDraft;
pub use template::TemplatePatch;
pub use time::Timestamp;
