// crates/formgate-core/src/core/submission.rs
// ============================================================================
// Module: Formgate Submission Records
// Description: Submission records, normalized response values, and identity.
// Purpose: Capture one respondent's validated answers pinned to a template version.
// Dependencies: crate::core::{identifiers, time}, serde
// ============================================================================

//! ## Overview
//! A submission is an immutable record of one validated response set. It pins
//! the template version active at submission time; later template evolution
//! never rewrites stored submissions. Submission identity is the
//! authenticated user id when present, otherwise the (normalized) guest
//! email; at least one of the two is always recorded.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use serde::Deserialize;
use serde::Serialize;

use crate::core::identifiers::FieldId;
use crate::core::identifiers::SubmissionId;
use crate::core::identifiers::TemplateId;
use crate::core::identifiers::TemplateVersion;
use crate::core::identifiers::UserId;
use crate::core::time::Timestamp;

// ============================================================================
// SECTION: Response Values
// ============================================================================

/// Normalized response value for one field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResponseValue {
    /// Trimmed string value for text-like and single-choice fields.
    Text(String),
    /// Distinct option values for checkbox fields.
    Choices(Vec<String>),
}

impl ResponseValue {
    /// Returns the text value when this is a text-shaped response.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(value) => Some(value),
            Self::Choices(_) => None,
        }
    }

    /// Returns the choice values when this is a choices-shaped response.
    #[must_use]
    pub fn as_choices(&self) -> Option<&[String]> {
        match self {
            Self::Text(_) => None,
            Self::Choices(values) => Some(values),
        }
    }
}

/// Normalized response map keyed by field identifier.
pub type ResponseMap = BTreeMap<FieldId, ResponseValue>;

// ============================================================================
// SECTION: Identity
// ============================================================================

/// Submission identity used for attribution and deduplication.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum SubmissionIdentity {
    /// Authenticated caller, keyed by user id.
    User(UserId),
    /// Unauthenticated caller, keyed by normalized email.
    Guest(String),
}

impl SubmissionIdentity {
    /// Builds a guest identity from a raw email, trimming and lowercasing.
    ///
    /// Returns `None` when the email is empty after trimming or is not
    /// minimally well-formed (a single `@` with text on both sides and no
    /// embedded whitespace).
    #[must_use]
    pub fn guest(raw_email: &str) -> Option<Self> {
        normalize_email(raw_email).map(Self::Guest)
    }

    /// Returns the user id for authenticated identities.
    #[must_use]
    pub const fn user_id(&self) -> Option<&UserId> {
        match self {
            Self::User(user_id) => Some(user_id),
            Self::Guest(_) => None,
        }
    }

    /// Returns the email for guest identities.
    #[must_use]
    pub fn email(&self) -> Option<&str> {
        match self {
            Self::User(_) => None,
            Self::Guest(email) => Some(email),
        }
    }
}

/// Normalizes a raw email address: trim, lowercase, minimal shape check.
#[must_use]
pub fn normalize_email(raw: &str) -> Option<String> {
    let email = raw.trim().to_lowercase();
    if email.is_empty() || email.chars().any(char::is_whitespace) {
        return None;
    }
    let mut parts = email.splitn(2, '@');
    let local = parts.next().unwrap_or_default();
    let domain = parts.next().unwrap_or_default();
    if local.is_empty() || domain.is_empty() || domain.contains('@') || !domain.contains('.') {
        return None;
    }
    Some(email)
}

// ============================================================================
// SECTION: Submission Records
// ============================================================================

/// Opaque request provenance and anti-abuse signals attached to a submission.
///
/// The core records these values verbatim; they are never validated.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SubmissionMetadata {
    /// Anti-abuse verifier score, when available.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub anti_abuse_score: Option<f64>,
    /// Anti-abuse verifier action label, when available.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub anti_abuse_action: Option<String>,
    /// Client IP address as reported by the transport.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_ip: Option<String>,
    /// Client user agent as reported by the transport.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
}

/// Canonical stored submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormSubmission {
    /// Submission identifier.
    pub id: SubmissionId,
    /// Template the submission answers.
    pub template_id: TemplateId,
    /// Template version active at submission time; immutable once written.
    pub template_version: TemplateVersion,
    /// Authenticated user id, when the caller was authenticated.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<UserId>,
    /// Normalized email, when recorded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Normalized response values keyed by field id.
    pub responses: ResponseMap,
    /// Opaque provenance metadata.
    #[serde(default)]
    pub metadata: SubmissionMetadata,
    /// Creation timestamp.
    pub created_at: Timestamp,
}

impl FormSubmission {
    /// Returns the deduplication identity for this submission.
    ///
    /// Authenticated submissions dedup by user id even when an email was
    /// also recorded.
    #[must_use]
    pub fn identity(&self) -> Option<SubmissionIdentity> {
        if let Some(user_id) = &self.user_id {
            return Some(SubmissionIdentity::User(user_id.clone()));
        }
        self.email.clone().map(SubmissionIdentity::Guest)
    }
}

/// Input for submission creation, produced by the engine after validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewSubmission {
    /// Template the submission answers.
    pub template_id: TemplateId,
    /// Template version pinned at submission time.
    pub template_version: TemplateVersion,
    /// Authenticated user id, when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<UserId>,
    /// Normalized email, when recorded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Normalized response values keyed by field id.
    pub responses: ResponseMap,
    /// Opaque provenance metadata.
    #[serde(default)]
    pub metadata: SubmissionMetadata,
}
