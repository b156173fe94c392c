// crates/formgate-core/src/runtime/engine.rs
// ============================================================================
// Module: Formgate Engine
// Description: Orchestration of validation, versioning, dedup, and persistence.
// Purpose: Execute the template and submission operations over the interfaces.
// Dependencies: crate::{core, interfaces, runtime}, serde_json, tracing
// ============================================================================

//! ## Overview
//! The engine is the single canonical execution path for Formgate. Any API
//! surface (HTTP handlers, CLIs, tests) must call into these methods to
//! preserve the template invariants and the submission flow ordering:
//! template lookup, identity resolution, anti-abuse verification, field
//! validation, deduplication, persistence, then best-effort notification.
//! Each operation is an independent stateless request; ordering guarantees
//! are only as strong as the underlying store provides.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde_json::Value;
use thiserror::Error;

use crate::core::FormSubmission;
use crate::core::FormTemplate;
use crate::core::NewSubmission;
use crate::core::ServiceId;
use crate::core::SubmissionId;
use crate::core::SubmissionIdentity;
use crate::core::SubmissionMetadata;
use crate::core::TemplateDraft;
use crate::core::TemplateId;
use crate::core::TemplatePatch;
use crate::core::TemplateVersion;
use crate::core::Timestamp;
use crate::core::UserId;
use crate::core::normalize_email;
use crate::interfaces::AntiAbuseVerifier;
use crate::interfaces::DirectoryError;
use crate::interfaces::NewTemplate;
use crate::interfaces::NotificationOutcome;
use crate::interfaces::NotificationSender;
use crate::interfaces::Pagination;
use crate::interfaces::ServiceDirectory;
use crate::interfaces::StoreError;
use crate::interfaces::SubmissionFilter;
use crate::interfaces::SubmissionPage;
use crate::interfaces::SubmissionStore;
use crate::interfaces::TemplateFilter;
use crate::interfaces::TemplateStore;
use crate::runtime::dedup::DEFAULT_DEDUP_WINDOW_MS;
use crate::runtime::dedup::DedupPolicy;
use crate::runtime::response::validate_responses;
use crate::runtime::schema::DEFAULT_REGEX_SIZE_LIMIT;
use crate::runtime::schema::TemplateValidator;
use crate::runtime::schema::ValidationErrors;
use crate::runtime::versioning::RemovedFieldsConflict;
use crate::runtime::versioning::plan_fields_update;

// ============================================================================
// SECTION: Engine Configuration
// ============================================================================

/// Configuration for the Formgate engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineConfig {
    /// Duplicate-submission window in milliseconds.
    pub dedup_window_ms: u64,
    /// Compiled-pattern size budget in bytes.
    pub regex_size_limit: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            dedup_window_ms: DEFAULT_DEDUP_WINDOW_MS,
            regex_size_limit: DEFAULT_REGEX_SIZE_LIMIT,
        }
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Per-request engine errors.
///
/// None of these are process-fatal; each maps to a specific caller-facing
/// status. Notification failures never appear here: they are logged and
/// reported as unsent flags inside an otherwise-successful receipt.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Input failed validation; the caller must correct it.
    #[error("invalid input: {0}")]
    Validation(ValidationErrors),
    /// Template missing, or inactive for a public operation.
    #[error("form template not found: {0}")]
    TemplateNotFound(TemplateId),
    /// Submission missing.
    #[error("form submission not found: {0}")]
    SubmissionNotFound(SubmissionId),
    /// Destructive template update blocked by existing submissions.
    #[error(transparent)]
    RemovedFields(#[from] RemovedFieldsConflict),
    /// Duplicate submission inside the dedup window.
    #[error("please wait before submitting another entry for this form")]
    DuplicateSubmission,
    /// Anti-abuse verifier declined the submission.
    #[error("anti-abuse verification failed (score {score})")]
    AbuseRejected {
        /// Verifier score reported with the rejection.
        score: f64,
    },
    /// Store operation failed.
    #[error(transparent)]
    Store(#[from] StoreError),
    /// Service directory lookup failed.
    #[error(transparent)]
    Directory(#[from] DirectoryError),
}

// ============================================================================
// SECTION: Submission Requests
// ============================================================================

/// Authenticated caller attached to a submission request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    /// Caller's user identifier.
    pub user_id: UserId,
    /// Caller's account email, when known.
    pub email: Option<String>,
}

/// One public submission request.
#[derive(Debug, Clone, PartialEq)]
pub struct SubmitRequest {
    /// Target template.
    pub template_id: TemplateId,
    /// Authenticated caller, when present.
    pub user: Option<AuthenticatedUser>,
    /// Payload email; mandatory for unauthenticated callers.
    pub email: Option<String>,
    /// Raw response payload; non-object values count as empty.
    pub responses: Value,
    /// Anti-abuse token supplied by the client.
    pub anti_abuse_token: String,
    /// Client IP address as reported by the transport.
    pub client_ip: Option<String>,
    /// Client user agent as reported by the transport.
    pub user_agent: Option<String>,
    /// Submission time supplied by the host.
    pub submitted_at: Timestamp,
}

/// Successful submission outcome.
#[derive(Debug, Clone, PartialEq)]
pub struct SubmissionReceipt {
    /// The stored submission.
    pub submission: FormSubmission,
    /// Best-effort notification delivery flags.
    pub notifications: NotificationOutcome,
}

// ============================================================================
// SECTION: Engine
// ============================================================================

/// Formgate engine composing the validators, guard, and policy over the
/// backend interfaces.
pub struct FormEngine<T, S, D, V, N> {
    /// Template store implementation.
    templates: T,
    /// Submission store implementation.
    submissions: S,
    /// Service directory implementation.
    directory: D,
    /// Anti-abuse verifier implementation.
    verifier: V,
    /// Notification sender implementation.
    notifier: N,
    /// Template schema validator.
    validator: TemplateValidator,
    /// Duplicate-submission policy.
    dedup: DedupPolicy,
    /// Engine configuration.
    config: EngineConfig,
}

impl<T, S, D, V, N> FormEngine<T, S, D, V, N>
where
    T: TemplateStore,
    S: SubmissionStore,
    D: ServiceDirectory,
    V: AntiAbuseVerifier,
    N: NotificationSender,
{
    /// Creates a new engine over the provided interfaces.
    #[must_use]
    pub const fn new(
        templates: T,
        submissions: S,
        directory: D,
        verifier: V,
        notifier: N,
        config: EngineConfig,
    ) -> Self {
        Self {
            templates,
            submissions,
            directory,
            verifier,
            notifier,
            validator: TemplateValidator::new(config.regex_size_limit),
            dedup: DedupPolicy::new(config.dedup_window_ms),
            config,
        }
    }

    /// Returns the engine configuration.
    #[must_use]
    pub const fn config(&self) -> EngineConfig {
        self.config
    }

    /// Creates a template at version 1.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Validation`] for schema or service-link
    /// problems and [`EngineError::Store`] for persistence failures.
    pub async fn create_template(
        &self,
        draft: TemplateDraft,
        now: Timestamp,
    ) -> Result<FormTemplate, EngineError> {
        let normalized = self.validator.validate_draft(&draft).map_err(EngineError::Validation)?;
        self.ensure_service(normalized.service_id.as_ref()).await?;

        let active = normalized.active.unwrap_or(true);
        let template = self
            .templates
            .create(
                NewTemplate {
                    name: normalized.name,
                    description: normalized.description,
                    service_id: normalized.service_id,
                    fields: normalized.fields,
                    version: TemplateVersion::INITIAL,
                    active,
                },
                now,
            )
            .await?;
        Ok(template)
    }

    /// Applies a patch to an existing template.
    ///
    /// Field-list changes pass through the versioning guard; metadata changes
    /// apply unconditionally with no version impact.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::TemplateNotFound`] when the template is absent,
    /// [`EngineError::Validation`] for schema or service-link problems,
    /// [`EngineError::RemovedFields`] when removal is blocked by existing
    /// submissions, and [`EngineError::Store`] for persistence failures.
    pub async fn update_template(
        &self,
        id: &TemplateId,
        patch: TemplatePatch,
        now: Timestamp,
    ) -> Result<FormTemplate, EngineError> {
        let normalized = self.validator.validate_patch(&patch).map_err(EngineError::Validation)?;

        let Some(existing) = self.templates.find(id).await? else {
            return Err(EngineError::TemplateNotFound(id.clone()));
        };

        self.ensure_service(normalized.service_id.as_ref()).await?;

        let (fields, version) = if let Some(incoming) = normalized.fields {
            let submission_count = self.templates.count_submissions(id).await?;
            let plan = plan_fields_update(&existing, incoming, submission_count)?;
            (plan.fields, plan.version)
        } else {
            (existing.fields, existing.version)
        };

        let updated = FormTemplate {
            id: existing.id,
            name: normalized.name.unwrap_or(existing.name),
            description: normalized.description.or(existing.description),
            service_id: normalized.service_id.or(existing.service_id),
            fields,
            version,
            active: normalized.active.unwrap_or(existing.active),
            created_at: existing.created_at,
            updated_at: now,
        };
        Ok(self.templates.update(&updated).await?)
    }

    /// Deactivates a template; this is the only form of deletion.
    ///
    /// Idempotent: deactivating an inactive template is a no-op write. The
    /// field list and version are never touched.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::TemplateNotFound`] when the template is absent
    /// and [`EngineError::Store`] for persistence failures.
    pub async fn deactivate_template(
        &self,
        id: &TemplateId,
        now: Timestamp,
    ) -> Result<FormTemplate, EngineError> {
        let Some(existing) = self.templates.find(id).await? else {
            return Err(EngineError::TemplateNotFound(id.clone()));
        };
        let updated = FormTemplate {
            active: false,
            updated_at: now,
            ..existing
        };
        Ok(self.templates.update(&updated).await?)
    }

    /// Returns a template regardless of its active flag (administrator view).
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::TemplateNotFound`] when the template is absent.
    pub async fn get_template(&self, id: &TemplateId) -> Result<FormTemplate, EngineError> {
        match self.templates.find(id).await? {
            Some(template) => Ok(template),
            None => Err(EngineError::TemplateNotFound(id.clone())),
        }
    }

    /// Returns an active template (public view).
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::TemplateNotFound`] when the template is absent
    /// or inactive.
    pub async fn get_public_template(&self, id: &TemplateId) -> Result<FormTemplate, EngineError> {
        match self.templates.find(id).await? {
            Some(template) if template.is_public() => Ok(template),
            _ => Err(EngineError::TemplateNotFound(id.clone())),
        }
    }

    /// Lists templates with an optional active filter (administrator view).
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Store`] when the listing fails.
    pub async fn list_templates(
        &self,
        filter: TemplateFilter,
    ) -> Result<Vec<FormTemplate>, EngineError> {
        Ok(self.templates.list(filter).await?)
    }

    /// Lists active templates (public view).
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Store`] when the listing fails.
    pub async fn list_public_templates(&self) -> Result<Vec<FormTemplate>, EngineError> {
        Ok(self
            .templates
            .list(TemplateFilter {
                active: Some(true),
            })
            .await?)
    }

    /// Processes one public submission end to end.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::TemplateNotFound`] for missing or inactive
    /// templates, [`EngineError::Validation`] for identity or field problems,
    /// [`EngineError::AbuseRejected`] when the verifier declines,
    /// [`EngineError::DuplicateSubmission`] inside the dedup window, and
    /// [`EngineError::Store`] for persistence failures.
    pub async fn submit_response(
        &self,
        request: SubmitRequest,
    ) -> Result<SubmissionReceipt, EngineError> {
        let template = self.get_public_template(&request.template_id).await?;

        let (identity, email) = resolve_identity(&request)?;

        let outcome =
            self.verifier.verify(&request.anti_abuse_token, request.client_ip.as_deref()).await;
        if !outcome.accepted {
            return Err(EngineError::AbuseRejected {
                score: outcome.score,
            });
        }

        let validation = validate_responses(
            &template.fields,
            &request.responses,
            self.config.regex_size_limit,
        );
        if !validation.is_valid() {
            let mut errors = ValidationErrors::new();
            for (field_id, message) in &validation.errors {
                errors.insert(field_id.as_str(), message.clone());
            }
            return Err(EngineError::Validation(errors));
        }

        let cutoff = self.dedup.cutoff(request.submitted_at);
        if self
            .submissions
            .find_recent(&template.id, &identity, cutoff)
            .await?
            .is_some()
        {
            return Err(EngineError::DuplicateSubmission);
        }

        let submission = self
            .submissions
            .create(
                NewSubmission {
                    template_id: template.id.clone(),
                    template_version: template.version,
                    user_id: identity.user_id().cloned(),
                    email,
                    responses: validation.normalized,
                    metadata: SubmissionMetadata {
                        anti_abuse_score: Some(outcome.score),
                        anti_abuse_action: outcome.action,
                        client_ip: request.client_ip,
                        user_agent: request.user_agent,
                    },
                },
                request.submitted_at,
            )
            .await?;

        let notifications = match self.notifier.notify(&submission, &template).await {
            Ok(outcome) => outcome,
            Err(err) => {
                tracing::warn!(
                    submission_id = %submission.id,
                    template_id = %template.id,
                    error = %err,
                    "failed to send form submission notifications"
                );
                NotificationOutcome::default()
            }
        };

        tracing::info!(
            template_id = %template.id,
            submission_id = %submission.id,
            template_version = %submission.template_version,
            "form submission received"
        );

        Ok(SubmissionReceipt {
            submission,
            notifications,
        })
    }

    /// Lists submissions with filters and pagination (administrator view).
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Store`] when the listing fails.
    pub async fn list_submissions(
        &self,
        filter: &SubmissionFilter,
        pagination: &Pagination,
    ) -> Result<SubmissionPage, EngineError> {
        Ok(self.submissions.list(filter, pagination).await?)
    }

    /// Returns one submission (administrator view).
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::SubmissionNotFound`] when absent.
    pub async fn get_submission(&self, id: &SubmissionId) -> Result<FormSubmission, EngineError> {
        match self.submissions.get(id).await? {
            Some(submission) => Ok(submission),
            None => Err(EngineError::SubmissionNotFound(id.clone())),
        }
    }

    /// Verifies that a referenced service resolves through the directory.
    async fn ensure_service(&self, service_id: Option<&ServiceId>) -> Result<(), EngineError> {
        let Some(service_id) = service_id else {
            return Ok(());
        };
        if self.directory.exists(service_id).await? {
            return Ok(());
        }
        let mut errors = ValidationErrors::new();
        errors.insert("service_id", "Service not found for provided service_id");
        Err(EngineError::Validation(errors))
    }
}

// ============================================================================
// SECTION: Identity Resolution
// ============================================================================

/// Resolves the submission identity and recorded email for a request.
///
/// Authenticated callers are identified by user id; the recorded email is
/// the payload email when present, otherwise the account email. Guests must
/// supply a well-formed email or the request is rejected before any field
/// validation runs.
fn resolve_identity(
    request: &SubmitRequest,
) -> Result<(SubmissionIdentity, Option<String>), EngineError> {
    let payload_email = match request.email.as_deref() {
        None => None,
        Some(raw) => match normalize_email(raw) {
            Some(email) => Some(email),
            None => {
                let mut errors = ValidationErrors::new();
                errors.insert("email", "A valid email address is required");
                return Err(EngineError::Validation(errors));
            }
        },
    };

    if let Some(user) = &request.user {
        let email =
            payload_email.or_else(|| user.email.as_deref().and_then(normalize_email));
        return Ok((SubmissionIdentity::User(user.user_id.clone()), email));
    }

    match payload_email {
        Some(email) => Ok((SubmissionIdentity::Guest(email.clone()), Some(email))),
        None => {
            let mut errors = ValidationErrors::new();
            errors.insert("email", "Email is required for guest submissions");
            Err(EngineError::Validation(errors))
        }
    }
}
