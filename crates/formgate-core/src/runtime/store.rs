// crates/formgate-core/src/runtime/store.rs
// ============================================================================
// Module: Formgate In-Memory Store
// Description: Simple in-memory stores and collaborators for tests and demos.
// Purpose: Provide deterministic interface implementations without external deps.
// Dependencies: crate::core, crate::interfaces, async-trait
// ============================================================================

//! ## Overview
//! This module provides simple in-memory implementations of the Formgate
//! interfaces for tests and local demos. They are deterministic (sequential
//! ids, ordered maps) and not intended for production use.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::sync::Arc;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::core::FormSubmission;
use crate::core::FormTemplate;
use crate::core::NewSubmission;
use crate::core::ServiceId;
use crate::core::SubmissionId;
use crate::core::SubmissionIdentity;
use crate::core::TemplateId;
use crate::core::Timestamp;
use crate::interfaces::AntiAbuseOutcome;
use crate::interfaces::AntiAbuseVerifier;
use crate::interfaces::DirectoryError;
use crate::interfaces::NewTemplate;
use crate::interfaces::NotificationError;
use crate::interfaces::NotificationOutcome;
use crate::interfaces::NotificationSender;
use crate::interfaces::Pagination;
use crate::interfaces::ServiceDirectory;
use crate::interfaces::SortOrder;
use crate::interfaces::StoreError;
use crate::interfaces::SubmissionFilter;
use crate::interfaces::SubmissionPage;
use crate::interfaces::SubmissionStore;
use crate::interfaces::TemplateFilter;
use crate::interfaces::TemplateStore;

// ============================================================================
// SECTION: In-Memory Store
// ============================================================================

/// In-memory template and submission store for tests and demos.
#[derive(Debug, Default, Clone)]
pub struct InMemoryFormStore {
    /// Template map protected by a mutex.
    templates: Arc<Mutex<BTreeMap<String, FormTemplate>>>,
    /// Submission map protected by a mutex.
    submissions: Arc<Mutex<BTreeMap<String, FormSubmission>>>,
    /// Known service identifiers.
    services: Arc<Mutex<BTreeSet<String>>>,
}

impl InMemoryFormStore {
    /// Creates an empty in-memory store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a service identifier for directory lookups.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the service set mutex is poisoned.
    pub fn register_service(&self, service_id: &ServiceId) -> Result<(), StoreError> {
        self.services
            .lock()
            .map_err(|_| StoreError::Store("service set mutex poisoned".to_string()))?
            .insert(service_id.as_str().to_string());
        Ok(())
    }
}

#[async_trait]
impl TemplateStore for InMemoryFormStore {
    async fn find(&self, id: &TemplateId) -> Result<Option<FormTemplate>, StoreError> {
        let guard = self
            .templates
            .lock()
            .map_err(|_| StoreError::Store("template store mutex poisoned".to_string()))?;
        Ok(guard.get(id.as_str()).cloned())
    }

    async fn list(&self, filter: TemplateFilter) -> Result<Vec<FormTemplate>, StoreError> {
        let guard = self
            .templates
            .lock()
            .map_err(|_| StoreError::Store("template store mutex poisoned".to_string()))?;
        let mut templates: Vec<FormTemplate> = guard
            .values()
            .filter(|template| filter.active.is_none_or(|active| template.active == active))
            .cloned()
            .collect();
        templates.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(templates)
    }

    async fn create(
        &self,
        template: NewTemplate,
        now: Timestamp,
    ) -> Result<FormTemplate, StoreError> {
        let mut guard = self
            .templates
            .lock()
            .map_err(|_| StoreError::Store("template store mutex poisoned".to_string()))?;
        let id = TemplateId::new(format!("tpl-{}", guard.len() + 1));
        let record = FormTemplate {
            id: id.clone(),
            name: template.name,
            description: template.description,
            service_id: template.service_id,
            fields: template.fields,
            version: template.version,
            active: template.active,
            created_at: now,
            updated_at: now,
        };
        guard.insert(id.as_str().to_string(), record.clone());
        Ok(record)
    }

    async fn update(&self, template: &FormTemplate) -> Result<FormTemplate, StoreError> {
        let mut guard = self
            .templates
            .lock()
            .map_err(|_| StoreError::Store("template store mutex poisoned".to_string()))?;
        if !guard.contains_key(template.id.as_str()) {
            return Err(StoreError::Invalid(format!("unknown template: {}", template.id)));
        }
        guard.insert(template.id.as_str().to_string(), template.clone());
        Ok(template.clone())
    }

    async fn count_submissions(&self, id: &TemplateId) -> Result<u64, StoreError> {
        let guard = self
            .submissions
            .lock()
            .map_err(|_| StoreError::Store("submission store mutex poisoned".to_string()))?;
        Ok(guard.values().filter(|submission| submission.template_id == *id).count() as u64)
    }
}

#[async_trait]
impl SubmissionStore for InMemoryFormStore {
    async fn find_recent(
        &self,
        template_id: &TemplateId,
        identity: &SubmissionIdentity,
        since: Timestamp,
    ) -> Result<Option<FormSubmission>, StoreError> {
        let guard = self
            .submissions
            .lock()
            .map_err(|_| StoreError::Store("submission store mutex poisoned".to_string()))?;
        Ok(guard
            .values()
            .filter(|submission| {
                submission.template_id == *template_id
                    && submission.created_at >= since
                    && matches_identity(submission, identity)
            })
            .max_by_key(|submission| submission.created_at)
            .cloned())
    }

    async fn create(
        &self,
        submission: NewSubmission,
        now: Timestamp,
    ) -> Result<FormSubmission, StoreError> {
        let mut guard = self
            .submissions
            .lock()
            .map_err(|_| StoreError::Store("submission store mutex poisoned".to_string()))?;
        let id = SubmissionId::new(format!("sub-{}", guard.len() + 1));
        let record = FormSubmission {
            id: id.clone(),
            template_id: submission.template_id,
            template_version: submission.template_version,
            user_id: submission.user_id,
            email: submission.email,
            responses: submission.responses,
            metadata: submission.metadata,
            created_at: now,
        };
        guard.insert(id.as_str().to_string(), record.clone());
        Ok(record)
    }

    async fn list(
        &self,
        filter: &SubmissionFilter,
        pagination: &Pagination,
    ) -> Result<SubmissionPage, StoreError> {
        let guard = self
            .submissions
            .lock()
            .map_err(|_| StoreError::Store("submission store mutex poisoned".to_string()))?;
        let mut matching: Vec<FormSubmission> =
            guard.values().filter(|submission| matches_filter(submission, filter)).cloned().collect();
        match pagination.order {
            SortOrder::Asc => matching.sort_by(|a, b| a.created_at.cmp(&b.created_at)),
            SortOrder::Desc => matching.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
        }
        let total = matching.len() as u64;
        let skip = usize::try_from(pagination.skip()).unwrap_or(usize::MAX);
        let limit = usize::try_from(pagination.limit).unwrap_or(usize::MAX);
        let items: Vec<FormSubmission> = matching.into_iter().skip(skip).take(limit).collect();
        Ok(SubmissionPage::new(items, pagination, total))
    }

    async fn get(&self, id: &SubmissionId) -> Result<Option<FormSubmission>, StoreError> {
        let guard = self
            .submissions
            .lock()
            .map_err(|_| StoreError::Store("submission store mutex poisoned".to_string()))?;
        Ok(guard.get(id.as_str()).cloned())
    }
}

#[async_trait]
impl ServiceDirectory for InMemoryFormStore {
    async fn exists(&self, service_id: &ServiceId) -> Result<bool, DirectoryError> {
        let guard = self
            .services
            .lock()
            .map_err(|_| DirectoryError::Lookup("service set mutex poisoned".to_string()))?;
        Ok(guard.contains(service_id.as_str()))
    }
}

// ============================================================================
// SECTION: Collaborator Stand-Ins
// ============================================================================

/// Anti-abuse verifier that accepts everything, mirroring bypass mode.
#[derive(Debug, Default, Clone, Copy)]
pub struct BypassAntiAbuseVerifier;

#[async_trait]
impl AntiAbuseVerifier for BypassAntiAbuseVerifier {
    async fn verify(&self, _token: &str, _client_ip: Option<&str>) -> AntiAbuseOutcome {
        AntiAbuseOutcome::bypass()
    }
}

/// Notification sender for deployments with no delivery channel configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct DisabledNotificationSender;

#[async_trait]
impl NotificationSender for DisabledNotificationSender {
    async fn notify(
        &self,
        _submission: &FormSubmission,
        _template: &FormTemplate,
    ) -> Result<NotificationOutcome, NotificationError> {
        Ok(NotificationOutcome::default())
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Returns true when a submission belongs to the given dedup identity.
fn matches_identity(submission: &FormSubmission, identity: &SubmissionIdentity) -> bool {
    match identity {
        SubmissionIdentity::User(user_id) => submission.user_id.as_ref() == Some(user_id),
        SubmissionIdentity::Guest(email) => submission.email.as_deref() == Some(email.as_str()),
    }
}

/// Returns true when a submission matches the listing filter.
fn matches_filter(submission: &FormSubmission, filter: &SubmissionFilter) -> bool {
    if filter.template_id.as_ref().is_some_and(|id| submission.template_id != *id) {
        return false;
    }
    if let Some(needle) = &filter.email_contains {
        let haystack = submission.email.as_deref().unwrap_or_default().to_lowercase();
        if !haystack.contains(&needle.to_lowercase()) {
            return false;
        }
    }
    if filter.date_from.is_some_and(|from| submission.created_at < from) {
        return false;
    }
    if filter.date_to.is_some_and(|to| submission.created_at > to) {
        return false;
    }
    true
}
