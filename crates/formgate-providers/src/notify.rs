// crates/formgate-providers/src/notify.rs
// ============================================================================
// Module: Webhook Notification Sender
// Description: Submission-received events posted to an operator webhook.
// Purpose: Deliver best-effort notifications after a submission is stored.
// Dependencies: formgate-core, reqwest, serde
// ============================================================================

//! ## Overview
//! The webhook sender posts a JSON event describing a stored submission to a
//! configured operator endpoint. Delivery is best-effort: the engine logs a
//! failure and reports unsent flags, never failing the submission. The admin
//! flag reflects webhook delivery; there is no visitor channel here, so the
//! visitor flag is always false.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::time::Duration;

use async_trait::async_trait;
use formgate_core::FormSubmission;
use formgate_core::FormTemplate;
use formgate_core::NotificationError;
use formgate_core::NotificationOutcome;
use formgate_core::NotificationSender;
use reqwest::Client;
use serde::Deserialize;
use serde::Serialize;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default connect timeout in milliseconds.
pub const DEFAULT_CONNECT_TIMEOUT_MS: u64 = 500;
/// Default request timeout in milliseconds.
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 5_000;

// ============================================================================
// SECTION: Config
// ============================================================================

/// Configuration for the webhook notification sender.
#[derive(Debug, Clone, Deserialize)]
pub struct WebhookSenderConfig {
    /// Webhook endpoint URL.
    pub url: String,
    /// Connect timeout in milliseconds.
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,
    /// Request timeout in milliseconds.
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

/// Returns the default connect timeout.
const fn default_connect_timeout_ms() -> u64 {
    DEFAULT_CONNECT_TIMEOUT_MS
}

/// Returns the default request timeout.
const fn default_request_timeout_ms() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_MS
}

// ============================================================================
// SECTION: Sender
// ============================================================================

/// Submission-received event payload posted to the webhook.
#[derive(Debug, Serialize)]
struct SubmissionEvent<'a> {
    /// Event discriminator.
    event: &'static str,
    /// Submission identifier.
    submission_id: &'a str,
    /// Template identifier.
    template_id: &'a str,
    /// Template display name.
    template_name: &'a str,
    /// Template version the submission pinned.
    template_version: u32,
    /// Recorded email, when present.
    email: Option<&'a str>,
    /// Submission creation time in unix milliseconds.
    created_at: i64,
}

/// Webhook-backed notification sender.
pub struct WebhookNotificationSender {
    /// Sender configuration.
    config: WebhookSenderConfig,
    /// HTTP client configured with timeouts.
    client: Client,
}

impl WebhookNotificationSender {
    /// Builds a new webhook sender.
    ///
    /// # Errors
    ///
    /// Returns [`NotificationError`] when the HTTP client cannot be built.
    pub fn new(config: WebhookSenderConfig) -> Result<Self, NotificationError> {
        let client = Client::builder()
            .connect_timeout(Duration::from_millis(config.connect_timeout_ms))
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .build()
            .map_err(|err| NotificationError::Send(err.to_string()))?;
        Ok(Self {
            config,
            client,
        })
    }
}

#[async_trait]
impl NotificationSender for WebhookNotificationSender {
    async fn notify(
        &self,
        submission: &FormSubmission,
        template: &FormTemplate,
    ) -> Result<NotificationOutcome, NotificationError> {
        let event = SubmissionEvent {
            event: "form_submission.received",
            submission_id: submission.id.as_str(),
            template_id: template.id.as_str(),
            template_name: &template.name,
            template_version: submission.template_version.get(),
            email: submission.email.as_deref(),
            created_at: submission.created_at.as_unix_millis(),
        };

        let response = self
            .client
            .post(&self.config.url)
            .json(&event)
            .send()
            .await
            .map_err(|err| NotificationError::Send(err.to_string()))?;
        if !response.status().is_success() {
            return Err(NotificationError::Send(format!(
                "webhook returned status {}",
                response.status()
            )));
        }
        Ok(NotificationOutcome {
            visitor_sent: false,
            admin_sent: true,
        })
    }
}
