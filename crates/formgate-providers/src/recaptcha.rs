// crates/formgate-providers/src/recaptcha.rs
// ============================================================================
// Module: reCAPTCHA Anti-Abuse Verifier
// Description: Token verification against the reCAPTCHA siteverify endpoint.
// Purpose: Map verification responses and failures to accept/reject outcomes.
// Dependencies: formgate-core, reqwest, serde, thiserror, tracing
// ============================================================================

//! ## Overview
//! The verifier posts submission tokens to the siteverify endpoint and maps
//! the response to an [`AntiAbuseOutcome`]: accepted when the provider
//! reports success and the score clears the configured threshold, rejected
//! otherwise. A missing secret, an HTTP error, or a malformed response all
//! fail closed to a rejection; verification is a decision input, never a
//! process failure. Bypass mode accepts everything with a full score for
//! tests and local development.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::time::Duration;

use async_trait::async_trait;
use formgate_core::AntiAbuseOutcome;
use formgate_core::AntiAbuseVerifier;
use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default verification endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://www.google.com/recaptcha/api/siteverify";
/// Default minimum score accepted.
pub const DEFAULT_MIN_SCORE: f64 = 0.5;
/// Default connect timeout in milliseconds.
pub const DEFAULT_CONNECT_TIMEOUT_MS: u64 = 500;
/// Default request timeout in milliseconds.
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 2_000;

// ============================================================================
// SECTION: Config
// ============================================================================

/// Configuration for the reCAPTCHA verifier.
#[derive(Debug, Clone, Deserialize)]
pub struct RecaptchaVerifierConfig {
    /// Verification endpoint URL.
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    /// Shared secret for the siteverify API; verification without it is
    /// rejected outright.
    #[serde(default)]
    pub secret_key: Option<String>,
    /// Minimum score accepted, in [0, 1].
    #[serde(default = "default_min_score")]
    pub min_score: f64,
    /// Accept everything without calling the endpoint.
    #[serde(default)]
    pub bypass: bool,
    /// Connect timeout in milliseconds.
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,
    /// Request timeout in milliseconds.
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

impl Default for RecaptchaVerifierConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            secret_key: None,
            min_score: DEFAULT_MIN_SCORE,
            bypass: false,
            connect_timeout_ms: DEFAULT_CONNECT_TIMEOUT_MS,
            request_timeout_ms: DEFAULT_REQUEST_TIMEOUT_MS,
        }
    }
}

/// Returns the default endpoint.
fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}

/// Returns the default minimum score.
const fn default_min_score() -> f64 {
    DEFAULT_MIN_SCORE
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
// SECTION: Errors
// ============================================================================

/// Verifier construction errors.
#[derive(Debug, Error)]
pub enum RecaptchaVerifierError {
    /// HTTP client construction failed.
    #[error("recaptcha client build failed: {0}")]
    Client(String),
}

// ============================================================================
// SECTION: Verifier
// ============================================================================

/// Siteverify response payload.
#[derive(Debug, Deserialize)]
struct SiteverifyResponse {
    /// Provider-side success flag.
    success: bool,
    /// Risk score, when the provider computes one.
    score: Option<f64>,
    /// Action label echoed by the provider.
    action: Option<String>,
}

/// reCAPTCHA-backed anti-abuse verifier.
pub struct RecaptchaVerifier {
    /// Verifier configuration.
    config: RecaptchaVerifierConfig,
    /// HTTP client configured with timeouts.
    client: Client,
}

impl RecaptchaVerifier {
    /// Builds a new verifier.
    ///
    /// # Errors
    ///
    /// Returns [`RecaptchaVerifierError`] when the HTTP client cannot be
    /// built.
    pub fn new(config: RecaptchaVerifierConfig) -> Result<Self, RecaptchaVerifierError> {
        let client = Client::builder()
            .connect_timeout(Duration::from_millis(config.connect_timeout_ms))
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .build()
            .map_err(|err| RecaptchaVerifierError::Client(err.to_string()))?;
        Ok(Self {
            config,
            client,
        })
    }

    /// Calls the siteverify endpoint and maps the response.
    async fn verify_live(&self, token: &str, client_ip: Option<&str>) -> AntiAbuseOutcome {
        let Some(secret) = self.config.secret_key.as_deref() else {
            tracing::error!("recaptcha secret key is missing; rejecting submission");
            return AntiAbuseOutcome::rejected();
        };

        let mut form: Vec<(&str, &str)> = vec![("secret", secret), ("response", token)];
        if let Some(remote_ip) = client_ip {
            form.push(("remoteip", remote_ip));
        }

        let response = match self.client.post(&self.config.endpoint).form(&form).send().await {
            Ok(response) => response,
            Err(err) => {
                tracing::warn!(error = %err, "recaptcha verification request failed");
                return AntiAbuseOutcome::rejected();
            }
        };
        if !response.status().is_success() {
            tracing::warn!(status = %response.status(), "recaptcha verification http error");
            return AntiAbuseOutcome::rejected();
        }

        let payload: SiteverifyResponse = match response.json().await {
            Ok(payload) => payload,
            Err(err) => {
                tracing::warn!(error = %err, "recaptcha verification returned malformed payload");
                return AntiAbuseOutcome::rejected();
            }
        };

        let score = payload.score.unwrap_or(0.0);
        AntiAbuseOutcome {
            accepted: payload.success && score >= self.config.min_score,
            score,
            action: payload.action,
        }
    }
}

#[async_trait]
impl AntiAbuseVerifier for RecaptchaVerifier {
    async fn verify(&self, token: &str, client_ip: Option<&str>) -> AntiAbuseOutcome {
        if self.config.bypass {
            return AntiAbuseOutcome::bypass();
        }
        self.verify_live(token, client_ip).await
    }
}
