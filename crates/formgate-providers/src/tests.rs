// crates/formgate-providers/src/tests.rs
// ============================================================================
// Module: Provider Tests
// Description: Tests for verifier bypass behavior and outcome mapping.
// Purpose: Ensure providers fail closed without network access.
// Dependencies: formgate-core, tokio
// ============================================================================
//! ## Overview
//! Provider tests avoid live network calls: they exercise bypass mode, the
//! missing-secret rejection, and transport-failure handling against
//! unreachable endpoints.

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only output and panic-based assertions are permitted."
)]

use formgate_core::AntiAbuseVerifier;

use crate::recaptcha::RecaptchaVerifier;
use crate::recaptcha::RecaptchaVerifierConfig;

/// Verifies bypass mode accepts without touching the endpoint.
#[tokio::test]
async fn bypass_mode_accepts_with_full_score() {
    let verifier = RecaptchaVerifier::new(RecaptchaVerifierConfig {
        bypass: true,
        ..RecaptchaVerifierConfig::default()
    })
    .expect("verifier builds");

    let outcome = verifier.verify("any-token", None).await;
    assert!(outcome.accepted);
    assert!((outcome.score - 1.0).abs() < f64::EPSILON);
    assert_eq!(outcome.action.as_deref(), Some("bypass"));
}

/// Verifies a missing secret rejects instead of erroring.
#[tokio::test]
async fn missing_secret_rejects() {
    let verifier = RecaptchaVerifier::new(RecaptchaVerifierConfig {
        secret_key: None,
        ..RecaptchaVerifierConfig::default()
    })
    .expect("verifier builds");

    let outcome = verifier.verify("token", Some("203.0.113.7")).await;
    assert!(!outcome.accepted);
    assert!(outcome.score.abs() < f64::EPSILON);
}

/// Verifies an unreachable endpoint fails closed to a rejection.
#[tokio::test]
async fn unreachable_endpoint_rejects() {
    let verifier = RecaptchaVerifier::new(RecaptchaVerifierConfig {
        endpoint: "http://127.0.0.1:1/siteverify".to_string(),
        secret_key: Some("secret".to_string()),
        connect_timeout_ms: 100,
        request_timeout_ms: 200,
        ..RecaptchaVerifierConfig::default()
    })
    .expect("verifier builds");

    let outcome = verifier.verify("token", None).await;
    assert!(!outcome.accepted);
}
