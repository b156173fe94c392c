// crates/formgate-providers/src/lib.rs
// ============================================================================
// Module: Formgate Providers
// Description: Built-in anti-abuse and notification collaborators.
// Purpose: Provide production implementations of the Formgate interfaces.
// Dependencies: formgate-core, reqwest, serde, thiserror, tracing
// ============================================================================

//! ## Overview
//! This crate ships the built-in collaborator implementations: a
//! reCAPTCHA-style anti-abuse verifier and a webhook notification sender.
//! Both treat transport failures as decision inputs rather than process
//! errors: the verifier fails closed to a rejection, the sender reports
//! unsent flags.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod notify;
pub mod recaptcha;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use notify::WebhookNotificationSender;
pub use notify::WebhookSenderConfig;
pub use recaptcha::RecaptchaVerifier;
pub use recaptcha::RecaptchaVerifierConfig;
pub use recaptcha::RecaptchaVerifierError;

#[cfg(test)]
mod tests;
