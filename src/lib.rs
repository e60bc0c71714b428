//! formpost - contact form submission client.
//!
//! formpost posts a visitor's contact form to a remote JSON endpoint. It validates
//! the form locally, sends it with a bounded per-attempt deadline, retries transient
//! failures with exponential backoff and reports every step through an optional
//! progress callback.
//!
//! # Features
//! - Field-level validation (lengths, email shape, disposable-domain denylist)
//! - Deterministic payload construction with per-service subject lines
//! - Per-attempt deadlines backed by cancellation tokens
//! - Client errors (4xx) fail fast; server and transport errors are retried
//! - Classified, cloneable error type suitable for rendering in a UI
//! - Optional health probe for monitoring
//! - Structured tracing via `tracing`
//!
//! # Quick Example
//! ```no_run
//! use std::sync::Arc;
//!
//! use formpost::{
//!     FormRecord, FormSubmissionService, FormValidator, HttpClientAdapter, SubmitOptions,
//!     config::ClientConfig,
//! };
//!
//! # #[tokio::main] async fn main() -> eyre::Result<()> {
//! let config = Arc::new(ClientConfig::default());
//! let client = Arc::new(HttpClientAdapter::new(&config.user_agent)?);
//! let service = FormSubmissionService::new(config, client);
//!
//! let record = FormRecord::new("Ada Lovelace", "ada@example.com", "Analytical Ltd", "ai");
//! if FormValidator::validate_form_data(&record).is_valid() {
//!     let options = SubmitOptions::default().on_progress(|event| println!("{event}"));
//!     let result = service.submit(&record, options).await?;
//!     println!("contact id: {:?}", result.contact_id);
//! }
//! # Ok(()) }
//! ```
//!
//! # Architecture
//! The crate separates **ports** (traits) from **adapters** (implementations) while keeping
//! the submission logic inside `core`. Tests substitute their own [`HttpClient`] to
//! script backend behaviour.
//!
//! # Error Handling
//! Submission APIs return [`SubmissionError`], a tagged enum carrying a message, a
//! numeric status and optional details. Configuration loading and the binary use
//! `eyre::Result` with context attached through `WrapErr`.
pub mod config;
pub mod ports;
pub mod tracing_setup;

pub mod adapters;
pub mod core;

// Re-export the specific types needed by the binary crate and embedders
pub use crate::{
    adapters::{HealthProbe, HealthReport, HttpClientAdapter},
    core::{
        FormRecord, FormSubmissionService, FormValidator, ProgressEvent, ProgressStatus,
        ServiceCategory, SubmissionError, SubmissionResult, SubmitOptions, ValidationResult,
    },
    ports::http_client::HttpClient,
};
