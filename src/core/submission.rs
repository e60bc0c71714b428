//! Contact form submission with bounded retries.
//!
//! One [`FormSubmissionService::submit`] call runs its attempts strictly one after
//! another. Each attempt gets its own [`AttemptDeadline`]; client errors (4xx) stop
//! immediately, everything else is retried with exponential backoff until the
//! retry budget is spent, at which point the last error is normalized for the
//! caller.
use std::sync::Arc;

use bytes::Bytes;
use serde::Serialize;
use serde_json::Value;
use tokio::time::sleep;
use tracing::Instrument;

use crate::{
    config::models::ClientConfig,
    core::{
        backoff::BackoffPolicy,
        deadline::AttemptDeadline,
        error::SubmissionError,
        form::{FormRecord, SubmissionPayload},
        progress::{ProgressCallback, ProgressEvent, ProgressReporter, ProgressStatus},
    },
    ports::http_client::{HttpClient, HttpClientError, HttpReply},
    tracing_setup,
};

/// Per-call options. Anything left unset falls back to the client configuration.
#[derive(Clone, Default)]
pub struct SubmitOptions {
    /// Retries after the first attempt
    pub retries: Option<u32>,
    pub on_progress: Option<ProgressCallback>,
}

impl SubmitOptions {
    pub fn with_retries(mut self, retries: u32) -> Self {
        self.retries = Some(retries);
        self
    }

    pub fn on_progress<F>(mut self, callback: F) -> Self
    where
        F: Fn(&ProgressEvent) + Send + Sync + 'static,
    {
        self.on_progress = Some(Arc::new(callback));
        self
    }
}

/// Confirmation returned by the contact backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubmissionResult {
    pub success: bool,
    pub contact_id: Option<String>,
    pub timestamp: Option<String>,
    pub message: Option<String>,
}

/// The fields of a backend answer the service cares about.
///
/// Read leniently from any JSON value: a body that parses but has an unexpected
/// shape is treated as an unsuccessful answer, not as a transport failure.
#[derive(Debug, Default)]
struct ContactResponse {
    success: bool,
    contact_id: Option<String>,
    timestamp: Option<String>,
    message: Option<String>,
    details: Option<Value>,
}

impl ContactResponse {
    fn from_json(body: &Value) -> Self {
        let text = |key: &str| match body.get(key) {
            Some(Value::String(s)) => Some(s.clone()),
            Some(Value::Number(n)) => Some(n.to_string()),
            _ => None,
        };
        let structured = |key: &str| body.get(key).filter(|v| is_truthy(v)).cloned();

        Self {
            success: body.get("success").and_then(Value::as_bool).unwrap_or(false),
            contact_id: text("contactId"),
            timestamp: text("timestamp"),
            message: text("message"),
            details: structured("details").or_else(|| structured("error")),
        }
    }
}

/// `null`, `false`, `0` and `""` count as absent when choosing between
/// `details` and `error`.
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Submits contact forms to the configured endpoint.
pub struct FormSubmissionService {
    config: Arc<ClientConfig>,
    http_client: Arc<dyn HttpClient>,
    backoff: BackoffPolicy,
}

impl FormSubmissionService {
    pub fn new(config: Arc<ClientConfig>, http_client: Arc<dyn HttpClient>) -> Self {
        let backoff = BackoffPolicy::from(&config.backoff);
        Self {
            config,
            http_client,
            backoff,
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Submit `record`, retrying transient failures.
    ///
    /// Fails without touching the network when a required field is empty.
    pub async fn submit(
        &self,
        record: &FormRecord,
        options: SubmitOptions,
    ) -> Result<SubmissionResult, SubmissionError> {
        let retries = options.retries.unwrap_or(self.config.retries);
        let span = tracing_setup::create_submission_span(&self.config.endpoint, retries);

        self.submit_with_retries(record, retries, ProgressReporter::new(options.on_progress))
            .instrument(span)
            .await
    }

    async fn submit_with_retries(
        &self,
        record: &FormRecord,
        retries: u32,
        progress: ProgressReporter,
    ) -> Result<SubmissionResult, SubmissionError> {
        let missing = record.missing_required_fields();
        if !missing.is_empty() {
            tracing::warn!("Rejecting submission with missing fields: {:?}", missing);
            tracing::Span::current().record("outcome", "invalid");
            return Err(SubmissionError::missing_required_fields());
        }

        let payload = SubmissionPayload::from_record(record);
        let body = serde_json::to_vec(&payload)
            .map(Bytes::from)
            .map_err(|e| SubmissionError::transport(format!("Failed to encode payload: {e}")))?;

        tracing::info!(
            "Submitting contact form from {} ({})",
            tracing_setup::redact_email(&payload.email),
            payload.subject
        );

        let mut last_error = None;
        for attempt in 0..=retries {
            let number = attempt.saturating_add(1);
            tracing::Span::current().record("attempts", number);
            progress.emit(number, ProgressStatus::Sending);

            let outcome = self
                .attempt(body.clone())
                .instrument(tracing_setup::create_attempt_span(number))
                .await;

            let error = match outcome {
                Ok((result, data)) => {
                    tracing::info!(
                        "Contact form accepted on attempt {} (contact id: {})",
                        number,
                        result.contact_id.as_deref().unwrap_or("n/a")
                    );
                    tracing::Span::current().record("outcome", "success");
                    progress.emit(number, ProgressStatus::Success { data });
                    return Ok(result);
                }
                Err(error) => error,
            };

            if error.is_permanent() {
                tracing::warn!(
                    "Attempt {} rejected with status {}: {}",
                    number,
                    error.status(),
                    error
                );
                tracing::Span::current().record("outcome", error.kind());
                progress.emit(
                    number,
                    ProgressStatus::Error {
                        error: error.clone(),
                    },
                );
                return Err(error);
            }

            if attempt < retries {
                let delay = self.backoff.delay_for(attempt);
                tracing::warn!(
                    "Attempt {} failed ({}: {}), retrying in {}ms",
                    number,
                    error.kind(),
                    error,
                    delay.as_millis()
                );
                progress.emit(number, ProgressStatus::Retrying { delay });
                last_error = Some(error);
                sleep(delay).await;
                continue;
            }

            tracing::error!(
                "Giving up after {} attempt(s): {} ({})",
                number,
                error,
                error.kind()
            );
            tracing::Span::current().record("outcome", error.kind());
            progress.emit(
                number,
                ProgressStatus::Failed {
                    error: error.clone(),
                },
            );
            return Err(error.into_terminal());
        }

        Err(last_error
            .map(SubmissionError::into_terminal)
            .unwrap_or_else(|| SubmissionError::transport("No submission attempt was made")))
    }

    /// One request/response cycle under its own deadline.
    async fn attempt(&self, body: Bytes) -> Result<(SubmissionResult, Value), SubmissionError> {
        let deadline = AttemptDeadline::new(self.config.timeout());
        let timeout_ms = u64::try_from(deadline.timeout().as_millis()).unwrap_or(u64::MAX);

        let reply = deadline
            .race(
                self.http_client
                    .post_json(&self.config.endpoint, body, deadline.token()),
            )
            .await;

        match reply {
            None | Some(Err(HttpClientError::Cancelled)) => {
                tracing::warn!("Attempt timed out after {}ms", timeout_ms);
                Err(SubmissionError::Timeout { timeout_ms })
            }
            Some(Err(e)) => Err(SubmissionError::transport(e.to_string())),
            Some(Ok(reply)) => {
                tracing::Span::current().record("http.status_code", reply.status.as_u16());
                Self::interpret(reply)
            }
        }
    }

    /// Classify a buffered backend answer.
    fn interpret(reply: HttpReply) -> Result<(SubmissionResult, Value), SubmissionError> {
        let data: Value = serde_json::from_slice(&reply.body).map_err(|e| {
            SubmissionError::transport(format!(
                "Invalid JSON in response (status {}): {e}",
                reply.status.as_u16()
            ))
        })?;
        if data.is_null() {
            return Err(SubmissionError::transport(format!(
                "Empty JSON document in response (status {})",
                reply.status.as_u16()
            )));
        }
        let response = ContactResponse::from_json(&data);

        if reply.status.is_success() && response.success {
            let result = SubmissionResult {
                success: true,
                contact_id: response.contact_id,
                timestamp: response.timestamp,
                message: response.message,
            };
            return Ok((result, data));
        }

        Err(SubmissionError::from_response(
            reply.status.as_u16(),
            response.message,
            response.details,
        ))
    }
}
