//! Progress notifications emitted while a submission runs.
use std::{fmt, sync::Arc, time::Duration};

use serde_json::Value;

use crate::core::error::SubmissionError;

/// Callback invoked synchronously at each lifecycle point of a submission.
pub type ProgressCallback = Arc<dyn Fn(&ProgressEvent) + Send + Sync>;

/// One lifecycle notification. `attempt` is 1-based.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressEvent {
    pub attempt: u32,
    pub status: ProgressStatus,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ProgressStatus {
    /// The request for this attempt is about to be sent.
    Sending,
    /// The backend accepted the submission; `data` is the parsed body.
    Success { data: Value },
    /// Permanent failure, no retry follows.
    Error { error: SubmissionError },
    /// Retryable failure; the next attempt starts after `delay`.
    Retrying { delay: Duration },
    /// Retries exhausted; carries the error before normalization.
    Failed { error: SubmissionError },
}

impl ProgressStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProgressStatus::Sending => "sending",
            ProgressStatus::Success { .. } => "success",
            ProgressStatus::Error { .. } => "error",
            ProgressStatus::Retrying { .. } => "retrying",
            ProgressStatus::Failed { .. } => "failed",
        }
    }
}

impl fmt::Display for ProgressEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.status {
            ProgressStatus::Retrying { delay } => write!(
                f,
                "attempt {}: retrying in {}ms",
                self.attempt,
                delay.as_millis()
            ),
            ProgressStatus::Error { error } | ProgressStatus::Failed { error } => write!(
                f,
                "attempt {}: {} ({})",
                self.attempt,
                self.status.as_str(),
                error
            ),
            status => write!(f, "attempt {}: {}", self.attempt, status.as_str()),
        }
    }
}

/// Thin wrapper so the service does not have to match on `Option` everywhere.
#[derive(Clone, Default)]
pub(crate) struct ProgressReporter {
    callback: Option<ProgressCallback>,
}

impl ProgressReporter {
    pub(crate) fn new(callback: Option<ProgressCallback>) -> Self {
        Self { callback }
    }

    pub(crate) fn emit(&self, attempt: u32, status: ProgressStatus) {
        if let Some(callback) = &self.callback {
            callback(&ProgressEvent { attempt, status });
        }
    }
}
