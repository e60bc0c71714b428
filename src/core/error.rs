//! Classified submission failures.
use serde_json::{Value, json};
use thiserror::Error;

/// Message used when the backend reports a failure without explaining it.
pub const DEFAULT_FAILURE_MESSAGE: &str = "Failed to submit contact form";
pub const TIMEOUT_MESSAGE: &str = "Request timeout. Please try again.";
pub const NETWORK_MESSAGE: &str = "Network error. Please check your connection and try again.";

/// Why a submission did not succeed.
///
/// Each variant carries a human-readable message, a numeric status (see
/// [`SubmissionError::status`] and [`SubmissionError::classification`]) and
/// optional structured details for the UI.
#[derive(Error, Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum SubmissionError {
    /// Required fields were empty; raised before any request is made.
    #[error("{message}")]
    Validation {
        message: String,
        details: Option<Value>,
    },

    /// The backend rejected the request (4xx).
    #[error("{message}")]
    Client {
        status: u16,
        message: String,
        details: Option<Value>,
    },

    /// The backend answered with any other non-success outcome: a 5xx, or a
    /// 2xx whose body reports `success: false`.
    #[error("{message}")]
    Server {
        status: u16,
        message: String,
        details: Option<Value>,
    },

    /// No classified response: connection failure, unreadable body or
    /// malformed JSON. Only seen while retries remain.
    #[error("{message}")]
    Transport { message: String },

    /// An attempt's deadline elapsed before the backend answered.
    #[error("Request timeout. Please try again.")]
    Timeout { timeout_ms: u64 },

    /// Terminal form of [`SubmissionError::Transport`] once retries are spent.
    #[error("{message}")]
    Network {
        message: String,
        details: Option<Value>,
    },
}

impl SubmissionError {
    pub fn missing_required_fields() -> Self {
        Self::Validation {
            message: "Missing required fields".to_string(),
            details: Some(json!({
                "fields": ["name", "email", "company", "service"],
            })),
        }
    }

    /// Classify a backend answer that was not a success.
    pub fn from_response(status: u16, message: Option<String>, details: Option<Value>) -> Self {
        let message = message
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| DEFAULT_FAILURE_MESSAGE.to_string());
        if (400..500).contains(&status) {
            Self::Client {
                status,
                message,
                details,
            }
        } else {
            Self::Server {
                status,
                message,
                details,
            }
        }
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    /// Status classification used for retry decisions.
    ///
    /// `None` means unclassified: transport failures and timeouts observed
    /// mid-flight.
    pub fn classification(&self) -> Option<u16> {
        match self {
            Self::Validation { .. } => Some(400),
            Self::Client { status, .. } | Self::Server { status, .. } => Some(*status),
            Self::Transport { .. } | Self::Timeout { .. } => None,
            Self::Network { .. } => Some(0),
        }
    }

    /// Numeric status as reported to callers (0 when unclassified).
    pub fn status(&self) -> u16 {
        match self {
            Self::Timeout { .. } => 408,
            other => other.classification().unwrap_or(0),
        }
    }

    /// Client-side errors will fail identically on retry.
    pub fn is_permanent(&self) -> bool {
        self.classification()
            .is_some_and(|status| (400..500).contains(&status))
    }

    pub fn message(&self) -> String {
        self.to_string()
    }

    pub fn details(&self) -> Option<Value> {
        match self {
            Self::Validation { details, .. }
            | Self::Client { details, .. }
            | Self::Server { details, .. }
            | Self::Network { details, .. } => details.clone(),
            Self::Transport { .. } => None,
            Self::Timeout { timeout_ms } => Some(json!({ "timeout": timeout_ms })),
        }
    }

    /// Convert the last error of an exhausted retry loop into what the caller
    /// sees: timeouts keep their 408 form, unclassified failures become a
    /// network error, classified errors pass through unchanged.
    pub fn into_terminal(self) -> Self {
        match self {
            Self::Transport { message } => Self::Network {
                message: NETWORK_MESSAGE.to_string(),
                details: Some(json!({ "originalError": message })),
            },
            other => other,
        }
    }

    /// Name of the variant, used as a log field.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Validation { .. } => "validation",
            Self::Client { .. } => "client",
            Self::Server { .. } => "server",
            Self::Transport { .. } => "transport",
            Self::Timeout { .. } => "timeout",
            Self::Network { .. } => "network",
        }
    }
}
