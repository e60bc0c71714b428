use url::Url;

use crate::config::models::{BackoffConfig, ClientConfig};

/// Upper bound on configured retries; beyond this a form submission would keep
/// the user waiting for minutes.
pub const MAX_RETRIES: u32 = 10;

/// Validation result type alias
pub type ConfigValidationResult<T> = Result<T, ValidationError>;

/// Validation error types
#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Missing required field: {field}")]
    MissingField { field: String },

    #[error("Invalid field '{field}': {message}")]
    InvalidField { field: String, message: String },

    #[error("Invalid endpoint '{endpoint}': {reason}")]
    InvalidEndpoint { endpoint: String, reason: String },

    #[error("Validation failed: {message}")]
    ValidationFailed { message: String },
}

/// Client configuration validator
pub struct ClientConfigValidator;

impl ClientConfigValidator {
    /// Validate the entire client configuration, reporting every problem found
    pub fn validate(config: &ClientConfig) -> ConfigValidationResult<()> {
        let mut errors = Vec::new();

        if let Err(e) = Self::validate_endpoint(&config.endpoint) {
            errors.push(e);
        }

        if config.timeout_secs == 0 {
            errors.push(ValidationError::InvalidField {
                field: "timeout_secs".to_string(),
                message: "Must be greater than 0".to_string(),
            });
        }

        if config.retries > MAX_RETRIES {
            errors.push(ValidationError::InvalidField {
                field: "retries".to_string(),
                message: format!("Must be at most {MAX_RETRIES}"),
            });
        }

        if config.user_agent.trim().is_empty() {
            errors.push(ValidationError::MissingField {
                field: "user_agent".to_string(),
            });
        }

        if let Err(mut backoff_errors) = Self::validate_backoff(&config.backoff) {
            errors.append(&mut backoff_errors);
        }

        if config.health_check.timeout_secs == 0 {
            errors.push(ValidationError::InvalidField {
                field: "health_check.timeout_secs".to_string(),
                message: "Must be greater than 0".to_string(),
            });
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ValidationError::ValidationFailed {
                message: Self::format_multiple_errors(errors),
            })
        }
    }

    /// The endpoint must be an absolute http(s) URL with a host
    fn validate_endpoint(endpoint: &str) -> ConfigValidationResult<()> {
        if endpoint.trim().is_empty() {
            return Err(ValidationError::MissingField {
                field: "endpoint".to_string(),
            });
        }

        let invalid = |reason: &str| ValidationError::InvalidEndpoint {
            endpoint: endpoint.to_string(),
            reason: reason.to_string(),
        };

        let url = Url::parse(endpoint).map_err(|e| invalid(&e.to_string()))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(invalid("Scheme must be http or https"));
        }
        if url.host_str().is_none() {
            return Err(invalid("Missing host"));
        }
        if !url.path().contains("/contact") {
            tracing::warn!(
                "Endpoint {} has no '/contact' segment; the health probe will use the same URL",
                endpoint
            );
        }
        Ok(())
    }

    fn validate_backoff(backoff: &BackoffConfig) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if backoff.initial_delay_ms == 0 {
            errors.push(ValidationError::InvalidField {
                field: "backoff.initial_delay_ms".to_string(),
                message: "Must be greater than 0".to_string(),
            });
        }

        if backoff.max_delay_ms < backoff.initial_delay_ms {
            errors.push(ValidationError::InvalidField {
                field: "backoff.max_delay_ms".to_string(),
                message: format!(
                    "Must be at least initial_delay_ms ({})",
                    backoff.initial_delay_ms
                ),
            });
        }

        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }

    fn format_multiple_errors(errors: Vec<ValidationError>) -> String {
        if errors.is_empty() {
            return "No errors".to_string();
        }

        if errors.len() == 1 {
            return errors[0].to_string();
        }

        let mut message = format!("Found {} validation errors:\n", errors.len());
        for (i, error) in errors.iter().enumerate() {
            message.push_str(&format!("  {}. {}\n", i + 1, error));
        }
        message
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_accepts_default_config() {
        assert!(ClientConfigValidator::validate(&ClientConfig::default()).is_ok());
    }

    #[test]
    fn validate_accepts_plain_http_endpoint() {
        let config = ClientConfig::builder()
            .endpoint("http://127.0.0.1:8080/contact")
            .build();
        assert!(ClientConfigValidator::validate(&config).is_ok());
    }

    #[test]
    fn validate_rejects_relative_endpoint() {
        let config = ClientConfig::builder().endpoint("/dev/contact").build();
        assert!(ClientConfigValidator::validate(&config).is_err());
    }

    #[test]
    fn validate_rejects_non_http_scheme() {
        let config = ClientConfig::builder()
            .endpoint("ftp://example.com/contact")
            .build();
        let err = ClientConfigValidator::validate(&config).unwrap_err();
        assert!(err.to_string().contains("Scheme must be http or https"));
    }

    #[test]
    fn validate_rejects_zero_timeout() {
        let config = ClientConfig::builder().timeout_secs(0).build();
        assert!(ClientConfigValidator::validate(&config).is_err());
    }

    #[test]
    fn validate_rejects_inverted_backoff() {
        let config = ClientConfig::builder().backoff(5000, 1000).build();
        let err = ClientConfigValidator::validate(&config).unwrap_err();
        assert!(err.to_string().contains("backoff.max_delay_ms"));
    }

    #[test]
    fn validate_rejects_excessive_retries() {
        let config = ClientConfig::builder().retries(MAX_RETRIES + 1).build();
        assert!(ClientConfigValidator::validate(&config).is_err());
    }

    #[test]
    fn validate_reports_every_problem() {
        let config = ClientConfig::builder()
            .endpoint("")
            .timeout_secs(0)
            .health_timeout_secs(0)
            .build();
        let err = ClientConfigValidator::validate(&config).unwrap_err();
        assert!(err.to_string().contains("Found 3 validation errors"));
    }
}
