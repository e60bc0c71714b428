use eyre::{Result, WrapErr};
use tracing_subscriber::{EnvFilter, Registry, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize structured logging with JSON output
pub fn init_tracing() -> Result<()> {
    init_tracing_with_config("info", true, false)
}

/// Initialize console-friendly logging for interactive use
pub fn init_console_tracing() -> Result<()> {
    init_tracing_with_config("info", false, false)
}

/// Initialize tracing with custom configuration.
///
/// `RUST_LOG` takes precedence over `level` when set. Logs go to stderr so
/// command output on stdout stays machine-readable.
pub fn init_tracing_with_config(level: &str, json_format: bool, include_spans: bool) -> Result<()> {
    let env_filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => {
            EnvFilter::try_new(level).wrap_err_with(|| format!("Invalid log level: {level}"))?
        }
    };

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_file(true)
        .with_line_number(true);

    if json_format {
        Registry::default()
            .with(env_filter)
            .with(
                fmt_layer
                    .json()
                    .with_current_span(include_spans)
                    .with_span_list(include_spans),
            )
            .try_init()
            .wrap_err("Failed to install tracing subscriber")?;
    } else {
        Registry::default()
            .with(env_filter)
            .with(fmt_layer.compact().with_ansi(true))
            .try_init()
            .wrap_err("Failed to install tracing subscriber")?;
    }

    tracing::debug!(
        "Logging initialized with level: {}, json: {}, spans: {}",
        level,
        json_format,
        include_spans
    );
    Ok(())
}

/// Span covering one `submit` call
pub fn create_submission_span(endpoint: &str, retries: u32) -> tracing::Span {
    tracing::info_span!(
        "submission",
        endpoint = endpoint,
        retries = retries,
        outcome = tracing::field::Empty,
        attempts = tracing::field::Empty,
    )
}

/// Span covering one attempt within a submission
pub fn create_attempt_span(attempt: u32) -> tracing::Span {
    tracing::info_span!(
        "attempt",
        attempt = attempt,
        http.status_code = tracing::field::Empty,
    )
}

/// Span covering one health probe
pub fn create_health_span(url: &str) -> tracing::Span {
    tracing::info_span!("health_check", url = url, healthy = tracing::field::Empty)
}

/// Domain part of an address, for logs that must not carry the mailbox itself
pub fn redact_email(email: &str) -> String {
    match email.trim().rsplit_once('@') {
        Some((_, domain)) if !domain.is_empty() => format!("***@{domain}"),
        _ => "***".to_string(),
    }
}
