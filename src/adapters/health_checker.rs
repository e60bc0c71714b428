use std::sync::Arc;

use serde::Serialize;
use tracing::Instrument;

use crate::{
    config::models::ClientConfig, core::deadline::AttemptDeadline,
    ports::http_client::HttpClient, tracing_setup,
};

/// Outcome of a single health probe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HealthReport {
    pub healthy: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl HealthReport {
    fn answered(status: u16, healthy: bool) -> Self {
        Self {
            healthy,
            status: Some(status),
            error: None,
        }
    }

    fn unreachable(error: impl Into<String>) -> Self {
        Self {
            healthy: false,
            status: None,
            error: Some(error.into()),
        }
    }
}

/// Probes the contact backend's health endpoint for external monitoring.
pub struct HealthProbe {
    config: Arc<ClientConfig>,
    http_client: Arc<dyn HttpClient>,
}

impl HealthProbe {
    pub fn new(config: Arc<ClientConfig>, http_client: Arc<dyn HttpClient>) -> Self {
        Self {
            config,
            http_client,
        }
    }

    /// GET the health endpoint under the health timeout. Never fails: every
    /// problem is folded into an unhealthy report.
    pub async fn check_api_health(&self) -> HealthReport {
        let url = self.config.health_endpoint();
        let span = tracing_setup::create_health_span(&url);

        async {
            let deadline = AttemptDeadline::new(self.config.health_timeout());
            let report = match deadline
                .race(self.http_client.get(&url, deadline.token()))
                .await
            {
                Some(Ok(reply)) => {
                    HealthReport::answered(reply.status.as_u16(), reply.status.is_success())
                }
                Some(Err(err)) => {
                    tracing::debug!("Health check error for {}: {}", url, err);
                    HealthReport::unreachable(err.to_string())
                }
                None => {
                    tracing::debug!("Health check timeout for {}", url);
                    HealthReport::unreachable(format!(
                        "Health check timed out after {}s",
                        self.config.health_check.timeout_secs
                    ))
                }
            };

            tracing::Span::current().record("healthy", report.healthy);
            tracing::info!("Health check for {} result: {}", url, report.healthy);
            report
        }
        .instrument(span)
        .await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use bytes::Bytes;
    use http::StatusCode;
    use tokio_util::sync::CancellationToken;

    use super::*;
    use crate::ports::http_client::{HttpClientError, HttpClientResult, HttpReply};

    enum Behaviour {
        Status(u16),
        Refuse,
        Hang,
    }

    // Mock HTTP client for testing
    struct MockHttpClient {
        behaviour: Behaviour,
        requested: Mutex<Vec<String>>,
    }

    impl MockHttpClient {
        fn new(behaviour: Behaviour) -> Arc<Self> {
            Arc::new(Self {
                behaviour,
                requested: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl HttpClient for MockHttpClient {
        async fn post_json(
            &self,
            _url: &str,
            _body: Bytes,
            _cancel: CancellationToken,
        ) -> HttpClientResult<HttpReply> {
            Err(HttpClientError::ConnectionError(
                "not used in tests".to_string(),
            ))
        }

        async fn get(&self, url: &str, cancel: CancellationToken) -> HttpClientResult<HttpReply> {
            self.requested.lock().unwrap().push(url.to_string());
            match self.behaviour {
                Behaviour::Status(code) => Ok(HttpReply::new(
                    StatusCode::from_u16(code).unwrap(),
                    Bytes::from_static(b"{}"),
                )),
                Behaviour::Refuse => Err(HttpClientError::ConnectionError(
                    "connection refused".to_string(),
                )),
                Behaviour::Hang => {
                    cancel.cancelled().await;
                    Err(HttpClientError::Cancelled)
                }
            }
        }
    }

    fn probe(client: Arc<MockHttpClient>) -> HealthProbe {
        HealthProbe::new(Arc::new(ClientConfig::default()), client)
    }

    #[tokio::test]
    async fn test_healthy_backend() {
        let client = MockHttpClient::new(Behaviour::Status(200));
        let report = probe(client.clone()).check_api_health().await;

        assert_eq!(report, HealthReport::answered(200, true));
        assert_eq!(
            client.requested.lock().unwrap().as_slice(),
            ["https://vj5g5k1f4b.execute-api.us-east-1.amazonaws.com/dev/health"]
        );
    }

    #[tokio::test]
    async fn test_error_status_is_unhealthy_but_reported() {
        let report = probe(MockHttpClient::new(Behaviour::Status(503)))
            .check_api_health()
            .await;
        assert!(!report.healthy);
        assert_eq!(report.status, Some(503));
        assert_eq!(report.error, None);
    }

    #[tokio::test]
    async fn test_unreachable_backend() {
        let report = probe(MockHttpClient::new(Behaviour::Refuse))
            .check_api_health()
            .await;
        assert!(!report.healthy);
        assert_eq!(report.status, None);
        assert!(report.error.unwrap().contains("connection refused"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_probe_gives_up_after_health_timeout() {
        let start = tokio::time::Instant::now();
        let report = probe(MockHttpClient::new(Behaviour::Hang))
            .check_api_health()
            .await;

        assert!(!report.healthy);
        assert_eq!(
            report.error.as_deref(),
            Some("Health check timed out after 5s")
        );
        assert!(start.elapsed() >= std::time::Duration::from_secs(5));
        assert!(start.elapsed() < std::time::Duration::from_secs(30));
    }

    #[test]
    fn test_report_serialization_skips_absent_fields() {
        let json = serde_json::to_value(HealthReport::unreachable("boom")).unwrap();
        assert_eq!(json, serde_json::json!({ "healthy": false, "error": "boom" }));
    }
}
