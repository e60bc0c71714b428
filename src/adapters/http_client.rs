use async_trait::async_trait;
use bytes::Bytes;
use eyre::Result;
use http_body_util::{BodyExt, Full};
use hyper::{Method, Request, Version, header, header::HeaderValue};
use hyper_rustls::HttpsConnector;
use hyper_util::{
    client::legacy::{Client, connect::HttpConnector},
    rt::TokioExecutor,
};
use rustls_native_certs::load_native_certs;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;

use crate::ports::http_client::{HttpClient, HttpClientError, HttpClientResult, HttpReply};

/// HTTP client adapter using Hyper with Rustls.
///
/// Responsibilities:
/// * Adds `User-Agent` / `Accept` headers
/// * Buffers the whole response body so callers can parse it as JSON
/// * Abandons the exchange (connect, headers and body) when the caller's
///   cancellation token fires
///
/// Deadlines and retries live in the submission service, not here.
pub struct HttpClientAdapter {
    client: Client<HttpsConnector<HttpConnector>, Full<Bytes>>,
    user_agent: HeaderValue,
}

impl HttpClientAdapter {
    /// Create a new HTTP client adapter.
    pub fn new(user_agent: &str) -> Result<Self> {
        // Install default crypto provider for rustls if not already set
        let _ = rustls::crypto::aws_lc_rs::default_provider().install_default();

        let mut http_connector = HttpConnector::new();
        http_connector.enforce_http(false); // Allow HTTPS URLs

        let mut root_cert_store = rustls::RootCertStore::empty();
        let native_certs = load_native_certs();

        if !native_certs.certs.is_empty() {
            for cert in native_certs.certs {
                if root_cert_store.add(cert).is_err() {
                    tracing::warn!("Failed to add native certificate to rustls RootCertStore");
                }
            }
            tracing::debug!("Loaded {} native root certificates.", root_cert_store.len());
        }

        if !native_certs.errors.is_empty() {
            tracing::warn!(
                "Some native certificates failed to load: {:?}",
                native_certs.errors
            );
        }

        let tls_config = rustls::ClientConfig::builder()
            .with_root_certificates(root_cert_store)
            .with_no_client_auth();

        let https_connector = hyper_rustls::HttpsConnectorBuilder::new()
            .with_tls_config(tls_config)
            .https_or_http()
            .enable_http1()
            .wrap_connector(http_connector);

        let client = Client::builder(TokioExecutor::new()).build::<_, Full<Bytes>>(https_connector);

        let user_agent = HeaderValue::from_str(user_agent)
            .map_err(|e| eyre::eyre!("Invalid user agent '{user_agent}': {e}"))?;

        tracing::debug!("Created HTTP client adapter");
        Ok(Self { client, user_agent })
    }

    fn build_request(
        &self,
        method: Method,
        url: &str,
        body: Option<Bytes>,
    ) -> HttpClientResult<Request<Full<Bytes>>> {
        let mut builder = Request::builder()
            .method(method)
            .uri(url)
            .version(Version::HTTP_11)
            .header(header::USER_AGENT, self.user_agent.clone())
            .header(header::ACCEPT, HeaderValue::from_static("application/json"));

        if body.is_some() {
            builder = builder.header(
                header::CONTENT_TYPE,
                HeaderValue::from_static("application/json"),
            );
        }

        let request = builder
            .body(Full::new(body.unwrap_or_default()))
            .map_err(|e| HttpClientError::InvalidRequest(e.to_string()))?;

        if request.uri().host().is_none() {
            tracing::error!("Outgoing URI has no host: {}", request.uri());
            return Err(HttpClientError::InvalidRequest(
                "Outgoing URI has no host".to_string(),
            ));
        }

        Ok(request)
    }

    /// Send the request and buffer the response, unless `cancel` fires first.
    async fn execute(
        &self,
        request: Request<Full<Bytes>>,
        cancel: CancellationToken,
    ) -> HttpClientResult<HttpReply> {
        let method = request.method().clone();
        let uri = request.uri().clone();

        let span = tracing::debug_span!(
            "contact_request",
            http.method = %method,
            http.url = %uri,
            http.status_code = tracing::field::Empty,
        );

        let client = self.client.clone();
        let exchange = async move {
            let response = client.request(request).await.map_err(|e| {
                HttpClientError::ConnectionError(format!("Request to {method} {uri} failed: {e}"))
            })?;

            let status = response.status();
            let body = response
                .into_body()
                .collect()
                .await
                .map_err(|e| HttpClientError::BodyError(e.to_string()))?
                .to_bytes();

            Ok(HttpReply { status, body })
        };

        let result = async {
            tokio::select! {
                biased;
                () = cancel.cancelled() => Err(HttpClientError::Cancelled),
                result = exchange => result,
            }
        }
        .instrument(span.clone())
        .await;

        span.in_scope(|| match &result {
            Ok(reply) => {
                span.record("http.status_code", reply.status.as_u16());
                tracing::debug!("Received {} ({} bytes)", reply.status, reply.body.len());
            }
            Err(HttpClientError::Cancelled) => {
                tracing::debug!("Request cancelled before completion");
            }
            Err(e) => {
                span.record("http.status_code", 599u16);
                tracing::debug!("Request failed: {}", e);
            }
        });

        result
    }
}

#[async_trait]
impl HttpClient for HttpClientAdapter {
    async fn post_json(
        &self,
        url: &str,
        body: Bytes,
        cancel: CancellationToken,
    ) -> HttpClientResult<HttpReply> {
        let request = self.build_request(Method::POST, url, Some(body))?;
        self.execute(request, cancel).await
    }

    async fn get(&self, url: &str, cancel: CancellationToken) -> HttpClientResult<HttpReply> {
        let request = self.build_request(Method::GET, url, None)?;
        self.execute(request, cancel).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn adapter() -> HttpClientAdapter {
        HttpClientAdapter::new("formpost-test/1.0").unwrap()
    }

    #[tokio::test]
    async fn test_http_client_creation() {
        assert!(HttpClientAdapter::new("formpost/0.1.0").is_ok());
    }

    #[tokio::test]
    async fn test_invalid_user_agent_is_rejected() {
        assert!(HttpClientAdapter::new("bad\nagent").is_err());
    }

    #[tokio::test]
    async fn test_post_request_headers() {
        let req = adapter()
            .build_request(
                Method::POST,
                "https://example.com/dev/contact",
                Some(Bytes::from_static(b"{}")),
            )
            .unwrap();

        let headers = req.headers();
        assert_eq!(
            headers.get(header::CONTENT_TYPE).unwrap(),
            HeaderValue::from_static("application/json")
        );
        assert_eq!(
            headers.get(header::USER_AGENT).unwrap(),
            HeaderValue::from_static("formpost-test/1.0")
        );
        assert_eq!(req.method(), Method::POST);
    }

    #[tokio::test]
    async fn test_get_request_has_no_content_type() {
        let req = adapter()
            .build_request(Method::GET, "https://example.com/dev/health", None)
            .unwrap();
        assert!(!req.headers().contains_key(header::CONTENT_TYPE));
    }

    #[tokio::test]
    async fn test_relative_url_is_invalid() {
        let result = adapter().get("/dev/health", CancellationToken::new()).await;
        assert!(matches!(result, Err(HttpClientError::InvalidRequest(_))));
    }

    #[tokio::test]
    async fn test_cancelled_token_short_circuits() {
        let token = CancellationToken::new();
        token.cancel();
        // 192.0.2.0/24 is reserved for documentation and never answers
        let result = adapter().get("http://192.0.2.1:81/health", token).await;
        assert_eq!(result, Err(HttpClientError::Cancelled));
    }
}
