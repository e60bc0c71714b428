use async_trait::async_trait;
use bytes::Bytes;
use http::StatusCode;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

/// Custom error type for HTTP client operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum HttpClientError {
    /// Error when connection to the endpoint fails
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// The caller's cancellation token fired before the exchange finished
    #[error("Request cancelled")]
    Cancelled,

    /// Error when request is invalid
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Error while reading the response body
    #[error("Failed to read response body: {0}")]
    BodyError(String),
}

/// Result type alias for HTTP client operations
pub type HttpClientResult<T> = Result<T, HttpClientError>;

/// A fully buffered HTTP response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpReply {
    pub status: StatusCode,
    pub body: Bytes,
}

impl HttpReply {
    pub fn new(status: StatusCode, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }
}

/// HttpClient defines the port (interface) for talking to the contact backend
#[async_trait]
pub trait HttpClient: Send + Sync + 'static {
    /// POST a JSON document
    ///
    /// # Arguments
    /// * `url` - Absolute URL to post to
    /// * `body` - Serialized JSON, sent with `Content-Type: application/json`
    /// * `cancel` - Abandon the exchange as soon as this token fires
    ///
    /// # Returns
    /// The status and full body of the response, whatever the status
    async fn post_json(
        &self,
        url: &str,
        body: Bytes,
        cancel: CancellationToken,
    ) -> HttpClientResult<HttpReply>;

    /// GET a URL
    ///
    /// # Arguments
    /// * `url` - Absolute URL to fetch
    /// * `cancel` - Abandon the exchange as soon as this token fires
    async fn get(&self, url: &str, cancel: CancellationToken) -> HttpClientResult<HttpReply>;
}
