pub mod health_checker;
pub mod http_client;

/// Re-export commonly used types from adapters
pub use health_checker::{HealthProbe, HealthReport};
pub use http_client::HttpClientAdapter;
