//! HTTP client builder with optional retry middleware.

use std::time::Duration;

use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::RetryTransientMiddleware;

use super::RetryAfterPolicy;
use crate::error::Error;

/// HTTP client configuration.
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// Request timeout.
    pub timeout: Duration,
    /// Maximum number of retries for transient failures. 0 disables the retry layer.
    pub max_retries: u32,
    /// User agent string.
    pub user_agent: String,
    /// Skip TLS certificate verification.
    pub accept_invalid_certs: bool,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            max_retries: 0,
            user_agent: format!("api-platform-sdk/{}", env!("CARGO_PKG_VERSION")),
            accept_invalid_certs: false,
        }
    }
}

/// The pair of clients every SDK call goes through.
///
/// Buffered requests use the middleware client so transient failures can be retried.
/// Streamed bodies (multipart uploads) cannot be replayed and use the plain client.
#[derive(Clone)]
pub struct HttpClient {
    plain: reqwest::Client,
    client: ClientWithMiddleware,
}

impl HttpClient {
    /// Build a client with the default configuration.
    pub fn new() -> Result<Self, Error> {
        HttpClientBuilder::new().build()
    }

    pub fn client(&self) -> &ClientWithMiddleware {
        &self.client
    }

    pub fn plain(&self) -> &reqwest::Client {
        &self.plain
    }
}

/// Builder for [`HttpClient`].
pub struct HttpClientBuilder {
    config: HttpClientConfig,
}

impl HttpClientBuilder {
    /// Create a new client builder with default configuration.
    pub fn new() -> Self {
        Self {
            config: HttpClientConfig::default(),
        }
    }

    /// Start from an existing configuration.
    pub fn with_config(mut self, config: HttpClientConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.config.max_retries = max_retries;
        self
    }

    pub fn with_user_agent(mut self, user_agent: String) -> Self {
        self.config.user_agent = user_agent;
        self
    }

    pub fn accept_invalid_certs(mut self, accept_invalid_certs: bool) -> Self {
        self.config.accept_invalid_certs = accept_invalid_certs;
        self
    }

    /// Build the configured HTTP client.
    pub fn build(self) -> Result<HttpClient, Error> {
        let plain = reqwest::Client::builder()
            .use_rustls_tls()
            .timeout(self.config.timeout)
            .user_agent(self.config.user_agent)
            .danger_accept_invalid_certs(self.config.accept_invalid_certs)
            .build()?;

        let mut builder = ClientBuilder::new(plain.clone());
        if self.config.max_retries > 0 {
            let retry_policy = RetryAfterPolicy::new(self.config.max_retries);
            builder = builder.with(RetryTransientMiddleware::new_with_policy(retry_policy));
        }

        Ok(HttpClient {
            plain,
            client: builder.build(),
        })
    }
}

impl Default for HttpClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}
