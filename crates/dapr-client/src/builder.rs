use crate::error::ClientError;
use crate::http::HttpInvocationClient;
use reqwest::header::{HeaderMap, HeaderValue};
use std::time::Duration;
use tracing::debug;

/// Port the sidecar listens on when `DAPR_HTTP_PORT` is not set.
pub const DEFAULT_DAPR_PORT: u16 = 3500;

pub(crate) const API_TOKEN_HEADER: &str = "dapr-api-token";

/// Builds an [`HttpInvocationClient`].
///
/// The defaults follow the sidecar conventions: `http://127.0.0.1:{DAPR_HTTP_PORT}`
/// and an API token taken from `DAPR_API_TOKEN` when that variable is set.
#[derive(Debug, Clone)]
pub struct DaprClientBuilder {
    http_host: String,
    api_token: Option<String>,
    timeout: Option<Duration>,
}

impl DaprClientBuilder {
    pub fn new() -> Self {
        let port = std::env::var("DAPR_HTTP_PORT")
            .ok()
            .and_then(|port| port.parse::<u16>().ok())
            .unwrap_or(DEFAULT_DAPR_PORT);
        let api_token = std::env::var("DAPR_API_TOKEN")
            .ok()
            .filter(|token| !token.is_empty());

        Self {
            http_host: format!("http://127.0.0.1:{}", port),
            api_token,
            timeout: None,
        }
    }

    pub fn use_http_host(mut self, http_host: impl Into<String>) -> Self {
        self.http_host = http_host.into();
        self
    }

    pub fn with_api_token(mut self, token: impl Into<String>) -> Self {
        let token = token.into();
        self.api_token = if token.is_empty() { None } else { Some(token) };
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn http_host(&self) -> &str {
        &self.http_host
    }

    pub fn build(self) -> Result<HttpInvocationClient, ClientError> {
        let base_url = reqwest::Url::parse(&self.http_host)
            .map_err(|e| ClientError::InvalidUrl(format!("{}: {}", self.http_host, e)))?;

        let mut headers = HeaderMap::new();
        if let Some(token) = &self.api_token {
            let value = HeaderValue::from_str(token)
                .map_err(|_| ClientError::InvalidApiToken)?;
            headers.insert(API_TOKEN_HEADER, value);
        }

        let mut builder = reqwest::Client::builder().default_headers(headers);
        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build()?;

        debug!(
            "Built dapr client for {} (token: {})",
            base_url,
            self.api_token.is_some()
        );
        Ok(HttpInvocationClient::new(http, base_url))
    }
}

impl Default for DaprClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}
