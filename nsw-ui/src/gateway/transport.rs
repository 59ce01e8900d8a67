//! HTTP transport backed by reqwest

use async_trait::async_trait;
use nsw_common::api::Endpoint;
use nsw_common::config::BackendConfig;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

use super::Transport;

const USER_AGENT: &str = concat!("nsw-ui/", env!("CARGO_PKG_VERSION"));

/// Network-level failure (connection, TLS, body read)
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct TransportError(String);

impl TransportError {
    pub fn new(description: impl Into<String>) -> Self {
        Self(description.into())
    }
}

/// Posts JSON to `<base_url>/api/<endpoint>`
///
/// The HTTP status code is only logged: the response body is returned for
/// envelope decoding whatever the status.
pub struct HttpTransport {
    http_client: reqwest::Client,
    base_url: String,
}

impl HttpTransport {
    pub fn new(config: &BackendConfig) -> Result<Self, TransportError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .build()
            .map_err(|e| TransportError::new(e.to_string()))?;

        Ok(Self {
            http_client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url_for(&self, endpoint: Endpoint) -> String {
        format!("{}{}", self.base_url, endpoint.path())
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn post(&self, endpoint: Endpoint, body: Option<Value>) -> Result<Vec<u8>, TransportError> {
        let url = self.url_for(endpoint);
        let request = match body {
            Some(ref json) => self.http_client.post(&url).json(json),
            None => self.http_client.post(&url),
        };

        let response = request
            .send()
            .await
            .map_err(|e| TransportError::new(format!("request to {} failed: {}", url, e)))?;

        let status = response.status();
        if !status.is_success() {
            tracing::debug!(%endpoint, status = status.as_u16(), "Non-2xx response, decoding envelope anyway");
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| TransportError::new(format!("reading response from {} failed: {}", url, e)))?;
        Ok(bytes.to_vec())
    }
}
