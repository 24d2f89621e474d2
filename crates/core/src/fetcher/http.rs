//! reqwest-backed transport.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use tracing::debug;

use crate::config::FetchConfig;

use super::transport::{ApiRequest, ApiResponse, HttpMethod, Transport, TransportError};
use super::Session;

/// Transport that talks to Jackett over HTTP.
///
/// A client is built per request around the session's cookie jar, so cookies
/// set during warm-up or login are sent with the API call that follows.
/// Redirects are followed with reqwest's default policy.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    timeout: Duration,
    accept_invalid_certs: bool,
}

impl ReqwestTransport {
    pub fn new(config: &FetchConfig) -> Self {
        Self {
            timeout: Duration::from_secs(config.timeout_secs),
            accept_invalid_certs: config.accept_invalid_certs,
        }
    }

    fn client_for(&self, session: &Session) -> Result<Client, TransportError> {
        Client::builder()
            .timeout(self.timeout)
            .cookie_provider(session.cookie_jar())
            .danger_accept_invalid_certs(self.accept_invalid_certs)
            .build()
            .map_err(|e| TransportError::Request(format!("Failed to create HTTP client: {}", e)))
    }
}

fn map_error(e: reqwest::Error) -> TransportError {
    if e.is_timeout() {
        TransportError::Timeout
    } else if e.is_connect() {
        TransportError::ConnectionFailed(e.to_string())
    } else {
        TransportError::Request(e.to_string())
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(
        &self,
        session: &Session,
        request: ApiRequest,
    ) -> Result<ApiResponse, TransportError> {
        let client = self.client_for(session)?;

        let mut builder = match request.method {
            HttpMethod::Get => client.get(&request.url),
            HttpMethod::Post => client.post(&request.url).form(&request.form),
        };
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        debug!(method = ?request.method, path = request.path(), "Sending request");

        let response = builder.send().await.map_err(map_error)?;

        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = response.text().await.map_err(map_error)?;

        Ok(ApiResponse {
            status,
            content_type,
            body,
        })
    }
}
