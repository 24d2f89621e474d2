//! Access control for the bridge's own HTTP API.

use thiserror::Error;

use crate::config::{AuthConfig, AuthMethod};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("Authentication required")]
    NotAuthenticated,

    #[error("Invalid API key")]
    InvalidCredentials,

    #[error("Configuration error: {0}")]
    ConfigurationError(String),
}

/// Request guard built from `[auth]`.
///
/// With `api_key` the key is accepted from `Authorization: Bearer <key>`
/// or `X-API-Key: <key>`.
#[derive(Clone)]
pub enum ApiGuard {
    Open,
    ApiKey(String),
}

impl std::fmt::Debug for ApiGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApiGuard::Open => f.write_str("Open"),
            ApiGuard::ApiKey(_) => f.write_str("ApiKey(<redacted>)"),
        }
    }
}

impl ApiGuard {
    pub fn from_config(config: &AuthConfig) -> Result<Self, AuthError> {
        match config.method {
            AuthMethod::None => Ok(ApiGuard::Open),
            AuthMethod::ApiKey => config
                .api_key
                .clone()
                .filter(|k| !k.is_empty())
                .map(ApiGuard::ApiKey)
                .ok_or_else(|| {
                    AuthError::ConfigurationError(
                        "api_key must be set when using api_key auth method".to_string(),
                    )
                }),
        }
    }

    pub fn method_name(&self) -> &'static str {
        match self {
            ApiGuard::Open => "none",
            ApiGuard::ApiKey(_) => "api_key",
        }
    }

    /// Check the credentials carried by a request's headers.
    pub fn check(
        &self,
        authorization: Option<&str>,
        x_api_key: Option<&str>,
    ) -> Result<(), AuthError> {
        let ApiGuard::ApiKey(expected) = self else {
            return Ok(());
        };

        let provided = authorization
            .and_then(|h| {
                h.strip_prefix("Bearer ")
                    .or_else(|| h.strip_prefix("bearer "))
            })
            .or(x_api_key)
            .ok_or(AuthError::NotAuthenticated)?;

        if constant_time_eq(provided.trim().as_bytes(), expected.as_bytes()) {
            Ok(())
        } else {
            Err(AuthError::InvalidCredentials)
        }
    }
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
