//! Types shared by the indexer fetch client.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use super::transport::TransportError;

/// Connection settings for one fetch cycle.
///
/// Built from user configuration and passed by reference to the fetch client
/// and the formatter, so neither depends on earlier initialization.
#[derive(Clone, PartialEq, Eq)]
pub struct ConnectionSettings {
    host: String,
    api_key: String,
    password: Option<String>,
}

impl ConnectionSettings {
    /// Host is trimmed of whitespace and trailing slashes; a blank password
    /// counts as no password.
    pub fn new(host: &str, api_key: &str, password: Option<&str>) -> Self {
        Self {
            host: host.trim().trim_end_matches('/').to_string(),
            api_key: api_key.trim().to_string(),
            password: password.filter(|p| !p.trim().is_empty()).map(str::to_string),
        }
    }

    /// Normalized base URL without trailing slash.
    pub fn base_url(&self) -> &str {
        &self.host
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub fn password(&self) -> Option<&str> {
        self.password.as_deref()
    }

    /// Host and API key are both present.
    pub fn is_complete(&self) -> bool {
        !self.host.is_empty() && !self.api_key.is_empty()
    }
}

impl std::fmt::Debug for ConnectionSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionSettings")
            .field("host", &self.host)
            .field("api_key", &if self.api_key.is_empty() { "<unset>" } else { "<redacted>" })
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// One entry of Jackett's configured indexer list.
///
/// Only `id` and `name` are interpreted. Non-string values for either are
/// left in `extra`, which makes the record unformattable rather than
/// failing the whole list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Value")]
pub struct IndexerRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl IndexerRecord {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            name: Some(name.into()),
            extra: Map::new(),
        }
    }
}

impl From<Value> for IndexerRecord {
    fn from(value: Value) -> Self {
        match value {
            Value::Object(mut map) => {
                let id = take_string(&mut map, "id");
                let name = take_string(&mut map, "name");
                Self {
                    id,
                    name,
                    extra: map,
                }
            }
            _ => Self::default(),
        }
    }
}

fn take_string(map: &mut Map<String, Value>, key: &str) -> Option<String> {
    match map.remove(key) {
        Some(Value::String(s)) => Some(s),
        Some(other) => {
            map.insert(key.to_string(), other);
            None
        }
        None => None,
    }
}

/// Classification of a failed attempt, used as the retry policy key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    /// Host or API key missing; no I/O performed.
    Configuration,
    /// HTTP 401/403.
    Authentication,
    /// Timeout or connection-level failure.
    TransientNetwork,
    /// HTTP 200 with a non-JSON body, usually a login page.
    ProtocolMismatch,
    /// Any other non-200 status.
    UnexpectedStatus,
    /// JSON that does not parse.
    MalformedResponse,
}

impl FailureKind {
    /// Label value for metrics.
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureKind::Configuration => "configuration",
            FailureKind::Authentication => "authentication",
            FailureKind::TransientNetwork => "transient_network",
            FailureKind::ProtocolMismatch => "protocol_mismatch",
            FailureKind::UnexpectedStatus => "unexpected_status",
            FailureKind::MalformedResponse => "malformed_response",
        }
    }
}

/// Errors that can occur while fetching the indexer list.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Jackett host or API key is not configured")]
    NotConfigured,

    #[error("Jackett rejected the request with HTTP {0}")]
    Unauthorized(u16),

    #[error("Request to Jackett timed out")]
    Timeout,

    #[error("Could not connect to Jackett: {0}")]
    ConnectionFailed(String),

    #[error("Request to Jackett failed: {0}")]
    Request(String),

    #[error("Jackett answered HTTP 200 with content type {content_type:?} instead of JSON")]
    UnexpectedContentType { content_type: String },

    #[error("Jackett answered HTTP {status}")]
    UnexpectedStatus { status: u16 },

    #[error("Jackett returned malformed JSON: {0}")]
    MalformedResponse(String),

    #[error("Gave up after {attempts} attempts: {last}")]
    RetriesExhausted {
        attempts: u32,
        last: Box<FetchError>,
    },
}

impl FetchError {
    pub fn kind(&self) -> FailureKind {
        match self {
            FetchError::NotConfigured => FailureKind::Configuration,
            FetchError::Unauthorized(_) => FailureKind::Authentication,
            FetchError::Timeout | FetchError::ConnectionFailed(_) | FetchError::Request(_) => {
                FailureKind::TransientNetwork
            }
            FetchError::UnexpectedContentType { .. } => FailureKind::ProtocolMismatch,
            FetchError::UnexpectedStatus { .. } => FailureKind::UnexpectedStatus,
            FetchError::MalformedResponse(_) => FailureKind::MalformedResponse,
            FetchError::RetriesExhausted { last, .. } => last.kind(),
        }
    }

    /// What the user should check, phrased for an API message.
    pub fn hint(&self) -> &'static str {
        match self.kind() {
            FailureKind::Configuration => "set the Jackett host and API key",
            FailureKind::Authentication => "check the Jackett API key and admin password",
            FailureKind::TransientNetwork => "check that the Jackett host is reachable",
            FailureKind::ProtocolMismatch => {
                "Jackett served a web page instead of JSON, check the admin password and host URL"
            }
            FailureKind::UnexpectedStatus => "check the Jackett logs",
            FailureKind::MalformedResponse => {
                "the configured host does not look like a Jackett API"
            }
        }
    }
}

impl From<TransportError> for FetchError {
    fn from(e: TransportError) -> Self {
        match e {
            TransportError::Timeout => FetchError::Timeout,
            TransportError::ConnectionFailed(msg) => FetchError::ConnectionFailed(msg),
            TransportError::Request(msg) => FetchError::Request(msg),
        }
    }
}
