use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Success code of an [`ApiEnvelope`].
pub const CODE_OK: i32 = 0;
/// Failure code of an [`ApiEnvelope`].
pub const CODE_FAILED: i32 = 1;

/// `{code, message, data}` response of the generator operations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiEnvelope<T> {
    pub code: i32,
    pub message: String,
    pub data: T,
}

impl<T> ApiEnvelope<T> {
    pub fn ok(message: impl Into<String>, data: T) -> Self {
        Self {
            code: CODE_OK,
            message: message.into(),
            data,
        }
    }

    pub fn is_ok(&self) -> bool {
        self.code == CODE_OK
    }
}

impl<T: Default> ApiEnvelope<T> {
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            code: CODE_FAILED,
            message: message.into(),
            data: T::default(),
        }
    }
}

/// One generated config line with its display data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigEntry {
    /// Jackett indexer name.
    pub name: String,
    /// Derived id, also the prefix of `config_string`.
    pub internal_id: String,
    /// `{internal_id}|{base64}` line for the custom indexer component.
    pub config_string: String,
}

/// Selectable indexer, as offered when choosing which indexers to export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexerOption {
    /// Jackett indexer id.
    pub value: String,
    /// Jackett indexer name.
    pub text: String,
}

/// Outcome of the most recent generation cycle.
#[derive(Debug, Clone, Serialize)]
pub struct GenerationSummary {
    pub generated_at: DateTime<Utc>,
    pub code: i32,
    pub message: String,
    pub lines: usize,
}
