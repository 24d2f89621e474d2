//! `{id}|{base64(json)}` config lines.

use std::fmt;
use std::str::FromStr;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use super::types::{FormatError, FormattedConfig};

/// Line accepted by the custom indexer component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigLine {
    id: String,
    payload: String,
}

impl ConfigLine {
    /// Compact JSON of `config`, base64 encoded, keyed by its id.
    pub fn encode(config: &FormattedConfig) -> Result<Self, FormatError> {
        let json = serde_json::to_string(config)?;
        Ok(Self {
            id: config.id.clone(),
            payload: STANDARD.encode(json.as_bytes()),
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// The base64 segment.
    pub fn payload(&self) -> &str {
        &self.payload
    }

    /// Decode the payload back into the config it was encoded from.
    pub fn decode(&self) -> Result<FormattedConfig, FormatError> {
        let bytes = STANDARD.decode(&self.payload)?;
        let json = String::from_utf8(bytes).map_err(|_| FormatError::InvalidUtf8)?;
        let config: FormattedConfig = serde_json::from_str(&json)?;

        if config.id != self.id {
            return Err(FormatError::IdMismatch {
                line_id: self.id.clone(),
                config_id: config.id,
            });
        }
        Ok(config)
    }
}

impl fmt::Display for ConfigLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}|{}", self.id, self.payload)
    }
}

impl FromStr for ConfigLine {
    type Err = FormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (id, payload) = s.trim().split_once('|').ok_or(FormatError::MissingSeparator)?;
        Ok(Self {
            id: id.to_string(),
            payload: payload.to_string(),
        })
    }
}
