use serde::{Deserialize, Serialize};
use std::net::IpAddr;

use crate::fetcher::ConnectionSettings;

/// Root configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub jackett: JackettConfig,
    #[serde(default)]
    pub fetch: FetchConfig,
    #[serde(default)]
    pub refresh: RefreshConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> IpAddr {
    IpAddr::from([0, 0, 0, 0])
}

fn default_port() -> u16 {
    8080
}

/// Authentication for the bridge's own API.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AuthConfig {
    #[serde(default)]
    pub method: AuthMethod,
    /// Required when `method = "api_key"`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AuthMethod {
    #[default]
    None,
    ApiKey,
}

/// Jackett connection settings as persisted by the user.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct JackettConfig {
    /// Whether config generation is served at all.
    #[serde(default)]
    pub enabled: bool,
    /// Jackett server URL (e.g., "http://localhost:9117")
    #[serde(default)]
    pub host: String,
    /// Jackett API key
    #[serde(default)]
    pub api_key: String,
    /// Jackett admin password, if the dashboard is password protected.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    /// Source indexer ids to export. Empty exports every configured indexer.
    #[serde(default)]
    pub indexers: Vec<String>,
}

impl JackettConfig {
    /// Snapshot of the connection settings for one fetch cycle.
    pub fn connection(&self) -> ConnectionSettings {
        ConnectionSettings::new(&self.host, &self.api_key, self.password.as_deref())
    }

    /// Whether a record with this source id was selected for export.
    pub fn is_selected(&self, indexer_id: &str) -> bool {
        self.indexers.is_empty() || self.indexers.iter().any(|id| id == indexer_id)
    }
}

/// HTTP behaviour of the indexer fetch client.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FetchConfig {
    /// Attempts at the indexer list request, including the first one.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// Fixed delay between attempts in seconds.
    #[serde(default = "default_retry_delay")]
    pub retry_delay_secs: u64,
    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
    /// User-Agent sent with every request.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// Skip TLS certificate verification (self-signed Jackett instances).
    #[serde(default)]
    pub accept_invalid_certs: bool,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            retry_delay_secs: default_retry_delay(),
            timeout_secs: default_timeout(),
            user_agent: default_user_agent(),
            accept_invalid_certs: false,
        }
    }
}

fn default_max_attempts() -> u32 {
    3
}

fn default_retry_delay() -> u64 {
    5
}

fn default_timeout() -> u64 {
    20
}

fn default_user_agent() -> String {
    format!("jackett-bridge/{}", env!("CARGO_PKG_VERSION"))
}

/// Periodic regeneration of the config lines.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RefreshConfig {
    /// Hours between scheduled regenerations, 0 disables the schedule.
    #[serde(default)]
    pub interval_hours: u64,
}

/// Sanitized config for API responses (secrets redacted)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedConfig {
    pub server: ServerConfig,
    pub auth: SanitizedAuthConfig,
    pub jackett: SanitizedJackettConfig,
    pub fetch: FetchConfig,
    pub refresh: RefreshConfig,
}

#[derive(Debug, Clone, Serialize)]
pub struct SanitizedAuthConfig {
    pub method: String,
}

/// Sanitized Jackett config (API key and password hidden)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedJackettConfig {
    pub enabled: bool,
    pub host: String,
    pub api_key_configured: bool,
    pub password_configured: bool,
    pub indexers: Vec<String>,
}

impl From<&Config> for SanitizedConfig {
    fn from(config: &Config) -> Self {
        Self {
            server: config.server.clone(),
            auth: SanitizedAuthConfig {
                method: match config.auth.method {
                    AuthMethod::None => "none".to_string(),
                    AuthMethod::ApiKey => "api_key".to_string(),
                },
            },
            jackett: SanitizedJackettConfig {
                enabled: config.jackett.enabled,
                host: config.jackett.host.clone(),
                api_key_configured: !config.jackett.api_key.is_empty(),
                password_configured: config
                    .jackett
                    .password
                    .as_deref()
                    .is_some_and(|p| !p.is_empty()),
                indexers: config.jackett.indexers.clone(),
            },
            fetch: config.fetch.clone(),
            refresh: config.refresh.clone(),
        }
    }
}
