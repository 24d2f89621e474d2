//! Testing utilities and mock implementations.
//!
//! [`MockTransport`] stands in for the network so the fetch client, the
//! generator and the HTTP API can be tested without a Jackett instance.

mod mock_transport;

pub use mock_transport::MockTransport;

/// Test fixtures and helper functions.
pub mod fixtures {
    use serde_json::{json, Value};

    use crate::config::JackettConfig;
    use crate::fetcher::ConnectionSettings;

    pub const HOST: &str = "http://localhost:9117";
    pub const API_KEY: &str = "ABC123";

    /// Connection to a local Jackett without admin password.
    pub fn connection() -> ConnectionSettings {
        ConnectionSettings::new(HOST, API_KEY, None)
    }

    /// Enabled Jackett settings matching [`connection`].
    pub fn jackett_settings() -> JackettConfig {
        JackettConfig {
            enabled: true,
            host: HOST.to_string(),
            api_key: API_KEY.to_string(),
            password: None,
            indexers: Vec::new(),
        }
    }

    /// Indexer list body as returned by `/api/v2.0/indexers`.
    pub fn indexer_list(indexers: &[(&str, &str)]) -> Value {
        Value::Array(
            indexers
                .iter()
                .map(|(id, name)| {
                    json!({
                        "id": id,
                        "name": name,
                        "type": "public",
                        "configured": true,
                        "site_link": format!("https://{}.example/", id),
                        "language": "en-US",
                    })
                })
                .collect(),
        )
    }
}
