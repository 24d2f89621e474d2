//! Indexer fetch client with session negotiation and bounded retries.

use std::sync::Arc;
use std::time::Instant;

use serde_json::Value;
use tracing::{debug, error, info, warn};

use crate::config::FetchConfig;
use crate::metrics::{FETCH_ATTEMPTS, FETCH_DURATION};

use super::http::ReqwestTransport;
use super::policy::{NextStep, RetryPolicy};
use super::session::{Session, SessionKind};
use super::transport::{ApiRequest, Transport};
use super::{ConnectionSettings, FetchError, IndexerRecord};

/// Indexer list endpoint, relative to the host.
pub const INDEXERS_PATH: &str = "/api/v2.0/indexers?configured=true";
/// Login page, fetched first to seed cookies.
pub const LOGIN_PATH: &str = "/UI/Login";
/// Dashboard endpoint that accepts the admin password.
pub const DASHBOARD_PATH: &str = "/UI/Dashboard";

const ACCEPT: &str = "application/json, text/javascript, */*; q=0.01";
const BODY_SNIPPET_CHARS: usize = 200;

/// Fetches the configured indexer list from Jackett.
pub struct IndexerFetchClient {
    transport: Arc<dyn Transport>,
    policy: RetryPolicy,
    user_agent: String,
}

impl IndexerFetchClient {
    pub fn new(
        transport: Arc<dyn Transport>,
        policy: RetryPolicy,
        user_agent: impl Into<String>,
    ) -> Self {
        Self {
            transport,
            policy,
            user_agent: user_agent.into(),
        }
    }

    /// Client over the real HTTP transport.
    pub fn from_config(config: &FetchConfig) -> Self {
        Self::new(
            Arc::new(ReqwestTransport::new(config)),
            RetryPolicy::from_config(config),
            config.user_agent.clone(),
        )
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Fetch the indexer list, returning an empty list on any failure.
    ///
    /// Failures are logged where they happen; use
    /// [`try_fetch_indexers`](Self::try_fetch_indexers) to inspect them.
    pub async fn fetch_indexers(&self, connection: &ConnectionSettings) -> Vec<IndexerRecord> {
        self.try_fetch_indexers(connection)
            .await
            .unwrap_or_default()
    }

    /// Fetch the indexer list.
    ///
    /// `Ok(vec![])` means Jackett answered with an empty (or non-list) JSON
    /// value, which is not retried.
    pub async fn try_fetch_indexers(
        &self,
        connection: &ConnectionSettings,
    ) -> Result<Vec<IndexerRecord>, FetchError> {
        if !connection.is_complete() {
            error!(
                host_set = !connection.base_url().is_empty(),
                api_key_set = !connection.api_key().is_empty(),
                "Jackett host or API key not configured, not fetching indexers"
            );
            return Err(FetchError::NotConfigured);
        }

        let start = Instant::now();
        let session = self.open_session(connection).await;
        let result = self.request_with_retry(&session, connection).await;

        let outcome = if result.is_ok() { "success" } else { "failure" };
        FETCH_DURATION
            .with_label_values(&[outcome])
            .observe(start.elapsed().as_secs_f64());

        result
    }

    /// Establish the cookie session for one fetch cycle.
    ///
    /// With a password this performs the dashboard login, otherwise a
    /// warm-up request against the bare host. Both are best-effort: a failure
    /// is logged and an anonymous session is returned.
    pub async fn open_session(&self, connection: &ConnectionSettings) -> Session {
        let session = Session::new();

        let kind = match connection.password() {
            Some(password) => match self.login(&session, connection, password).await {
                Ok(()) => {
                    info!("Logged in to the Jackett dashboard");
                    SessionKind::Authenticated
                }
                Err(e) => {
                    warn!(error = %e, "Jackett login failed, continuing with the API key only");
                    SessionKind::Anonymous
                }
            },
            None => match self.warm_up(&session, connection).await {
                Ok(()) => SessionKind::WarmedUp,
                Err(e) => {
                    warn!(error = %e, "Jackett warm-up request failed");
                    SessionKind::Anonymous
                }
            },
        };

        debug!(
            kind = ?kind,
            has_cookies = session.has_cookies_for(connection.base_url()),
            "Jackett session ready"
        );
        session.with_kind(kind)
    }

    async fn login(
        &self,
        session: &Session,
        connection: &ConnectionSettings,
        password: &str,
    ) -> Result<(), FetchError> {
        let base = connection.base_url();

        let landing = self
            .transport
            .send(
                session,
                self.decorate(ApiRequest::get(format!("{}{}", base, LOGIN_PATH)), connection),
            )
            .await?;
        debug!(status = landing.status, "Fetched Jackett login page");

        let form = vec![("password".to_string(), password.to_string())];
        let response = self
            .transport
            .send(
                session,
                self.decorate(
                    ApiRequest::post_form(format!("{}{}", base, DASHBOARD_PATH), form),
                    connection,
                ),
            )
            .await?;

        match response.status {
            200..=299 => Ok(()),
            401 | 403 => Err(FetchError::Unauthorized(response.status)),
            status => Err(FetchError::UnexpectedStatus { status }),
        }
    }

    async fn warm_up(
        &self,
        session: &Session,
        connection: &ConnectionSettings,
    ) -> Result<(), FetchError> {
        let response = self
            .transport
            .send(
                session,
                self.decorate(ApiRequest::get(connection.base_url()), connection),
            )
            .await?;
        debug!(status = response.status, "Jackett warm-up complete");
        Ok(())
    }

    async fn request_with_retry(
        &self,
        session: &Session,
        connection: &ConnectionSettings,
    ) -> Result<Vec<IndexerRecord>, FetchError> {
        let url = format!("{}{}", connection.base_url(), INDEXERS_PATH);
        let max_attempts = self.policy.max_attempts();
        let mut attempt = 1;

        loop {
            info!(attempt, max_attempts, url = %url, "Requesting Jackett indexer list");

            let err = match self.request_indexers(session, connection, &url).await {
                Ok(indexers) => {
                    FETCH_ATTEMPTS.with_label_values(&["success"]).inc();
                    return Ok(indexers);
                }
                Err(e) => e,
            };
            FETCH_ATTEMPTS
                .with_label_values(&[err.kind().as_str()])
                .inc();

            match self.policy.next_step(err.kind(), attempt) {
                NextStep::RetryAfter(delay) => {
                    warn!(
                        attempt,
                        max_attempts,
                        error = %err,
                        "Jackett indexer request failed, retrying in {:?}",
                        delay
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                NextStep::Stop => return Err(err),
                NextStep::Exhausted => {
                    warn!(
                        attempts = attempt,
                        error = %err,
                        "Could not fetch the Jackett indexer list after {} attempts",
                        attempt
                    );
                    return Err(FetchError::RetriesExhausted {
                        attempts: attempt,
                        last: Box::new(err),
                    });
                }
            }
        }
    }

    /// One attempt at the indexer list.
    async fn request_indexers(
        &self,
        session: &Session,
        connection: &ConnectionSettings,
        url: &str,
    ) -> Result<Vec<IndexerRecord>, FetchError> {
        let response = self
            .transport
            .send(session, self.decorate(ApiRequest::get(url), connection))
            .await?;

        debug!(
            status = response.status,
            content_type = ?response.content_type,
            "Jackett responded"
        );

        match response.status {
            200 => {}
            401 | 403 => {
                error!(
                    status = response.status,
                    body = %response.snippet(BODY_SNIPPET_CHARS),
                    "Jackett rejected the request, check the API key"
                );
                return Err(FetchError::Unauthorized(response.status));
            }
            status => {
                return Err(FetchError::UnexpectedStatus { status });
            }
        }

        if !response.is_json() {
            debug!(
                body = %response.snippet(BODY_SNIPPET_CHARS),
                "Non-JSON body from Jackett"
            );
            return Err(FetchError::UnexpectedContentType {
                content_type: response.content_type.clone().unwrap_or_default(),
            });
        }

        let value: Value = serde_json::from_str(&response.body).map_err(|e| {
            error!(
                error = %e,
                body = %response.snippet(BODY_SNIPPET_CHARS * 2),
                "Failed to parse Jackett response"
            );
            FetchError::MalformedResponse(e.to_string())
        })?;

        match value {
            Value::Array(items) if !items.is_empty() => {
                info!(count = items.len(), "Fetched Jackett indexers");
                Ok(items.into_iter().map(IndexerRecord::from).collect())
            }
            other => {
                warn!(
                    body = %other.to_string().chars().take(BODY_SNIPPET_CHARS).collect::<String>(),
                    "Jackett returned no indexers"
                );
                Ok(Vec::new())
            }
        }
    }

    /// Standard headers for every request of the cycle.
    fn decorate(&self, request: ApiRequest, connection: &ConnectionSettings) -> ApiRequest {
        request
            .header("User-Agent", self.user_agent.as_str())
            .header("X-Api-Key", connection.api_key())
            .header("Accept", ACCEPT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetcher::transport::{HttpMethod, TransportError};
    use crate::testing::{fixtures, MockTransport};
    use serde_json::json;
    use std::time::Duration;

    const INDEXERS: &str = "/api/v2.0/indexers";

    fn client(transport: &Arc<MockTransport>, max_attempts: u32) -> IndexerFetchClient {
        IndexerFetchClient::new(
            Arc::clone(transport) as Arc<dyn Transport>,
            RetryPolicy::new(max_attempts, Duration::ZERO),
            "jackett-bridge-test",
        )
    }

    #[tokio::test]
    async fn test_missing_settings_issue_no_requests() {
        let transport = Arc::new(MockTransport::new());
        let client = client(&transport, 3);

        for conn in [
            ConnectionSettings::new("", "", None),
            ConnectionSettings::new("http://localhost:9117", "", None),
            ConnectionSettings::new("", "ABC123", None),
        ] {
            let result = client.try_fetch_indexers(&conn).await;
            assert!(matches!(result, Err(FetchError::NotConfigured)));
            assert!(client.fetch_indexers(&conn).await.is_empty());
        }

        assert_eq!(transport.total_calls(), 0);
    }

    #[tokio::test]
    async fn test_success_returns_records_in_order() {
        let transport = Arc::new(MockTransport::new());
        transport.push_json(
            INDEXERS,
            200,
            json!([{"id": "1337x", "name": "1337x"}, {"id": "rarbg", "name": "RARBG"}]),
        );
        let client = client(&transport, 3);

        let records = client.fetch_indexers(&fixtures::connection()).await;

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].id.as_deref(), Some("1337x"));
        assert_eq!(records[1].name.as_deref(), Some("RARBG"));
        assert_eq!(transport.calls_to(INDEXERS), 1);
    }

    #[tokio::test]
    async fn test_request_headers() {
        let transport = Arc::new(MockTransport::new());
        transport.push_json(INDEXERS, 200, json!([]));
        let client = client(&transport, 3);

        client
            .fetch_indexers(&ConnectionSettings::new(
                "http://localhost:9117/",
                "ABC123",
                None,
            ))
            .await;

        let request = transport
            .requests()
            .into_iter()
            .find(|r| r.path() == INDEXERS)
            .unwrap();
        assert_eq!(
            request.url,
            "http://localhost:9117/api/v2.0/indexers?configured=true"
        );
        assert_eq!(request.header_value("X-Api-Key"), Some("ABC123"));
        assert!(request.header_value("Accept").unwrap().starts_with("application/json"));
        assert_eq!(request.header_value("User-Agent"), Some("jackett-bridge-test"));
    }

    #[tokio::test]
    async fn test_unauthorized_is_not_retried() {
        for status in [401, 403] {
            let transport = Arc::new(MockTransport::new());
            transport.push_text(INDEXERS, status, "text/plain", "Unauthorized");
            let client = client(&transport, 3);

            let result = client.try_fetch_indexers(&fixtures::connection()).await;

            assert!(matches!(result, Err(FetchError::Unauthorized(s)) if s == status));
            assert_eq!(transport.calls_to(INDEXERS), 1);
        }
    }

    #[tokio::test]
    async fn test_timeout_then_success_is_retried() {
        let transport = Arc::new(MockTransport::new());
        transport.push_error(INDEXERS, TransportError::Timeout);
        transport.push_json(INDEXERS, 200, json!([{"id": "1337x", "name": "1337x"}]));
        let client = client(&transport, 3);

        let records = client.fetch_indexers(&fixtures::connection()).await;

        assert_eq!(records, vec![IndexerRecord::new("1337x", "1337x")]);
        assert_eq!(transport.calls_to(INDEXERS), 2);
    }

    #[tokio::test]
    async fn test_html_response_retried_until_exhausted() {
        let transport = Arc::new(MockTransport::new());
        transport.push_text(INDEXERS, 200, "text/html", "<html>Login</html>");
        let client = client(&transport, 3);

        let result = client.try_fetch_indexers(&fixtures::connection()).await;

        match result {
            Err(FetchError::RetriesExhausted { attempts, last }) => {
                assert_eq!(attempts, 3);
                assert!(matches!(*last, FetchError::UnexpectedContentType { .. }));
            }
            other => panic!("unexpected result: {:?}", other),
        }
        assert_eq!(transport.calls_to(INDEXERS), 3);
    }

    #[tokio::test]
    async fn test_connection_failures_exhaust_to_empty() {
        let transport = Arc::new(MockTransport::new());
        transport.push_error(
            INDEXERS,
            TransportError::ConnectionFailed("refused".to_string()),
        );
        let client = client(&transport, 2);

        assert!(client.fetch_indexers(&fixtures::connection()).await.is_empty());
        assert_eq!(transport.calls_to(INDEXERS), 2);
    }

    #[tokio::test]
    async fn test_server_error_is_retried() {
        let transport = Arc::new(MockTransport::new());
        transport.push_text(INDEXERS, 500, "text/plain", "boom");
        transport.push_json(INDEXERS, 200, json!([{"id": "a", "name": "A"}]));
        let client = client(&transport, 3);

        let records = client.fetch_indexers(&fixtures::connection()).await;

        assert_eq!(records.len(), 1);
        assert_eq!(transport.calls_to(INDEXERS), 2);
    }

    #[tokio::test]
    async fn test_malformed_json_is_terminal() {
        let transport = Arc::new(MockTransport::new());
        transport.push_text(INDEXERS, 200, "application/json", "[{not json");
        let client = client(&transport, 3);

        let result = client.try_fetch_indexers(&fixtures::connection()).await;

        assert!(matches!(result, Err(FetchError::MalformedResponse(_))));
        assert_eq!(transport.calls_to(INDEXERS), 1);
    }

    #[tokio::test]
    async fn test_empty_or_non_list_is_empty_success() {
        for body in [json!([]), json!({"error": "nope"}), json!(null)] {
            let transport = Arc::new(MockTransport::new());
            transport.push_json(INDEXERS, 200, body);
            let client = client(&transport, 3);

            let result = client.try_fetch_indexers(&fixtures::connection()).await;

            assert!(matches!(result, Ok(ref v) if v.is_empty()));
            assert_eq!(transport.calls_to(INDEXERS), 1);
        }
    }

    #[tokio::test]
    async fn test_warm_up_without_password() {
        let transport = Arc::new(MockTransport::new());
        transport.push_json(INDEXERS, 200, json!([]));
        let client = client(&transport, 1);

        let session = client.open_session(&fixtures::connection()).await;

        assert_eq!(session.kind(), SessionKind::WarmedUp);
        assert_eq!(transport.calls_to("/"), 1);
        assert_eq!(transport.calls_to(LOGIN_PATH), 0);
        assert_eq!(transport.calls_to(DASHBOARD_PATH), 0);
    }

    #[tokio::test]
    async fn test_login_with_password() {
        let transport = Arc::new(MockTransport::new());
        transport.push_text(LOGIN_PATH, 200, "text/html", "<form>");
        transport.push_text(DASHBOARD_PATH, 200, "text/html", "<dashboard>");
        let client = client(&transport, 1);
        let conn = ConnectionSettings::new("http://localhost:9117", "ABC123", Some("hunter2"));

        let session = client.open_session(&conn).await;

        assert_eq!(session.kind(), SessionKind::Authenticated);
        let requests = transport.requests();
        assert_eq!(requests[0].path(), LOGIN_PATH);
        assert_eq!(requests[1].path(), DASHBOARD_PATH);
        assert_eq!(requests[1].method, HttpMethod::Post);
        assert_eq!(
            requests[1].form,
            vec![("password".to_string(), "hunter2".to_string())]
        );
        assert_eq!(transport.calls_to("/"), 0);
    }

    #[tokio::test]
    async fn test_failed_login_does_not_abort_fetch() {
        let transport = Arc::new(MockTransport::new());
        transport.push_error(
            LOGIN_PATH,
            TransportError::ConnectionFailed("reset".to_string()),
        );
        transport.push_json(INDEXERS, 200, json!([{"id": "a", "name": "A"}]));
        let client = client(&transport, 1);
        let conn = ConnectionSettings::new("http://localhost:9117", "ABC123", Some("hunter2"));

        let records = client.fetch_indexers(&conn).await;

        assert_eq!(records.len(), 1);
        assert_eq!(transport.calls_to(DASHBOARD_PATH), 0);
    }

    #[tokio::test]
    async fn test_rejected_login_leaves_anonymous_session() {
        let transport = Arc::new(MockTransport::new());
        transport.push_text(LOGIN_PATH, 200, "text/html", "<form>");
        transport.push_text(DASHBOARD_PATH, 403, "text/html", "denied");
        let client = client(&transport, 1);
        let conn = ConnectionSettings::new("http://localhost:9117", "ABC123", Some("wrong"));

        let session = client.open_session(&conn).await;

        assert_eq!(session.kind(), SessionKind::Anonymous);
    }
}
