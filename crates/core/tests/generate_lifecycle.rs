//! Config generation lifecycle integration tests.
//!
//! These tests drive a full cycle over the mock transport:
//! session -> indexer list -> format -> encode -> envelope

use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde_json::{json, Value};
use tempfile::NamedTempFile;

use jackett_bridge_core::{
    config::JackettConfig,
    fetcher::{HttpMethod, TransportError, DASHBOARD_PATH, LOGIN_PATH},
    load_config,
    testing::{fixtures, MockTransport},
    validate_config, ConfigGenerator, ConfigLine, IndexerFetchClient, RetryPolicy, Transport,
};

const INDEXERS: &str = "/api/v2.0/indexers";

struct TestHarness {
    transport: Arc<MockTransport>,
    generator: ConfigGenerator,
}

impl TestHarness {
    fn new(settings: JackettConfig) -> Self {
        let transport = Arc::new(MockTransport::new());
        let fetcher = IndexerFetchClient::new(
            Arc::clone(&transport) as Arc<dyn Transport>,
            RetryPolicy::new(3, Duration::ZERO),
            "jackett-bridge-test",
        );
        Self {
            transport,
            generator: ConfigGenerator::new(fetcher, settings),
        }
    }
}

fn decode_payload(config_string: &str) -> Value {
    let (_, payload) = config_string.split_once('|').unwrap();
    let json = STANDARD.decode(payload).unwrap();
    serde_json::from_slice(&json).unwrap()
}

#[tokio::test]
async fn test_single_indexer_lifecycle() {
    let harness = TestHarness::new(fixtures::jackett_settings());
    harness
        .transport
        .push_json(INDEXERS, 200, json!([{"id": "1337x", "name": "1337x"}]));

    let envelope = harness.generator.list_custom_configs().await;

    assert_eq!(envelope.code, 0);
    assert_eq!(envelope.data.len(), 1);
    let line = &envelope.data[0].config_string;
    assert!(line.starts_with("jackett_1337x|"));

    let raw = String::from_utf8(
        STANDARD
            .decode(line.split_once('|').unwrap().1)
            .unwrap(),
    )
    .unwrap();
    assert!(raw.contains(r#""apikey":"ABC123""#));
    assert!(raw.contains(r#""path":"/api/v2.0/indexers/1337x/results/torznab""#));

    let decoded = decode_payload(line);
    assert_eq!(decoded["name"], "[Jackett] 1337x");
    assert_eq!(decoded["domain"], "http://localhost:9117");
    assert_eq!(decoded["search"]["paths"][0]["method"], "get");
    assert_eq!(decoded["search"]["params"]["q"], "{keyword}");

    let parsed: ConfigLine = line.parse().unwrap();
    assert_eq!(parsed.decode().unwrap().id, "jackett_1337x");
}

#[tokio::test]
async fn test_request_carries_api_key_and_json_accept() {
    let harness = TestHarness::new(fixtures::jackett_settings());
    harness
        .transport
        .push_json(INDEXERS, 200, fixtures::indexer_list(&[("rarbg", "RARBG")]));

    harness.generator.list_custom_configs().await;

    let request = harness
        .transport
        .requests()
        .into_iter()
        .find(|r| r.path() == INDEXERS)
        .unwrap();
    assert_eq!(request.header_value("x-api-key"), Some("ABC123"));
    assert!(request.header_value("accept").unwrap().contains("application/json"));
    assert!(request.url.ends_with("?configured=true"));
}

#[tokio::test]
async fn test_password_triggers_dashboard_login() {
    let harness = TestHarness::new(JackettConfig {
        password: Some("hunter2".to_string()),
        ..fixtures::jackett_settings()
    });
    harness
        .transport
        .push_json(INDEXERS, 200, fixtures::indexer_list(&[("1337x", "1337x")]));

    let envelope = harness.generator.list_custom_configs().await;
    assert!(envelope.is_ok());

    let requests = harness.transport.requests();
    let login = requests
        .iter()
        .position(|r| r.path() == DASHBOARD_PATH && r.method == HttpMethod::Post)
        .unwrap();
    let list = requests.iter().position(|r| r.path() == INDEXERS).unwrap();
    assert!(login < list);
    assert_eq!(
        requests[login].form,
        vec![("password".to_string(), "hunter2".to_string())]
    );
    assert_eq!(harness.transport.calls_to(LOGIN_PATH), 1);
}

#[tokio::test]
async fn test_flaky_jackett_recovers_within_attempts() {
    let harness = TestHarness::new(fixtures::jackett_settings());
    harness
        .transport
        .push_error(INDEXERS, TransportError::ConnectionFailed("reset".into()));
    harness.transport.push_text(INDEXERS, 502, "text/html", "Bad Gateway");
    harness
        .transport
        .push_json(INDEXERS, 200, fixtures::indexer_list(&[("1337x", "1337x")]));

    let envelope = harness.generator.list_custom_configs().await;

    assert!(envelope.is_ok());
    assert_eq!(harness.transport.calls_to(INDEXERS), 3);
}

#[tokio::test]
async fn test_unreachable_jackett_reports_failure() {
    let harness = TestHarness::new(fixtures::jackett_settings());
    harness.transport.push_error(INDEXERS, TransportError::Timeout);

    let envelope = harness.generator.list_custom_configs().await;

    assert_eq!(envelope.code, 1);
    assert!(envelope.data.is_empty());
    assert!(envelope.message.contains("reachable"));
    assert_eq!(harness.transport.calls_to(INDEXERS), 3);
}

#[tokio::test]
async fn test_mixed_batch_keeps_valid_records_in_order() {
    let harness = TestHarness::new(fixtures::jackett_settings());
    harness.transport.push_json(
        INDEXERS,
        200,
        json!([
            {"id": "Torrent-Site", "name": "Torrent Site"},
            {"id": 42, "name": "numeric id"},
            {"id": "torrent_site", "name": "Collides"},
            {"id": "nyaa", "name": "Nyaa"}
        ]),
    );

    let envelope = harness.generator.list_custom_configs().await;

    let ids: Vec<_> = envelope
        .data
        .iter()
        .map(|e| e.internal_id.as_str())
        .collect();
    assert_eq!(ids, vec!["jackett_torrent_site", "jackett_nyaa"]);
    assert_eq!(envelope.data[0].name, "Torrent Site");
    assert_eq!(
        decode_payload(&envelope.data[0].config_string)["search"]["paths"][0]["path"],
        "/api/v2.0/indexers/Torrent-Site/results/torznab"
    );
}

#[tokio::test]
async fn test_disabled_integration_issues_no_requests() {
    let harness = TestHarness::new(JackettConfig {
        enabled: false,
        ..fixtures::jackett_settings()
    });

    let envelope = harness.generator.list_custom_configs().await;

    assert_eq!(envelope.code, 1);
    assert_eq!(harness.transport.total_calls(), 0);
}

#[tokio::test]
async fn test_selection_from_config_file() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
[jackett]
enabled = true
host = "http://localhost:9117/"
api_key = "ABC123"
indexers = ["nyaa"]
"#
    )
    .unwrap();
    let config = load_config(file.path()).unwrap();
    validate_config(&config).unwrap();

    let harness = TestHarness::new(config.jackett);
    harness.transport.push_json(
        INDEXERS,
        200,
        fixtures::indexer_list(&[("1337x", "1337x"), ("nyaa", "Nyaa")]),
    );

    let envelope = harness.generator.list_custom_configs().await;

    assert_eq!(envelope.data.len(), 1);
    assert_eq!(envelope.data[0].internal_id, "jackett_nyaa");
    assert_eq!(
        decode_payload(&envelope.data[0].config_string)["url"],
        "http://localhost:9117"
    );
}

#[tokio::test]
async fn test_concurrent_requests_share_serialized_cycles() {
    let harness = Arc::new(TestHarness::new(fixtures::jackett_settings()));
    harness
        .transport
        .push_json(INDEXERS, 200, fixtures::indexer_list(&[("1337x", "1337x")]));

    let a = {
        let h = Arc::clone(&harness);
        tokio::spawn(async move { h.generator.list_custom_configs().await })
    };
    let b = {
        let h = Arc::clone(&harness);
        tokio::spawn(async move { h.generator.list_custom_configs().await })
    };

    let (a, b) = (a.await.unwrap(), b.await.unwrap());
    assert_eq!(a, b);
    assert_eq!(harness.transport.calls_to(INDEXERS), 2);
}
