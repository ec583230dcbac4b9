//! Integration tests for the HTTP layer and discovery client against wiremock.
//!
//! Verifies:
//! - JSON success responses
//! - Non-success statuses become transport errors with the raw body
//! - Invalid JSON becomes a payload decode error carrying the document
//! - Timeouts stay unclassified
//! - Directory filtering and version resolution
//! - Token endpoint responses

mod common;

use std::time::Duration;

use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use gcall::core::auth::{AuthorizedUser, exchange_refresh_token};
use gcall::core::discovery::{DiscoveryClient, ServiceRef};
use gcall::core::http::{DEFAULT_TIMEOUT, build_client, fetch_json, send};
use gcall::error::{CommandError, DomainError, ErrorCategory};

use common::fixtures::FakeGoogle;
use common::logger::TestLogger;

// =============================================================================
// fetch_json
// =============================================================================

#[tokio::test]
async fn fetch_json_success_with_query() {
    let log = TestLogger::new("fetch_json_success_with_query");
    log.phase("setup");

    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/test"))
        .and(query_param("name", "drive"))
        .and(header("user-agent", format!("gcall/{}", env!("CARGO_PKG_VERSION")).as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"ok": true})))
        .mount(&mock_server)
        .await;

    log.phase("execute");
    let client = build_client(DEFAULT_TIMEOUT).expect("client build");
    let url = format!("{}/api/test", mock_server.uri());
    log.http_request("GET", &url);
    let value = fetch_json(&client, &url, &[("name", "drive")])
        .await
        .expect("fetch should succeed");

    log.phase("verify");
    assert_eq!(value, serde_json::json!({"ok": true}));
    log.finish_ok();
}

#[tokio::test]
async fn error_status_becomes_transport_error() {
    let log = TestLogger::new("error_status_becomes_transport_error");
    let mock_server = MockServer::start().await;

    for status in [401_u16, 403, 404, 429, 500, 503] {
        log.phase(&format!("status {status}"));
        let route = format!("/status/{status}");
        Mock::given(method("GET"))
            .and(path(route.as_str()))
            .respond_with(ResponseTemplate::new(status).set_body_string("  not found  \n"))
            .mount(&mock_server)
            .await;

        let client = build_client(DEFAULT_TIMEOUT).unwrap();
        let url = format!("{}{route}", mock_server.uri());
        let err = fetch_json(&client, &url, &[]).await.unwrap_err();

        assert_eq!(err.category(), Some(ErrorCategory::Transport));
        assert_eq!(
            err.to_string(),
            format!("Server error response ({status}): not found")
        );
        match err {
            CommandError::Transport { status: got, body } => {
                assert_eq!(got, status);
                assert_eq!(body, b"  not found  \n");
            }
            other => panic!("expected transport error, got {other:?}"),
        }
    }
    log.finish_ok();
}

#[tokio::test]
async fn invalid_json_becomes_payload_decode_error() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/broken"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&mock_server)
        .await;

    let client = build_client(DEFAULT_TIMEOUT).unwrap();
    let err = fetch_json(&client, &format!("{}/broken", mock_server.uri()), &[])
        .await
        .unwrap_err();

    let lines = err.diagnostic_lines().expect("classified");
    assert_eq!(lines.len(), 2);
    assert!(lines[0].starts_with("JSONDecodeError: expected value"), "{}", lines[0]);
    assert_eq!(lines[1], "JSON was: <html>oops</html>");
}

#[tokio::test]
async fn timeout_is_unclassified() {
    let log = TestLogger::new("timeout_is_unclassified");
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(500)))
        .mount(&mock_server)
        .await;

    let client = build_client(Duration::from_millis(50)).unwrap();
    let url = format!("{}/slow", mock_server.uri());
    let err = send(client.get(&url), &url).await.unwrap_err();

    assert!(err.category().is_none());
    assert_eq!(err.to_string(), format!("request to {url} timed out"));
    log.finish_ok();
}

// =============================================================================
// Discovery client
// =============================================================================

#[tokio::test]
async fn list_apis_filters_by_name() {
    let google = FakeGoogle::start().await;
    google.mount_directory().await;

    let discovery = DiscoveryClient::new(build_client(DEFAULT_TIMEOUT).unwrap(), &google.discovery_url());

    let all = discovery.list_apis(None).await.unwrap();
    assert_eq!(all.len(), 3);

    let drive = discovery.list_apis(Some("drive")).await.unwrap();
    let ids: Vec<String> = drive.iter().map(|item| item.id()).collect();
    assert_eq!(ids, vec!["drive:v2", "drive:v3"]);
}

#[tokio::test]
async fn version_resolution_prefers_preferred_entry() {
    let google = FakeGoogle::start().await;
    google.mount_directory().await;
    let discovery = DiscoveryClient::new(build_client(DEFAULT_TIMEOUT).unwrap(), &google.discovery_url());

    let implicit = discovery.resolve_version(&ServiceRef::parse("drive").unwrap()).await.unwrap();
    assert_eq!(implicit, "v3");

    let explicit = discovery
        .resolve_version(&ServiceRef::parse("drive:v2").unwrap())
        .await
        .unwrap();
    assert_eq!(explicit, "v2");

    let err = discovery
        .resolve_version(&ServiceRef::parse("nosuchapi").unwrap())
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        CommandError::Domain(DomainError::UnknownService(ref name)) if name == "nosuchapi"
    ));
}

#[tokio::test]
async fn rest_document_is_fetched_and_checked() {
    let google = FakeGoogle::start().await;
    google.mount_drive_document().await;
    let discovery = DiscoveryClient::new(build_client(DEFAULT_TIMEOUT).unwrap(), &google.discovery_url());

    let doc = discovery.rest_document("drive", "v3").await.unwrap();
    assert_eq!(doc.id(), "drive:v3");
    assert_eq!(doc.root_url(), google.root_url());

    let err = discovery.rest_document("drive", "v9").await.unwrap_err();
    assert_eq!(err.category(), Some(ErrorCategory::Transport));
}

// =============================================================================
// Token exchange
// =============================================================================

fn user() -> AuthorizedUser {
    AuthorizedUser {
        client_id: "client.apps.googleusercontent.com".into(),
        client_secret: "secret".into(),
        refresh_token: "1//refresh".into(),
        token_uri: None,
    }
}

#[tokio::test]
async fn token_lifetime_sets_expiry() {
    let google = FakeGoogle::start().await;
    google
        .mount_token(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({"access_token": "ya29.t", "expires_in": 3599})),
        )
        .await;

    let client = build_client(DEFAULT_TIMEOUT).unwrap();
    let token = exchange_refresh_token(&client, &google.token_url(), &user())
        .await
        .unwrap();

    assert_eq!(token.token, "ya29.t");
    let expires_at = token.expires_at.expect("expiry from expires_in");
    assert!(expires_at > chrono::Utc::now());
}

#[tokio::test]
async fn out_of_range_token_lifetime_is_unknown_expiry() {
    let log = TestLogger::new("out_of_range_token_lifetime_is_unknown_expiry");
    let google = FakeGoogle::start().await;
    let client = build_client(DEFAULT_TIMEOUT).unwrap();

    for expires_in in [i64::MAX, i64::MIN] {
        log.phase(&format!("expires_in {expires_in}"));
        google.server.reset().await;
        google
            .mount_token(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"access_token": "t", "expires_in": expires_in})),
            )
            .await;

        let token = exchange_refresh_token(&client, &google.token_url(), &user())
            .await
            .expect("exchange succeeds");
        assert_eq!(token.token, "t");
        assert!(token.expires_at.is_none());
    }
    log.finish_ok();
}
