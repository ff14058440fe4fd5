//! End-to-end session scenarios against a mocked account service.

use std::sync::Arc;

use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use challengers_core::auth::{FileTokenStore, NavigationOutcome, TokenStore};
use challengers_core::config::Config;
use challengers_core::routes::PendingNavigation;
use challengers_core::Client;

const VERIFY: &str = "/challengers.Account/VerifyAccount";
const CREATE: &str = "/challengers.Account/CreateAccount";

struct Harness {
    _dir: tempfile::TempDir,
    store: Arc<FileTokenStore>,
    client: Client,
}

fn harness(server: &MockServer) -> Harness {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = Arc::new(FileTokenStore::new(dir.path().to_path_buf()));
    let config = Config {
        api_base_url: server.uri(),
        verify_timeout_secs: 5,
        ..Config::default()
    };
    let client = Client::with_store(&config, store.clone()).expect("client");
    Harness {
        _dir: dir,
        store,
        client,
    }
}

async fn request_count(server: &MockServer, route: &str) -> usize {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .filter(|r| r.url.path() == route)
        .count()
}

#[tokio::test]
async fn empty_store_is_unauthenticated_without_remote_call() {
    let server = MockServer::start().await;
    let h = harness(&server);

    assert!(!h.client.verifier.is_authenticated().await);
    assert_eq!(request_count(&server, VERIFY).await, 0);
}

#[tokio::test]
async fn accepted_token_is_kept() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(VERIFY))
        .and(body_json(json!({ "token": "abc" })))
        .and(header("authorization", "abc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "token": "abc", "name": "Ada" })))
        .expect(1)
        .mount(&server)
        .await;

    let h = harness(&server);
    h.store.write("abc").unwrap();

    assert!(h.client.verifier.is_authenticated().await);
    assert_eq!(h.store.read().as_deref(), Some("abc"));
}

#[tokio::test]
async fn rejected_token_is_revoked() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(VERIFY))
        .respond_with(ResponseTemplate::new(401).set_body_string("invalid token"))
        .expect(1)
        .mount(&server)
        .await;

    let h = harness(&server);
    h.store.write("abc").unwrap();

    assert!(!h.client.verifier.is_authenticated().await);
    assert_eq!(h.store.read(), None);
}

#[tokio::test]
async fn unreachable_service_revokes_token() {
    // Nothing listens here once the server is gone
    let server = MockServer::start().await;
    let h = harness(&server);
    drop(server);
    h.store.write("abc").unwrap();

    assert!(!h.client.verifier.is_authenticated().await);
    assert_eq!(h.store.read(), None);
}

#[tokio::test]
async fn guard_redirects_then_resumes_after_account_creation() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(CREATE))
        .and(body_json(json!({ "name": "Ada" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "token": "xyz" })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(VERIFY))
        .and(body_json(json!({ "token": "xyz" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "token": "xyz" })))
        .expect(1)
        .mount(&server)
        .await;

    let h = harness(&server);

    let NavigationOutcome::Redirected { location, pending } = h.client.guard.navigate("/game/1").await else {
        panic!("expected redirect to account creation");
    };
    assert_eq!(location, "/account/create?redirectTo=%2Fgame%2F1");
    assert_eq!(request_count(&server, VERIFY).await, 0);

    // The creation screen itself is reachable
    assert!(h.client.guard.navigate(&location).await.is_allowed());

    h.client.accounts.create("Ada").await;
    assert!(!h.client.accounts.is_pending());
    assert_eq!(h.store.read().as_deref(), Some("xyz"));

    let pending = pending.or_else(|| PendingNavigation::from_location(&location));
    match h.client.guard.resume(pending.as_ref()).await {
        NavigationOutcome::Allowed(route) => {
            assert_eq!(route.route.name, "Game");
            assert_eq!(route.params.get("id").map(String::as_str), Some("1"));
        }
        other => panic!("expected allowed, got {:?}", other),
    }
}

#[tokio::test]
async fn failed_account_creation_leaves_store_empty() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(CREATE))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .expect(1)
        .mount(&server)
        .await;

    let h = harness(&server);
    h.client.accounts.create("Ada").await;

    assert_eq!(h.store.read(), None);
    assert!(!h.client.accounts.is_pending());
}

#[tokio::test]
async fn every_call_carries_the_stored_token() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(CREATE))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "token": "second" })))
        .mount(&server)
        .await;

    let h = harness(&server);
    h.store.write("first").unwrap();
    h.client.accounts.create("Ada").await;

    let requests = server.received_requests().await.unwrap_or_default();
    assert_eq!(requests.len(), 1);
    let auth = requests[0]
        .headers
        .get("authorization")
        .and_then(|v| v.to_str().ok());
    assert_eq!(auth, Some("first"));
    assert_eq!(h.store.read().as_deref(), Some("second"));
}

#[tokio::test]
async fn unsendable_token_does_not_block_account_creation() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(CREATE))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "token": "fresh" })))
        .expect(1)
        .mount(&server)
        .await;

    let h = harness(&server);
    h.store.write("bad\ntoken").unwrap();
    h.client.accounts.create("Ada").await;

    let requests = server.received_requests().await.unwrap_or_default();
    assert_eq!(requests.len(), 1);
    assert!(requests[0].headers.get("authorization").is_none());
    assert_eq!(h.store.read().as_deref(), Some("fresh"));
}
