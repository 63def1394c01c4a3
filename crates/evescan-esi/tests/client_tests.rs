//! Integration tests for the ESI client using wiremock.
//!
//! These tests verify the retry policy, backoff accounting, terminal error
//! handling, and response header parsing against a mock HTTP server.

use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use evescan_core::{ContractId, RegionId};
use evescan_esi::{EsiClient, EsiConfig, FetchError};

const REGION: RegionId = RegionId::new(10_000_002);

fn fast_config(base_url: &str) -> EsiConfig {
    EsiConfig::new(base_url)
        .with_max_attempts(3)
        .with_backoff_base(2.0)
        .with_backoff_unit_ms(1)
}

fn contracts_path() -> String {
    format!("/contracts/public/{}/", REGION)
}

// =============================================================================
// Retry policy
// =============================================================================

#[tokio::test]
async fn test_success_on_first_attempt() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(contracts_path()))
        .and(query_param("page", "1"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([{"contract_id": 1}, {"contract_id": 2}]))
                .insert_header("X-Pages", "5"),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = EsiClient::new(fast_config(&server.uri())).unwrap();
    let page = client.fetch_public_contracts(REGION, 1).await.unwrap();

    assert_eq!(page.records.len(), 2);
    assert_eq!(page.total_pages, 5);
}

#[tokio::test]
async fn test_rate_limited_then_success() {
    // [429, 429, 200] with an attempt budget of 3 returns the 200 payload.
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(contracts_path()))
        .respond_with(ResponseTemplate::new(429))
        .up_to_n_times(2)
        .expect(2)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path(contracts_path()))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([{"contract_id": 7}]))
                .insert_header("X-Pages", "1"),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = EsiClient::new(fast_config(&server.uri())).unwrap();
    let page = client.fetch_public_contracts(REGION, 1).await.unwrap();

    assert_eq!(page.records.len(), 1);
}

#[tokio::test]
async fn test_persistent_transient_failure_exhausts_budget() {
    // A 503 on every attempt raises Transient after one extra unconditional
    // request: 3 budgeted attempts plus the last-chance request.
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(contracts_path()))
        .respond_with(ResponseTemplate::new(503))
        .expect(4)
        .mount(&server)
        .await;

    let client = EsiClient::new(fast_config(&server.uri())).unwrap();
    let err = client.fetch_public_contracts(REGION, 1).await.unwrap_err();

    match err {
        FetchError::Transient { status, attempts } => {
            assert_eq!(status, 503);
            assert_eq!(attempts, 4);
        }
        other => panic!("expected Transient, got {other:?}"),
    }
}

#[tokio::test]
async fn test_last_chance_request_can_succeed() {
    // Three 503s exhaust the budget, but the final unconditional request
    // finds the server recovered and its payload is returned as success.
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(contracts_path()))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(3)
        .expect(3)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path(contracts_path()))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([]))
                .insert_header("X-Pages", "1"),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = EsiClient::new(fast_config(&server.uri())).unwrap();
    let page = client.fetch_public_contracts(REGION, 1).await.unwrap();

    assert!(page.records.is_empty());
}

#[tokio::test]
async fn test_terminal_status_fails_without_retry() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(contracts_path()))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let client = EsiClient::new(fast_config(&server.uri())).unwrap();
    let err = client.fetch_public_contracts(REGION, 1).await.unwrap_err();

    assert!(matches!(err, FetchError::Terminal { status: 404 }));
    assert!(!err.is_transient());
}

#[tokio::test]
async fn test_exhausted_error_budget_triggers_backoff() {
    // A low X-ESI-Error-Limit-Remain makes even a terminal status retryable,
    // backing off pre-emptively before the limit is hit.
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(contracts_path()))
        .respond_with(ResponseTemplate::new(420).insert_header("X-ESI-Error-Limit-Remain", "1"))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path(contracts_path()))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([]))
                .insert_header("X-Pages", "1"),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = EsiClient::new(fast_config(&server.uri())).unwrap();
    let page = client.fetch_public_contracts(REGION, 1).await.unwrap();

    assert!(page.records.is_empty());
}

#[tokio::test]
async fn test_transport_error_surfaces_immediately() {
    // Nothing is listening on this address.
    let client = EsiClient::new(fast_config("http://127.0.0.1:9")).unwrap();
    let err = client.fetch_public_contracts(REGION, 1).await.unwrap_err();

    assert!(matches!(err, FetchError::Transport(_)));
}

// =============================================================================
// Response parsing
// =============================================================================

#[tokio::test]
async fn test_missing_pages_header_defaults_to_one() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(contracts_path()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let client = EsiClient::new(fast_config(&server.uri())).unwrap();
    let page = client.fetch_public_contracts(REGION, 1).await.unwrap();

    assert_eq!(page.total_pages, 1);
}

#[tokio::test]
async fn test_fetch_contract_items() {
    let server = MockServer::start().await;
    let contract = ContractId::new(42);

    Mock::given(method("GET"))
        .and(path(format!("/contracts/public/items/{contract}/")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"type_id": 587, "quantity": 1},
            {"type_id": 34, "quantity": 1000},
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let client = EsiClient::new(fast_config(&server.uri())).unwrap();
    let items = client.fetch_contract_items(contract).await.unwrap();

    assert_eq!(items.len(), 2);
    assert_eq!(items[0]["type_id"], 587);
}

#[tokio::test]
async fn test_pages_header_is_read_per_response() {
    // A listing can shrink or grow mid-walk; the reported total must come
    // from each response rather than being cached from the first.
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(contracts_path()))
        .and(query_param("page", "1"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([{"contract_id": 1}]))
                .insert_header("X-Pages", "3"),
        )
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path(contracts_path()))
        .and(query_param("page", "2"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([{"contract_id": 2}]))
                .insert_header("X-Pages", "2"),
        )
        .mount(&server)
        .await;

    let client = EsiClient::new(fast_config(&server.uri())).unwrap();

    let first = client.fetch_public_contracts(REGION, 1).await.unwrap();
    assert_eq!(first.total_pages, 3);

    let second = client.fetch_public_contracts(REGION, 2).await.unwrap();
    assert_eq!(second.total_pages, 2);
}
