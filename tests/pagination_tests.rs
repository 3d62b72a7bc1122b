//! Cursor pagination tests

mod helpers;

use std::sync::Arc;

use helpers::{client_for, client_with, fast_config, query_param, MockTransport, Reply, VITALIK};
use serde_json::json;
use web3_query::{ClientConfigBuilder, QueryError, QueryOptions};

fn two_pages() -> Arc<MockTransport> {
    Arc::new(
        MockTransport::new()
            .then(Reply::json(json!({ "result": ["a", "b"], "cursor": "x" })))
            .then(Reply::json(json!({ "result": ["c"], "cursor": null }))),
    )
}

fn transfers() -> QueryOptions {
    QueryOptions::new().address(VITALIK).chain("eth")
}

#[tokio::test]
async fn test_follows_cursor_until_exhausted() {
    let transport = two_pages();
    let client = client_for(&transport);

    let items = client
        .paginate("/:address/erc20/transfers", transfers(), None)
        .await
        .unwrap();

    assert_eq!(items, vec![json!("a"), json!("b"), json!("c")]);

    let requests = transport.requests();
    assert_eq!(requests.len(), 2);
    assert_eq!(query_param(&requests[0], "cursor"), None);
    assert_eq!(query_param(&requests[0], "limit").as_deref(), Some("100"));
    assert_eq!(query_param(&requests[1], "cursor").as_deref(), Some("x"));
    assert_eq!(query_param(&requests[1], "chain").as_deref(), Some("0x1"));
}

#[tokio::test]
async fn test_max_results_truncates_and_stops() {
    let transport = two_pages();
    let client = client_for(&transport);

    let items = client
        .paginate("/:address/erc20/transfers", transfers(), Some(2))
        .await
        .unwrap();

    assert_eq!(items, vec![json!("a"), json!("b")]);
    assert_eq!(transport.attempts(), 1);
}

#[tokio::test]
async fn test_max_results_mid_page() {
    let transport = two_pages();
    let client = client_for(&transport);

    let items = client
        .paginate("/:address/erc20/transfers", transfers(), Some(1))
        .await
        .unwrap();

    assert_eq!(items, vec![json!("a")]);
}

#[tokio::test]
async fn test_zero_max_results_is_unlimited() {
    let transport = two_pages();
    let client = client_for(&transport);

    let items = client
        .paginate("/:address/erc20/transfers", transfers(), Some(0))
        .await
        .unwrap();

    assert_eq!(items.len(), 3);
}

#[tokio::test]
async fn test_page_cap_stops_without_error() {
    let transport = Arc::new(
        MockTransport::new().always(Reply::json(json!({ "result": [1], "cursor": "more" }))),
    );
    let config = ClientConfigBuilder::new()
        .max_pages(3)
        .base_delay(std::time::Duration::from_millis(1))
        .build();
    let client = client_with(config, &transport);

    let items = client
        .paginate("/:address/nft", transfers(), None)
        .await
        .unwrap();

    assert_eq!(items.len(), 3);
    assert_eq!(transport.attempts(), 3);
}

#[tokio::test]
async fn test_caller_limit_overrides_page_size() {
    let transport = two_pages();
    let config = ClientConfigBuilder::new().page_size(25).build();
    let client = client_with(config, &transport);

    client
        .paginate(
            "/:address/erc20/transfers",
            transfers().param("limit", 7),
            None,
        )
        .await
        .unwrap();

    for request in transport.requests() {
        assert_eq!(query_param(&request, "limit").as_deref(), Some("7"));
    }
}

#[tokio::test]
async fn test_configured_page_size_is_sent() {
    let transport = two_pages();
    let config = ClientConfigBuilder::new().page_size(25).build();
    let client = client_with(config, &transport);

    client
        .paginate("/:address/erc20/transfers", transfers(), None)
        .await
        .unwrap();

    assert_eq!(
        query_param(&transport.requests()[0], "limit").as_deref(),
        Some("25")
    );
}

#[tokio::test]
async fn test_bare_array_is_a_single_page() {
    let transport = Arc::new(MockTransport::new().always(Reply::json(json!([{ "id": 1 }, { "id": 2 }]))));
    let client = client_for(&transport);

    let items = client
        .paginate("/:address/balance", transfers(), None)
        .await
        .unwrap();

    assert_eq!(items.len(), 2);
    assert_eq!(transport.attempts(), 1);
}

#[tokio::test]
async fn test_first_array_field_is_used_without_result() {
    let transport = Arc::new(
        MockTransport::new()
            .then(Reply::json(json!({ "page": 0, "tokens": ["t1"], "cursor": "c1" })))
            .then(Reply::json(json!({ "page": 1, "tokens": ["t2"] }))),
    );
    let client = client_for(&transport);

    let items = client
        .paginate("/wallets/:address/tokens", transfers(), None)
        .await
        .unwrap();

    assert_eq!(items, vec![json!("t1"), json!("t2")]);
}

#[tokio::test]
async fn test_later_page_error_keeps_collected_items() {
    let transport = Arc::new(
        MockTransport::new()
            .then(Reply::json(json!({ "result": ["a", "b"], "cursor": "x" })))
            .then(Reply::status(500, r#"{"message":"Internal error"}"#)),
    );
    let client = client_with(fast_config(), &transport);

    let items = client
        .paginate("/:address/erc20/transfers", transfers(), None)
        .await
        .unwrap();

    assert_eq!(items, vec![json!("a"), json!("b")]);
    assert_eq!(transport.attempts(), 2);
    assert_eq!(client.metrics().errors, 1);
}

#[tokio::test]
async fn test_first_page_error_propagates() {
    let transport = Arc::new(
        MockTransport::new().then(Reply::status(400, r#"{"message":"Invalid cursor"}"#)),
    );
    let client = client_with(fast_config(), &transport);

    let error = client
        .paginate("/:address/erc20/transfers", transfers(), None)
        .await
        .unwrap_err();

    assert!(matches!(error, QueryError::Api(ref e) if e.status == 400));
    assert_eq!(transport.attempts(), 1);
}
