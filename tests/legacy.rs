//! v3 client behavior against a mock ConvertKit server.

use convertkit_client::{Error, LegacyClient, Purchase, PurchaseProduct};
use httpmock::prelude::*;
use serde_json::json;

fn client(server: &MockServer) -> LegacyClient {
    LegacyClient::builder("key-1", "secret-1")
        .base_url(server.base_url())
        .build()
        .unwrap()
}

fn subscriber_page(page: u32, total_pages: u32, entries: serde_json::Value) -> serde_json::Value {
    json!({
        "total_subscribers": 3,
        "page": page,
        "total_pages": total_pages,
        "subscribers": entries
    })
}

#[tokio::test]
async fn forms_and_landing_pages_are_split_client_side() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/v3/forms")
                .query_param("api_key", "key-1");
            then.status(200).json_body(json!({
                "forms": [
                    {"id": 1, "name": "Retired", "type": "hosted", "archived": true},
                    {"id": 2, "name": "Launch", "type": "hosted", "archived": false},
                    {"id": 3, "name": "Sidebar", "type": "embed", "archived": false}
                ]
            }));
        })
        .await;

    let client = client(&server);
    let forms = client.get_forms().await.unwrap();
    let pages = client.get_landing_pages().await.unwrap();

    assert_eq!(forms.len(), 1);
    assert_eq!(forms[0]["id"], 3);
    assert_eq!(pages.len(), 1);
    assert_eq!(pages[0]["id"], 2);
    assert_eq!(mock.hits_async().await, 2);
}

#[tokio::test]
async fn subscriber_lookup_walks_to_second_page() {
    let server = MockServer::start_async().await;
    let first = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/v3/subscribers")
                .query_param("api_secret", "secret-1")
                .query_param("page", "1");
            then.status(200).json_body(subscriber_page(
                1,
                2,
                json!([
                    {"id": 1, "email_address": "first@example.com"},
                    {"id": 2, "email_address": "second@example.com"}
                ]),
            ));
        })
        .await;
    let second = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/v3/subscribers")
                .query_param("api_secret", "secret-1")
                .query_param("page", "2");
            then.status(200).json_body(subscriber_page(
                2,
                2,
                json!([{"id": 3, "email_address": "target@example.com"}]),
            ));
        })
        .await;

    let id = client(&server)
        .get_subscriber_id("target@example.com")
        .await
        .unwrap();

    assert_eq!(id, Some(3));
    first.assert_async().await;
    second.assert_async().await;
}

#[tokio::test]
async fn subscriber_lookup_without_match_is_not_found() {
    let server = MockServer::start_async().await;
    for page in 1..=2u32 {
        server
            .mock_async(move |when, then| {
                when.method(GET)
                    .path("/v3/subscribers")
                    .query_param("page", page.to_string());
                then.status(200).json_body(subscriber_page(
                    page,
                    2,
                    json!([{"id": page, "email_address": "someone@example.com"}]),
                ));
            })
            .await;
    }

    let id = client(&server)
        .get_subscriber_id("missing@example.com")
        .await
        .unwrap();
    assert_eq!(id, None);
}

#[tokio::test]
async fn subscriber_lookup_stops_at_page_limit() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(GET).path("/v3/subscribers");
            then.status(200).json_body(subscriber_page(1, 50, json!([])));
        })
        .await;

    let client = LegacyClient::builder("key-1", "secret-1")
        .base_url(server.base_url())
        .max_subscriber_pages(3)
        .build()
        .unwrap();

    let err = client.get_subscriber_id("missing@example.com").await.unwrap_err();
    assert!(matches!(err, Error::PageLimit(3)));
    assert_eq!(mock.hits_async().await, 3);
}

#[tokio::test]
async fn unsupported_resource_sends_nothing() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.path_contains("/v3/");
            then.status(200).json_body(json!({}));
        })
        .await;

    let err = client(&server).get_resources("broadcasts").await.unwrap_err();
    assert!(matches!(err, Error::InvalidArgument(_)));
    assert_eq!(mock.hits_async().await, 0);
}

#[tokio::test]
async fn sequences_are_read_from_courses_key() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/v3/sequences");
            then.status(200)
                .json_body(json!({"courses": [{"id": 4, "name": "Onboarding"}]}));
        })
        .await;

    let sequences = client(&server).get_resources("sequences").await.unwrap();
    assert_eq!(sequences.len(), 1);
    assert_eq!(sequences[0]["name"], "Onboarding");
}

#[tokio::test]
async fn subscription_forms_map_excludes_archived() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/v3/subscription_forms");
            then.status(200).json_body(json!({
                "subscription_forms": [
                    {"id": 100, "form_id": 1, "archived": false},
                    {"id": 101, "form_id": 2, "archived": true}
                ]
            }));
        })
        .await;

    let map = client(&server).get_subscription_forms().await.unwrap();
    assert_eq!(map.get(&100), Some(&1));
    assert!(!map.contains_key(&101));
}

#[tokio::test]
async fn tag_subscribe_uses_secret_in_body() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST).path("/v3/tags/8/subscribe").json_body(json!({
                "email": "jane@example.com",
                "api_secret": "secret-1"
            }));
            then.status(200).json_body(json!({"subscription": {"id": 1}}));
        })
        .await;

    client(&server)
        .tag_subscriber(8, "jane@example.com")
        .await
        .unwrap();
    mock.assert_async().await;
}

#[tokio::test]
async fn purchase_is_nested_under_purchase_key() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST).path("/v3/purchases").json_body(json!({
                "purchase": {
                    "email_address": "buyer@example.com",
                    "transaction_id": "txn-9",
                    "currency": "USD",
                    "subtotal": 20.0,
                    "tax": 0.0,
                    "shipping": 0.0,
                    "discount": 0.0,
                    "total": 20.0,
                    "products": [{
                        "name": "Course",
                        "pid": "c-1",
                        "lid": "l-1",
                        "quantity": 1,
                        "unit_price": 20.0
                    }]
                },
                "api_secret": "secret-1"
            }));
            then.status(201).json_body(json!({"id": 5}));
        })
        .await;

    let mut purchase = Purchase::new(
        "buyer@example.com",
        "txn-9",
        vec![PurchaseProduct {
            name: "Course".to_string(),
            pid: "c-1".to_string(),
            lid: "l-1".to_string(),
            quantity: 1,
            unit_price: 20.0,
            sku: None,
        }],
    );
    purchase.subtotal = 20.0;
    purchase.total = 20.0;

    client(&server).create_purchase(&purchase).await.unwrap();
    mock.assert_async().await;
}

#[tokio::test]
async fn failures_report_status_instead_of_false() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/v3/account");
            then.status(401)
                .json_body(json!({"error": "Authorization Failed"}));
        })
        .await;

    let err = client(&server).get_account().await.unwrap_err();
    assert_eq!(err.status().map(|s| s.as_u16()), Some(401));
}

#[tokio::test]
async fn connection_failure_does_not_expose_secret() {
    let client = LegacyClient::builder("key-1", "hidden-api-secret-value")
        .base_url("http://127.0.0.1:1")
        .build()
        .unwrap();

    let err = client.get_account().await.unwrap_err();
    assert!(matches!(err, Error::Request(_)));
    let rendered = err.to_string();
    assert!(!rendered.contains("hidden-api-secret-value"), "{rendered}");
    assert!(!format!("{err:?}").contains("hidden-api-secret-value"));
}
