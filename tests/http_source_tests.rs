//! Feed gateway client tests against a mock HTTP server.

use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use rentfeed::source::{HttpMessageSource, MessageSource, SourceError};

#[tokio::test]
async fn resolve_channel_returns_the_numeric_identity() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/channels/rent_city_feed"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": 12345 })))
        .mount(&server)
        .await;

    let source = HttpMessageSource::new(server.uri()).expect("client");
    let id = source
        .resolve_channel("rent_city_feed")
        .await
        .expect("resolution");
    assert_eq!(id, 12345);
}

#[tokio::test]
async fn unknown_channel_maps_to_channel_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/channels/missing"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let source = HttpMessageSource::new(server.uri()).expect("client");
    let err = source.resolve_channel("missing").await.expect_err("404");
    assert!(matches!(err, SourceError::ChannelNotFound { handle } if handle == "missing"));
}

#[tokio::test]
async fn fetch_page_maps_messages_cursor_and_empty_bodies() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/channels/12345/messages"))
        .and(query_param("limit", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "messages": [
                { "id": 9, "text": "🏠 75 Sq.m", "date": "2026-07-01T10:00:00Z" },
                { "id": 8, "text": null, "date": "2026-07-01T09:00:00Z" }
            ],
            "has_more": true
        })))
        .mount(&server)
        .await;

    let source = HttpMessageSource::new(server.uri()).expect("client");
    let page = source.fetch_page(12345, None, 2).await.expect("page");
    assert_eq!(page.messages.len(), 2);
    assert_eq!(page.messages[0].id, 9);
    // Media-only posts arrive with a null body; the client yields "".
    assert_eq!(page.messages[1].text, "");
    assert_eq!(page.next_cursor, Some(8));
    assert!(page.has_more);
}

#[tokio::test]
async fn fetch_page_passes_the_cursor_through() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/channels/12345/messages"))
        .and(query_param("before_id", "8"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "messages": [],
            "has_more": false
        })))
        .mount(&server)
        .await;

    let source = HttpMessageSource::new(server.uri()).expect("client");
    let page = source.fetch_page(12345, Some(8), 50).await.expect("page");
    assert!(page.messages.is_empty());
    assert_eq!(page.next_cursor, None);
    assert!(!page.has_more);
}

#[tokio::test]
async fn server_errors_are_retryable_network_failures() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/channels/12345/messages"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let source = HttpMessageSource::new(server.uri()).expect("client");
    let err = source.fetch_page(12345, None, 50).await.expect_err("503");
    assert!(matches!(err, SourceError::Network { retryable: true, .. }));
}

#[tokio::test]
async fn malformed_payload_is_reported_as_such() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/channels/12345/messages"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let source = HttpMessageSource::new(server.uri()).expect("client");
    let err = source.fetch_page(12345, None, 50).await.expect_err("bad body");
    assert!(matches!(err, SourceError::Malformed { .. }));
}
