//! Push relay delivery against a mock relay

mod common;

use benefitbell_server::notify::{
    jobs::{broadcast_payload, DEADLINE_TTL},
    DeliveryError, Notifier, RelayNotifier,
};
use common::subscription;
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_relay_posts_subscription_and_payload() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/send"))
        .and(header("authorization", "Bearer relay-token"))
        .and(body_partial_json(json!({
            "subscription": {
                "endpoint": "https://push.example/1",
                "keys": { "auth": "tBHItJI5svbpez7KI4CCXg" }
            },
            "payload": { "title": "혜택알리미 🔔", "tag": "benefit-alert", "url": "/" },
            "ttl": 86400
        })))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;

    let relay = RelayNotifier::new(format!("{}/send", server.uri()), Some("relay-token".into())).unwrap();
    relay
        .send(
            &subscription("https://push.example/1"),
            &broadcast_payload(None, None, None),
            Some(DEADLINE_TTL),
        )
        .await
        .unwrap();
}

#[tokio::test]
async fn test_relay_maps_expired_endpoint() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(410))
        .mount(&server)
        .await;

    let relay = RelayNotifier::new(server.uri(), None).unwrap();
    let result = relay
        .send(&subscription("https://push.example/old"), &broadcast_payload(None, None, None), None)
        .await;

    assert!(matches!(result, Err(DeliveryError::Gone)));
}

#[tokio::test]
async fn test_relay_other_failures_are_rejections() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let relay = RelayNotifier::new(server.uri(), None).unwrap();
    let result = relay
        .send(&subscription("https://push.example/1"), &broadcast_payload(None, None, None), None)
        .await;

    assert!(matches!(result, Err(DeliveryError::Rejected(500))));
}
