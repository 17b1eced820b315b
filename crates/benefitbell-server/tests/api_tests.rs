//! Router tests through the full middleware stack, without a database

mod common;

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use benefitbell_server::{
    api,
    catalog::MemoryDetailStore,
    config::CorsConfig,
    features::FeatureState,
    ingest::{PrefetchConfig, Prefetcher},
    middleware::CronAuth,
    notify::{MemorySubscriptionStore, NotifyService},
};
use common::*;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

const CRON_SECRET: &str = "s3cret";

struct TestApp {
    router: Router,
    notifier: Arc<RecordingNotifier>,
}

fn test_app() -> TestApp {
    let details = Arc::new(MemoryDetailStore::new());
    let catalog = keyless_catalog(details);
    let notifier = Arc::new(RecordingNotifier::default());
    let notify = Arc::new(NotifyService::new(
        catalog.clone(),
        Arc::new(MemorySubscriptionStore::new()),
        notifier.clone(),
    ));
    let prefetcher = Arc::new(Prefetcher::new(catalog.clone(), PrefetchConfig::default()));

    let state = FeatureState {
        catalog,
        notify,
        prefetcher,
        cron: CronAuth::new(Some(CRON_SECRET.to_string())),
    };
    let cors = CorsConfig {
        allowed_origins: vec!["http://localhost:3000".to_string()],
        allow_credentials: true,
    };

    TestApp {
        router: api::router(state, &cors),
        notifier,
    }
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn json_request(method: Method, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn with_secret(mut request: Request<Body>) -> Request<Body> {
    request.headers_mut().insert(
        header::AUTHORIZATION,
        format!("Bearer {CRON_SECRET}").parse().unwrap(),
    );
    request
}

fn subscribe_body(endpoint: &str) -> Value {
    json!({
        "endpoint": endpoint,
        "keys": { "p256dh": "BNcRdreALRFXTkOOUHK1EtK2wtaz5Ry4YfYCA", "auth": "tBHItJI5svbpez7KI4CCXg" }
    })
}

#[tokio::test]
async fn test_root_and_health() {
    let app = test_app().router;

    let (status, body) = send(&app, get("/")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "BenefitBell Server");

    let (status, body) = send(&app, get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["serviceKey"], false);
}

#[tokio::test]
async fn test_list_without_key_serves_bundled_benefits() {
    let app = test_app().router;

    let (status, body) = send(&app, get("/api/benefits")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["source"], "no_key");
    assert_eq!(body["totalCount"], 9);
    assert_eq!(body["data"].as_array().unwrap().len(), 9);
}

#[tokio::test]
async fn test_list_filters_by_category_and_keyword() {
    let app = test_app().router;

    let (status, body) = send(&app, get("/api/benefits?category=youth")).await;
    assert_eq!(status, StatusCode::OK);
    let data = body["data"].as_array().unwrap();
    assert!(!data.is_empty());
    assert!(data.iter().all(|b| b["category"] == "youth"));
    assert!(data.iter().any(|b| b["id"] == "WLF00001188"));

    let (_, body) = send(&app, get("/api/benefits?keyword=%EA%B8%B0%EC%B4%88%EC%97%B0%EA%B8%88")).await;
    let ids: Vec<_> = body["data"].as_array().unwrap().iter().map(|b| b["id"].clone()).collect();
    assert_eq!(ids, vec![json!("WLF00000970")]);
}

#[tokio::test]
async fn test_list_rejects_unknown_category() {
    let app = test_app().router;

    let (status, body) = send(&app, get("/api/benefits?category=pets")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn test_urgent_validates_days() {
    let app = test_app().router;

    let (status, body) = send(&app, get("/api/benefits/urgent")).await;
    assert_eq!(status, StatusCode::OK);
    // bundled benefits are all year-round
    assert_eq!(body["totalCount"], 0);

    let (status, _) = send(&app, get("/api/benefits/urgent?days=31")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_detail_falls_back_to_bundled_entry() {
    let app = test_app().router;

    let (status, body) = send(&app, get("/api/benefits/WLF00000970")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["source"], "fallback");
    assert_eq!(body["data"]["servId"], "WLF00000970");
    assert_eq!(body["data"]["phone"], "1355");
}

#[tokio::test]
async fn test_detail_unknown_id_without_key_is_unavailable() {
    let app = test_app().router;

    let (status, body) = send(&app, get("/api/benefits/WLF99999999")).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["error"]["code"], "SERVICE_UNAVAILABLE");
}

#[tokio::test]
async fn test_detail_blank_id_is_rejected() {
    let app = test_app().router;

    let (status, body) = send(&app, get("/api/benefits/%20")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["message"], "Invalid benefit ID");
}

#[tokio::test]
async fn test_recommend_ranks_for_profile() {
    let app = test_app().router;

    let profile = json!({
        "birthYear": 1999,
        "region": "서울특별시 마포구",
        "employmentStatus": "jobSeeking",
        "housingType": "monthly",
        "specialStatus": [],
        "incomePercent": 80
    });
    let (status, body) = send(&app, json_request(Method::POST, "/api/recommend", profile)).await;
    assert_eq!(status, StatusCode::OK);

    let ids: Vec<_> = body["data"].as_array().unwrap().iter().map(|b| b["id"].clone()).collect();
    assert!(ids.contains(&json!("WLF00001188")));
    assert!(!ids.contains(&json!("WLF00000970")));
}

#[tokio::test]
async fn test_recommend_without_profile_returns_catalog() {
    let app = test_app().router;

    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/recommend")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["totalCount"], 9);
}

#[tokio::test]
async fn test_recommend_rejects_malformed_profile() {
    let app = test_app().router;

    let profile = json!({ "birthYear": "1999", "region": 42 });
    let (status, body) = send(&app, json_request(Method::POST, "/api/recommend", profile)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "BAD_REQUEST");

    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/recommend")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let (status, _) = send(&app, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_recommend_survives_extreme_birth_year() {
    let app = test_app().router;

    for birth_year in [i32::MIN, i32::MAX] {
        let profile = json!({
            "birthYear": birth_year,
            "region": "",
            "employmentStatus": "employed",
            "housingType": "owned",
            "incomePercent": 100
        });
        let (status, body) = send(&app, json_request(Method::POST, "/api/recommend", profile)).await;
        assert_eq!(status, StatusCode::OK, "birth year {birth_year}");
        assert!(body["data"].is_array());
    }
}

#[tokio::test]
async fn test_subscribe_lifecycle() {
    let app = test_app().router;
    let endpoint = "https://fcm.googleapis.com/fcm/send/abc";

    let (status, body) = send(&app, json_request(Method::POST, "/api/push/subscribe", subscribe_body(endpoint))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "success": true, "total": 1 }));

    // same endpoint again replaces rather than duplicates
    let (_, body) = send(&app, json_request(Method::POST, "/api/push/subscribe", subscribe_body(endpoint))).await;
    assert_eq!(body["total"], 1);

    let (_, body) = send(&app, get("/api/push/subscribe")).await;
    assert_eq!(body, json!({ "count": 1 }));

    let (status, body) = send(
        &app,
        json_request(Method::DELETE, "/api/push/subscribe", json!({ "endpoint": endpoint })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["removed"], true);

    let (_, body) = send(&app, get("/api/push/subscribe")).await;
    assert_eq!(body["count"], 0);
}

#[tokio::test]
async fn test_subscribe_rejects_invalid_input() {
    let app = test_app().router;

    let mut body = subscribe_body("https://push.example/1");
    body["categories"] = json!(["pets"]);
    let (status, _) = send(&app, json_request(Method::POST, "/api/push/subscribe", body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(&app, json_request(Method::POST, "/api/push/subscribe", subscribe_body(""))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_cron_routes_require_secret() {
    let app = test_app().router;

    for uri in ["/api/cron/notify", "/api/cron/prefetch-details", "/api/push/cron-deadline"] {
        let (status, body) = send(&app, get(uri)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{uri}");
        assert_eq!(body["error"]["code"], "UNAUTHORIZED");
    }

    let (status, _) = send(&app, json_request(Method::POST, "/api/push/send", json!({}))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_cron_notify_with_secret() {
    let app = test_app().router;

    let (status, body) = send(&app, with_secret(get("/api/cron/notify"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ok"], true);
    assert_eq!(body["report"]["sent"], 0);
}

#[tokio::test]
async fn test_cron_prefetch_without_key_is_unavailable() {
    let app = test_app().router;

    let (status, _) = send(&app, with_secret(get("/api/cron/prefetch-details?dry=true"))).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_manual_broadcast_uses_defaults() {
    let TestApp { router, notifier } = test_app();

    send(&router, json_request(Method::POST, "/api/push/subscribe", subscribe_body("https://push.example/1"))).await;

    let (status, body) = send(
        &router,
        with_secret(json_request(Method::POST, "/api/push/send", json!({ "body": "신청 마감 3일 전입니다" }))),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["sent"], 1);
    assert_eq!(body["total"], 1);

    let deliveries = notifier.deliveries();
    assert_eq!(deliveries.len(), 1);
    assert_eq!(deliveries[0].1.title, "혜택알리미 🔔");
    assert_eq!(deliveries[0].1.body, "신청 마감 3일 전입니다");
    assert_eq!(deliveries[0].1.url, "/");
}

#[tokio::test]
async fn test_cors_preflight() {
    let app = test_app().router;

    let request = Request::builder()
        .method(Method::OPTIONS)
        .uri("/api/benefits")
        .header(header::ORIGIN, "http://localhost:3000")
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "GET")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(
        response.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
        "http://localhost:3000"
    );
    assert_eq!(
        response.headers().get(header::ACCESS_CONTROL_ALLOW_CREDENTIALS).unwrap(),
        "true"
    );
}
