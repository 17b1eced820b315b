//! Shared fixtures for BenefitBell integration tests
//!
//! Everything here runs without Postgres: stores are the in-memory ones and
//! data.go.kr is replaced by a wiremock server where needed.

#![allow(dead_code)]

use async_trait::async_trait;
use benefitbell_server::{
    catalog::{Catalog, DetailStore, MemoryDetailStore, StaticFallback},
    notify::{
        DeliveryError, MemorySubscriptionStore, NotificationPayload, Notifier, NotifyService,
        PushSubscription,
    },
    welfare::{Backoff, RetryPolicy, WelfareClient, WelfareConfig, WelfareDetail},
};
use chrono::{NaiveDate, Utc};
use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const TEST_SERVICE_KEY: &str = "test-key";

/// Client config pointing at a mock server
pub fn welfare_config(base_url: &str) -> WelfareConfig {
    WelfareConfig {
        service_key: Some(TEST_SERVICE_KEY.to_string()),
        base_url: base_url.to_string(),
        list_rows: 2,
        max_pages: 10,
        ..Default::default()
    }
}

/// Retries without real waiting
pub fn fast_policy(max_attempts: u32) -> RetryPolicy {
    RetryPolicy {
        max_attempts,
        timeout: Duration::from_secs(2),
        backoff: Backoff::Fixed(Duration::from_millis(5)),
    }
}

pub struct ListEntry<'a> {
    pub serv_id: &'a str,
    pub name: &'a str,
}

pub fn list_xml(total: u64, entries: &[ListEntry<'_>]) -> String {
    let items: String = entries
        .iter()
        .map(|e| {
            format!(
                "<servList><servId>{}</servId><servNm>{}</servNm><servDgst>월 최대 20만원 지원</servDgst>\
                 <jurMnofNm>국토교통부</jurMnofNm><lifeArray>청년</lifeArray><intrsThemaArray>주거</intrsThemaArray>\
                 <servDtlLink>https://www.bokjiro.go.kr/{}</servDtlLink><inqNum>120</inqNum>\
                 <svcfrstRegTs>20240101</svcfrstRegTs></servList>",
                e.serv_id, e.name, e.serv_id
            )
        })
        .collect();

    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?><wantedList><totalCount>{total}</totalCount>\
         <resultCode>0</resultCode><resultMessage>SUCCESS</resultMessage>{items}</wantedList>"
    )
}

pub fn detail_xml(serv_id: &str, title: &str, apply_end: &str) -> String {
    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?><wantedDtl><resultCode>0</resultCode>\
         <resultMessage>SUCCESS</resultMessage><servId>{serv_id}</servId><servNm>{title}</servNm>\
         <jurMnofNm>국토교통부</jurMnofNm><rprsCtadr>1599-0001</rprsCtadr>\
         <alwServCn>월 최대 20만원 월세 지원</alwServCn><tgtrDtlCn>만 19~34세 무주택 청년</tgtrDtlCn>\
         <aplyBgnDd>20240101</aplyBgnDd><aplyEndDd>{apply_end}</aplyEndDd></wantedDtl>"
    )
}

pub fn error_xml(code: &str, message: &str) -> String {
    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?><OpenAPI_ServiceResponse><cmmMsgHeader>\
         <resultCode>{code}</resultCode><resultMessage>{message}</resultMessage>\
         </cmmMsgHeader></OpenAPI_ServiceResponse>"
    )
}

/// A cached detail whose application window ends `days_left` after `today`
pub fn closing_detail(serv_id: &str, title: &str, today: NaiveDate, days_left: i64) -> WelfareDetail {
    let end = today + chrono::Duration::days(days_left);
    WelfareDetail::from_xml(
        serv_id,
        &detail_xml(serv_id, title, &end.format("%Y%m%d").to_string()),
        Utc::now(),
    )
}

/// Catalog without a service key, backed by the bundled benefits
pub fn keyless_catalog(details: Arc<MemoryDetailStore>) -> Arc<Catalog> {
    let client = WelfareClient::new(WelfareConfig::default()).unwrap();
    Arc::new(Catalog::new(
        Arc::new(client),
        details as Arc<dyn DetailStore>,
        StaticFallback::bundled().unwrap(),
    ))
}

pub fn mocked_catalog(base_url: &str, details: Arc<MemoryDetailStore>) -> Arc<Catalog> {
    let client = WelfareClient::new(welfare_config(base_url)).unwrap();
    Arc::new(Catalog::new(Arc::new(client), details, StaticFallback::empty()))
}

pub fn subscription(endpoint: &str) -> PushSubscription {
    PushSubscription {
        endpoint: endpoint.to_string(),
        p256dh: "BNcRdreALRFXTkOOUHK1EtK2wtaz5Ry4YfYCA".to_string(),
        auth: "tBHItJI5svbpez7KI4CCXg".to_string(),
        categories: Vec::new(),
        created_at: Utc::now(),
    }
}

/// Records every send; endpoints in `gone` answer as expired
#[derive(Default)]
pub struct RecordingNotifier {
    pub sent: Mutex<Vec<(String, NotificationPayload, Option<Duration>)>>,
    pub gone: HashSet<String>,
}

impl RecordingNotifier {
    pub fn with_gone(endpoints: &[&str]) -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            gone: endpoints.iter().map(|e| e.to_string()).collect(),
        }
    }

    pub fn deliveries(&self) -> Vec<(String, NotificationPayload, Option<Duration>)> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send(
        &self,
        subscription: &PushSubscription,
        payload: &NotificationPayload,
        ttl: Option<Duration>,
    ) -> Result<(), DeliveryError> {
        if self.gone.contains(&subscription.endpoint) {
            return Err(DeliveryError::Gone);
        }
        self.sent
            .lock()
            .unwrap()
            .push((subscription.endpoint.clone(), payload.clone(), ttl));
        Ok(())
    }
}

pub struct NotifyFixture {
    pub details: Arc<MemoryDetailStore>,
    pub subscriptions: Arc<MemorySubscriptionStore>,
    pub notifier: Arc<RecordingNotifier>,
    pub service: Arc<NotifyService>,
}

pub fn notify_fixture(notifier: RecordingNotifier) -> NotifyFixture {
    let details = Arc::new(MemoryDetailStore::new());
    let subscriptions = Arc::new(MemorySubscriptionStore::new());
    let notifier = Arc::new(notifier);
    let service = Arc::new(NotifyService::new(
        keyless_catalog(details.clone()),
        subscriptions.clone(),
        notifier.clone(),
    ));

    NotifyFixture {
        details,
        subscriptions,
        notifier,
        service,
    }
}
