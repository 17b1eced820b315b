//! Delivery sinks for push notifications
//!
//! Web Push encryption happens in the relay; this side only hands over the
//! subscription keys and the payload.

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Serialize;
use std::time::Duration;
use thiserror::Error;
use tracing::info;

use super::payload::NotificationPayload;
use super::store::PushSubscription;

const RELAY_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Error, Debug)]
pub enum DeliveryError {
    /// The push service no longer knows this endpoint
    #[error("Subscription expired")]
    Gone,

    #[error("Relay rejected notification: HTTP {0}")]
    Rejected(u16),

    #[error("Relay request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(
        &self,
        subscription: &PushSubscription,
        payload: &NotificationPayload,
        ttl: Option<Duration>,
    ) -> Result<(), DeliveryError>;
}

#[derive(Serialize)]
struct RelayKeys<'a> {
    p256dh: &'a str,
    auth: &'a str,
}

#[derive(Serialize)]
struct RelaySubscription<'a> {
    endpoint: &'a str,
    keys: RelayKeys<'a>,
}

#[derive(Serialize)]
struct RelayRequest<'a> {
    subscription: RelaySubscription<'a>,
    payload: &'a NotificationPayload,
    #[serde(skip_serializing_if = "Option::is_none")]
    ttl: Option<u64>,
}

/// POSTs each notification as JSON to a push relay
#[derive(Debug, Clone)]
pub struct RelayNotifier {
    http: reqwest::Client,
    url: String,
    token: Option<String>,
}

impl RelayNotifier {
    pub fn new(url: impl Into<String>, token: Option<String>) -> Result<Self, DeliveryError> {
        let http = reqwest::Client::builder().timeout(RELAY_TIMEOUT).build()?;
        Ok(Self {
            http,
            url: url.into(),
            token,
        })
    }
}

#[async_trait]
impl Notifier for RelayNotifier {
    async fn send(
        &self,
        subscription: &PushSubscription,
        payload: &NotificationPayload,
        ttl: Option<Duration>,
    ) -> Result<(), DeliveryError> {
        let body = RelayRequest {
            subscription: RelaySubscription {
                endpoint: &subscription.endpoint,
                keys: RelayKeys {
                    p256dh: &subscription.p256dh,
                    auth: &subscription.auth,
                },
            },
            payload,
            ttl: ttl.map(|t| t.as_secs()),
        };

        let mut request = self.http.post(&self.url).json(&body);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        match response.status() {
            status if status.is_success() => Ok(()),
            StatusCode::NOT_FOUND | StatusCode::GONE => Err(DeliveryError::Gone),
            status => Err(DeliveryError::Rejected(status.as_u16())),
        }
    }
}

/// Logs notifications instead of delivering them
#[derive(Debug, Clone, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn send(
        &self,
        subscription: &PushSubscription,
        payload: &NotificationPayload,
        _ttl: Option<Duration>,
    ) -> Result<(), DeliveryError> {
        info!(
            endpoint = %subscription.endpoint,
            title = %payload.title,
            url = %payload.url,
            "Push notification (no relay configured)"
        );
        Ok(())
    }
}
