//! Notification jobs: personalised alerts, deadline broadcast, manual broadcast

use benefitbell_common::BenefitStatus;
use chrono::{DateTime, NaiveDate, Utc};
use futures::stream::{self, StreamExt};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use super::payload::NotificationPayload;
use super::relay::{DeliveryError, Notifier};
use super::store::{PushSubscription, SubscriptionStore};
use crate::catalog::Catalog;
use crate::db::StoreResult;
use crate::welfare::Benefit;

/// Deliveries in flight at once
const SEND_CONCURRENCY: usize = 16;

/// Open benefits closing within this many days are announced
pub const PERSONAL_WINDOW_DAYS: i64 = 7;

pub const DEADLINE_WEEK_DAYS: i64 = 7;
pub const DEADLINE_TODAY_DAYS: i64 = 1;
pub const DEADLINE_TAG: &str = "deadline-alert";
pub const DEADLINE_URL: &str = "/?tab=deadline";
pub const DEADLINE_TTL: Duration = Duration::from_secs(24 * 3600);

pub const BROADCAST_TAG: &str = "benefit-alert";
pub const DEFAULT_BROADCAST_TITLE: &str = "혜택알리미 🔔";
pub const DEFAULT_BROADCAST_BODY: &str = "마감 임박 혜택이 있습니다!";
pub const DEFAULT_BROADCAST_URL: &str = "/";

/// Outcome of one delivery fan-out
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DeliveryStats {
    pub sent: usize,
    pub failed: usize,
    /// Expired subscriptions deleted
    pub removed: usize,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotifyReport {
    #[serde(flatten)]
    pub stats: DeliveryStats,
    /// Relevant benefits considered
    pub benefits: usize,
    pub timestamp: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeadlineReport {
    #[serde(flatten)]
    pub stats: DeliveryStats,
    pub urgent_count: usize,
    pub today_count: usize,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct BroadcastReport {
    #[serde(flatten)]
    pub stats: DeliveryStats,
    pub total: usize,
}

/// Open benefits closing within a week, or not yet open, soonest first.
pub fn relevant_benefits(mut benefits: Vec<Benefit>) -> Vec<Benefit> {
    benefits.retain(|b| match b.status {
        BenefitStatus::Open => (0..=PERSONAL_WINDOW_DAYS).contains(&b.d_day),
        BenefitStatus::Upcoming => true,
        BenefitStatus::Closed => false,
    });
    benefits.sort_by_key(|b| b.d_day);
    benefits
}

pub fn personal_payload(benefit: &Benefit) -> NotificationPayload {
    let title = if benefit.status == BenefitStatus::Open {
        format!("📢 마감 D-{}: {}", benefit.d_day, benefit.title)
    } else {
        format!("🔔 새 혜택: {}", benefit.title)
    };

    NotificationPayload::new(
        title,
        benefit.amount.clone(),
        format!("/detail/{}", benefit.id),
        format!("benefit-{}", benefit.id),
    )
    .with_icons()
}

/// `None` when nothing closes within a week.
pub fn deadline_payload(week: &[Benefit], today: &[Benefit]) -> Option<NotificationPayload> {
    let first_week = week.first()?;

    let (title, body) = match today.first() {
        Some(first_today) => (
            format!("⚠️ 오늘 마감! {}", first_today.title),
            format!(
                "{} 마감이 임박했어요!",
                today
                    .iter()
                    .map(|b| format!("{} (D-{})", b.title, b.d_day))
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
        ),
        None => (
            format!("📅 D-7 임박: {}", first_week.title),
            format!("{}개 혜택이 7일 이내 마감됩니다. 놓치지 마세요!", week.len()),
        ),
    };

    Some(NotificationPayload::new(title, body, DEADLINE_URL, DEADLINE_TAG).with_icons())
}

fn or_default(value: Option<String>, default: &str) -> String {
    value
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}

pub fn broadcast_payload(
    title: Option<String>,
    body: Option<String>,
    url: Option<String>,
) -> NotificationPayload {
    NotificationPayload::new(
        or_default(title, DEFAULT_BROADCAST_TITLE),
        or_default(body, DEFAULT_BROADCAST_BODY),
        or_default(url, DEFAULT_BROADCAST_URL),
        BROADCAST_TAG,
    )
}

pub struct NotifyService {
    catalog: Arc<Catalog>,
    subscriptions: Arc<dyn SubscriptionStore>,
    notifier: Arc<dyn Notifier>,
}

impl NotifyService {
    pub fn new(
        catalog: Arc<Catalog>,
        subscriptions: Arc<dyn SubscriptionStore>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            catalog,
            subscriptions,
            notifier,
        }
    }

    pub fn subscriptions(&self) -> &Arc<dyn SubscriptionStore> {
        &self.subscriptions
    }

    /// Send each (subscription, payload) pair and drop expired endpoints.
    async fn deliver(
        &self,
        jobs: Vec<(PushSubscription, NotificationPayload)>,
        ttl: Option<Duration>,
    ) -> DeliveryStats {
        let notifier = &self.notifier;
        let results: Vec<(String, Result<(), DeliveryError>)> = stream::iter(jobs)
            .map(|(sub, payload)| async move {
                let result = notifier.send(&sub, &payload, ttl).await;
                (sub.endpoint, result)
            })
            .buffer_unordered(SEND_CONCURRENCY)
            .collect()
            .await;

        let mut stats = DeliveryStats::default();
        for (endpoint, result) in results {
            match result {
                Ok(()) => stats.sent += 1,
                Err(DeliveryError::Gone) => {
                    stats.failed += 1;
                    match self.subscriptions.remove(&endpoint).await {
                        Ok(true) => stats.removed += 1,
                        Ok(false) => {},
                        Err(e) => warn!(endpoint = %endpoint, error = %e, "Failed to remove expired subscription"),
                    }
                },
                Err(e) => {
                    stats.failed += 1;
                    warn!(endpoint = %endpoint, error = %e, "Push delivery failed");
                },
            }
        }
        stats
    }

    /// Send each subscriber the most pressing benefit in their categories.
    pub async fn notify_subscribers(&self, today: NaiveDate) -> StoreResult<NotifyReport> {
        let subs = self.subscriptions.list().await?;
        if subs.is_empty() {
            info!("No push subscriptions, skipping notify");
            return Ok(NotifyReport {
                timestamp: Some(Utc::now()),
                ..Default::default()
            });
        }

        let relevant = relevant_benefits(self.catalog.dated_benefits(today).await);
        let jobs: Vec<_> = subs
            .into_iter()
            .filter_map(|sub| {
                let benefit = relevant.iter().find(|b| sub.wants(b.category))?;
                Some((sub, personal_payload(benefit)))
            })
            .collect();

        let stats = self.deliver(jobs, None).await;
        info!(
            sent = stats.sent,
            failed = stats.failed,
            removed = stats.removed,
            benefits = relevant.len(),
            "Personalised notifications sent"
        );

        Ok(NotifyReport {
            stats,
            benefits: relevant.len(),
            timestamp: Some(Utc::now()),
        })
    }

    /// Tell every subscriber about deadlines within a week.
    pub async fn deadline_broadcast(&self, today: NaiveDate) -> StoreResult<DeadlineReport> {
        let week = self.catalog.urgent(DEADLINE_WEEK_DAYS, today).await;
        let closing = self.catalog.urgent(DEADLINE_TODAY_DAYS, today).await;

        let Some(payload) = deadline_payload(&week, &closing) else {
            info!("No benefits closing within a week, skipping deadline push");
            return Ok(DeadlineReport::default());
        };

        let subs = self.subscriptions.list().await?;
        let jobs = subs.into_iter().map(|sub| (sub, payload.clone())).collect();
        let stats = self.deliver(jobs, Some(DEADLINE_TTL)).await;

        info!(
            sent = stats.sent,
            failed = stats.failed,
            urgent = week.len(),
            today = closing.len(),
            "Deadline notifications sent"
        );

        Ok(DeadlineReport {
            stats,
            urgent_count: week.len(),
            today_count: closing.len(),
        })
    }

    /// Send one payload to every subscriber.
    pub async fn broadcast(&self, payload: NotificationPayload) -> StoreResult<BroadcastReport> {
        let subs = self.subscriptions.list().await?;
        let total = subs.len();
        let jobs = subs.into_iter().map(|sub| (sub, payload.clone())).collect();
        let stats = self.deliver(jobs, None).await;

        info!(sent = stats.sent, failed = stats.failed, total, "Broadcast sent");
        Ok(BroadcastReport { stats, total })
    }
}
