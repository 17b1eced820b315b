//! Push subscription registry

use async_trait::async_trait;
use benefitbell_common::BenefitCategory;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::db::StoreResult;

/// A browser push endpoint and the categories it wants to hear about
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PushSubscription {
    pub endpoint: String,
    pub p256dh: String,
    pub auth: String,
    /// Empty means every category
    pub categories: Vec<BenefitCategory>,
    pub created_at: DateTime<Utc>,
}

impl PushSubscription {
    pub fn wants(&self, category: BenefitCategory) -> bool {
        self.categories.is_empty() || self.categories.contains(&category)
    }
}

#[async_trait]
pub trait SubscriptionStore: Send + Sync {
    /// Insert, or replace keys and categories of an existing endpoint.
    async fn upsert(&self, subscription: &PushSubscription) -> StoreResult<()>;

    /// Returns whether a row was removed.
    async fn remove(&self, endpoint: &str) -> StoreResult<bool>;

    async fn list(&self) -> StoreResult<Vec<PushSubscription>>;

    async fn count(&self) -> StoreResult<u64>;
}

#[derive(Debug, Default)]
pub struct MemorySubscriptionStore {
    subscriptions: RwLock<Vec<PushSubscription>>,
}

impl MemorySubscriptionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SubscriptionStore for MemorySubscriptionStore {
    async fn upsert(&self, subscription: &PushSubscription) -> StoreResult<()> {
        let mut subs = self.subscriptions.write().await;
        match subs.iter_mut().find(|s| s.endpoint == subscription.endpoint) {
            Some(existing) => {
                existing.p256dh = subscription.p256dh.clone();
                existing.auth = subscription.auth.clone();
                existing.categories = subscription.categories.clone();
            },
            None => subs.push(subscription.clone()),
        }
        Ok(())
    }

    async fn remove(&self, endpoint: &str) -> StoreResult<bool> {
        let mut subs = self.subscriptions.write().await;
        let before = subs.len();
        subs.retain(|s| s.endpoint != endpoint);
        Ok(subs.len() != before)
    }

    async fn list(&self) -> StoreResult<Vec<PushSubscription>> {
        Ok(self.subscriptions.read().await.clone())
    }

    async fn count(&self) -> StoreResult<u64> {
        Ok(self.subscriptions.read().await.len() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sub(endpoint: &str, categories: Vec<BenefitCategory>) -> PushSubscription {
        PushSubscription {
            endpoint: endpoint.to_string(),
            p256dh: "key".to_string(),
            auth: "auth".to_string(),
            categories,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_upsert_is_idempotent_per_endpoint() {
        let store = MemorySubscriptionStore::new();
        store.upsert(&sub("https://push/1", vec![])).await.unwrap();
        store
            .upsert(&sub("https://push/1", vec![BenefitCategory::Youth]))
            .await
            .unwrap();

        let subs = store.list().await.unwrap();
        assert_eq!(subs.len(), 1);
        assert_eq!(subs[0].categories, vec![BenefitCategory::Youth]);
    }

    #[tokio::test]
    async fn test_remove() {
        let store = MemorySubscriptionStore::new();
        store.upsert(&sub("https://push/1", vec![])).await.unwrap();

        assert!(store.remove("https://push/1").await.unwrap());
        assert!(!store.remove("https://push/1").await.unwrap());
        assert_eq!(store.count().await.unwrap(), 0);
    }

    #[test]
    fn test_wants() {
        assert!(sub("e", vec![]).wants(BenefitCategory::Housing));
        let youth_only = sub("e", vec![BenefitCategory::Youth]);
        assert!(youth_only.wants(BenefitCategory::Youth));
        assert!(!youth_only.wants(BenefitCategory::Housing));
    }
}
