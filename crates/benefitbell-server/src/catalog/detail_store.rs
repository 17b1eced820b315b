//! Storage seam for the detail cache

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::{HashMap, HashSet};
use tokio::sync::RwLock;

use crate::db::StoreResult;
use crate::welfare::WelfareDetail;

/// Persistent cache of fetched welfare details
#[async_trait]
pub trait DetailStore: Send + Sync {
    async fn get(&self, serv_id: &str) -> StoreResult<Option<WelfareDetail>>;

    /// Insert or replace rows by servId; returns rows written.
    async fn upsert_many(&self, details: &[WelfareDetail]) -> StoreResult<u64>;

    /// Ids fetched strictly after `cutoff`
    async fn fresh_ids_since(&self, cutoff: DateTime<Utc>) -> StoreResult<HashSet<String>>;

    async fn all_ids(&self) -> StoreResult<HashSet<String>>;

    async fn list_all(&self) -> StoreResult<Vec<WelfareDetail>>;

    /// Connectivity probe for `/health`
    async fn health(&self) -> StoreResult<()>;
}

/// Process-local store for tests and database-less runs
#[derive(Debug, Default)]
pub struct MemoryDetailStore {
    rows: RwLock<HashMap<String, WelfareDetail>>,
}

impl MemoryDetailStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.rows.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.rows.read().await.is_empty()
    }
}

#[async_trait]
impl DetailStore for MemoryDetailStore {
    async fn get(&self, serv_id: &str) -> StoreResult<Option<WelfareDetail>> {
        Ok(self.rows.read().await.get(serv_id).cloned())
    }

    async fn upsert_many(&self, details: &[WelfareDetail]) -> StoreResult<u64> {
        let mut rows = self.rows.write().await;
        for detail in details {
            rows.insert(detail.serv_id.clone(), detail.clone());
        }
        Ok(details.len() as u64)
    }

    async fn fresh_ids_since(&self, cutoff: DateTime<Utc>) -> StoreResult<HashSet<String>> {
        Ok(self
            .rows
            .read()
            .await
            .values()
            .filter(|d| d.fetched_at > cutoff)
            .map(|d| d.serv_id.clone())
            .collect())
    }

    async fn all_ids(&self) -> StoreResult<HashSet<String>> {
        Ok(self.rows.read().await.keys().cloned().collect())
    }

    async fn list_all(&self) -> StoreResult<Vec<WelfareDetail>> {
        let mut details: Vec<_> = self.rows.read().await.values().cloned().collect();
        details.sort_by(|a, b| a.serv_id.cmp(&b.serv_id));
        Ok(details)
    }

    async fn health(&self) -> StoreResult<()> {
        Ok(())
    }
}
