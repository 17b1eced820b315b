//! In-memory copy of the last successful list fetch

use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

use crate::welfare::WelfareListItem;

#[derive(Debug, Clone)]
struct Entry {
    items: Arc<Vec<WelfareListItem>>,
    stored_at: Instant,
}

#[derive(Debug)]
pub struct ListCache {
    ttl: Duration,
    entry: RwLock<Option<Entry>>,
}

impl ListCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entry: RwLock::new(None),
        }
    }

    /// Items stored less than `ttl` ago.
    pub async fn fresh(&self) -> Option<Arc<Vec<WelfareListItem>>> {
        self.entry
            .read()
            .await
            .as_ref()
            .filter(|e| e.stored_at.elapsed() < self.ttl)
            .map(|e| Arc::clone(&e.items))
    }

    /// Items regardless of age.
    pub async fn stale(&self) -> Option<Arc<Vec<WelfareListItem>>> {
        self.entry.read().await.as_ref().map(|e| Arc::clone(&e.items))
    }

    pub async fn store(&self, items: Vec<WelfareListItem>) -> Arc<Vec<WelfareListItem>> {
        let items = Arc::new(items);
        *self.entry.write().await = Some(Entry {
            items: Arc::clone(&items),
            stored_at: Instant::now(),
        });
        items
    }
}
