//! Benefit catalog with tiered caching
//!
//! Lists come from the in-memory [`ListCache`], then the live API, then the
//! expired in-memory copy, then the [`StaticFallback`]. Details come from the
//! [`DetailStore`] while fresh, then the live API, then the expired row, then
//! the static list.

use benefitbell_common::{BenefitCategory, BenefitStatus};
use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::welfare::transform::{detail_to_benefit, list_item_to_benefit};
use crate::welfare::{Benefit, RetryPolicy, WelfareClient, WelfareDetail, WelfareError, WelfareListItem};

pub mod detail_store;
pub mod fallback;
pub mod list_cache;

pub use detail_store::{DetailStore, MemoryDetailStore};
pub use fallback::StaticFallback;
pub use list_cache::ListCache;

/// Where a list response came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ListSource {
    Cache,
    Api,
    Stale,
    Fallback,
    NoKey,
}

impl ListSource {
    pub fn as_str(self) -> &'static str {
        match self {
            ListSource::Cache => "cache",
            ListSource::Api => "api",
            ListSource::Stale => "stale",
            ListSource::Fallback => "fallback",
            ListSource::NoKey => "no_key",
        }
    }
}

impl fmt::Display for ListSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a detail response came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DetailSource {
    Cache,
    Api,
    Stale,
    Fallback,
}

impl DetailSource {
    pub fn as_str(self) -> &'static str {
        match self {
            DetailSource::Cache => "cache",
            DetailSource::Api => "api",
            DetailSource::Stale => "stale",
            DetailSource::Fallback => "fallback",
        }
    }
}

impl fmt::Display for DetailSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Category and keyword filter for benefit lists
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BenefitFilter {
    /// `None` matches every category
    pub category: Option<BenefitCategory>,
    pub keyword: Option<String>,
}

impl BenefitFilter {
    pub fn matches(&self, benefit: &Benefit) -> bool {
        if self.category.is_some_and(|c| c != benefit.category) {
            return false;
        }
        match self.keyword.as_deref().map(str::trim) {
            Some(kw) if !kw.is_empty() => {
                benefit.title.contains(kw)
                    || benefit.ministry.contains(kw)
                    || benefit.description.contains(kw)
            },
            _ => true,
        }
    }

    pub fn apply(&self, benefits: Vec<Benefit>) -> Vec<Benefit> {
        benefits.into_iter().filter(|b| self.matches(b)).collect()
    }
}

/// Whether a row fetched at `fetched_at` is younger than `ttl`
pub fn is_fresh(fetched_at: DateTime<Utc>, ttl: Duration, now: DateTime<Utc>) -> bool {
    match (now - fetched_at).to_std() {
        Ok(age) => age < ttl,
        // fetched_at in the future, clock skew between writers
        Err(_) => true,
    }
}

pub struct Catalog {
    client: Arc<WelfareClient>,
    details: Arc<dyn DetailStore>,
    list_cache: ListCache,
    fallback: StaticFallback,
    detail_ttl: Duration,
}

impl Catalog {
    pub fn new(
        client: Arc<WelfareClient>,
        details: Arc<dyn DetailStore>,
        fallback: StaticFallback,
    ) -> Self {
        let config = client.config();
        let list_cache = ListCache::new(config.list_ttl());
        let detail_ttl = config.detail_ttl();

        Self {
            client,
            details,
            list_cache,
            fallback,
            detail_ttl,
        }
    }

    pub fn client(&self) -> &Arc<WelfareClient> {
        &self.client
    }

    pub fn details(&self) -> &Arc<dyn DetailStore> {
        &self.details
    }

    pub fn fallback(&self) -> &StaticFallback {
        &self.fallback
    }

    /// Fetch the full list from the API and replace the in-memory copy.
    ///
    /// An empty result is an error and leaves the previous copy in place.
    pub async fn refresh_list(&self) -> Result<Arc<Vec<WelfareListItem>>, WelfareError> {
        let items = self.client.fetch_all_list().await?;
        if items.is_empty() {
            return Err(WelfareError::EmptyBody);
        }
        info!(count = items.len(), "Welfare list refreshed");
        Ok(self.list_cache.store(items).await)
    }

    async fn list_items(&self) -> Option<(Arc<Vec<WelfareListItem>>, ListSource)> {
        if let Some(items) = self.list_cache.fresh().await {
            debug!(count = items.len(), "Serving welfare list from memory");
            return Some((items, ListSource::Cache));
        }

        match self.refresh_list().await {
            Ok(items) => Some((items, ListSource::Api)),
            Err(e) => {
                warn!(error = %e, "Welfare list fetch failed");
                self.list_cache.stale().await.map(|items| (items, ListSource::Stale))
            },
        }
    }

    /// All benefits for `today`, tagged with the tier that answered.
    pub async fn benefits(&self, today: NaiveDate) -> (Vec<Benefit>, ListSource) {
        if !self.client.has_service_key() {
            return (self.fallback.benefits(today), ListSource::NoKey);
        }

        match self.list_items().await {
            Some((items, source)) => {
                let benefits = items
                    .iter()
                    .enumerate()
                    .map(|(i, item)| list_item_to_benefit(item, i, today))
                    .collect();
                (benefits, source)
            },
            None => (self.fallback.benefits(today), ListSource::Fallback),
        }
    }

    /// Resolve one detail record by servId.
    pub async fn detail(&self, serv_id: &str) -> Result<(WelfareDetail, DetailSource), WelfareError> {
        let now = Utc::now();

        let cached = match self.details.get(serv_id).await {
            Ok(row) => row,
            Err(e) => {
                warn!(serv_id, error = %e, "Detail cache read failed");
                None
            },
        };

        if let Some(row) = &cached {
            if is_fresh(row.fetched_at, self.detail_ttl, now) {
                return Ok((row.clone(), DetailSource::Cache));
            }
        }

        match self
            .client
            .fetch_detail(serv_id, &RetryPolicy::interactive())
            .await
        {
            Ok(detail) => {
                if let Err(e) = self.details.upsert_many(std::slice::from_ref(&detail)).await {
                    warn!(serv_id, error = %e, "Detail cache write failed");
                }
                Ok((detail, DetailSource::Api))
            },
            Err(e) => {
                if let Some(row) = cached {
                    warn!(serv_id, error = %e, "Serving expired detail");
                    return Ok((row, DetailSource::Stale));
                }
                if let Some(detail) = self.fallback.detail(serv_id, now) {
                    warn!(serv_id, error = %e, "Serving bundled detail");
                    return Ok((detail, DetailSource::Fallback));
                }
                Err(e)
            },
        }
    }

    /// Benefits that carry an application window: every cached detail, plus
    /// bundled entries not already cached.
    pub async fn dated_benefits(&self, today: NaiveDate) -> Vec<Benefit> {
        let details = match self.details.list_all().await {
            Ok(details) => details,
            Err(e) => {
                warn!(error = %e, "Detail cache unavailable, using bundled list only");
                Vec::new()
            },
        };

        let cached_ids: HashSet<&str> = details.iter().map(|d| d.serv_id.as_str()).collect();
        let mut benefits: Vec<Benefit> = details.iter().map(|d| detail_to_benefit(d, today)).collect();
        benefits.extend(
            self.fallback
                .benefits(today)
                .into_iter()
                .filter(|b| !cached_ids.contains(b.id.as_str())),
        );
        benefits
    }

    /// Open or upcoming benefits closing within `days`, soonest first.
    pub async fn urgent(&self, days: i64, today: NaiveDate) -> Vec<Benefit> {
        let mut urgent: Vec<Benefit> = self
            .dated_benefits(today)
            .await
            .into_iter()
            .filter(|b| b.d_day >= 0 && b.d_day <= days && b.status != BenefitStatus::Closed)
            .collect();
        urgent.sort_by_key(|b| b.d_day);
        urgent
    }

    pub async fn health(&self) -> crate::db::StoreResult<()> {
        self.details.health().await
    }
}
