//! Detail cache warm-up
//!
//! Walks every servId of the live list and stores its detail record, in small
//! concurrent batches so the daily data.go.kr quota is not burned in one go.
//! A quota response stops the run; the next run picks up where it left off
//! because already cached ids are skipped.

use chrono::{DateTime, Utc};
use futures::future::join_all;
use serde::Serialize;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{error, info, warn};

use super::config::PrefetchConfig;
use crate::catalog::Catalog;
use crate::db::StoreError;
use crate::welfare::{RetryPolicy, WelfareDetail, WelfareError};

#[derive(Error, Debug)]
pub enum PrefetchError {
    #[error("Failed to load the welfare list: {0}")]
    List(#[source] WelfareError),

    #[error("Detail cache unavailable: {0}")]
    Store(#[from] StoreError),
}

/// Which cached ids are left alone
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipCached {
    /// Refetch everything
    Nothing,
    /// Skip rows fetched within this window
    Within(Duration),
    /// Skip every id with a row, whatever its age
    Any,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrefetchOptions {
    pub skip: SkipCached,
    /// Plan only, fetch nothing
    pub dry_run: bool,
}

impl PrefetchOptions {
    /// Daily job: refresh rows older than `skip_fresh`.
    pub fn scheduled(config: &PrefetchConfig) -> Self {
        Self {
            skip: SkipCached::Within(config.skip_fresh()),
            dry_run: false,
        }
    }

    /// One-shot CLI: `--force` refetches everything, otherwise only uncached ids.
    pub fn manual(force: bool, dry_run: bool) -> Self {
        Self {
            skip: if force { SkipCached::Nothing } else { SkipCached::Any },
            dry_run,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PrefetchReport {
    /// Distinct servIds in the list
    pub total: usize,
    pub already_cached: usize,
    pub fetched: usize,
    pub failed: usize,
    pub quota_hit: bool,
    pub dry_run: bool,
    /// Ids that would be fetched, filled on dry runs
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub planned_ids: Vec<String>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl PrefetchReport {
    fn new(started_at: DateTime<Utc>, dry_run: bool) -> Self {
        Self {
            total: 0,
            already_cached: 0,
            fetched: 0,
            failed: 0,
            quota_hit: false,
            dry_run,
            planned_ids: Vec::new(),
            started_at,
            finished_at: started_at,
        }
    }

    pub fn duration(&self) -> Duration {
        (self.finished_at - self.started_at).to_std().unwrap_or_default()
    }
}

pub struct Prefetcher {
    catalog: Arc<Catalog>,
    config: PrefetchConfig,
    policy: RetryPolicy,
}

impl Prefetcher {
    pub fn new(catalog: Arc<Catalog>, config: PrefetchConfig) -> Self {
        Self {
            catalog,
            config,
            policy: RetryPolicy::batch(),
        }
    }

    /// Override the per-detail retry policy.
    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn config(&self) -> &PrefetchConfig {
        &self.config
    }

    async fn list_ids(&self) -> Result<Vec<String>, PrefetchError> {
        let items = self.catalog.refresh_list().await.map_err(PrefetchError::List)?;

        let mut seen = HashSet::new();
        Ok(items
            .iter()
            .map(|item| item.serv_id.trim())
            .filter(|id| !id.is_empty() && seen.insert(*id))
            .map(str::to_string)
            .collect())
    }

    async fn cached_ids(&self, skip: SkipCached) -> Result<HashSet<String>, PrefetchError> {
        let store = self.catalog.details();
        let ids = match skip {
            SkipCached::Nothing => HashSet::new(),
            SkipCached::Any => store.all_ids().await?,
            SkipCached::Within(window) => {
                let window = chrono::Duration::from_std(window)
                    .unwrap_or_else(|_| chrono::Duration::days(365 * 100));
                let cutoff = Utc::now().checked_sub_signed(window).unwrap_or(DateTime::<Utc>::MIN_UTC);
                store.fresh_ids_since(cutoff).await?
            },
        };
        Ok(ids)
    }

    pub async fn run(&self, options: PrefetchOptions) -> Result<PrefetchReport, PrefetchError> {
        let mut report = PrefetchReport::new(Utc::now(), options.dry_run);

        let ids = self.list_ids().await?;
        let cached = self.cached_ids(options.skip).await?;

        report.total = ids.len();
        let to_fetch: Vec<String> = ids.into_iter().filter(|id| !cached.contains(id)).collect();
        report.already_cached = report.total - to_fetch.len();

        info!(
            total = report.total,
            cached = report.already_cached,
            to_fetch = to_fetch.len(),
            dry_run = options.dry_run,
            "Detail prefetch planned"
        );

        if options.dry_run {
            report.planned_ids = to_fetch;
            report.finished_at = Utc::now();
            return Ok(report);
        }

        let batch_size = self.config.batch_size.max(1);
        let batches = to_fetch.chunks(batch_size).count();

        for (index, batch) in to_fetch.chunks(batch_size).enumerate() {
            if index > 0 {
                tokio::time::sleep(self.config.batch_delay()).await;
            }

            let results = join_all(
                batch
                    .iter()
                    .map(|id| self.catalog.client().fetch_detail(id, &self.policy)),
            )
            .await;

            let mut fetched: Vec<WelfareDetail> = Vec::with_capacity(batch.len());
            for (id, result) in batch.iter().zip(results) {
                match result {
                    Ok(detail) => fetched.push(detail),
                    Err(WelfareError::QuotaExceeded) => {
                        report.quota_hit = true;
                        report.failed += 1;
                    },
                    Err(e) => {
                        warn!(serv_id = %id, error = %e, "Detail prefetch failed");
                        report.failed += 1;
                    },
                }
            }

            if !fetched.is_empty() {
                match self.catalog.details().upsert_many(&fetched).await {
                    Ok(written) => report.fetched += written as usize,
                    Err(e) => {
                        error!(error = %e, rows = fetched.len(), "Failed to store prefetched details");
                        report.failed += fetched.len();
                    },
                }
            }

            info!(
                batch = index + 1,
                batches,
                fetched = report.fetched,
                failed = report.failed,
                "Prefetch batch complete"
            );

            if report.quota_hit {
                warn!(
                    remaining = to_fetch.len().saturating_sub((index + 1) * batch_size),
                    "data.go.kr quota exceeded, stopping prefetch"
                );
                break;
            }
        }

        report.finished_at = Utc::now();
        info!(
            fetched = report.fetched,
            failed = report.failed,
            quota_hit = report.quota_hit,
            duration_secs = report.duration().as_secs_f64(),
            "Detail prefetch finished"
        );

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manual_options() {
        assert_eq!(PrefetchOptions::manual(true, false).skip, SkipCached::Nothing);
        assert_eq!(PrefetchOptions::manual(false, true).skip, SkipCached::Any);
        assert!(PrefetchOptions::manual(false, true).dry_run);
    }

    #[test]
    fn test_scheduled_options_use_fresh_window() {
        let options = PrefetchOptions::scheduled(&PrefetchConfig::default());
        assert_eq!(options.skip, SkipCached::Within(Duration::from_secs(12 * 3600)));
        assert!(!options.dry_run);
    }
}
