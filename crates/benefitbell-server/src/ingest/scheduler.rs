//! Daily job scheduler
//!
//! Each enabled job runs in its own task at a fixed KST wall-clock hour. A job
//! is awaited before its next run is computed, so a slow run delays the next
//! one instead of overlapping it.

use chrono::{DateTime, Duration as ChronoDuration, NaiveTime, Utc};
use std::fmt;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use super::config::JobsConfig;
use super::prefetch::{PrefetchOptions, Prefetcher};
use crate::notify::NotifyService;
use crate::welfare::deadline::{kst_to_utc, today_kst, utc_to_kst};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScheduledJob {
    Prefetch,
    DeadlineBroadcast,
    Notify,
}

impl ScheduledJob {
    pub const ALL: [ScheduledJob; 3] = [
        ScheduledJob::Prefetch,
        ScheduledJob::DeadlineBroadcast,
        ScheduledJob::Notify,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ScheduledJob::Prefetch => "prefetch-details",
            ScheduledJob::DeadlineBroadcast => "deadline-push",
            ScheduledJob::Notify => "notify",
        }
    }

    /// Configured KST hour, `None` when disabled
    pub fn hour(self, config: &JobsConfig) -> Option<u32> {
        match self {
            ScheduledJob::Prefetch => config.prefetch_hour,
            ScheduledJob::DeadlineBroadcast => config.deadline_push_hour,
            ScheduledJob::Notify => config.notify_hour,
        }
    }
}

impl fmt::Display for ScheduledJob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// First instant strictly after `now` whose KST wall clock reads `hour:minute`.
pub fn next_run_after(now: DateTime<Utc>, hour: u32, minute: u32) -> DateTime<Utc> {
    let at = NaiveTime::from_hms_opt(hour.min(23), minute.min(59), 0).unwrap_or(NaiveTime::MIN);
    let kst_now = utc_to_kst(now);

    let mut candidate = kst_now.date().and_time(at);
    if candidate <= kst_now {
        candidate += ChronoDuration::days(1);
    }
    kst_to_utc(candidate)
}

pub struct Scheduler {
    config: JobsConfig,
    prefetcher: Arc<Prefetcher>,
    notify: Arc<NotifyService>,
}

impl Scheduler {
    pub fn new(config: JobsConfig, prefetcher: Arc<Prefetcher>, notify: Arc<NotifyService>) -> Self {
        Self {
            config,
            prefetcher,
            notify,
        }
    }

    /// Spawn one loop per enabled job; they stop when `shutdown` is cancelled.
    pub fn spawn(self, shutdown: CancellationToken) -> Vec<JoinHandle<()>> {
        if !self.config.enabled {
            info!("Background jobs disabled");
            return Vec::new();
        }

        let scheduler = Arc::new(self);
        ScheduledJob::ALL
            .into_iter()
            .filter_map(|job| {
                let Some(hour) = job.hour(&scheduler.config) else {
                    info!(job = %job, "Job disabled");
                    return None;
                };
                let scheduler = Arc::clone(&scheduler);
                let shutdown = shutdown.clone();
                Some(tokio::spawn(async move {
                    scheduler.job_loop(job, hour, shutdown).await;
                }))
            })
            .collect()
    }

    async fn job_loop(&self, job: ScheduledJob, hour: u32, shutdown: CancellationToken) {
        loop {
            let now = Utc::now();
            let next = next_run_after(now, hour, 0);
            let wait = (next - now).to_std().unwrap_or_default();
            info!(job = %job, next_run = %next, "Job scheduled");

            tokio::select! {
                _ = shutdown.cancelled() => break,
                _ = tokio::time::sleep(wait) => {},
            }

            tokio::select! {
                _ = shutdown.cancelled() => {
                    info!(job = %job, "Job interrupted by shutdown");
                    break;
                },
                _ = self.run(job) => {},
            }
        }
        info!(job = %job, "Job loop stopped");
    }

    /// Run one job now; failures are logged.
    pub async fn run(&self, job: ScheduledJob) {
        info!(job = %job, "Job started");
        let today = today_kst();

        let outcome = match job {
            ScheduledJob::Prefetch => self
                .prefetcher
                .run(PrefetchOptions::scheduled(self.prefetcher.config()))
                .await
                .map(|r| format!("fetched={} failed={} quota_hit={}", r.fetched, r.failed, r.quota_hit))
                .map_err(|e| e.to_string()),
            ScheduledJob::DeadlineBroadcast => self
                .notify
                .deadline_broadcast(today)
                .await
                .map(|r| format!("sent={} failed={} urgent={}", r.stats.sent, r.stats.failed, r.urgent_count))
                .map_err(|e| e.to_string()),
            ScheduledJob::Notify => self
                .notify
                .notify_subscribers(today)
                .await
                .map(|r| format!("sent={} failed={} benefits={}", r.stats.sent, r.stats.failed, r.benefits))
                .map_err(|e| e.to_string()),
        };

        match outcome {
            Ok(summary) => info!(job = %job, summary = %summary, "Job finished"),
            Err(e) => error!(job = %job, error = %e, "Job failed"),
        }
    }
}
