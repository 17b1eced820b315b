//! Background job configuration
//!
//! Hours are KST wall-clock hours. Setting a job's hour variable to `off`
//! disables that job; `JOBS_ENABLED=false` disables the scheduler entirely.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::env_or;

pub const DEFAULT_PREFETCH_HOUR_KST: u32 = 2;
pub const DEFAULT_DEADLINE_PUSH_HOUR_KST: u32 = 9;
pub const DEFAULT_NOTIFY_HOUR_KST: u32 = 10;

/// Details fetched concurrently per batch
pub const DEFAULT_PREFETCH_BATCH_SIZE: usize = 5;

pub const DEFAULT_PREFETCH_BATCH_DELAY_MS: u64 = 2000;

/// Cached rows younger than this are not refetched by the scheduled prefetch
pub const DEFAULT_PREFETCH_SKIP_FRESH_HOURS: u64 = 12;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PrefetchConfig {
    pub batch_size: usize,
    pub batch_delay_ms: u64,
    pub skip_fresh_hours: u64,
}

impl Default for PrefetchConfig {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_PREFETCH_BATCH_SIZE,
            batch_delay_ms: DEFAULT_PREFETCH_BATCH_DELAY_MS,
            skip_fresh_hours: DEFAULT_PREFETCH_SKIP_FRESH_HOURS,
        }
    }
}

impl PrefetchConfig {
    pub fn from_env() -> Self {
        Self {
            batch_size: env_or("PREFETCH_BATCH_SIZE", DEFAULT_PREFETCH_BATCH_SIZE),
            batch_delay_ms: env_or("PREFETCH_BATCH_DELAY_MS", DEFAULT_PREFETCH_BATCH_DELAY_MS),
            skip_fresh_hours: env_or("PREFETCH_SKIP_FRESH_HOURS", DEFAULT_PREFETCH_SKIP_FRESH_HOURS),
        }
    }

    pub fn batch_delay(&self) -> Duration {
        Duration::from_millis(self.batch_delay_ms)
    }

    pub fn skip_fresh(&self) -> Duration {
        Duration::from_secs(self.skip_fresh_hours * 3600)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct JobsConfig {
    pub enabled: bool,
    /// `None` disables the job
    pub prefetch_hour: Option<u32>,
    pub deadline_push_hour: Option<u32>,
    pub notify_hour: Option<u32>,
    pub prefetch: PrefetchConfig,
}

impl Default for JobsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            prefetch_hour: Some(DEFAULT_PREFETCH_HOUR_KST),
            deadline_push_hour: Some(DEFAULT_DEADLINE_PUSH_HOUR_KST),
            notify_hour: Some(DEFAULT_NOTIFY_HOUR_KST),
            prefetch: PrefetchConfig::default(),
        }
    }
}

/// `off`/`disabled`/`none` → `None`; unset or unparsable → default.
fn job_hour(key: &str, default: u32) -> Option<u32> {
    match std::env::var(key) {
        Ok(value) => match value.trim().to_lowercase().as_str() {
            "off" | "disabled" | "none" => None,
            other => Some(other.parse().unwrap_or(default)),
        },
        Err(_) => Some(default),
    }
}

impl JobsConfig {
    pub fn from_env() -> Self {
        Self {
            enabled: env_or("JOBS_ENABLED", true),
            prefetch_hour: job_hour("PREFETCH_HOUR_KST", DEFAULT_PREFETCH_HOUR_KST),
            deadline_push_hour: job_hour("DEADLINE_PUSH_HOUR_KST", DEFAULT_DEADLINE_PUSH_HOUR_KST),
            notify_hour: job_hour("NOTIFY_HOUR_KST", DEFAULT_NOTIFY_HOUR_KST),
            prefetch: PrefetchConfig::from_env(),
        }
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        for (name, hour) in [
            ("PREFETCH_HOUR_KST", self.prefetch_hour),
            ("DEADLINE_PUSH_HOUR_KST", self.deadline_push_hour),
            ("NOTIFY_HOUR_KST", self.notify_hour),
        ] {
            if let Some(hour) = hour {
                if hour > 23 {
                    anyhow::bail!("{} must be between 0 and 23, got {}", name, hour);
                }
            }
        }

        if self.prefetch.batch_size == 0 {
            anyhow::bail!("PREFETCH_BATCH_SIZE must be greater than 0");
        }

        Ok(())
    }
}
