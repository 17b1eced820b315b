//! Background ingestion
//!
//! - **config**: job hours and prefetch batching (`*_HOUR_KST`, `PREFETCH_*`)
//! - **prefetch**: warms the detail cache from the live list
//! - **scheduler**: runs the daily jobs at fixed KST times

pub mod config;
pub mod prefetch;
pub mod scheduler;

pub use config::{JobsConfig, PrefetchConfig};
pub use prefetch::{PrefetchError, PrefetchOptions, PrefetchReport, Prefetcher, SkipCached};
pub use scheduler::{next_run_after, ScheduledJob, Scheduler};
