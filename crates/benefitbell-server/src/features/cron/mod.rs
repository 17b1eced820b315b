//! Endpoints an external scheduler calls instead of the in-process jobs

pub mod routes;

use std::sync::Arc;

use crate::ingest::Prefetcher;
use crate::notify::NotifyService;

pub use routes::{cron_routes, PrefetchParams};

#[derive(Clone)]
pub struct CronState {
    pub prefetcher: Arc<Prefetcher>,
    pub notify: Arc<NotifyService>,
}
