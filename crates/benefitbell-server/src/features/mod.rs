//! HTTP feature slices
//!
//! Each slice owns its routes and its request types:
//!
//! - **benefits**: list, urgent and detail lookups over the catalog
//! - **recommend**: profile based ranking
//! - **push**: Web Push subscriptions and manual broadcasts
//! - **cron**: prefetch and notify triggers for an external scheduler
//!
//! Read operations live under `queries/`, write operations under `commands`.

pub mod benefits;
pub mod cron;
pub mod push;
pub mod recommend;

use axum::Router;
use std::sync::Arc;

use crate::catalog::Catalog;
use crate::ingest::Prefetcher;
use crate::middleware::CronAuth;
use crate::notify::NotifyService;

/// Shared state for all feature routes
#[derive(Clone)]
pub struct FeatureState {
    pub catalog: Arc<Catalog>,
    pub notify: Arc<NotifyService>,
    pub prefetcher: Arc<Prefetcher>,
    /// Guards `/push/send`, `/push/cron-deadline` and `/cron/*`
    pub cron: CronAuth,
}

/// Creates the API router with every feature slice mounted under its prefix.
pub fn router(state: FeatureState) -> Router<()> {
    let cron_state = cron::CronState {
        prefetcher: state.prefetcher.clone(),
        notify: state.notify.clone(),
    };

    Router::new()
        .nest("/benefits", benefits::benefits_routes().with_state(state.catalog.clone()))
        .nest("/recommend", recommend::recommend_routes().with_state(state.catalog.clone()))
        .nest("/push", push::push_routes(state.cron.clone()).with_state(state.notify.clone()))
        .nest("/cron", cron::cron_routes(state.cron).with_state(cron_state))
}
