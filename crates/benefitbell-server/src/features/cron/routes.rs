use axum::{
    extract::{Query, State},
    middleware::from_fn_with_state,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;

use super::CronState;
use crate::error::AppError;
use crate::ingest::{PrefetchOptions, SkipCached};
use crate::middleware::{require_cron_secret, CronAuth};
use crate::welfare::deadline::today_kst;

#[derive(Debug, Default, Deserialize)]
pub struct PrefetchParams {
    /// Refetch rows regardless of age
    #[serde(default)]
    pub force: bool,
    #[serde(default)]
    pub dry: bool,
}

impl PrefetchParams {
    pub fn options(&self, state: &CronState) -> PrefetchOptions {
        let mut options = PrefetchOptions::scheduled(state.prefetcher.config());
        if self.force {
            options.skip = SkipCached::Nothing;
        }
        options.dry_run = self.dry;
        options
    }
}

pub fn cron_routes(auth: CronAuth) -> Router<CronState> {
    Router::new()
        .route("/prefetch-details", get(prefetch_details))
        .route("/notify", get(notify))
        .route_layer(from_fn_with_state(auth, require_cron_secret))
}

#[tracing::instrument(skip(state))]
async fn prefetch_details(
    State(state): State<CronState>,
    Query(params): Query<PrefetchParams>,
) -> Result<Response, AppError> {
    let report = state.prefetcher.run(params.options(&state)).await?;
    Ok(Json(json!({ "ok": true, "report": report })).into_response())
}

#[tracing::instrument(skip(state))]
async fn notify(State(state): State<CronState>) -> Result<Response, AppError> {
    let report = state.notify.notify_subscribers(today_kst()).await?;
    Ok(Json(json!({ "ok": true, "report": report })).into_response())
}
