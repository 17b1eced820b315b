use axum::{
    extract::State,
    middleware::from_fn_with_state,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use std::sync::Arc;

use super::commands::{BroadcastCommand, SubscribeCommand, SubscribeError, UnsubscribeCommand};
use crate::error::AppError;
use crate::middleware::{require_cron_secret, CronAuth};
use crate::notify::jobs::broadcast_payload;
use crate::notify::NotifyService;
use crate::welfare::deadline::today_kst;

pub fn push_routes(auth: CronAuth) -> Router<Arc<NotifyService>> {
    let protected = Router::new()
        .route("/send", post(send))
        .route("/cron-deadline", get(cron_deadline))
        .route_layer(from_fn_with_state(auth, require_cron_secret));

    Router::new()
        .route("/subscribe", post(subscribe).get(count).delete(unsubscribe))
        .merge(protected)
}

#[tracing::instrument(skip_all)]
async fn subscribe(
    State(notify): State<Arc<NotifyService>>,
    Json(command): Json<SubscribeCommand>,
) -> Result<Response, AppError> {
    let subscription = command.into_subscription()?;
    let store = notify.subscriptions();

    store.upsert(&subscription).await?;
    let total = store.count().await?;

    tracing::info!(categories = subscription.categories.len(), total, "Push subscription saved");
    Ok(Json(json!({ "success": true, "total": total })).into_response())
}

async fn count(State(notify): State<Arc<NotifyService>>) -> Result<Response, AppError> {
    let count = notify.subscriptions().count().await?;
    Ok(Json(json!({ "count": count })).into_response())
}

#[tracing::instrument(skip_all)]
async fn unsubscribe(
    State(notify): State<Arc<NotifyService>>,
    Json(command): Json<UnsubscribeCommand>,
) -> Result<Response, AppError> {
    command.validate()?;
    let removed = notify.subscriptions().remove(command.endpoint.trim()).await?;

    Ok(Json(json!({ "success": true, "removed": removed })).into_response())
}

#[tracing::instrument(skip_all)]
async fn send(
    State(notify): State<Arc<NotifyService>>,
    body: Option<Json<BroadcastCommand>>,
) -> Result<Response, AppError> {
    let BroadcastCommand { title, body, url } = body.map(|Json(b)| b).unwrap_or_default();
    let report = notify.broadcast(broadcast_payload(title, body, url)).await?;

    Ok(Json(report).into_response())
}

#[tracing::instrument(skip_all)]
async fn cron_deadline(State(notify): State<Arc<NotifyService>>) -> Result<Response, AppError> {
    let report = notify.deadline_broadcast(today_kst()).await?;
    Ok(Json(json!({ "ok": true, "report": report })).into_response())
}

impl From<SubscribeError> for AppError {
    fn from(err: SubscribeError) -> Self {
        AppError::BadRequest(err.to_string())
    }
}
