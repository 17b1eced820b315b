use axum::{
    extract::{rejection::JsonRejection, State},
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use chrono::Datelike;
use std::sync::Arc;

use crate::api::response::ApiResponse;
use crate::catalog::Catalog;
use crate::error::{ApiResult, AppError};
use crate::recommend::{recommend, UserProfile};
use crate::welfare::deadline::today_kst;

pub fn recommend_routes() -> Router<Arc<Catalog>> {
    Router::new().route("/", post(ranked))
}

/// Without a JSON body the catalog order is returned unchanged; a JSON body
/// that is not a valid profile is rejected.
#[tracing::instrument(skip_all)]
async fn ranked(
    State(catalog): State<Arc<Catalog>>,
    profile: Result<Json<UserProfile>, JsonRejection>,
) -> ApiResult<Response> {
    let profile = match profile {
        Ok(Json(profile)) => Some(profile),
        Err(JsonRejection::MissingJsonContentType(_)) => None,
        Err(rejection) => {
            return Err(AppError::BadRequest(format!(
                "Invalid profile: {}",
                rejection.body_text()
            )))
        },
    };

    let today = today_kst();
    let (benefits, source) = catalog.benefits(today).await;

    let ranked = recommend(benefits, profile.as_ref(), today.year());
    let total = ranked.len();
    tracing::debug!(count = total, personalised = profile.is_some(), "Recommendations ranked");

    Ok(ApiResponse::success(ranked)
        .with_source(source.as_str())
        .with_total(total)
        .into_response())
}
