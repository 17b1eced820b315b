use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use std::sync::Arc;

use super::queries::{
    get_benefit, list_benefits, urgent_benefits, GetBenefitError, ListBenefitsError,
    ListBenefitsQuery, UrgentBenefitsError, UrgentBenefitsQuery,
};
use crate::api::response::ApiResponse;
use crate::catalog::Catalog;
use crate::error::AppError;
use crate::welfare::deadline::today_kst;

pub fn benefits_routes() -> Router<Arc<Catalog>> {
    Router::new()
        .route("/", get(list))
        .route("/urgent", get(urgent))
        .route("/:id", get(detail))
}

#[tracing::instrument(
    skip(catalog, query),
    fields(category = ?query.category, keyword = ?query.keyword)
)]
async fn list(
    State(catalog): State<Arc<Catalog>>,
    Query(query): Query<ListBenefitsQuery>,
) -> Result<Response, AppError> {
    let response = list_benefits::handle(&catalog, query, today_kst()).await?;
    let total = response.benefits.len();

    tracing::debug!(count = total, source = %response.source, "Benefits listed");

    Ok(ApiResponse::success(response.benefits)
        .with_source(response.source.as_str())
        .with_total(total)
        .into_response())
}

#[tracing::instrument(skip(catalog, query), fields(days = ?query.days))]
async fn urgent(
    State(catalog): State<Arc<Catalog>>,
    Query(query): Query<UrgentBenefitsQuery>,
) -> Result<Response, AppError> {
    let benefits = urgent_benefits::handle(&catalog, query, today_kst()).await?;
    let total = benefits.len();

    Ok(ApiResponse::success(benefits).with_total(total).into_response())
}

#[tracing::instrument(skip(catalog))]
async fn detail(
    State(catalog): State<Arc<Catalog>>,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    let (detail, source) = get_benefit::handle(&catalog, &id).await?;

    Ok(ApiResponse::success(detail)
        .with_source(source.as_str())
        .into_response())
}

impl From<ListBenefitsError> for AppError {
    fn from(err: ListBenefitsError) -> Self {
        AppError::BadRequest(err.to_string())
    }
}

impl From<UrgentBenefitsError> for AppError {
    fn from(err: UrgentBenefitsError) -> Self {
        AppError::BadRequest(err.to_string())
    }
}

impl From<GetBenefitError> for AppError {
    fn from(err: GetBenefitError) -> Self {
        match err {
            GetBenefitError::InvalidId => AppError::BadRequest(err.to_string()),
            GetBenefitError::Welfare(e) => e.into(),
        }
    }
}
