pub mod response;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::json;
use std::sync::Arc;
use tower_http::compression::CompressionLayer;

use crate::catalog::Catalog;
use crate::config::CorsConfig;
use crate::features::{self, FeatureState};
use crate::middleware;

/// Builds the full application: root routes, `/api/*` feature slices and the
/// middleware stack.
pub fn router(state: FeatureState, cors: &CorsConfig) -> Router {
    let root = Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .with_state(state.catalog.clone());

    root.nest("/api", features::router(state))
        // Apply layers from innermost to outermost
        .layer(CompressionLayer::new())
        .layer(middleware::tracing_layer())
        .layer(middleware::cors_layer(cors))
}

async fn root() -> impl IntoResponse {
    Json(json!({
        "name": "BenefitBell Server",
        "version": env!("CARGO_PKG_VERSION"),
        "status": "running"
    }))
}

async fn health(State(catalog): State<Arc<Catalog>>) -> Result<Response, StatusCode> {
    match catalog.health().await {
        Ok(()) => Ok((
            StatusCode::OK,
            Json(json!({
                "status": "healthy",
                "database": "connected",
                "serviceKey": catalog.client().has_service_key()
            })),
        )
            .into_response()),
        Err(e) => {
            tracing::error!("Detail store health check failed: {:?}", e);
            Err(StatusCode::SERVICE_UNAVAILABLE)
        },
    }
}
