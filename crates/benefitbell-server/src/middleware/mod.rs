//! Middleware for the BenefitBell server
//!
//! - CORS (Cross-Origin Resource Sharing)
//! - Request logging with tracing
//! - Bearer-secret guard for cron routes

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap, Method},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use crate::config::CorsConfig;
use crate::error::AppError;

/// Create CORS layer from configuration
pub fn cors_layer(config: &CorsConfig) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([
            header::ACCEPT,
            header::ACCEPT_LANGUAGE,
            header::CONTENT_LANGUAGE,
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
        ])
        .max_age(Duration::from_secs(3600));

    // tower-http refuses credentials together with a wildcard origin
    if config.allowed_origins.is_empty() || config.allowed_origins.iter().any(|o| o == "*") {
        return cors.allow_origin(Any);
    }

    let origins: Vec<_> = config
        .allowed_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    cors.allow_origin(origins)
        .allow_credentials(config.allow_credentials)
}

/// Create tracing/logging layer
pub fn tracing_layer(
) -> TraceLayer<tower_http::classify::SharedClassifier<tower_http::classify::ServerErrorsAsFailures>>
{
    TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
        .on_response(
            DefaultOnResponse::new()
                .level(Level::INFO)
                .latency_unit(tower_http::LatencyUnit::Micros),
        )
}

/// Shared secret for cron routes; `None` leaves them open
#[derive(Debug, Clone, Default)]
pub struct CronAuth {
    secret: Option<Arc<str>>,
}

impl CronAuth {
    pub fn new(secret: Option<String>) -> Self {
        Self {
            secret: secret
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .map(Arc::from),
        }
    }

    pub fn is_authorized(&self, headers: &HeaderMap) -> bool {
        let Some(secret) = &self.secret else {
            return true;
        };

        headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .is_some_and(|token| token == secret.as_ref())
    }
}

/// Reject cron requests without `Authorization: Bearer {CRON_SECRET}`.
pub async fn require_cron_secret(
    State(auth): State<CronAuth>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    if !auth.is_authorized(request.headers()) {
        tracing::warn!(path = %request.uri().path(), "Rejected cron request");
        return Err(AppError::Unauthorized("Invalid cron secret".to_string()));
    }
    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(auth: Option<&str>) -> HeaderMap {
        let mut headers = HeaderMap::new();
        if let Some(value) = auth {
            headers.insert(header::AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        }
        headers
    }

    #[test]
    fn test_cors_layer_with_specific_origins() {
        let config = CorsConfig {
            allowed_origins: vec![
                "http://localhost:3000".to_string(),
                "https://benefitbell.kr".to_string(),
            ],
            allow_credentials: true,
        };

        let _layer = cors_layer(&config);
    }

    #[test]
    fn test_cors_layer_with_wildcard_and_credentials() {
        let config = CorsConfig {
            allowed_origins: vec!["*".to_string()],
            allow_credentials: true,
        };

        let _layer = cors_layer(&config);
    }

    #[test]
    fn test_cron_auth_open_without_secret() {
        let auth = CronAuth::new(None);
        assert!(auth.is_authorized(&headers(None)));

        let blank = CronAuth::new(Some("  ".to_string()));
        assert!(blank.is_authorized(&headers(None)));
    }

    #[test]
    fn test_cron_auth_requires_bearer() {
        let auth = CronAuth::new(Some("s3cret".to_string()));
        assert!(auth.is_authorized(&headers(Some("Bearer s3cret"))));
        assert!(!auth.is_authorized(&headers(Some("Bearer wrong"))));
        assert!(!auth.is_authorized(&headers(Some("s3cret"))));
        assert!(!auth.is_authorized(&headers(None)));
    }
}
