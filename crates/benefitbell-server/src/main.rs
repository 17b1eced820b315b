//! BenefitBell Server - Main entry point

use anyhow::Result;
use benefitbell_common::logging::{init_logging, LogConfig};
use std::{net::SocketAddr, sync::Arc, time::Duration};
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::info;

use benefitbell_server::{
    api,
    catalog::{Catalog, StaticFallback},
    config::{Config, NotifyConfig},
    db::{self, PgDetailStore, PgSubscriptionStore},
    features::FeatureState,
    ingest::{Prefetcher, Scheduler},
    middleware::CronAuth,
    notify::{LogNotifier, Notifier, NotifyService, RelayNotifier},
    welfare::WelfareClient,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging with configuration from environment
    let log_config = LogConfig::builder()
        .log_file_prefix("benefitbell-server")
        .filter_directives("benefitbell_server=debug,tower_http=debug,sqlx=warn")
        .build()
        .merge_env()?;

    let _log_guard = init_logging(&log_config)?;

    info!("Starting BenefitBell Server");

    let config = Config::load()?;
    info!(
        "Configuration loaded - server will bind to {}:{}",
        config.server.host, config.server.port
    );

    let pool = db::create_pool(&config.database).await?;
    info!("Database connection pool established");

    db::migrate(&pool).await?;

    let client = Arc::new(WelfareClient::new(config.welfare.clone())?);
    if !client.has_service_key() {
        tracing::warn!("DATA_GO_KR_SERVICE_KEY is not set - serving bundled benefits only");
    }

    let fallback = StaticFallback::bundled()?;
    info!(benefits = fallback.len(), "Bundled fallback catalog loaded");

    let catalog = Arc::new(Catalog::new(
        client,
        Arc::new(PgDetailStore::new(pool.clone())),
        fallback,
    ));

    let notify = Arc::new(NotifyService::new(
        catalog.clone(),
        Arc::new(PgSubscriptionStore::new(pool.clone())),
        notifier(&config.notify)?,
    ));

    let prefetcher = Arc::new(Prefetcher::new(catalog.clone(), config.jobs.prefetch.clone()));

    // Start background jobs
    let shutdown = CancellationToken::new();
    let job_handles =
        Scheduler::new(config.jobs.clone(), prefetcher.clone(), notify.clone()).spawn(shutdown.clone());
    info!(jobs = job_handles.len(), "Background jobs started");

    let state = FeatureState {
        catalog,
        notify,
        prefetcher,
        cron: CronAuth::new(config.notify.cron_secret.clone()),
    };
    let app = api::router(state, &config.cors);

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    // Start server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(config.server.shutdown_timeout_secs))
        .await?;

    shutdown.cancel();
    for handle in job_handles {
        if let Err(e) = handle.await {
            tracing::error!("Background job panicked: {}", e);
        }
    }

    info!("Server shut down gracefully");

    Ok(())
}

fn notifier(config: &NotifyConfig) -> Result<Arc<dyn Notifier>> {
    match &config.relay_url {
        Some(url) => {
            info!(relay = %url, "Push relay configured");
            Ok(Arc::new(RelayNotifier::new(url.clone(), config.relay_token.clone())?))
        },
        None => {
            tracing::warn!("PUSH_RELAY_URL is not set - notifications will only be logged");
            Ok(Arc::new(LogNotifier))
        },
    }
}

/// Graceful shutdown signal handler
async fn shutdown_signal(timeout_secs: u64) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            },
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
            },
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, starting graceful shutdown");
        },
        _ = terminate => {
            info!("Received terminate signal, starting graceful shutdown");
        },
    }

    // Give ongoing requests time to complete
    info!("Waiting up to {} seconds for connections to close", timeout_secs);
    tokio::time::sleep(Duration::from_secs(timeout_secs.min(5))).await;
}
