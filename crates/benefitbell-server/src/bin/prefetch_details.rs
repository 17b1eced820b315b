//! One-shot detail prefetch
//!
//! Fills the welfare detail cache outside the server process, e.g. from a
//! system cron during the quiet hours when the data.go.kr quota is unused.
//!
//! Usage:
//!   cargo run --bin prefetch-details -- [--force] [--dry] [--wait-for-window]
//!
//! Exit codes: 0 done, 1 error, 2 stopped on the daily quota.

use anyhow::{Context, Result};
use benefitbell_common::logging::{init_logging, LogConfig, LogOutput};
use chrono::{NaiveDateTime, Timelike, Utc};
use clap::Parser;
use std::process;
use std::sync::Arc;
use tracing::{error, info};

use benefitbell_server::{
    catalog::{Catalog, StaticFallback},
    config::Config,
    db::{self, PgDetailStore},
    ingest::{next_run_after, PrefetchOptions, Prefetcher},
    welfare::{deadline::utc_to_kst, WelfareClient},
};

const WINDOW_START_HOUR_KST: u32 = 1;
const WINDOW_END_HOUR_KST: u32 = 6;

#[derive(Debug, Parser)]
#[command(name = "prefetch-details", version, about = "Warm the welfare detail cache")]
struct Cli {
    /// Refetch every id, even ones already cached
    #[arg(long)]
    force: bool,

    /// List what would be fetched without calling the detail API
    #[arg(long)]
    dry: bool,

    /// Sleep until 01:00 KST unless already inside the 01:00-06:00 window
    #[arg(long)]
    wait_for_window: bool,
}

fn in_window(kst: NaiveDateTime) -> bool {
    (WINDOW_START_HOUR_KST..WINDOW_END_HOUR_KST).contains(&kst.hour())
}

async fn wait_for_window() {
    let now = Utc::now();
    if in_window(utc_to_kst(now)) {
        return;
    }

    let start = next_run_after(now, WINDOW_START_HOUR_KST, 0);
    info!(until = %start, "Waiting for the quiet window");
    tokio::time::sleep((start - now).to_std().unwrap_or_default()).await;
}

async fn run(cli: &Cli) -> Result<bool> {
    let config = Config::load()?;

    if cli.wait_for_window {
        wait_for_window().await;
    }

    let pool = db::create_pool(&config.database)
        .await
        .context("Failed to connect to the database")?;
    db::migrate(&pool).await?;

    let client = Arc::new(WelfareClient::new(config.welfare.clone())?);
    if !client.has_service_key() {
        anyhow::bail!("DATA_GO_KR_SERVICE_KEY must be set to prefetch details");
    }

    let catalog = Arc::new(Catalog::new(
        client,
        Arc::new(PgDetailStore::new(pool)),
        StaticFallback::empty(),
    ));
    let prefetcher = Prefetcher::new(catalog, config.jobs.prefetch.clone());

    let report = prefetcher
        .run(PrefetchOptions::manual(cli.force, cli.dry))
        .await?;

    info!(
        total = report.total,
        already_cached = report.already_cached,
        fetched = report.fetched,
        failed = report.failed,
        quota_hit = report.quota_hit,
        elapsed_secs = report.duration().as_secs(),
        "Prefetch finished"
    );
    if report.dry_run {
        for id in &report.planned_ids {
            println!("{}", id);
        }
    }

    Ok(report.quota_hit)
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let log_config = LogConfig::builder()
        .output(LogOutput::Console)
        .log_file_prefix("prefetch-details")
        .build();
    let log_config = log_config.merge_env().unwrap_or_default();
    let _guard = match init_logging(&log_config) {
        Ok(guard) => Some(guard),
        Err(e) => {
            eprintln!("Logging disabled: {}", e);
            None
        },
    };

    match run(&cli).await {
        Ok(false) => {},
        Ok(true) => {
            error!("Stopped early: daily API quota exhausted");
            process::exit(2);
        },
        Err(e) => {
            error!(error = %e, "Prefetch failed");
            eprintln!("Error: {:#}", e);
            process::exit(1);
        },
    }
}
