//! BenefitBell Server Library
//!
//! HTTP server that collects Korean public welfare programs from data.go.kr
//! and reminds subscribers before their application windows close.
//!
//! # Overview
//!
//! - **welfare**: data.go.kr client, XML parsing and the benefit transform
//! - **catalog**: tiered lookups (memory list, Postgres detail cache, bundled fallback)
//! - **ingest**: detail prefetch and the daily job scheduler
//! - **notify**: push subscriptions, payload building and delivery
//! - **recommend**: profile based ranking
//! - **features**: HTTP slices mounted under `/api`
//!
//! # Example
//!
//! ```no_run
//! use benefitbell_server::{catalog::{Catalog, MemoryDetailStore, StaticFallback}, welfare::{WelfareClient, WelfareConfig}};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let client = Arc::new(WelfareClient::new(WelfareConfig::from_env())?);
//!     let catalog = Catalog::new(client, Arc::new(MemoryDetailStore::new()), StaticFallback::bundled()?);
//!     let today = benefitbell_server::welfare::deadline::today_kst();
//!     for benefit in catalog.urgent(7, today).await {
//!         println!("{} D-{}", benefit.title, benefit.d_day);
//!     }
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod catalog;
pub mod config;
pub mod db;
pub mod error;
pub mod features;
pub mod ingest;
pub mod middleware;
pub mod notify;
pub mod recommend;
pub mod welfare;

// Re-export commonly used types
pub use error::{ApiResult, AppError};
