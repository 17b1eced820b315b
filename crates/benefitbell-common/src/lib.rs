//! BenefitBell Common Library
#![deny(clippy::unwrap_used, clippy::expect_used)]
//!
//! Shared types, logging, and error handling for the BenefitBell workspace.
//!
//! # Overview
//!
//! - **Error Handling**: [`CommonError`] for the shared domain types
//! - **Logging**: tracing subscriber setup driven by `LOG_*` variables
//! - **Types**: benefit categories and application status
//!
//! # Example
//!
//! ```no_run
//! use benefitbell_common::logging::{init_logging, LogConfig};
//! use benefitbell_common::types::BenefitCategory;
//!
//! fn main() -> anyhow::Result<()> {
//!     let _guard = init_logging(&LogConfig::from_env()?)?;
//!     let category: BenefitCategory = "youth".parse()?;
//!     tracing::info!(category = %category, "parsed");
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod logging;
pub mod types;

// Re-export commonly used types
pub use error::{CommonError, Result};
pub use types::{BenefitCategory, BenefitStatus};
