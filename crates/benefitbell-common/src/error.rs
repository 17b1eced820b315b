//! Error types shared across BenefitBell crates

use thiserror::Error;

/// Result type alias for common operations
pub type Result<T> = std::result::Result<T, CommonError>;

/// Errors raised by the shared domain types
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommonError {
    #[error("Unknown benefit category: {0}")]
    UnknownCategory(String),

    #[error("Unknown benefit status: {0}")]
    UnknownStatus(String),

    #[error("Configuration error: {0}")]
    Config(String),
}
