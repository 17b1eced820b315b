//! data.go.kr client configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::env_or;

pub const DEFAULT_API_BASE_URL: &str =
    "https://apis.data.go.kr/B554287/NationalWelfareInformationsV001";

/// Rows requested per list page
pub const DEFAULT_LIST_ROWS: u32 = 500;

/// Upper bound on list pages fetched per refresh
pub const DEFAULT_MAX_PAGES: u32 = 10;

pub const DEFAULT_LIST_TTL_SECS: u64 = 3600;

pub const DEFAULT_DETAIL_TTL_SECS: u64 = 86_400;

/// Value shipped in sample env files; treated as no key
pub const PLACEHOLDER_SERVICE_KEY: &str = "placeholder";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WelfareConfig {
    /// data.go.kr service key, used verbatim in the query string
    #[serde(skip_serializing)]
    pub service_key: Option<String>,
    pub base_url: String,
    pub list_rows: u32,
    pub max_pages: u32,
    pub list_ttl_secs: u64,
    pub detail_ttl_secs: u64,
}

impl Default for WelfareConfig {
    fn default() -> Self {
        Self {
            service_key: None,
            base_url: DEFAULT_API_BASE_URL.to_string(),
            list_rows: DEFAULT_LIST_ROWS,
            max_pages: DEFAULT_MAX_PAGES,
            list_ttl_secs: DEFAULT_LIST_TTL_SECS,
            detail_ttl_secs: DEFAULT_DETAIL_TTL_SECS,
        }
    }
}

impl WelfareConfig {
    pub fn from_env() -> Self {
        Self {
            service_key: std::env::var("DATA_GO_KR_SERVICE_KEY").ok(),
            base_url: std::env::var("WELFARE_API_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_API_BASE_URL.to_string()),
            list_rows: env_or("WELFARE_LIST_ROWS", DEFAULT_LIST_ROWS),
            max_pages: env_or("WELFARE_MAX_PAGES", DEFAULT_MAX_PAGES),
            list_ttl_secs: env_or("WELFARE_LIST_TTL_SECS", DEFAULT_LIST_TTL_SECS),
            detail_ttl_secs: env_or("WELFARE_DETAIL_TTL_SECS", DEFAULT_DETAIL_TTL_SECS),
        }
    }

    /// The service key, unless unset, blank, or the placeholder value.
    pub fn effective_service_key(&self) -> Option<&str> {
        self.service_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty() && *key != PLACEHOLDER_SERVICE_KEY)
    }

    pub fn list_ttl(&self) -> Duration {
        Duration::from_secs(self.list_ttl_secs)
    }

    pub fn detail_ttl(&self) -> Duration {
        Duration::from_secs(self.detail_ttl_secs)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.list_rows == 0 {
            anyhow::bail!("WELFARE_LIST_ROWS must be greater than 0");
        }
        if self.max_pages == 0 {
            anyhow::bail!("WELFARE_MAX_PAGES must be greater than 0");
        }
        if self.effective_service_key().is_none() {
            tracing::warn!("DATA_GO_KR_SERVICE_KEY is not configured - serving the static benefit list");
        }
        Ok(())
    }
}
