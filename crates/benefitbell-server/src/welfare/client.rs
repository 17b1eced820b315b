//! HTTP client for the National Welfare Information API
//!
//! Two endpoints are used:
//!
//! - `NationalWelfarelistV001` (`callTp=L`): paginated service list
//! - `NationalWelfaredetailedV001` (`callTp=D`): one service by `servId`
//!
//! Both answer XML even when JSON is requested. The list endpoint rejects
//! requests without `srchKeyCode=001`.

use chrono::Utc;
use futures::future::join_all;
use reqwest::StatusCode;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

use super::config::WelfareConfig;
use super::models::{WelfareDetail, WelfareListItem, LIST_ITEM_TAG};
use super::xml::{blocks, tag_value};

const LIST_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Bodies shorter than this are truncated or error pages
const MIN_DETAIL_BODY_LEN: usize = 50;

/// Result codes meaning the servId does not exist
const NOT_FOUND_RESULT_CODES: [&str; 2] = ["30", "99"];

#[derive(Error, Debug)]
pub enum WelfareError {
    #[error("DATA_GO_KR_SERVICE_KEY is not configured")]
    MissingServiceKey,

    #[error("data.go.kr request quota exceeded")]
    QuotaExceeded,

    #[error("Welfare service '{serv_id}' not found: {message}")]
    NotFound { serv_id: String, message: String },

    #[error("HTTP {0}")]
    Status(u16),

    #[error("API error {code}: {message}")]
    Api { code: String, message: String },

    #[error("Empty response")]
    EmptyBody,

    #[error("Timeout")]
    Timeout,

    #[error("Request failed: {0}")]
    Transport(reqwest::Error),

    #[error("Failed after {attempts} attempts: {last_error}")]
    RetriesExhausted { attempts: u32, last_error: String },
}

impl WelfareError {
    /// Whether another attempt could succeed
    pub fn is_retryable(&self) -> bool {
        !matches!(
            self,
            WelfareError::MissingServiceKey
                | WelfareError::QuotaExceeded
                | WelfareError::NotFound { .. }
                | WelfareError::RetriesExhausted { .. }
        )
    }
}

fn transport_error(e: reqwest::Error) -> WelfareError {
    if e.is_timeout() {
        WelfareError::Timeout
    } else {
        WelfareError::Transport(e)
    }
}

/// Delay between detail attempts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backoff {
    /// `base × n` before retry `n`
    Linear(Duration),
    Fixed(Duration),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    /// Per-attempt timeout
    pub timeout: Duration,
    pub backoff: Backoff,
}

impl RetryPolicy {
    /// Used when a user is waiting on the response
    pub fn interactive() -> Self {
        Self {
            max_attempts: 3,
            timeout: Duration::from_secs(8),
            backoff: Backoff::Linear(Duration::from_millis(600)),
        }
    }

    /// Used by the prefetch job, which is quota bound rather than latency bound
    pub fn batch() -> Self {
        Self {
            max_attempts: 2,
            timeout: Duration::from_secs(8),
            backoff: Backoff::Fixed(Duration::from_secs(2)),
        }
    }

    /// Sleep before 1-based `attempt`; nothing before the first.
    pub fn delay_before(&self, attempt: u32) -> Duration {
        if attempt <= 1 {
            return Duration::ZERO;
        }
        match self.backoff {
            Backoff::Linear(base) => base * (attempt - 1),
            Backoff::Fixed(delay) => delay,
        }
    }
}

/// One page of the list endpoint
#[derive(Debug, Clone)]
pub struct ListPage {
    pub total_count: u64,
    pub items: Vec<WelfareListItem>,
}

#[derive(Debug, Clone)]
pub struct WelfareClient {
    http: reqwest::Client,
    config: WelfareConfig,
}

impl WelfareClient {
    pub fn new(config: WelfareConfig) -> Result<Self, WelfareError> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("benefitbell/", env!("CARGO_PKG_VERSION")))
            .connect_timeout(CONNECT_TIMEOUT)
            .build()
            .map_err(WelfareError::Transport)?;

        Ok(Self { http, config })
    }

    pub fn config(&self) -> &WelfareConfig {
        &self.config
    }

    pub fn has_service_key(&self) -> bool {
        self.config.effective_service_key().is_some()
    }

    fn service_key(&self) -> Result<&str, WelfareError> {
        self.config
            .effective_service_key()
            .ok_or(WelfareError::MissingServiceKey)
    }

    // Portal keys are usually issued pre-encoded, so the key is not re-encoded.
    fn list_url(&self, key: &str, page: u32, rows: u32) -> String {
        format!(
            "{}/NationalWelfarelistV001?serviceKey={}&callTp=L&srchKeyCode=001&pageNo={}&numOfRows={}",
            self.config.base_url.trim_end_matches('/'),
            key,
            page,
            rows
        )
    }

    fn detail_url(&self, key: &str, serv_id: &str) -> String {
        format!(
            "{}/NationalWelfaredetailedV001?serviceKey={}&callTp=D&servId={}",
            self.config.base_url.trim_end_matches('/'),
            key,
            serv_id
        )
    }

    /// Fetch one list page.
    pub async fn fetch_list_page(&self, page: u32, rows: u32) -> Result<ListPage, WelfareError> {
        let url = self.list_url(self.service_key()?, page, rows);

        let response = self
            .http
            .get(&url)
            .timeout(LIST_REQUEST_TIMEOUT)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(WelfareError::QuotaExceeded);
        }
        if !status.is_success() {
            return Err(WelfareError::Status(status.as_u16()));
        }

        let body = response.text().await.map_err(transport_error)?;

        let code = tag_value(&body, "resultCode");
        if code != "0" && code != "00" {
            return Err(WelfareError::Api {
                message: tag_value(&body, "resultMessage"),
                code,
            });
        }

        let total_count = tag_value(&body, "totalCount").parse().unwrap_or(0);
        let items = blocks(&body, LIST_ITEM_TAG)
            .into_iter()
            .map(WelfareListItem::from_block)
            .collect();

        Ok(ListPage { total_count, items })
    }

    /// Fetch every list page, bounded by `max_pages`.
    ///
    /// Page 1 must succeed; later pages run concurrently and a failed one only
    /// shortens the result.
    pub async fn fetch_all_list(&self) -> Result<Vec<WelfareListItem>, WelfareError> {
        let rows = self.config.list_rows.max(1);
        let first = self.fetch_list_page(1, rows).await?;

        let total_pages = first
            .total_count
            .div_ceil(u64::from(rows))
            .min(u64::from(self.config.max_pages)) as u32;

        info!(
            total_count = first.total_count,
            pages = total_pages,
            first_page_items = first.items.len(),
            "Fetched first welfare list page"
        );

        let mut items = first.items;
        if total_pages > 1 {
            let pages = join_all((2..=total_pages).map(|page| async move {
                (page, self.fetch_list_page(page, rows).await)
            }))
            .await;

            for (page, result) in pages {
                match result {
                    Ok(list_page) => items.extend(list_page.items),
                    Err(e) => warn!(page, error = %e, "Welfare list page failed, skipping"),
                }
            }
        }

        info!(items = items.len(), "Welfare list fetched");
        Ok(items)
    }

    /// Fetch one service detail, retrying according to `policy`.
    pub async fn fetch_detail(
        &self,
        serv_id: &str,
        policy: &RetryPolicy,
    ) -> Result<WelfareDetail, WelfareError> {
        let url = self.detail_url(self.service_key()?, serv_id);
        let attempts = policy.max_attempts.max(1);
        let mut last_error = None;

        for attempt in 1..=attempts {
            let delay = policy.delay_before(attempt);
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }

            match self.fetch_detail_once(&url, serv_id, policy.timeout).await {
                Ok(detail) => {
                    if attempt > 1 {
                        debug!(serv_id, attempt, "Detail fetched after retry");
                    }
                    return Ok(detail);
                },
                Err(e) if !e.is_retryable() => return Err(e),
                Err(e) => {
                    warn!(serv_id, attempt, max_attempts = attempts, error = %e, "Detail attempt failed");
                    last_error = Some(e);
                },
            }
        }

        Err(WelfareError::RetriesExhausted {
            attempts,
            last_error: last_error
                .map(|e| e.to_string())
                .unwrap_or_else(|| "Unknown error".to_string()),
        })
    }

    async fn fetch_detail_once(
        &self,
        url: &str,
        serv_id: &str,
        timeout: Duration,
    ) -> Result<WelfareDetail, WelfareError> {
        let response = self
            .http
            .get(url)
            .timeout(timeout)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(WelfareError::QuotaExceeded);
        }
        if !status.is_success() {
            return Err(WelfareError::Status(status.as_u16()));
        }

        let body = response.text().await.map_err(transport_error)?;
        if body.len() < MIN_DETAIL_BODY_LEN {
            return Err(WelfareError::EmptyBody);
        }

        let code = tag_value(&body, "resultCode");
        if !code.is_empty() && code != "0" && code != "00" {
            let message = match tag_value(&body, "resultMessage") {
                m if m.is_empty() => format!("resultCode: {code}"),
                m => m,
            };
            if NOT_FOUND_RESULT_CODES.contains(&code.as_str()) {
                return Err(WelfareError::NotFound {
                    serv_id: serv_id.to_string(),
                    message,
                });
            }
            return Err(WelfareError::Api { code, message });
        }

        Ok(WelfareDetail::from_xml(serv_id, &body, Utc::now()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets() {
        let interactive = RetryPolicy::interactive();
        assert_eq!(interactive.max_attempts, 3);
        assert_eq!(interactive.timeout, Duration::from_secs(8));

        let batch = RetryPolicy::batch();
        assert_eq!(batch.max_attempts, 2);
        assert_eq!(batch.backoff, Backoff::Fixed(Duration::from_secs(2)));
    }

    #[test]
    fn test_linear_backoff() {
        let policy = RetryPolicy::interactive();
        assert_eq!(policy.delay_before(1), Duration::ZERO);
        assert_eq!(policy.delay_before(2), Duration::from_millis(600));
        assert_eq!(policy.delay_before(3), Duration::from_millis(1200));
    }

    #[test]
    fn test_fixed_backoff() {
        let policy = RetryPolicy::batch();
        assert_eq!(policy.delay_before(1), Duration::ZERO);
        assert_eq!(policy.delay_before(2), Duration::from_secs(2));
    }

    #[test]
    fn test_retryable_classification() {
        assert!(WelfareError::Timeout.is_retryable());
        assert!(WelfareError::Status(502).is_retryable());
        assert!(WelfareError::EmptyBody.is_retryable());
        assert!(!WelfareError::QuotaExceeded.is_retryable());
        assert!(!WelfareError::MissingServiceKey.is_retryable());
        assert!(!WelfareError::NotFound { serv_id: "x".into(), message: "m".into() }.is_retryable());
    }

    #[test]
    fn test_urls() {
        let client = WelfareClient::new(WelfareConfig {
            base_url: "http://localhost:9/api/".into(),
            ..Default::default()
        })
        .unwrap();

        assert_eq!(
            client.list_url("K", 2, 500),
            "http://localhost:9/api/NationalWelfarelistV001?serviceKey=K&callTp=L&srchKeyCode=001&pageNo=2&numOfRows=500"
        );
        assert_eq!(
            client.detail_url("K", "WLF1"),
            "http://localhost:9/api/NationalWelfaredetailedV001?serviceKey=K&callTp=D&servId=WLF1"
        );
    }

    #[tokio::test]
    async fn test_missing_key_short_circuits() {
        let client = WelfareClient::new(WelfareConfig::default()).unwrap();
        assert!(!client.has_service_key());
        assert!(matches!(
            client.fetch_detail("WLF1", &RetryPolicy::interactive()).await,
            Err(WelfareError::MissingServiceKey)
        ));
        assert!(matches!(client.fetch_all_list().await, Err(WelfareError::MissingServiceKey)));
    }
}
