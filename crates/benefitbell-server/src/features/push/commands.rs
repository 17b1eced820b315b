use benefitbell_common::BenefitCategory;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::notify::PushSubscription;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubscriptionKeys {
    pub p256dh: String,
    pub auth: String,
}

/// Body of `POST /push/subscribe`, the browser's `PushSubscription.toJSON()`
/// plus an optional category filter
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubscribeCommand {
    pub endpoint: String,
    pub keys: SubscriptionKeys,
    #[serde(default)]
    pub categories: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnsubscribeCommand {
    pub endpoint: String,
}

/// Body of `POST /push/send`; missing fields use the default broadcast text
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BroadcastCommand {
    pub title: Option<String>,
    pub body: Option<String>,
    pub url: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum SubscribeError {
    #[error("endpoint must be an http(s) URL")]
    InvalidEndpoint,
    #[error("keys.p256dh and keys.auth are required")]
    MissingKeys,
    #[error("Unknown category: {0}")]
    InvalidCategory(String),
}

fn valid_endpoint(endpoint: &str) -> bool {
    let endpoint = endpoint.trim();
    endpoint.starts_with("https://") || endpoint.starts_with("http://")
}

impl SubscribeCommand {
    pub fn validate(&self) -> Result<(), SubscribeError> {
        if !valid_endpoint(&self.endpoint) {
            return Err(SubscribeError::InvalidEndpoint);
        }
        if self.keys.p256dh.trim().is_empty() || self.keys.auth.trim().is_empty() {
            return Err(SubscribeError::MissingKeys);
        }
        self.parsed_categories().map(|_| ())
    }

    fn parsed_categories(&self) -> Result<Vec<BenefitCategory>, SubscribeError> {
        let mut categories = Vec::with_capacity(self.categories.len());
        for slug in &self.categories {
            let category = slug
                .trim()
                .parse::<BenefitCategory>()
                .map_err(|_| SubscribeError::InvalidCategory(slug.clone()))?;
            if !categories.contains(&category) {
                categories.push(category);
            }
        }
        Ok(categories)
    }

    pub fn into_subscription(self) -> Result<PushSubscription, SubscribeError> {
        self.validate()?;
        let categories = self.parsed_categories()?;
        Ok(PushSubscription {
            endpoint: self.endpoint.trim().to_string(),
            p256dh: self.keys.p256dh,
            auth: self.keys.auth,
            categories,
            created_at: Utc::now(),
        })
    }
}

impl UnsubscribeCommand {
    pub fn validate(&self) -> Result<(), SubscribeError> {
        if !valid_endpoint(&self.endpoint) {
            return Err(SubscribeError::InvalidEndpoint);
        }
        Ok(())
    }
}
