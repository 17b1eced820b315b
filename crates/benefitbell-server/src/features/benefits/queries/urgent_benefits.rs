use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::catalog::Catalog;
use crate::welfare::Benefit;

pub const DEFAULT_URGENT_DAYS: i64 = 7;
pub const MAX_URGENT_DAYS: i64 = 30;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UrgentBenefitsQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub days: Option<i64>,
}

#[derive(Debug, thiserror::Error)]
pub enum UrgentBenefitsError {
    #[error("days must be between 0 and {MAX_URGENT_DAYS}")]
    InvalidDays,
}

impl UrgentBenefitsQuery {
    pub fn validate(&self) -> Result<(), UrgentBenefitsError> {
        if !(0..=MAX_URGENT_DAYS).contains(&self.days()) {
            return Err(UrgentBenefitsError::InvalidDays);
        }
        Ok(())
    }

    pub fn days(&self) -> i64 {
        self.days.unwrap_or(DEFAULT_URGENT_DAYS)
    }
}

#[tracing::instrument(skip(catalog))]
pub async fn handle(
    catalog: &Catalog,
    query: UrgentBenefitsQuery,
    today: NaiveDate,
) -> Result<Vec<Benefit>, UrgentBenefitsError> {
    query.validate()?;
    Ok(catalog.urgent(query.days(), today).await)
}
