use benefitbell_common::BenefitCategory;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::catalog::{BenefitFilter, Catalog, ListSource};
use crate::welfare::Benefit;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListBenefitsQuery {
    /// Category slug; `all` or absent means no filter
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keyword: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ListBenefitsResponse {
    pub benefits: Vec<Benefit>,
    pub source: ListSource,
}

#[derive(Debug, thiserror::Error)]
pub enum ListBenefitsError {
    #[error("Unknown category: {0}")]
    InvalidCategory(String),
}

impl ListBenefitsQuery {
    pub fn filter(&self) -> Result<BenefitFilter, ListBenefitsError> {
        let category = match self.category.as_deref().map(str::trim) {
            None | Some("") | Some("all") => None,
            Some(slug) => Some(
                slug.parse::<BenefitCategory>()
                    .map_err(|_| ListBenefitsError::InvalidCategory(slug.to_string()))?,
            ),
        };

        Ok(BenefitFilter {
            category,
            keyword: self
                .keyword
                .as_deref()
                .map(str::trim)
                .filter(|k| !k.is_empty())
                .map(str::to_string),
        })
    }
}

#[tracing::instrument(skip(catalog))]
pub async fn handle(
    catalog: &Catalog,
    query: ListBenefitsQuery,
    today: NaiveDate,
) -> Result<ListBenefitsResponse, ListBenefitsError> {
    let filter = query.filter()?;
    let (benefits, source) = catalog.benefits(today).await;

    Ok(ListBenefitsResponse {
        benefits: filter.apply(benefits),
        source,
    })
}
