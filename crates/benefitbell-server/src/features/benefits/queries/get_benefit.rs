use crate::catalog::{Catalog, DetailSource};
use crate::welfare::transform::normalize_benefit_id;
use crate::welfare::{WelfareDetail, WelfareError};

#[derive(Debug, thiserror::Error)]
pub enum GetBenefitError {
    #[error("Invalid benefit ID")]
    InvalidId,
    #[error(transparent)]
    Welfare(#[from] WelfareError),
}

/// Detail by servId; generated `api-` ids are accepted.
#[tracing::instrument(skip(catalog))]
pub async fn handle(catalog: &Catalog, id: &str) -> Result<(WelfareDetail, DetailSource), GetBenefitError> {
    let serv_id = normalize_benefit_id(id).ok_or(GetBenefitError::InvalidId)?;
    Ok(catalog.detail(serv_id).await?)
}
