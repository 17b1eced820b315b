pub mod get_benefit;
pub mod list_benefits;
pub mod urgent_benefits;

pub use get_benefit::GetBenefitError;
pub use list_benefits::{ListBenefitsError, ListBenefitsQuery, ListBenefitsResponse};
pub use urgent_benefits::{UrgentBenefitsError, UrgentBenefitsQuery};
