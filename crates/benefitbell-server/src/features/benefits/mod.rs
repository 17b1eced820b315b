pub mod queries;
pub mod routes;

pub use queries::{
    GetBenefitError, ListBenefitsError, ListBenefitsQuery, ListBenefitsResponse,
    UrgentBenefitsError, UrgentBenefitsQuery,
};

pub use routes::benefits_routes;
