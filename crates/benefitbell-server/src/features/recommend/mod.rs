pub mod routes;

pub use routes::recommend_routes;
