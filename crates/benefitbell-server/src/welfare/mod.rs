//! data.go.kr welfare ingestion
//!
//! Fetching, XML field extraction, classification and deadline arithmetic
//! for the National Welfare Information API.

pub mod category;
pub mod client;
pub mod config;
pub mod deadline;
pub mod models;
pub mod transform;
pub mod xml;

pub use client::{Backoff, ListPage, RetryPolicy, WelfareClient, WelfareError};
pub use config::WelfareConfig;
pub use models::{Benefit, Contact, Homepage, WelfareDetail, WelfareListItem};
