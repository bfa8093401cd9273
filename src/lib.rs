//! Yearly, state-level, demographically-stratified all-cause hospitalization
//! risk from the CMS DE-SynPUF public-use files.
//!
//! The pipeline unions the yearly beneficiary summary extracts of one sample
//! into a single relation inside an in-memory DuckDB workspace and joins the
//! sample's inpatient claims onto it. The result is the distinct
//! hospitalization count per (year, state, stratification group).

pub mod bands;
pub mod cohort;
pub mod config;
pub mod error;
pub mod fetch;
pub mod output;
pub mod pipeline;

pub use bands::AgeBands;
pub use config::Config;
pub use error::{Error, Result};
pub use pipeline::{Pipeline, SampleRisk};
