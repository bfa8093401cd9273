//! Acquisition of the DE-SynPUF archives from the CMS download site.
//!
//! This runs before the aggregation core and entirely outside of it: it
//! lands the extracted CSVs under the data root and nothing else. No retries;
//! a failed download is reported with its URL and fails the acquisition run.

pub mod urls;
pub mod zips;
