//! YAML configuration surface for the pipeline and the acquisition binary.
//!
//! Validation happens at load time, before any sample is touched: a contract
//! violation here is an `InvalidConfiguration` error, never a mid-run failure.

use std::fs;
use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::cohort::STRATIFIERS;
use crate::error::{Error, Result};

/// The DE-SynPUF population is partitioned into 20 samples.
pub const SAMPLE_RANGE: RangeInclusive<u8> = 1..=20;

/// Observation years covered by the beneficiary summary extracts.
pub const YEAR_RANGE: RangeInclusive<i32> = 2008..=2010;

/// The derived dimension every stratification set must carry.
pub const AGE_GROUP_DIMENSION: &str = "age_group";

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Directory holding the extracted DE-SynPUF CSV files.
    pub data_root: PathBuf,
    /// Directory per-sample result CSVs are written to.
    pub output_root: PathBuf,
    /// Samples to process, in order. Omitted means all of 1..=20.
    #[serde(default)]
    pub samples: Option<Vec<u8>>,
    /// Years the acquisition binary downloads. Omitted means 2008..=2010.
    #[serde(default)]
    pub years: Option<Vec<i32>>,
    /// Ordered stratification dimensions, e.g. `[sex, race, age_group]`.
    pub groups: Vec<String>,
    /// Ascending age band breakpoints, e.g. `[5, 18, 65]`.
    pub age_breakpoints: Vec<i32>,
}

impl Config {
    /// Read and validate a configuration file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        let config: Self = serde_yaml::from_str(&text)
            .map_err(|e| Error::InvalidConfiguration(format!("{}: {e}", path.display())))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.age_breakpoints.is_empty() {
            return Err(Error::InvalidConfiguration(
                "age_breakpoints must not be empty".into(),
            ));
        }
        if !self.age_breakpoints.windows(2).all(|pair| pair[0] < pair[1]) {
            return Err(Error::InvalidConfiguration(format!(
                "age_breakpoints must be strictly ascending, got {:?}",
                self.age_breakpoints
            )));
        }

        if self.groups.is_empty() {
            return Err(Error::InvalidConfiguration(
                "groups must name at least one stratification dimension".into(),
            ));
        }
        for group in &self.groups {
            if !STRATIFIERS.contains(&group.as_str()) {
                return Err(Error::InvalidConfiguration(format!(
                    "unknown stratification dimension {group:?}; expected one of {STRATIFIERS:?}"
                )));
            }
        }
        if !self.groups.iter().any(|g| g == AGE_GROUP_DIMENSION) {
            return Err(Error::InvalidConfiguration(format!(
                "groups must include the derived {AGE_GROUP_DIMENSION:?} dimension"
            )));
        }
        let mut seen = self.groups.clone();
        seen.sort();
        seen.dedup();
        if seen.len() != self.groups.len() {
            return Err(Error::InvalidConfiguration(format!(
                "groups contains a duplicate dimension: {:?}",
                self.groups
            )));
        }

        for sample in self.samples() {
            if !SAMPLE_RANGE.contains(&sample) {
                return Err(Error::InvalidConfiguration(format!(
                    "sample {sample} is outside {:?}",
                    SAMPLE_RANGE
                )));
            }
        }
        for year in self.years() {
            if !YEAR_RANGE.contains(&year) {
                return Err(Error::InvalidConfiguration(format!(
                    "year {year} is outside {:?}",
                    YEAR_RANGE
                )));
            }
        }

        Ok(())
    }

    /// Samples to process; defaults to every sample.
    pub fn samples(&self) -> Vec<u8> {
        self.samples
            .clone()
            .unwrap_or_else(|| SAMPLE_RANGE.collect())
    }

    /// Years to acquire; defaults to every observation year.
    pub fn years(&self) -> Vec<i32> {
        self.years.clone().unwrap_or_else(|| YEAR_RANGE.collect())
    }
}
