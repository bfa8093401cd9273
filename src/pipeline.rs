//! Cohort pipeline orchestration.
//!
//! One pass per configured sample: discover files, open a fresh workspace,
//! unify the yearly extracts, associate claims, aggregate, hand the table to
//! the caller. The workspace is dropped before the next sample starts, so
//! samples share no state and peak memory stays at one sample's working set.

use arrow::record_batch::RecordBatch;
use chrono::{NaiveDate, Utc};
use tracing::{info, instrument};

use crate::bands::AgeBands;
use crate::cohort::{aggregate, events, files, unify, Workspace};
use crate::config::Config;
use crate::error::Result;

/// One sample's completed risk table.
#[derive(Debug)]
pub struct SampleRisk {
    pub sample: u8,
    /// `year, state, <dimensions…>, hospitalization_risk_count`, ordered
    /// ascending per the aggregation contract.
    pub table: RecordBatch,
}

#[derive(Debug)]
pub struct Pipeline<'a> {
    config: &'a Config,
    bands: AgeBands,
    observed_on: NaiveDate,
}

impl<'a> Pipeline<'a> {
    /// Validate the caller contract up front. Nothing touches the data root
    /// here; a configuration problem surfaces before any sample is processed.
    pub fn new(config: &'a Config) -> Result<Self> {
        config.validate()?;
        let bands = AgeBands::from_breakpoints(&config.age_breakpoints)?;
        Ok(Self {
            config,
            bands,
            observed_on: Utc::now().date_naive(),
        })
    }

    /// Pin the processing date. Ages of living beneficiaries derive from it,
    /// so pinning makes a run reproducible independent of the wall clock.
    pub fn with_observed_on(mut self, observed_on: NaiveDate) -> Self {
        self.observed_on = observed_on;
        self
    }

    /// Process the configured samples lazily, in configured order. Each item
    /// is either one sample's completed risk table or the typed failure that
    /// stopped that sample; the driver decides whether to halt. The default
    /// driver fails fast, matching the no-partial-output rule: a failed
    /// sample never emits a row.
    pub fn results(&self) -> impl Iterator<Item = Result<SampleRisk>> + '_ {
        self.config
            .samples()
            .into_iter()
            .map(move |sample| self.process_sample(sample))
    }

    #[instrument(level = "info", skip(self))]
    fn process_sample(&self, sample: u8) -> Result<SampleRisk> {
        let inputs = files::discover(&self.config.data_root, sample)?;

        // the workspace lives for exactly this one sample
        let workspace = Workspace::open(sample)?;
        let beneficiaries = unify::load_beneficiaries(
            &workspace,
            &inputs.beneficiary,
            &self.bands,
            self.observed_on,
        )?;
        let claims = events::load_claims(&workspace, &inputs.claims)?;
        events::associate(&workspace)?;
        let table = aggregate::aggregate(&workspace, &self.config.groups)?;

        info!(
            sample,
            beneficiaries,
            claims,
            groups = table.num_rows(),
            "sample complete"
        );
        Ok(SampleRisk { sample, table })
    }
}
