//! Association of inpatient claims with the unified beneficiary relation.
//!
//! The claims extract covers all three observation years of a sample in one
//! file. Admission dates are normalized with the same policy as birth and
//! death dates, and each claim is attributed to its admission year so that a
//! hospitalization counts toward exactly one observation year. The claims are
//! then left-joined onto the beneficiaries by subject identifier and
//! observation year: a beneficiary-year without claims keeps exactly one row
//! with a null claim id, one with N claims that year appears N times.
//! Duplicate claim ids are kept as-is; distinctness is the aggregator's job.

use std::path::Path;

use chrono::{Datelike, NaiveDate};
use duckdb::ToSql;
use tracing::{info, instrument, warn};

use super::dates::parse_required;
use super::extract::{cell, read_csv_file, utf8_column};
use super::Workspace;
use crate::error::Result;

struct ClaimRow {
    clm_id: String,
    bene_id: String,
    admission_date: NaiveDate,
    admission_year: i32,
}

/// Load the sample's inpatient claims extract into the `claims` relation.
/// Returns the number of claim rows appended.
#[instrument(level = "info", skip_all, fields(sample = workspace.sample()))]
pub fn load_claims(workspace: &Workspace, path: &Path) -> Result<usize> {
    let mut rows = Vec::new();

    for batch in read_csv_file(path)? {
        let claim_ids = utf8_column(&batch, path, "CLM_ID")?;
        let bene_ids = utf8_column(&batch, path, "DESYNPUF_ID")?;
        let admissions = utf8_column(&batch, path, "CLM_ADMSN_DT")?;

        for row in 0..batch.num_rows() {
            let (Some(clm_id), Some(bene_id)) = (cell(claim_ids, row), cell(bene_ids, row))
            else {
                warn!(file = %path.display(), row, "claim without identifiers skipped");
                continue;
            };
            let admission_date = parse_required(path, "CLM_ADMSN_DT", cell(admissions, row))?;
            rows.push(ClaimRow {
                clm_id: clm_id.to_string(),
                bene_id: bene_id.to_string(),
                admission_date,
                admission_year: admission_date.year(),
            });
        }
    }

    let mut appender = workspace.conn().appender("claims")?;
    appender.append_rows(rows.iter().map(|r| {
        [
            &r.clm_id as &dyn ToSql,
            &r.bene_id as &dyn ToSql,
            &r.admission_date as &dyn ToSql,
            &r.admission_year as &dyn ToSql,
        ]
    }))?;
    appender.flush()?;

    info!(claims = rows.len(), file = %path.display(), "loaded inpatient claims");
    Ok(rows.len())
}

/// Materialize the joined relation: beneficiaries left-joined with claims on
/// subject identifier and observation year. Inputs are left untouched.
pub fn associate(workspace: &Workspace) -> Result<()> {
    workspace.conn().execute_batch(
        "CREATE TABLE joined AS
         SELECT beneficiaries.*, claims.clm_id, claims.admission_date
         FROM beneficiaries
         LEFT JOIN claims
           ON beneficiaries.bene_id = claims.bene_id
          AND beneficiaries.year = claims.admission_year;",
    )?;
    Ok(())
}
