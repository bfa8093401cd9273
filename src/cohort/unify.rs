//! Schema unification across the yearly beneficiary extracts of one sample.
//!
//! Each extract contributes one row per beneficiary, tagged with the year the
//! file represents. Dates are normalized and age is derived relative to the
//! death date when one exists (else the processing date), with the band label
//! attached, before the rows are appended into the workspace's unified
//! relation. No deduplication happens across years: a beneficiary present in
//! all three extracts legitimately appears three times.

use chrono::NaiveDate;
use duckdb::ToSql;
use tracing::{info, instrument, warn};

use super::dates::{age_in_years, parse_optional, parse_required};
use super::extract::{cell, read_csv_file, utf8_column};
use super::files::YearlyExtract;
use super::Workspace;
use crate::bands::AgeBands;
use crate::error::Result;

struct BeneficiaryRow {
    year: i32,
    bene_id: String,
    birth_date: NaiveDate,
    death_date: Option<NaiveDate>,
    sex: Option<String>,
    race: Option<String>,
    state: Option<String>,
    hmo_coverage_months: Option<String>,
    age: i32,
    age_group: String,
}

/// Union all yearly extracts into the workspace's `beneficiaries` relation.
/// Returns the number of rows appended across all files.
#[instrument(level = "info", skip_all, fields(sample = workspace.sample()))]
pub fn load_beneficiaries(
    workspace: &Workspace,
    extracts: &[YearlyExtract],
    bands: &AgeBands,
    observed_on: NaiveDate,
) -> Result<usize> {
    let mut total = 0;
    for extract in extracts {
        let rows = decode_extract(extract, bands, observed_on)?;
        append_rows(workspace, &rows)?;
        info!(
            year = extract.year,
            rows = rows.len(),
            file = %extract.path.display(),
            "unified beneficiary extract"
        );
        total += rows.len();
    }
    Ok(total)
}

fn decode_extract(
    extract: &YearlyExtract,
    bands: &AgeBands,
    observed_on: NaiveDate,
) -> Result<Vec<BeneficiaryRow>> {
    let path = extract.path.as_path();
    let mut rows = Vec::new();

    for batch in read_csv_file(path)? {
        let ids = utf8_column(&batch, path, "DESYNPUF_ID")?;
        let births = utf8_column(&batch, path, "BENE_BIRTH_DT")?;
        let deaths = utf8_column(&batch, path, "BENE_DEATH_DT")?;
        let sexes = utf8_column(&batch, path, "BENE_SEX_IDENT_CD")?;
        let races = utf8_column(&batch, path, "BENE_RACE_CD")?;
        let states = utf8_column(&batch, path, "SP_STATE_CODE")?;
        let coverages = utf8_column(&batch, path, "BENE_HMO_CVRAGE_TOT_MONS")?;

        for row in 0..batch.num_rows() {
            let Some(bene_id) = cell(ids, row) else {
                warn!(file = %path.display(), row, "row without DESYNPUF_ID skipped");
                continue;
            };
            let birth_date = parse_required(path, "BENE_BIRTH_DT", cell(births, row))?;
            let death_date = parse_optional(path, "BENE_DEATH_DT", cell(deaths, row))?;
            let age = age_in_years(birth_date, death_date.unwrap_or(observed_on));

            rows.push(BeneficiaryRow {
                year: extract.year,
                bene_id: bene_id.to_string(),
                birth_date,
                death_date,
                sex: cell(sexes, row).map(str::to_string),
                race: cell(races, row).map(str::to_string),
                state: cell(states, row).map(str::to_string),
                hmo_coverage_months: cell(coverages, row).map(str::to_string),
                age,
                age_group: bands.classify(age).to_string(),
            });
        }
    }

    Ok(rows)
}

fn append_rows(workspace: &Workspace, rows: &[BeneficiaryRow]) -> Result<()> {
    let mut appender = workspace.conn().appender("beneficiaries")?;
    appender.append_rows(rows.iter().map(|r| {
        [
            &r.year as &dyn ToSql,
            &r.bene_id as &dyn ToSql,
            &r.birth_date as &dyn ToSql,
            &r.death_date as &dyn ToSql,
            &r.sex as &dyn ToSql,
            &r.race as &dyn ToSql,
            &r.state as &dyn ToSql,
            &r.hmo_coverage_months as &dyn ToSql,
            &r.age as &dyn ToSql,
            &r.age_group as &dyn ToSql,
        ]
    }))?;
    appender.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use std::fs;
    use std::path::Path;

    const HEADER: &str = "DESYNPUF_ID,BENE_BIRTH_DT,BENE_DEATH_DT,\
BENE_SEX_IDENT_CD,BENE_RACE_CD,SP_STATE_CODE,BENE_HMO_CVRAGE_TOT_MONS";

    fn write_extract(dir: &Path, year: i32, rows: &[&str]) -> YearlyExtract {
        let path = dir.join(format!(
            "DE1_0_{year}_Beneficiary_Summary_File_Sample_1.csv"
        ));
        let mut content = format!("{HEADER}\n");
        for row in rows {
            content.push_str(row);
            content.push('\n');
        }
        fs::write(&path, content).unwrap();
        YearlyExtract { year, path }
    }

    fn observed_on() -> NaiveDate {
        NaiveDate::from_ymd_opt(2010, 7, 1).unwrap()
    }

    #[test]
    fn unified_row_count_is_sum_over_files() {
        let dir = tempfile::tempdir().unwrap();
        let extracts = vec![
            write_extract(
                dir.path(),
                2008,
                &["B1,19380615,,1,1,05,12", "B2,19450101,,2,2,05,0"],
            ),
            write_extract(
                dir.path(),
                2009,
                &[
                    "B1,19380615,,1,1,05,12",
                    "B2,19450101,,2,2,05,0",
                    "B3,20000220,,1,3,33,6",
                ],
            ),
        ];
        let workspace = Workspace::open(1).unwrap();
        let bands = AgeBands::from_breakpoints(&[5, 18, 65]).unwrap();

        let appended =
            load_beneficiaries(&workspace, &extracts, &bands, observed_on()).unwrap();
        assert_eq!(appended, 5);
        assert_eq!(workspace.beneficiary_count().unwrap(), 5);
    }

    #[test]
    fn derives_age_and_band_from_death_date_when_present() {
        let dir = tempfile::tempdir().unwrap();
        let extracts = vec![write_extract(
            dir.path(),
            2008,
            &[
                // alive: age 72 on 2010-07-01
                "B1,19380615,,1,1,05,12",
                // died 2009-12-31 at age 69
                "B2,19400101,20091231,2,1,05,12",
            ],
        )];
        let workspace = Workspace::open(1).unwrap();
        let bands = AgeBands::from_breakpoints(&[5, 18, 65]).unwrap();
        load_beneficiaries(&workspace, &extracts, &bands, observed_on()).unwrap();

        let (age, group): (i32, String) = workspace
            .conn()
            .query_row(
                "SELECT age, age_group FROM beneficiaries WHERE bene_id = 'B1'",
                [],
                |r| Ok((r.get(0)?, r.get(1)?)),
            )
            .unwrap();
        assert_eq!((age, group.as_str()), (72, ">65"));

        let (age, group): (i32, String) = workspace
            .conn()
            .query_row(
                "SELECT age, age_group FROM beneficiaries WHERE bene_id = 'B2'",
                [],
                |r| Ok((r.get(0)?, r.get(1)?)),
            )
            .unwrap();
        assert_eq!((age, group.as_str()), (69, ">65"));
    }

    #[test]
    fn malformed_death_date_fails_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let extracts = vec![write_extract(
            dir.path(),
            2008,
            &["B1,19380615,20090100,1,1,05,12"], // day 00
        )];
        let workspace = Workspace::open(1).unwrap();
        let bands = AgeBands::from_breakpoints(&[65]).unwrap();

        let err =
            load_beneficiaries(&workspace, &extracts, &bands, observed_on()).unwrap_err();
        assert!(matches!(
            err,
            Error::MalformedDate { column: "BENE_DEATH_DT", .. }
        ));
        assert_eq!(workspace.beneficiary_count().unwrap(), 0);
    }

    #[test]
    fn missing_birth_date_is_malformed() {
        let dir = tempfile::tempdir().unwrap();
        let extracts = vec![write_extract(dir.path(), 2008, &["B1,,,1,1,05,12"])];
        let workspace = Workspace::open(1).unwrap();
        let bands = AgeBands::from_breakpoints(&[65]).unwrap();

        let err =
            load_beneficiaries(&workspace, &extracts, &bands, observed_on()).unwrap_err();
        assert!(matches!(
            err,
            Error::MalformedDate { column: "BENE_BIRTH_DT", .. }
        ));
    }
}
