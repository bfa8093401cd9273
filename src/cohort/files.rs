//! Discovery of a sample's input extracts under the data root.
//!
//! The acquisition service is expected to have landed, per sample, one
//! beneficiary summary CSV per observation year plus exactly one inpatient
//! claims CSV. Discovery only resolves paths; it never opens the files.

use std::path::{Path, PathBuf};

use glob::glob;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::warn;

use crate::error::{Error, Result};

static EXTRACT_YEAR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"DE1_0_(\d{4})_Beneficiary").expect("invalid extract-year regex"));

/// One beneficiary summary extract, tagged with the year it represents.
#[derive(Debug, Clone)]
pub struct YearlyExtract {
    pub year: i32,
    pub path: PathBuf,
}

/// The resolved input set for one cohort sample.
#[derive(Debug, Clone)]
pub struct SampleFiles {
    pub sample: u8,
    /// Beneficiary extracts in ascending year order.
    pub beneficiary: Vec<YearlyExtract>,
    pub claims: PathBuf,
}

/// Resolve the input files for `sample` under `data_root`.
///
/// No matching beneficiary file, or a missing claims file, is a hard
/// `NotFound` for this sample.
pub fn discover(data_root: &Path, sample: u8) -> Result<SampleFiles> {
    let pattern = format!(
        "{}/DE1_0_*_Beneficiary_Summary_File_Sample_{}.csv",
        data_root.display(),
        sample
    );

    let mut beneficiary = Vec::new();
    for entry in glob(&pattern)? {
        let path = match entry {
            Ok(path) => path,
            Err(e) => {
                warn!("cannot read glob entry: {e:?}");
                continue;
            }
        };
        beneficiary.push(YearlyExtract {
            year: extract_year(&path)?,
            path,
        });
    }
    if beneficiary.is_empty() {
        return Err(Error::NotFound { sample, pattern });
    }
    beneficiary.sort_by_key(|extract| extract.year);

    let claims = data_root.join(format!(
        "DE1_0_2008_to_2010_Inpatient_Claims_Sample_{sample}.csv"
    ));
    if !claims.is_file() {
        return Err(Error::NotFound {
            sample,
            pattern: claims.display().to_string(),
        });
    }

    Ok(SampleFiles {
        sample,
        beneficiary,
        claims,
    })
}

/// The 4-digit observation year embedded in a beneficiary extract filename.
fn extract_year(path: &Path) -> Result<i32> {
    let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
    EXTRACT_YEAR
        .captures(name)
        .and_then(|caps| caps[1].parse().ok())
        .ok_or_else(|| Error::UnrecognizedExtract {
            path: path.to_path_buf(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn touch(dir: &Path, name: &str) {
        fs::write(dir.join(name), "header\n").unwrap();
    }

    #[test]
    fn discovers_yearly_extracts_in_year_order() {
        let dir = tempfile::tempdir().unwrap();
        touch(
            dir.path(),
            "DE1_0_2010_Beneficiary_Summary_File_Sample_2.csv",
        );
        touch(
            dir.path(),
            "DE1_0_2008_Beneficiary_Summary_File_Sample_2.csv",
        );
        touch(dir.path(), "DE1_0_2008_to_2010_Inpatient_Claims_Sample_2.csv");
        // another sample's file must not leak in
        touch(
            dir.path(),
            "DE1_0_2008_Beneficiary_Summary_File_Sample_12.csv",
        );

        let files = discover(dir.path(), 2).unwrap();
        let years: Vec<i32> = files.beneficiary.iter().map(|e| e.year).collect();
        assert_eq!(years, vec![2008, 2010]);
        assert!(files.claims.ends_with("DE1_0_2008_to_2010_Inpatient_Claims_Sample_2.csv"));
    }

    #[test]
    fn no_beneficiary_files_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let err = discover(dir.path(), 3).unwrap_err();
        assert!(matches!(err, Error::NotFound { sample: 3, .. }));
    }

    #[test]
    fn missing_claims_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        touch(
            dir.path(),
            "DE1_0_2009_Beneficiary_Summary_File_Sample_4.csv",
        );
        let err = discover(dir.path(), 4).unwrap_err();
        assert!(matches!(err, Error::NotFound { sample: 4, .. }));
    }
}
