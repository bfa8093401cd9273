//! CMS download locations for the DE-SynPUF archives.

use anyhow::{bail, Result};

use crate::config::{SAMPLE_RANGE, YEAR_RANGE};

const CMS_DOWNLOAD_ROOT: &str = "https://www.cms.gov/research-statistics-data-and-systems/downloadable-public-use-files/synpufs/downloads/";

/// The 2010 sample-1 beneficiary archive was republished under a different
/// path than every other archive.
const BENEFICIARY_2010_SAMPLE_1_URL: &str =
    "https://www.cms.gov/sites/default/files/2020-09/DE1_0_2010_Beneficiary_Summary_File_Sample_1.zip";

/// Archive URL for one year's beneficiary summary file of one sample.
pub fn beneficiary_zip_url(year: i32, sample: u8) -> Result<String> {
    if !YEAR_RANGE.contains(&year) {
        bail!("year {year} is not covered by DE-SynPUF (expected {YEAR_RANGE:?})");
    }
    check_sample(sample)?;
    if year == 2010 && sample == 1 {
        return Ok(BENEFICIARY_2010_SAMPLE_1_URL.to_string());
    }
    Ok(format!(
        "{CMS_DOWNLOAD_ROOT}de1_0_{year}_beneficiary_summary_file_sample_{sample}.zip"
    ))
}

/// Archive URL for one sample's 2008–2010 inpatient claims file.
pub fn inpatient_claims_zip_url(sample: u8) -> Result<String> {
    check_sample(sample)?;
    Ok(format!(
        "{CMS_DOWNLOAD_ROOT}de1_0_2008_to_2010_inpatient_claims_sample_{sample}.zip"
    ))
}

fn check_sample(sample: u8) -> Result<()> {
    if !SAMPLE_RANGE.contains(&sample) {
        bail!("sample {sample} is not one of the DE-SynPUF samples {SAMPLE_RANGE:?}");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn beneficiary_urls_are_lowercased_archive_paths() {
        let url = beneficiary_zip_url(2008, 3).unwrap();
        assert_eq!(
            url,
            "https://www.cms.gov/research-statistics-data-and-systems/downloadable-public-use-files/synpufs/downloads/de1_0_2008_beneficiary_summary_file_sample_3.zip"
        );
    }

    #[test]
    fn sample_1_of_2010_uses_the_republished_location() {
        let url = beneficiary_zip_url(2010, 1).unwrap();
        assert_eq!(
            url,
            "https://www.cms.gov/sites/default/files/2020-09/DE1_0_2010_Beneficiary_Summary_File_Sample_1.zip"
        );
        // only that one archive moved
        assert!(beneficiary_zip_url(2010, 2).unwrap().ends_with("sample_2.zip"));
        assert!(beneficiary_zip_url(2009, 1).unwrap().ends_with("sample_1.zip"));
    }

    #[test]
    fn out_of_range_inputs_rejected() {
        assert!(beneficiary_zip_url(2011, 1).is_err());
        assert!(beneficiary_zip_url(2007, 1).is_err());
        assert!(beneficiary_zip_url(2008, 0).is_err());
        assert!(beneficiary_zip_url(2008, 21).is_err());
        assert!(inpatient_claims_zip_url(21).is_err());
    }
}
