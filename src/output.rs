//! CSV persistence of per-sample risk tables.

use std::fs::{self, File};
use std::path::{Path, PathBuf};

use arrow::csv::WriterBuilder;

use crate::error::Result;
use crate::pipeline::SampleRisk;

/// Write one sample's risk table to `sample_<N>_result.csv` under
/// `output_root`, creating the directory if needed. Returns the written path.
pub fn write_sample_csv(output_root: &Path, risk: &SampleRisk) -> Result<PathBuf> {
    fs::create_dir_all(output_root)?;
    let path = output_root.join(format!("sample_{}_result.csv", risk.sample));
    let file = File::create(&path)?;
    let mut writer = WriterBuilder::new().with_header(true).build(file);
    writer.write(&risk.table)?;
    Ok(path)
}
