//! Decoding of DE-SynPUF CSV extracts into Arrow batches.
//!
//! Every extract is read through the Arrow CSV reader with an all-Utf8 schema
//! built from the file's own header row; typed interpretation (dates, ages)
//! happens afterwards in Rust, column by column.

use std::fs;
use std::io::Cursor;
use std::path::Path;
use std::sync::Arc;

use arrow::array::Array;
use arrow::array::StringArray;
use arrow::csv::ReaderBuilder;
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;

use crate::error::{Error, Result};

const BATCH_SIZE: usize = 8192;

/// Trim whitespace and strip outer quotes if present.
fn clean_field(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.starts_with('"') && trimmed.ends_with('"') && trimmed.len() >= 2 {
        trimmed[1..trimmed.len() - 1].to_string()
    } else {
        trimmed.to_string()
    }
}

/// Read a whole CSV extract as Utf8 record batches. An empty file yields no
/// batches.
pub(crate) fn read_csv_file(path: &Path) -> Result<Vec<RecordBatch>> {
    let content = fs::read_to_string(path)?;
    let Some(header) = content.lines().next() else {
        return Ok(Vec::new());
    };

    let fields: Vec<Field> = header
        .split(',')
        .map(|name| Field::new(clean_field(name), DataType::Utf8, true))
        .collect();
    let schema = Arc::new(Schema::new(fields));

    let cursor = Cursor::new(content.as_bytes());
    let reader = ReaderBuilder::new(schema)
        .with_header(true)
        .with_batch_size(BATCH_SIZE)
        .with_delimiter(b',')
        .build(cursor)?;

    let batches = reader.collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(batches)
}

/// Look up a named Utf8 column in a batch.
pub(crate) fn utf8_column<'a>(
    batch: &'a RecordBatch,
    path: &Path,
    name: &'static str,
) -> Result<&'a StringArray> {
    batch
        .column_by_name(name)
        .and_then(|col| col.as_any().downcast_ref::<StringArray>())
        .ok_or_else(|| Error::MissingColumn {
            file: path.to_path_buf(),
            column: name,
        })
}

/// A cell's trimmed value, with nulls and empty strings folded to `None`.
pub(crate) fn cell(column: &StringArray, row: usize) -> Option<&str> {
    if column.is_null(row) {
        return None;
    }
    let value = column.value(row).trim();
    (!value.is_empty()).then_some(value)
}
