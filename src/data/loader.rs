// ============================================================
// Layer 4 — CSV Issue Loader
// ============================================================
// Reads issue reports from a CSV file with the `csv` crate.
//
// Only two columns matter: the free-text column and the label
// column (by default `Text Content` and `Code`). They are found
// by header name, so extra columns and column order don't
// matter. Every other column is dropped here.
//
// Any CSV error (bad quoting, ragged rows, unreadable file) or a
// missing column aborts the load. There is no partial recovery.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::data::DataError;
use crate::domain::issue::IssueRecord;
use crate::domain::traits::RecordSource;

/// Loads issue records from one CSV file.
pub struct CsvIssueLoader {
    path:         PathBuf,
    text_column:  String,
    label_column: String,
}

impl CsvIssueLoader {
    pub fn new(
        path:         impl AsRef<Path>,
        text_column:  impl Into<String>,
        label_column: impl Into<String>,
    ) -> Self {
        Self {
            path:         path.as_ref().to_path_buf(),
            text_column:  text_column.into(),
            label_column: label_column.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl RecordSource for CsvIssueLoader {
    fn load_all(&self) -> Result<Vec<IssueRecord>> {
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_path(&self.path)
            .with_context(|| format!("Cannot open CSV '{}'", self.path.display()))?;

        let headers = rdr
            .headers()
            .with_context(|| format!("Cannot read CSV header of '{}'", self.path.display()))?
            .clone();

        let text_idx  = column_index(&headers, &self.text_column)?;
        let label_idx = column_index(&headers, &self.label_column)?;

        let mut records = Vec::new();
        for (row, result) in rdr.records().enumerate() {
            let record = result.with_context(|| {
                format!("Malformed CSV row {} in '{}'", row + 1, self.path.display())
            })?;

            // Header lookup succeeded and the reader rejects ragged rows,
            // so both fields are present.
            let text = record.get(text_idx).unwrap_or_default();
            let code = record.get(label_idx).unwrap_or_default();
            records.push(IssueRecord::new(text, code.trim()));
        }

        tracing::info!(
            "Loaded {} rows from '{}'",
            records.len(),
            self.path.display()
        );
        Ok(records)
    }
}

fn column_index(headers: &csv::StringRecord, name: &str) -> Result<usize> {
    headers
        .iter()
        .position(|h| h.trim() == name)
        .ok_or_else(|| DataError::MissingColumn(name.to_string()).into())
}
