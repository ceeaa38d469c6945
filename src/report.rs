//! CSV outputs: the two per-file error reports and the data dictionary.

use std::fs::{self, File};
use std::path::Path;

use anyhow::{Context, Result};

pub const SCHEMA_ERRORS_FILE: &str = "json_schema_errors.csv";
pub const LINT_ERRORS_FILE: &str = "json_lint_errors.csv";

const ERROR_HEADER: [&str; 2] = ["Filename", "Error Message"];
const DICTIONARY_HEADER: [&str; 2] = ["Table Name", "Column Name"];

/// Writers for the two error reports of one batch.
///
/// Both files are created up front with their header row, so a clean run
/// still leaves empty reports behind rather than stale ones from a
/// previous batch.
pub struct ErrorReports {
    schema: csv::Writer<File>,
    lint: csv::Writer<File>,
    schema_count: u64,
    lint_count: u64,
}

impl ErrorReports {
    pub fn create(dir: &Path) -> Result<Self> {
        fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create report directory {}", dir.display()))?;
        let mut schema = open_report(&dir.join(SCHEMA_ERRORS_FILE))?;
        schema.write_record(ERROR_HEADER)?;
        let mut lint = open_report(&dir.join(LINT_ERRORS_FILE))?;
        lint.write_record(ERROR_HEADER)?;
        Ok(Self {
            schema,
            lint,
            schema_count: 0,
            lint_count: 0,
        })
    }

    /// A document that parsed as JSON but was rejected by the schema.
    pub fn record_schema_error(&mut self, filename: &str, message: &str) -> Result<()> {
        self.schema
            .write_record([filename, message])
            .with_context(|| format!("Failed to record schema error for {filename}"))?;
        self.schema_count += 1;
        Ok(())
    }

    /// A malformed file: unreadable, unparseable as JSON, or faulted
    /// while flattening.
    pub fn record_lint_error(&mut self, filename: &str, message: &str) -> Result<()> {
        self.lint
            .write_record([filename, message])
            .with_context(|| format!("Failed to record lint error for {filename}"))?;
        self.lint_count += 1;
        Ok(())
    }

    /// Flush both reports and return (schema, lint) error counts.
    pub fn finish(mut self) -> Result<(u64, u64)> {
        self.schema.flush().context("Failed to flush schema error report")?;
        self.lint.flush().context("Failed to flush lint error report")?;
        Ok((self.schema_count, self.lint_count))
    }
}

fn open_report(path: &Path) -> Result<csv::Writer<File>> {
    csv::Writer::from_path(path)
        .with_context(|| format!("Failed to create report file {}", path.display()))
}

/// Write the `(table, column)` pairs reported by the store after a load.
pub fn write_data_dictionary(path: &Path, entries: &[(String, String)]) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create dictionary directory {}", parent.display())
            })?;
        }
    }
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("Failed to create dictionary file {}", path.display()))?;
    writer.write_record(DICTIONARY_HEADER)?;
    for (table, column) in entries {
        writer.write_record([table.as_str(), column.as_str()])?;
    }
    writer
        .flush()
        .with_context(|| format!("Failed to flush dictionary file {}", path.display()))?;
    Ok(())
}
