//! Batch driver: scan the input folder, validate and flatten each
//! document, replace the store tables, and export the CSV outputs.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde_json::Value;
use tracing::{info, warn};

use crate::config::{BatchConfig, RunConfig};
use crate::flatten::{self, FlatRows, FlattenOptions};
use crate::report::{self, ErrorReports};
use crate::ui::{Counts, Phase, Ui};
use crate::validate::SchemaValidator;
use crate::writer::{ensure_database, PgSink};

/// Counters for one batch
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BatchSummary {
    pub files_seen: u64,
    pub documents_loaded: u64,
    pub schema_errors: u64,
    pub lint_errors: u64,
    pub records: u64,
}

impl BatchSummary {
    pub fn describe(&self) -> String {
        format!(
            "{} files: {} loaded, {} schema errors, {} invalid JSON, {} records",
            self.files_seen,
            self.documents_loaded,
            self.schema_errors,
            self.lint_errors,
            self.records
        )
    }
}

/// JSON files in the input folder, in directory order
pub fn list_json_files(input_dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = fs::read_dir(input_dir)
        .with_context(|| format!("Failed to read input folder {}", input_dir.display()))?;
    let mut files = Vec::new();
    for entry in entries {
        let entry = entry
            .with_context(|| format!("Failed to read entry in {}", input_dir.display()))?;
        let path = entry.path();
        if path.is_file() && path.extension().map_or(false, |ext| ext == "json") {
            files.push(path);
        }
    }
    Ok(files)
}

enum FileOutcome {
    Loaded(FlatRows),
    /// Parsed as JSON but failed validation; goes to the schema CSV
    SchemaError(String),
    /// Unreadable, unparseable, or faulted during flattening; goes to
    /// the malformed-file CSV
    Malformed(String),
}

fn process_file(
    path: &Path,
    filename: &str,
    validator: &SchemaValidator,
    options: &FlattenOptions,
) -> FileOutcome {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) => {
            return FileOutcome::Malformed(format!(
                "Invalid JSON format in file: {filename}: {err}"
            ))
        }
    };
    let doc: Value = match serde_json::from_str(&text) {
        Ok(doc) => doc,
        Err(err) => {
            return FileOutcome::Malformed(format!(
                "Invalid JSON format in file: {filename}: {err}"
            ))
        }
    };
    if let Some(message) = validator.check(&doc) {
        return FileOutcome::SchemaError(message);
    }
    match flatten::flatten(&doc, options) {
        Ok(rows) => FileOutcome::Loaded(rows),
        Err(err) => FileOutcome::Malformed(err.to_string()),
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Process every file once, writing per-file errors as they happen.
/// Rejected files contribute nothing; the batch carries on without them.
fn collect_rows(
    config: &BatchConfig,
    validator: &SchemaValidator,
    reports: &mut ErrorReports,
    summary: &mut BatchSummary,
    ui: &mut impl Ui,
) -> Result<FlatRows> {
    let files = list_json_files(&config.input_dir)?;
    summary.files_seen = files.len() as u64;
    if files.is_empty() {
        warn!(folder = %config.input_dir.display(), "no JSON files found");
    }
    ui.log(format!(
        "Found {} JSON files in {}",
        files.len(),
        config.input_dir.display()
    ));

    let options = FlattenOptions {
        obstruction_scan: config.obstruction_scan,
    };
    let total = files.len() as u64;
    let mut rows = FlatRows::default();
    let mut counts = Counts::default();
    for (index, path) in files.iter().enumerate() {
        let filename = file_name(path);
        ui.set_progress(index as u64 + 1, total, filename.clone());
        match process_file(path, &filename, validator, &options) {
            FileOutcome::Loaded(file_rows) => {
                counts.loaded += 1;
                summary.documents_loaded += 1;
                rows.extend(file_rows);
            }
            FileOutcome::SchemaError(message) => {
                counts.rejected += 1;
                warn!(file = %filename, "document rejected by schema");
                ui.log(format!("{filename}: {message}"));
                reports.record_schema_error(&filename, &message)?;
            }
            FileOutcome::Malformed(message) => {
                counts.invalid += 1;
                warn!(file = %filename, "document malformed");
                ui.log(format!("{filename}: {message}"));
                reports.record_lint_error(&filename, &message)?;
            }
        }
        ui.set_counts(counts);
    }
    Ok(rows)
}

/// Full ingest: replace the store tables with this batch and export the
/// data dictionary alongside the error reports.
pub fn run(config: &RunConfig, ui: &mut impl Ui) -> Result<BatchSummary> {
    let mut summary = BatchSummary::default();

    ui.set_phase(Phase::Connecting);
    ui.set_info(format!(
        "{} -> {}",
        config.batch.input_dir.display(),
        config.db.database
    ));
    ensure_database(&config.db)?;
    let mut sink = PgSink::connect(&config.db)?;
    ui.log(format!(
        "Connected to {} on {}:{}",
        config.db.database, config.db.host, config.db.port
    ));

    ui.set_phase(Phase::Scanning);
    let validator = SchemaValidator::from_path(&config.batch.schema_path)?;
    let mut reports = ErrorReports::create(&config.batch.report_dir)?;

    ui.set_phase(Phase::Processing);
    let rows = collect_rows(&config.batch, &validator, &mut reports, &mut summary, ui)?;
    ui.clear_progress();
    let (schema_errors, lint_errors) = reports.finish()?;
    summary.schema_errors = schema_errors;
    summary.lint_errors = lint_errors;

    ui.set_phase(Phase::Loading);
    let load = sink.replace_all(&rows)?;
    summary.records = load.total_records();
    for (table, count) in &load.table_counts {
        ui.log(format!("{table}: {count} rows"));
    }

    ui.set_phase(Phase::Exporting);
    report::write_data_dictionary(&config.dictionary_path, &load.dictionary)?;
    ui.log(format!(
        "Data dictionary written to {}",
        config.dictionary_path.display()
    ));

    info!(
        files = summary.files_seen,
        loaded = summary.documents_loaded,
        schema_errors = summary.schema_errors,
        lint_errors = summary.lint_errors,
        records = summary.records,
        "batch complete"
    );
    Ok(summary)
}

/// Validate and flatten without touching the store. Writes the same
/// error reports a full run would.
pub fn check(config: &BatchConfig, ui: &mut impl Ui) -> Result<BatchSummary> {
    let mut summary = BatchSummary::default();

    ui.set_phase(Phase::Scanning);
    ui.set_info(format!("checking {}", config.input_dir.display()));
    let validator = SchemaValidator::from_path(&config.schema_path)?;
    let mut reports = ErrorReports::create(&config.report_dir)?;

    ui.set_phase(Phase::Processing);
    let rows = collect_rows(config, &validator, &mut reports, &mut summary, ui)?;
    ui.clear_progress();
    let (schema_errors, lint_errors) = reports.finish()?;
    summary.schema_errors = schema_errors;
    summary.lint_errors = lint_errors;
    summary.records = rows.total();

    for (table, count) in rows.table_counts() {
        ui.log(format!("{table}: {count} rows staged"));
    }
    info!(
        files = summary.files_seen,
        loaded = summary.documents_loaded,
        "check complete"
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_json_files_filters_extensions() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.json"), "{}").unwrap();
        fs::write(dir.path().join("b.txt"), "x").unwrap();
        fs::write(dir.path().join("noext"), "x").unwrap();
        fs::create_dir(dir.path().join("sub.json")).unwrap();

        let files = list_json_files(dir.path()).unwrap();
        assert_eq!(files.len(), 1);
        assert!(files[0].ends_with("a.json"));
    }

    #[test]
    fn test_list_json_files_missing_folder() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("absent");
        assert!(list_json_files(&missing).is_err());
    }

    #[test]
    fn test_summary_describe() {
        let summary = BatchSummary {
            files_seen: 4,
            documents_loaded: 2,
            schema_errors: 1,
            lint_errors: 1,
            records: 17,
        };
        assert_eq!(
            summary.describe(),
            "4 files: 2 loaded, 1 schema errors, 1 invalid JSON, 17 records"
        );
    }
}
