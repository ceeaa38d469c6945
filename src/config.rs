//! Runtime configuration assembled by the CLI layer.

use std::path::PathBuf;

use crate::flatten::ObstructionScan;

/// Connection settings for the destination server
#[derive(Debug, Clone)]
pub struct DbConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub database: String,
}

/// Settings shared by every batch: where documents come from, which
/// schema gates them, and where error reports land.
#[derive(Debug, Clone)]
pub struct BatchConfig {
    pub input_dir: PathBuf,
    pub schema_path: PathBuf,
    pub report_dir: PathBuf,
    pub obstruction_scan: ObstructionScan,
}

/// A full ingest run: batch settings plus the store and the dictionary
/// export that follows a successful load.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub db: DbConfig,
    pub batch: BatchConfig,
    pub dictionary_path: PathBuf,
}
