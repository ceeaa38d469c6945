use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::config::{BatchConfig, DbConfig};
use crate::flatten::ObstructionScan;

#[derive(Parser, Debug)]
#[command(name = "roofs-to-postgres")]
#[command(version, about = "Load roof site-model JSON documents into PostgreSQL")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Disable the terminal UI and print plain log lines
    #[arg(long, global = true)]
    pub no_tui: bool,
}

#[derive(Args, Debug)]
pub struct DbArgs {
    /// Database server host
    #[arg(long, env = "DB_HOST")]
    pub db_host: String,

    /// Database server port
    #[arg(long, env = "DB_PORT", default_value_t = 5432)]
    pub db_port: u16,

    /// Database user
    #[arg(long, env = "DB_USER")]
    pub db_user: String,

    /// Database password
    #[arg(long, env = "DB_PASSWORD", hide_env_values = true)]
    pub db_password: String,

    /// Target database name
    #[arg(long, env = "DB_DATABASE")]
    pub db_database: String,
}

impl DbArgs {
    pub fn into_config(self) -> DbConfig {
        DbConfig {
            host: self.db_host,
            port: self.db_port,
            user: self.db_user,
            password: self.db_password,
            database: self.db_database,
        }
    }
}

#[derive(Args, Debug)]
pub struct InputArgs {
    /// Folder containing the JSON documents
    #[arg(default_value = "roof_input_data")]
    pub input_dir: PathBuf,

    /// JSON Schema file that gates every document
    #[arg(short, long, default_value = "schema.json")]
    pub schema: PathBuf,

    /// Folder for the error report CSVs
    #[arg(long, default_value = "roof_json_errors")]
    pub report_dir: PathBuf,

    /// Scan plane obstructions even on planes without penetrations
    #[arg(long)]
    pub independent_obstructions: bool,
}

impl InputArgs {
    pub fn into_config(self) -> BatchConfig {
        let obstruction_scan = if self.independent_obstructions {
            ObstructionScan::Independent
        } else {
            ObstructionScan::PenetrationGated
        };
        BatchConfig {
            input_dir: self.input_dir,
            schema_path: self.schema,
            report_dir: self.report_dir,
            obstruction_scan,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Validate, flatten and load a batch, replacing the store tables
    Run {
        #[command(flatten)]
        input: InputArgs,

        #[command(flatten)]
        db: DbArgs,

        /// Where to write the data dictionary CSV
        #[arg(long, default_value = "roof_data_dictionary.csv")]
        dictionary: PathBuf,
    },

    /// Validate and flatten a batch without loading anything
    Check {
        #[command(flatten)]
        input: InputArgs,
    },

    /// List destination tables and their columns
    ListTables,
}

impl Cli {
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
