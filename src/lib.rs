pub mod batch;
pub mod cli;
pub mod config;
pub mod flatten;
pub mod report;
pub mod schema;
pub mod ui;
pub mod validate;
pub mod writer;

pub use batch::{check, run, BatchSummary};
pub use cli::{Cli, Commands};
pub use config::{BatchConfig, DbConfig, RunConfig};
pub use flatten::{flatten, FlatRows, FlattenOptions, ObstructionScan};
pub use ui::{Counts, Phase, PlainUi, SilentUi, Ui, UiApp};
pub use validate::SchemaValidator;
pub use writer::{ensure_database, LoadReport, PgSink};
