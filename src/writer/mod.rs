pub mod postgres;
pub mod schema_gen;

pub use self::postgres::{ensure_database, LoadReport, PgSink};
