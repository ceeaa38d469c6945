use anyhow::{Context, Result};
use postgres::{Client, NoTls, Transaction};
use tracing::{debug, info};

use super::schema_gen::{generate_create_table, generate_drop_table, generate_insert, quote_ident};
use crate::config::DbConfig;
use crate::flatten::{FlatRows, TableRow};
use crate::schema::ALL_TABLES;

const DICTIONARY_SQL: &str = "SELECT table_name::text, column_name::text \
     FROM information_schema.columns \
     WHERE table_catalog = current_database() AND table_schema = 'public' \
     ORDER BY table_name, ordinal_position";

/// Outcome of one load: rows written per table and the catalog contents
/// for the data dictionary, both read inside the load transaction.
#[derive(Debug)]
pub struct LoadReport {
    pub table_counts: Vec<(&'static str, u64)>,
    pub dictionary: Vec<(String, String)>,
}

impl LoadReport {
    pub fn total_records(&self) -> u64 {
        self.table_counts.iter().map(|(_, n)| n).sum()
    }
}

fn client_config(db: &DbConfig, dbname: &str) -> postgres::Config {
    let mut config = postgres::Config::new();
    config
        .host(&db.host)
        .port(db.port)
        .user(&db.user)
        .password(&db.password)
        .dbname(dbname);
    config
}

/// Create the target database when it does not exist yet.
///
/// Connects to the maintenance database, so it works on a fresh server
/// before the first run ever loaded anything.
pub fn ensure_database(db: &DbConfig) -> Result<()> {
    let mut client = client_config(db, "postgres")
        .connect(NoTls)
        .with_context(|| format!("Failed to connect to server at {}:{}", db.host, db.port))?;
    let exists = client
        .query_opt("SELECT 1 FROM pg_database WHERE datname = $1", &[&db.database])
        .context("Failed to check for target database")?
        .is_some();
    if !exists {
        // CREATE DATABASE cannot take bind parameters
        client
            .batch_execute(&format!("CREATE DATABASE {}", quote_ident(&db.database)))
            .with_context(|| format!("Failed to create database {}", db.database))?;
        info!(database = %db.database, "created target database");
    }
    Ok(())
}

pub struct PgSink {
    client: Client,
}

impl PgSink {
    pub fn connect(db: &DbConfig) -> Result<Self> {
        let client = client_config(db, &db.database).connect(NoTls).with_context(|| {
            format!(
                "Failed to connect to database {} at {}:{}",
                db.database, db.host, db.port
            )
        })?;
        Ok(Self { client })
    }

    /// Replace the six tables with the given rows in one transaction.
    ///
    /// Each table is dropped and recreated before its inserts, so the
    /// store always reflects exactly the latest batch. The dictionary is
    /// read through the same transaction; a failure anywhere leaves the
    /// previous tables in place.
    pub fn replace_all(&mut self, rows: &FlatRows) -> Result<LoadReport> {
        let mut tx = self
            .client
            .transaction()
            .context("Failed to open load transaction")?;

        for table in ALL_TABLES {
            tx.batch_execute(&generate_drop_table(table))
                .with_context(|| format!("Failed to drop table {}", table.name))?;
            tx.batch_execute(&generate_create_table(table))
                .with_context(|| format!("Failed to create table {}", table.name))?;
        }

        let table_counts = vec![
            ("sites", insert_rows(&mut tx, &rows.sites)?),
            ("buildings", insert_rows(&mut tx, &rows.buildings)?),
            ("mounting_planes", insert_rows(&mut tx, &rows.mounting_planes)?),
            ("edges", insert_rows(&mut tx, &rows.edges)?),
            ("penetrations", insert_rows(&mut tx, &rows.penetrations)?),
            ("obstructions", insert_rows(&mut tx, &rows.obstructions)?),
        ];

        let dictionary = read_dictionary(&mut tx)?;

        tx.commit().context("Failed to commit load transaction")?;
        Ok(LoadReport {
            table_counts,
            dictionary,
        })
    }
}

fn insert_rows<R: TableRow>(tx: &mut Transaction<'_>, rows: &[R]) -> Result<u64> {
    let schema = R::table();
    let statement = tx
        .prepare(&generate_insert(schema))
        .with_context(|| format!("Failed to prepare insert for {}", schema.name))?;
    for row in rows {
        let values = row.values();
        let params: Vec<&(dyn postgres::types::ToSql + Sync)> = values
            .iter()
            .map(|value| value as &(dyn postgres::types::ToSql + Sync))
            .collect();
        tx.execute(&statement, &params)
            .with_context(|| format!("Failed to insert into {}", schema.name))?;
    }
    debug!(table = schema.name, rows = rows.len(), "loaded table");
    Ok(rows.len() as u64)
}

fn read_dictionary(tx: &mut Transaction<'_>) -> Result<Vec<(String, String)>> {
    let rows = tx
        .query(DICTIONARY_SQL, &[])
        .context("Failed to read column catalog for the data dictionary")?;
    Ok(rows
        .iter()
        .map(|row| (row.get(0), row.get(1)))
        .collect())
}
