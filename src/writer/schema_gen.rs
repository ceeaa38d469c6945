use crate::schema::{ColumnType, TableSchema};

fn postgres_type(col_type: ColumnType) -> &'static str {
    match col_type {
        ColumnType::Integer => "BIGINT",
        ColumnType::Real => "DOUBLE PRECISION",
        ColumnType::Text => "TEXT",
        ColumnType::Boolean => "BOOLEAN",
        ColumnType::Timestamp => "TIMESTAMPTZ",
        ColumnType::Json => "TEXT",
    }
}

/// Quote an identifier; mixed-case column names must reach the catalog
/// unchanged.
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

pub fn generate_drop_table(schema: &TableSchema) -> String {
    format!("DROP TABLE IF EXISTS {}", quote_ident(schema.name))
}

/// Generate CREATE TABLE SQL for a table schema
pub fn generate_create_table(schema: &TableSchema) -> String {
    let mut sql = format!("CREATE TABLE {} (\n", quote_ident(schema.name));
    let columns: Vec<String> = schema
        .columns
        .iter()
        .map(|col| {
            let null_constraint = if !col.nullable { " NOT NULL" } else { "" };
            format!(
                "    {} {}{}",
                quote_ident(col.name),
                postgres_type(col.col_type),
                null_constraint
            )
        })
        .collect();
    sql.push_str(&columns.join(",\n"));
    sql.push_str("\n)");
    sql
}

/// Generate a positional-parameter INSERT covering every column
pub fn generate_insert(schema: &TableSchema) -> String {
    let columns: Vec<String> = schema
        .columns
        .iter()
        .map(|col| quote_ident(col.name))
        .collect();
    let placeholders: Vec<String> = (1..=schema.columns.len())
        .map(|i| format!("${i}"))
        .collect();
    format!(
        "INSERT INTO {} ({}) VALUES ({})",
        quote_ident(schema.name),
        columns.join(", "),
        placeholders.join(", ")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{BUILDINGS, EDGES, SITES};

    #[test]
    fn test_generate_create_table() {
        let sql = generate_create_table(&SITES);
        assert!(sql.starts_with("CREATE TABLE \"sites\" (\n"));
        assert!(sql.contains("\"installationId\" TEXT"));
        assert!(sql.contains("\"northVector_x\" DOUBLE PRECISION"));
        assert!(sql.contains("\"etlUpdatedDate\" TIMESTAMPTZ NOT NULL"));
        assert!(!sql.contains("\"site_id\" TEXT NOT NULL"));
    }

    #[test]
    fn test_generate_create_table_types() {
        let sql = generate_create_table(&BUILDINGS);
        assert!(sql.contains("\"building_id\" BIGINT NOT NULL"));
        assert!(sql.contains("\"is_primary_building\" BOOLEAN"));

        let sql = generate_create_table(&EDGES);
        assert!(sql.contains("\"bearingVector\" TEXT"));
    }

    #[test]
    fn test_generate_drop_table() {
        assert_eq!(
            generate_drop_table(&SITES),
            "DROP TABLE IF EXISTS \"sites\""
        );
    }

    #[test]
    fn test_generate_insert_placeholders() {
        let sql = generate_insert(&BUILDINGS);
        assert_eq!(
            sql,
            "INSERT INTO \"buildings\" (\"site_id\", \"building_id\", \
             \"is_primary_building\", \"total_roof_area\", \"etlUpdatedDate\") \
             VALUES ($1, $2, $3, $4, $5)"
        );
    }

    #[test]
    fn test_quote_ident_escapes_quotes() {
        assert_eq!(quote_ident("plain"), "\"plain\"");
        assert_eq!(quote_ident("odd\"name"), "\"odd\"\"name\"");
    }
}
