//! Integration tests for the batch pipeline.
//!
//! The offline tests drive the full check flow (scan, validate, flatten,
//! report) against a temporary folder and need nothing external.
//!
//! The live-store tests replace tables in a real PostgreSQL database and
//! are ignored by default. Run them with:
//! ```sh
//! DB_HOST=localhost DB_USER=postgres DB_PASSWORD=postgres \
//! DB_DATABASE=roofs_test cargo test --test integration_test -- --ignored
//! ```

use std::fs;

use serde_json::json;
use tempfile::TempDir;

use roofs_to_postgres::batch;
use roofs_to_postgres::config::{BatchConfig, DbConfig, RunConfig};
use roofs_to_postgres::flatten::ObstructionScan;
use roofs_to_postgres::ui::SilentUi;

// =============================================================================
// Fixtures
// =============================================================================

fn test_schema() -> serde_json::Value {
    json!({
        "type": "object",
        "required": ["id", "siteModel"],
        "properties": {
            "id": {"type": "string"},
            "siteModel": {"type": "object"}
        }
    })
}

/// One site, one building with a plane carrying two edges, one
/// penetration and one plane obstruction, plus a site obstruction.
/// Flattens to 8 records.
fn full_document() -> serde_json::Value {
    json!({
        "id": "site-1",
        "installationId": "inst-1",
        "dateCreated": "2024-03-05T08:15:00Z",
        "version": "2.4",
        "siteModel": {
            "units": {"length": "meters", "angle": "degrees", "area": "squareMeters"},
            "northVector": {"x": 0.0, "y": 1.0, "z": 0.0},
            "obstructions": [
                {"id": "ob-1", "shapeType": "rect", "featureName": "skylight"}
            ],
            "buildings": [{
                "isPrimaryBuilding": true,
                "totalRoofArea": 120.0,
                "mountingPlanes": [{
                    "id": "plane-1",
                    "area": 52.5,
                    "pitchAngle": 22.0,
                    "azimuthAngle": 180.0,
                    "centroid": {"x": 1.0, "y": 2.0, "z": 3.0},
                    "azimuthVector": {"x": 0.0, "y": -1.0, "z": 0.0},
                    "coordinateSystem": {
                        "xAxis": {"x": 1.0, "y": 0.0, "z": 0.0},
                        "yAxis": {"x": 0.0, "y": 1.0, "z": 0.0},
                        "zAxis": {"x": 0.0, "y": 0.0, "z": 1.0}
                    },
                    "polygon": {
                        "exteriorRing": {
                            "windingDirection": "counterclockwise",
                            "edges": [
                                {
                                    "id": "e1",
                                    "startPoint": {"x": 0.0, "y": 0.0, "z": 0.0},
                                    "endPoint": {"x": 4.0, "y": 0.0, "z": 0.0}
                                },
                                {
                                    "id": "e2",
                                    "startPoint": {"x": 4.0, "y": 0.0, "z": 0.0},
                                    "endPoint": {"x": 4.0, "y": 3.0, "z": 2.0}
                                }
                            ]
                        }
                    },
                    "penetrations": [
                        {"id": "pen-1", "obstructionId": "ob-2"}
                    ],
                    "obstructions": [
                        {"id": "ob-2", "shapeType": "circle",
                         "center": {"x": 0.5, "y": 0.5, "z": 0.0}, "radius": 0.2}
                    ]
                }]
            }]
        }
    })
}

struct TestBatch {
    dir: TempDir,
    config: BatchConfig,
}

impl TestBatch {
    fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let input_dir = dir.path().join("roof_input_data");
        fs::create_dir(&input_dir).unwrap();
        let schema_path = dir.path().join("schema.json");
        fs::write(&schema_path, test_schema().to_string()).unwrap();
        let config = BatchConfig {
            input_dir,
            schema_path,
            report_dir: dir.path().join("roof_json_errors"),
            obstruction_scan: ObstructionScan::PenetrationGated,
        };
        Self { dir, config }
    }

    fn write_document(&self, name: &str, doc: &serde_json::Value) {
        fs::write(self.config.input_dir.join(name), doc.to_string()).unwrap();
    }

    fn write_raw(&self, name: &str, content: &str) {
        fs::write(self.config.input_dir.join(name), content).unwrap();
    }

    fn report(&self, file: &str) -> String {
        fs::read_to_string(self.config.report_dir.join(file)).unwrap()
    }
}

// =============================================================================
// Offline check flow
// =============================================================================

#[test]
fn test_check_flow_counts_and_reports() {
    let batch_dir = TestBatch::new();
    batch_dir.write_document("valid.json", &full_document());
    batch_dir.write_document("minimal.json", &json!({"id": "site-2", "siteModel": {}}));
    batch_dir.write_document("rejected.json", &json!({"siteModel": {}}));
    batch_dir.write_raw("broken.json", "{not json");
    batch_dir.write_raw("notes.txt", "ignored entirely");

    let summary = batch::check(&batch_dir.config, &mut SilentUi::new()).unwrap();

    assert_eq!(summary.files_seen, 4);
    assert_eq!(summary.documents_loaded, 2);
    assert_eq!(summary.schema_errors, 1);
    assert_eq!(summary.lint_errors, 1);
    assert_eq!(summary.records, 9);

    let schema_report = batch_dir.report("json_schema_errors.csv");
    assert!(schema_report.starts_with("Filename,Error Message"));
    assert!(schema_report.contains("rejected.json"));
    assert!(schema_report.contains("The JSON object is invalid"));
    assert!(!schema_report.contains("valid.json"));

    let lint_report = batch_dir.report("json_lint_errors.csv");
    assert!(lint_report.contains("broken.json"));
    assert!(lint_report.contains("Invalid JSON format in file: broken.json"));
}

#[test]
fn test_empty_input_folder_is_a_clean_batch() {
    let batch_dir = TestBatch::new();
    let summary = batch::check(&batch_dir.config, &mut SilentUi::new()).unwrap();
    assert_eq!(summary.files_seen, 0);
    assert_eq!(summary.records, 0);

    // Reports still get created so stale ones never linger
    let schema_report = batch_dir.report("json_schema_errors.csv");
    assert_eq!(schema_report.trim_end(), "Filename,Error Message");
}

#[test]
fn test_documents_accumulate_independently() {
    let batch_dir = TestBatch::new();
    batch_dir.write_document("a.json", &full_document());
    batch_dir.write_document(
        "b.json",
        &json!({
            "id": "site-9",
            "siteModel": {"buildings": [{}, {}]}
        }),
    );

    let summary = batch::check(&batch_dir.config, &mut SilentUi::new()).unwrap();
    assert_eq!(summary.documents_loaded, 2);
    // 8 records from the full document, 3 from the two-building one
    assert_eq!(summary.records, 11);
    assert_eq!(summary.schema_errors, 0);
}

#[test]
fn test_unparsable_date_is_contained_to_its_file() {
    let batch_dir = TestBatch::new();
    batch_dir.write_document(
        "bad_date.json",
        &json!({"id": "site-1", "dateCreated": "yesterday", "siteModel": {}}),
    );
    batch_dir.write_document("fine.json", &json!({"id": "site-2", "siteModel": {}}));

    let summary = batch::check(&batch_dir.config, &mut SilentUi::new()).unwrap();
    assert_eq!(summary.documents_loaded, 1);
    assert_eq!(summary.schema_errors, 0);
    assert_eq!(summary.lint_errors, 1);
    assert_eq!(summary.records, 1);

    let lint_report = batch_dir.report("json_lint_errors.csv");
    assert!(lint_report.contains("bad_date.json"));
    assert!(lint_report.contains("unrecognized dateCreated value"));
}

#[test]
fn test_missing_required_key_rejects_whole_document_as_malformed() {
    let batch_dir = TestBatch::new();
    // Site-level obstruction without its id: schema-valid for the test
    // schema, but a flattening fault for the whole document
    batch_dir.write_document(
        "no_ob_id.json",
        &json!({
            "id": "site-1",
            "siteModel": {
                "obstructions": [{"shapeType": "circle", "featureName": "vent"}],
                "buildings": [{}]
            }
        }),
    );
    batch_dir.write_document("fine.json", &json!({"id": "site-2", "siteModel": {}}));

    let summary = batch::check(&batch_dir.config, &mut SilentUi::new()).unwrap();
    assert_eq!(summary.documents_loaded, 1);
    assert_eq!(summary.lint_errors, 1);
    // Zero rows from the faulted document, one site row from the other
    assert_eq!(summary.records, 1);

    let lint_report = batch_dir.report("json_lint_errors.csv");
    assert!(lint_report.contains("no_ob_id.json"));
    assert!(lint_report.contains("does not match the expected shape"));
}

#[test]
fn test_check_fails_without_schema_file() {
    let batch_dir = TestBatch::new();
    fs::remove_file(&batch_dir.config.schema_path).unwrap();
    assert!(batch::check(&batch_dir.config, &mut SilentUi::new()).is_err());
}

// =============================================================================
// Live store (ignored unless a database is provided)
// =============================================================================

fn db_config_from_env() -> DbConfig {
    let var = |name: &str| {
        std::env::var(name)
            .unwrap_or_else(|_| panic!("{name} must be set for live store tests"))
    };
    DbConfig {
        host: var("DB_HOST"),
        port: std::env::var("DB_PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(5432),
        user: var("DB_USER"),
        password: var("DB_PASSWORD"),
        database: var("DB_DATABASE"),
    }
}

fn count_rows(client: &mut postgres::Client, table: &str) -> i64 {
    let sql = format!("SELECT count(*) FROM \"{table}\"");
    client.query_one(sql.as_str(), &[]).unwrap().get(0)
}

#[test]
#[ignore]
fn test_run_replaces_tables_and_exports_dictionary() {
    let batch_dir = TestBatch::new();
    batch_dir.write_document("valid.json", &full_document());
    batch_dir.write_document("minimal.json", &json!({"id": "site-2", "siteModel": {}}));

    let db = db_config_from_env();
    let dictionary_path = batch_dir.dir.path().join("roof_data_dictionary.csv");
    let config = RunConfig {
        db: db.clone(),
        batch: batch_dir.config.clone(),
        dictionary_path: dictionary_path.clone(),
    };

    let summary = batch::run(&config, &mut SilentUi::new()).unwrap();
    assert_eq!(summary.documents_loaded, 2);
    assert_eq!(summary.records, 9);

    let mut client = postgres::Config::new()
        .host(&db.host)
        .port(db.port)
        .user(&db.user)
        .password(&db.password)
        .dbname(&db.database)
        .connect(postgres::NoTls)
        .unwrap();

    assert_eq!(count_rows(&mut client, "sites"), 2);
    assert_eq!(count_rows(&mut client, "buildings"), 1);
    assert_eq!(count_rows(&mut client, "mounting_planes"), 1);
    assert_eq!(count_rows(&mut client, "edges"), 2);
    assert_eq!(count_rows(&mut client, "penetrations"), 1);
    assert_eq!(count_rows(&mut client, "obstructions"), 2);

    let loaded: Option<String> = client
        .query_one("SELECT \"site_id\" FROM \"buildings\" LIMIT 1", &[])
        .unwrap()
        .get(0);
    assert_eq!(loaded.as_deref(), Some("site-1"));

    let dictionary = fs::read_to_string(&dictionary_path).unwrap();
    assert!(dictionary.starts_with("Table Name,Column Name"));
    assert!(dictionary.contains("sites,site_id"));
    assert!(dictionary.contains("sites,installationId"));
    assert!(dictionary.contains("obstructions,level"));

    // Running again replaces rather than appends
    let again = batch::run(&config, &mut SilentUi::new()).unwrap();
    assert_eq!(again.records, 9);
    assert_eq!(count_rows(&mut client, "sites"), 2);
}
