use assert_cmd::Command;
use predicates::prelude::PredicateBooleanExt;
use predicates::str::contains;
use serde_json::json;
use std::fs;

fn write_sample(dir: &tempfile::TempDir) -> std::path::PathBuf {
    let path = dir.path().join("madison.geojson");
    let collection = json!({
        "type": "FeatureCollection",
        "features": [
            {
                "type": "Feature",
                "properties": {"Prop_ID": "M1", "OWNER_NAME": "D'Angelo", "LAND_VALUE": 500},
                "geometry": {"type": "Point", "coordinates": [-95.9, 30.9]}
            },
            {
                "type": "Feature",
                "properties": {"Prop_ID": "M2", "OWNER_NAME": "Smith", "LAND_VALUE": 0},
                "geometry": null
            }
        ]
    });
    fs::write(&path, collection.to_string()).expect("write sample");
    path
}

#[test]
fn generate_sql_requires_arguments() {
    Command::cargo_bin("generate-sql")
        .expect("binary exists")
        .assert()
        .failure()
        .stderr(contains("Usage"));
}

#[test]
fn generate_sql_rejects_extra_arguments() {
    Command::cargo_bin("generate-sql")
        .expect("binary exists")
        .args(["madison", "a.geojson", "b.geojson"])
        .assert()
        .failure();
}

#[test]
fn generate_sql_missing_input_fails() {
    let dir = tempfile::tempdir().unwrap();
    Command::cargo_bin("generate-sql")
        .expect("binary exists")
        .current_dir(dir.path())
        .args(["madison", "nope.geojson"])
        .assert()
        .failure()
        .stderr(contains("input file not found"));
}

#[test]
fn generate_sql_unknown_county_needs_a_file() {
    let dir = tempfile::tempdir().unwrap();
    Command::cargo_bin("generate-sql")
        .expect("binary exists")
        .current_dir(dir.path())
        .arg("travis")
        .assert()
        .failure()
        .stderr(contains("no default data file"));
}

#[test]
fn generate_sql_writes_default_output_file() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_sample(&dir);

    Command::cargo_bin("generate-sql")
        .expect("binary exists")
        .current_dir(dir.path())
        .args(["Madison", input.to_str().unwrap()])
        .assert()
        .success();

    let sql = fs::read_to_string(dir.path().join("import_madison.sql")).expect("read output");
    assert!(sql.contains("DELETE FROM properties WHERE county = 'madison';"));
    assert!(sql.contains("('madison', 'M1', 'D''Angelo', '', '', 500, NULL, NULL, "));
    assert!(sql.contains("('madison', 'M2', 'Smith', '', '', NULL, NULL, NULL, 'null');"));
}

#[test]
fn generate_sql_to_stdout() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_sample(&dir);

    Command::cargo_bin("generate-sql")
        .expect("binary exists")
        .args([
            "madison",
            input.to_str().unwrap(),
            "--output",
            "-",
            "--no-transaction",
            "--no-delete",
        ])
        .assert()
        .success()
        .stdout(contains("INSERT INTO properties (county, prop_id"))
        .stdout(contains("BEGIN;").not());
}

#[test]
fn import_requires_database_url() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_sample(&dir);

    Command::cargo_bin("import")
        .expect("binary exists")
        .current_dir(dir.path())
        .env_remove("DATABASE_URL")
        .args(["madison", input.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(contains("DATABASE_URL"));
}

#[test]
fn import_help_documents_one_run_per_county() {
    Command::cargo_bin("import")
        .expect("binary exists")
        .arg("--help")
        .assert()
        .success()
        .stdout(contains("at most one import per county"));
}
