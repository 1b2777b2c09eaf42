//! Tests for the JSON file backend

use std::fs;

use pretty_assertions::assert_eq;
use serde_json::Value;
use tempfile::TempDir;
use udr_core::{
    ApplyExecutor, Error as CoreError, Operation, ReconcileRequest, Route, RouteTable,
    RouteTableBackend, TableRef, reconcile,
};
use udr_tables::FileBackend;
use udr_test_utils::documents::{read_route_names, write_route_table};
use udr_test_utils::fixtures::{day, snapshot, unrelated_routes};

fn read_json(path: &std::path::Path) -> Value {
    serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
}

#[test]
fn test_fetch_reads_routes() {
    let dir = TempDir::new().unwrap();
    write_route_table(dir.path(), "rg", "rt", &unrelated_routes(3));

    let backend = FileBackend::new(dir.path());
    let table = backend.fetch(&TableRef::new("rg", "rt")).unwrap();

    assert_eq!(table.len(), 3);
    assert!(table.contains("manual-2"));
    assert_eq!(table.etag.as_deref(), Some("W/\"0\""));
}

#[test]
fn test_fetch_missing_table() {
    let dir = TempDir::new().unwrap();
    let backend = FileBackend::new(dir.path());

    let err = backend.fetch(&TableRef::new("rg", "missing")).unwrap_err();
    assert!(matches!(err, CoreError::RouteTableNotFound { table } if table == "rg/missing"));
}

#[test]
fn test_fetch_table_without_routes_key() {
    let dir = TempDir::new().unwrap();
    fs::create_dir_all(dir.path().join("rg")).unwrap();
    fs::write(dir.path().join("rg/empty.json"), r#"{"name": "empty"}"#).unwrap();

    let table = FileBackend::new(dir.path())
        .fetch(&TableRef::new("rg", "empty"))
        .unwrap();
    assert!(table.is_empty());
}

#[test]
fn test_fetch_invalid_json_is_backend_error() {
    let dir = TempDir::new().unwrap();
    fs::create_dir_all(dir.path().join("rg")).unwrap();
    fs::write(dir.path().join("rg/rt.json"), "{ not json").unwrap();

    let err = FileBackend::new(dir.path())
        .fetch(&TableRef::new("rg", "rt"))
        .unwrap_err();
    assert!(matches!(err, CoreError::Backend(_)), "got {err:?}");
}

#[test]
fn test_commit_preserves_document_and_unchanged_routes() {
    let dir = TempDir::new().unwrap();
    let path = write_route_table(dir.path(), "rg", "rt", &unrelated_routes(2));
    let backend = FileBackend::new(dir.path());
    let table_ref = TableRef::new("rg", "rt");

    let mut table = backend.fetch(&table_ref).unwrap();
    table.remove_route("manual-0").unwrap();
    table
        .add_route(Route::internet("added", "40.0.0.0/8"))
        .unwrap();
    backend.commit(&table_ref, &table).unwrap();

    let document = read_json(&path);
    assert_eq!(document["location"], "westeurope");
    assert_eq!(read_route_names(&path), vec!["manual-1", "added"]);
    assert_eq!(document["routes"][0]["provisioningState"], "Succeeded");
    assert!(document["routes"][1].get("provisioningState").is_none());
    assert_eq!(document["routes"][1]["nextHopType"], "Internet");
}

#[test]
fn test_commit_rejects_stale_etag() {
    let dir = TempDir::new().unwrap();
    let path = write_route_table(dir.path(), "rg", "rt", &unrelated_routes(1));
    let mut document = read_json(&path);
    document["etag"] = Value::from("W/\"2\"");
    fs::write(&path, serde_json::to_vec_pretty(&document).unwrap()).unwrap();

    let backend = FileBackend::new(dir.path());
    let table_ref = TableRef::new("rg", "rt");
    let table = backend.fetch(&table_ref).unwrap();
    assert_eq!(table.etag.as_deref(), Some("W/\"2\""));

    let stale = RouteTable::new(vec![]).unwrap().with_etag(Some("W/\"1\"".to_string()));
    let err = backend.commit(&table_ref, &stale).unwrap_err();
    assert!(err.to_string().contains("changed since it was read"), "got {err}");
    assert_eq!(read_route_names(&path), vec!["manual-0"]);

    backend.commit(&table_ref, &table).unwrap();
    assert_eq!(read_json(&path)["etag"], "W/\"3\"");
}

#[test]
fn test_commit_stamps_fresh_etag() {
    let dir = TempDir::new().unwrap();
    let path = write_route_table(dir.path(), "rg", "rt", &unrelated_routes(1));
    let backend = FileBackend::new(dir.path());
    let table_ref = TableRef::new("rg", "rt");

    let table = backend.fetch(&table_ref).unwrap();
    backend.commit(&table_ref, &table).unwrap();
    assert_eq!(read_json(&path)["etag"], "W/\"1\"");

    let table = backend.fetch(&table_ref).unwrap();
    assert_eq!(table.etag.as_deref(), Some("W/\"1\""));
    backend.commit(&table_ref, &table).unwrap();
    assert_eq!(read_json(&path)["etag"], "W/\"2\"");
}

#[test]
fn test_second_writer_with_earlier_read_is_rejected() {
    let dir = TempDir::new().unwrap();
    let path = write_route_table(dir.path(), "rg", "rt", &unrelated_routes(1));
    let backend = FileBackend::new(dir.path());
    let table_ref = TableRef::new("rg", "rt");

    let mut first = backend.fetch(&table_ref).unwrap();
    let mut second = backend.fetch(&table_ref).unwrap();

    first
        .add_route(Route::internet("from-first", "40.0.0.0/8"))
        .unwrap();
    backend.commit(&table_ref, &first).unwrap();

    second
        .add_route(Route::internet("from-second", "41.0.0.0/8"))
        .unwrap();
    let err = backend.commit(&table_ref, &second).unwrap_err();
    assert!(err.to_string().contains("changed since it was read"), "got {err}");

    assert_eq!(read_route_names(&path), vec!["manual-0", "from-first"]);
}

#[test]
fn test_commit_without_etag_skips_check() {
    let dir = TempDir::new().unwrap();
    let path = write_route_table(dir.path(), "rg", "rt", &unrelated_routes(1));
    let backend = FileBackend::new(dir.path());
    let table_ref = TableRef::new("rg", "rt");

    let table = backend.fetch(&table_ref).unwrap();
    backend.commit(&table_ref, &table).unwrap();

    let blind = RouteTable::new(vec![Route::internet("blind", "40.0.0.0/8")]).unwrap();
    backend.commit(&table_ref, &blind).unwrap();
    assert_eq!(read_route_names(&path), vec!["blind"]);
    assert_eq!(read_json(&path)["etag"], "W/\"2\"");
}

#[test]
fn test_commit_leaves_no_temp_files() {
    let dir = TempDir::new().unwrap();
    write_route_table(dir.path(), "rg", "rt", &unrelated_routes(1));
    let backend = FileBackend::new(dir.path());
    let table_ref = TableRef::new("rg", "rt");

    let table = backend.fetch(&table_ref).unwrap();
    backend.commit(&table_ref, &table).unwrap();

    let leftovers: Vec<String> = fs::read_dir(dir.path().join("rg"))
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .filter(|name| name.ends_with(".tmp"))
        .collect();
    assert!(leftovers.is_empty(), "got {leftovers:?}");
}

#[test]
fn test_commit_missing_table() {
    let dir = TempDir::new().unwrap();
    let err = FileBackend::new(dir.path())
        .commit(&TableRef::new("rg", "rt"), &RouteTable::default())
        .unwrap_err();
    assert!(matches!(err, CoreError::RouteTableNotFound { .. }));
}

#[test]
fn test_reconcile_and_apply_against_file() {
    let dir = TempDir::new().unwrap();
    let path = write_route_table(dir.path(), "rg", "rt", &unrelated_routes(1));
    let backend = FileBackend::new(dir.path());
    let table_ref = TableRef::new("rg", "rt");
    let snapshot = snapshot("Public", 9, &[("Foo", 3, &["10.0.0.0/8", "10.1.0.0/16"])]);
    let request = ReconcileRequest::new(["Foo"], Operation::Sync).with_date(day(2024, 5, 13));

    let current = backend.fetch(&table_ref).unwrap();
    let plan = reconcile(&current, &snapshot, &request).unwrap();
    ApplyExecutor::new(&backend)
        .apply(&table_ref, current, &plan)
        .unwrap();

    assert_eq!(
        read_route_names(&path),
        vec![
            "manual-0",
            "STUDR-Public-Foo-3-0-20240513",
            "STUDR-Public-Foo-3-1-20240513",
        ]
    );

    // Second run is a no-op
    let current = backend.fetch(&table_ref).unwrap();
    let plan = reconcile(&current, &snapshot, &request).unwrap();
    assert!(plan.is_empty());
}
