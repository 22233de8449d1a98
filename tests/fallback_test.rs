use assert_cmd::cargo_bin;
use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::process::Command;

fn payrun() -> Command {
    let mut cmd = Command::new(cargo_bin!("workzen"));
    cmd.arg("payrun")
        .args(["--employees", "tests/fixtures/employees.csv"])
        .args(["--structures", "tests/fixtures/structures.csv"])
        .args(["--from", "2025-02-01", "--to", "2025-02-28"]);
    cmd
}

#[cfg(not(feature = "storage-rocksdb"))]
#[test]
fn test_rocksdb_fallback_warning() {
    let mut cmd = payrun();
    cmd.arg("--db-path").arg("some_db");

    cmd.assert()
        .success()
        .stderr(predicate::str::contains(
            "Persistent storage requested via --db-path, but 'storage-rocksdb' feature is not \
             enabled. Falling back to In-Memory storage.",
        ));
}

#[cfg(not(feature = "storage-rocksdb"))]
#[test]
fn test_db_path_from_environment() {
    let mut cmd = payrun();
    cmd.env("WORKZEN_DB_PATH", "some_db");

    cmd.assert()
        .success()
        .stderr(predicate::str::contains("Falling back to In-Memory storage"));
}

#[cfg(feature = "storage-rocksdb")]
#[test]
fn test_rocksdb_no_fallback_warning() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("test_db");

    let mut cmd = payrun();
    cmd.arg("--db-path").arg(&db_path);

    cmd.assert()
        .success()
        .stderr(predicate::str::contains("Falling back").not());
}
