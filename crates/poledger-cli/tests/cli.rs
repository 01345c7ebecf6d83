use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const LEDGER: &str = "\
PO_NUM,PO_DOLLARS,UNITS,CARRIER,CLIENT
123456,4500.00,1200,ACME,Magic Spoon
";

const NEW_PO: &str = "\
Order #: 555001
Requested Ship Date:
  10/01/2024
Merchandise Total 96 2,016.00
";

fn poledger() -> Command {
    Command::cargo_bin("poledger").unwrap()
}

fn workspace() -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("ledger.csv"), LEDGER).unwrap();
    fs::write(dir.path().join("555001.txt"), NEW_PO).unwrap();
    fs::write(dir.path().join("dup.txt"), "Order #: 123456\n").unwrap();
    fs::write(dir.path().join("memo.txt"), "See attached.\n").unwrap();
    dir
}

fn path_arg(dir: &Path, name: &str) -> String {
    dir.join(name).display().to_string()
}

#[test]
fn test_merge_writes_updated_file() {
    let dir = workspace();

    poledger()
        .arg("merge")
        .arg("--ledger")
        .arg(path_arg(dir.path(), "ledger.csv"))
        .arg(path_arg(dir.path(), "*.txt"))
        .args(["--no-prompt", "--carrier", "Swift"])
        .assert()
        .success()
        .stderr(predicate::str::contains("already in the ledger"))
        .stderr(predicate::str::contains("memo.txt"));

    let output = fs::read_to_string(dir.path().join("updated_file.csv")).unwrap();
    assert_eq!(
        output,
        "PO_NUM,PO_DOLLARS,UNITS,CARRIER,CLIENT\n\
         123456,4500.00,1200,ACME,Magic Spoon\n\
         555001,2016.00,96,Swift,N/A\n"
    );
}

#[test]
fn test_dry_run_writes_nothing() {
    let dir = workspace();

    poledger()
        .arg("merge")
        .arg("--ledger")
        .arg(path_arg(dir.path(), "ledger.csv"))
        .arg(path_arg(dir.path(), "555001.txt"))
        .args(["--no-prompt", "--dry-run"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Dry run"));

    assert!(!dir.path().join("updated_file.csv").exists());
}

#[test]
fn test_unsupported_ledger_is_rejected() {
    let dir = workspace();
    fs::write(dir.path().join("ledger.ods"), "").unwrap();

    poledger()
        .arg("merge")
        .arg("--ledger")
        .arg(path_arg(dir.path(), "ledger.ods"))
        .arg(path_arg(dir.path(), "555001.txt"))
        .arg("--no-prompt")
        .assert()
        .failure()
        .stderr(predicate::str::contains("unsupported ledger file type"));
}

#[test]
fn test_extract_csv_to_stdout() {
    let dir = workspace();

    poledger()
        .arg("extract")
        .arg(path_arg(dir.path(), "555001.txt"))
        .args(["--format", "csv"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("PO_NUM,PO_DOLLARS,UNITS,SHIP_DATE"))
        .stdout(predicate::str::contains("555001,2016.00,96,10/01/2024"));
}

#[test]
fn test_extract_reports_unrecognized_file() {
    let dir = workspace();

    poledger()
        .arg("extract")
        .arg(path_arg(dir.path(), "memo.txt"))
        .assert()
        .success()
        .stdout(predicate::str::contains("[]"))
        .stderr(predicate::str::contains("does not match the Costco PO format"));
}

#[test]
fn test_config_get_default() {
    let dir = tempfile::tempdir().unwrap();

    poledger()
        .arg("--config")
        .arg(path_arg(dir.path(), "config.json"))
        .args(["config", "get", "ledger.output_stem"])
        .assert()
        .success()
        .stdout(predicate::str::contains("updated_file"));
}
