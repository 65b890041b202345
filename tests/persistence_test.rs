#![cfg(feature = "storage-rocksdb")]

use assert_cmd::cargo_bin;
use std::io::Write;
use std::process::Command;
use tempfile::tempdir;

const HEADER: &str = "op, caller, project, contractor, amount, outcome, memo";

#[test]
fn test_rocksdb_persistence_recovery() {
    let dir = tempdir().unwrap();
    let db_path = dir.path().join("test_db");

    // 1. First run: escrow a project
    let mut csv1 = tempfile::NamedTempFile::new().unwrap();
    writeln!(csv1, "{HEADER}").unwrap();
    writeln!(csv1, "create, 0xa, , 0xb, 100.0, , bridge").unwrap();

    let mut cmd1 = Command::new(cargo_bin!("payguard"));
    cmd1.arg(csv1.path()).arg("--db-path").arg(&db_path);

    let output1 = cmd1.output().expect("Failed to execute command");
    assert!(output1.status.success());
    let stdout1 = String::from_utf8_lossy(&output1.stdout);
    assert!(stdout1.contains("1,0xa,0xb,100.0,0,"));

    // 2. Second run: release the recovered project and create another
    let mut csv2 = tempfile::NamedTempFile::new().unwrap();
    writeln!(csv2, "{HEADER}").unwrap();
    writeln!(csv2, "release, 0xa, 1, , , , ").unwrap();
    writeln!(csv2, "create, 0xc, , 0xd, 5.0, , shed").unwrap();

    let mut cmd2 = Command::new(cargo_bin!("payguard"));
    cmd2.arg(csv2.path()).arg("--db-path").arg(&db_path);

    let output2 = cmd2.output().expect("Failed to execute command");
    assert!(output2.status.success());
    let stdout2 = String::from_utf8_lossy(&output2.stdout);

    // Project 1 survived the restart and was released
    assert!(stdout2.contains("1,0xa,0xb,0,1,"));
    // The id counter also survived: the new project got id 2, not 1
    assert!(stdout2.contains("2,0xc,0xd,5.0,0,"));
}
