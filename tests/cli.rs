use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;

fn cmd(db: &Path) -> Command {
    let mut cmd = Command::cargo_bin("apptrack").unwrap();
    cmd.arg("--db").arg(db);
    cmd
}

fn temp_db(dir: &tempfile::TempDir) -> PathBuf {
    dir.path().join("apptrack.db")
}

#[test]
fn init_add_list_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let db = temp_db(&dir);

    cmd(&db)
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Database initialized"));

    cmd(&db)
        .args(["add", "Acme Corp", "SWE Intern", "--date", "2024-01-10"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Added application #1"));

    cmd(&db)
        .arg("list")
        .assert()
        .success()
        .stdout(
            predicate::str::contains("Acme Corp")
                .and(predicate::str::contains("SWE Intern"))
                .and(predicate::str::contains("applied"))
                .and(predicate::str::contains("2024-01-10")),
        );
}

#[test]
fn commands_fail_before_init() {
    let dir = tempfile::tempdir().unwrap();
    let db = temp_db(&dir);

    cmd(&db)
        .arg("list")
        .assert()
        .failure()
        .stderr(predicate::str::contains("not initialized"));
}

#[test]
fn empty_company_is_rejected_with_the_field_named() {
    let dir = tempfile::tempdir().unwrap();
    let db = temp_db(&dir);
    cmd(&db).arg("init").assert().success();

    cmd(&db)
        .args(["add", "", "SWE Intern"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("company"));

    cmd(&db)
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("No applications found."));
}

#[test]
fn unknown_status_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let db = temp_db(&dir);
    cmd(&db).arg("init").assert().success();

    cmd(&db)
        .args(["add", "Acme", "Role", "--status", "ghosted"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("status"));
}

#[test]
fn status_update_shows_up_in_list() {
    let dir = tempfile::tempdir().unwrap();
    let db = temp_db(&dir);
    cmd(&db).arg("init").assert().success();
    cmd(&db)
        .args(["add", "Acme Corp", "SWE Intern", "--date", "2024-01-10"])
        .assert()
        .success();

    cmd(&db)
        .args(["status", "1", "interviewing"])
        .assert()
        .success()
        .stdout(predicate::str::contains("updated to interviewing"));

    cmd(&db)
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("interviewing"));
}

#[test]
fn status_update_on_missing_id_fails() {
    let dir = tempfile::tempdir().unwrap();
    let db = temp_db(&dir);
    cmd(&db).arg("init").assert().success();

    cmd(&db)
        .args(["status", "42", "offer"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no application found with id 42"));
}

#[test]
fn delete_requires_confirmation_flag() {
    let dir = tempfile::tempdir().unwrap();
    let db = temp_db(&dir);
    cmd(&db).arg("init").assert().success();
    cmd(&db).args(["add", "Acme", "Role"]).assert().success();

    cmd(&db)
        .args(["delete", "1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--yes"));

    cmd(&db)
        .args(["delete", "1", "--yes"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Deleted application #1"));

    // ids are not reused
    cmd(&db)
        .args(["add", "Globex", "Role"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Added application #2"));
}

#[test]
fn list_json_emits_parseable_records() {
    let dir = tempfile::tempdir().unwrap();
    let db = temp_db(&dir);
    cmd(&db).arg("init").assert().success();
    cmd(&db)
        .args(["add", "Acme Corp", "SWE Intern", "--date", "2024-01-10", "--notes", "referral"])
        .assert()
        .success();

    let output = cmd(&db).args(["list", "--json"]).output().unwrap();
    assert!(output.status.success());
    let records: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(records[0]["id"], 1);
    assert_eq!(records[0]["company"], "Acme Corp");
    assert_eq!(records[0]["status"], "applied");
    assert_eq!(records[0]["date_applied"], "2024-01-10");
    assert_eq!(records[0]["notes"], "referral");
}

#[test]
fn search_matches_company_fragments() {
    let dir = tempfile::tempdir().unwrap();
    let db = temp_db(&dir);
    cmd(&db).arg("init").assert().success();
    cmd(&db).args(["add", "Acme Corp", "Role"]).assert().success();
    cmd(&db).args(["add", "Globex", "Role"]).assert().success();

    cmd(&db)
        .args(["search", "acme"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Acme Corp").and(predicate::str::contains("Globex").not()));
}

#[test]
fn stats_reports_counts() {
    let dir = tempfile::tempdir().unwrap();
    let db = temp_db(&dir);
    cmd(&db).arg("init").assert().success();
    cmd(&db).args(["add", "Acme", "Role"]).assert().success();
    cmd(&db).args(["add", "Globex", "Role"]).assert().success();
    cmd(&db).args(["status", "1", "offer"]).assert().success();

    cmd(&db)
        .arg("stats")
        .assert()
        .success()
        .stdout(predicate::str::contains("TOTAL").and(predicate::str::contains("offer")));
}

#[test]
fn interactive_session_quits_cleanly() {
    let dir = tempfile::tempdir().unwrap();
    let db = temp_db(&dir);

    cmd(&db)
        .write_stdin("7\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("APPTRACK"));
}

#[test]
fn interactive_add_then_quit() {
    let dir = tempfile::tempdir().unwrap();
    let db = temp_db(&dir);

    cmd(&db)
        .write_stdin("1\nAcme Corp\nSWE Intern\n2024-01-10\n\n7\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Added application #1"));

    cmd(&db)
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("Acme Corp"));
}

#[test]
fn interactive_recovers_from_a_failed_operation() {
    let dir = tempfile::tempdir().unwrap();
    let db = temp_db(&dir);

    // option 3 with a missing id reports the error, then the session
    // continues to the quit option
    cmd(&db)
        .write_stdin("3\n42\n7\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("No application with id 42"));
}
