//! Integration tests for the qmt CLI
//!
//! These tests exercise the CLI commands end-to-end using assert_cmd.
//! Every test gets its own data directory, so the sample records are the
//! starting point each time.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

/// A qmt command isolated from the user's config and environment
fn qmt(tmp: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("qmt").unwrap();
    cmd.env("QMT_CONFIG", tmp.path().join("no-config.yaml"))
        .env("QMT_AUTHOR", "Auditor")
        .env_remove("QMT_DATA_DIR")
        .env_remove("QMT_BACKEND")
        .env_remove("QMT_STORAGE_KEY")
        .env_remove("QMT_ID_STRATEGY")
        .env_remove("QMT_LOG")
        .arg("--data-dir")
        .arg(tmp.path());
    cmd
}

/// Run a command and return its stdout
fn stdout_of(tmp: &TempDir, args: &[&str]) -> String {
    let output = qmt(tmp).args(args).output().unwrap();
    assert!(output.status.success(), "qmt {:?} failed", args);
    String::from_utf8_lossy(&output.stdout).to_string()
}

/// Id from a "✓ Created <kind> <id>" report line
fn created_id(stdout: &str) -> String {
    stdout
        .lines()
        .find(|l| l.contains("Created"))
        .and_then(|l| l.split_whitespace().last())
        .map(str::to_string)
        .unwrap_or_default()
}

// ============================================================================
// CLI Basic Tests
// ============================================================================

#[test]
fn test_help_displays() {
    let tmp = TempDir::new().unwrap();
    qmt(&tmp)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Quality Management Toolkit"));
}

#[test]
fn test_unknown_command_fails() {
    let tmp = TempDir::new().unwrap();
    qmt(&tmp)
        .arg("unknown-command")
        .assert()
        .failure()
        .stderr(predicate::str::contains("error"));
}

#[test]
fn test_completions_bash() {
    let tmp = TempDir::new().unwrap();
    qmt(&tmp)
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("qmt"));
}

// ============================================================================
// Seed data and persistence
// ============================================================================

#[test]
fn test_first_run_lists_sample_risks() {
    let tmp = TempDir::new().unwrap();
    qmt(&tmp)
        .args(["risk", "list", "--count"])
        .assert()
        .success()
        .stdout("3\n");

    assert!(tmp.path().join("sgc-data.json").exists());
}

#[test]
fn test_created_record_survives_restart() {
    let tmp = TempDir::new().unwrap();
    let out = stdout_of(
        &tmp,
        &[
            "risk", "new", "--title", "Fuga de datos", "-p", "alto", "-i", "muy-alto",
        ],
    );
    let id = created_id(&out);
    assert!(!id.is_empty());
    assert!(out.contains("Muy Alto"));

    qmt(&tmp)
        .args(["risk", "show", &id])
        .assert()
        .success()
        .stdout(predicate::str::contains("Fuga de datos"))
        .stdout(predicate::str::contains("Auditor"));

    qmt(&tmp)
        .args(["risk", "list", "--high", "-f", "id"])
        .assert()
        .success()
        .stdout(format!("{}\n", id));
}

#[test]
fn test_corrupt_snapshot_falls_back_to_seed() {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join("sgc-data.json"), "{ not json").unwrap();

    qmt(&tmp)
        .args(["doc", "list", "--count"])
        .assert()
        .success()
        .stdout("4\n");
}

#[test]
fn test_partial_snapshot_keeps_other_collections() {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join("sgc-data.json"), r#"{"risks": [], "darkMode": true}"#).unwrap();

    qmt(&tmp)
        .args(["risk", "list", "--count"])
        .assert()
        .success()
        .stdout("0\n");
    qmt(&tmp)
        .args(["kpi", "list", "-f", "id"])
        .assert()
        .success()
        .stdout(predicate::str::contains("6"));
    qmt(&tmp)
        .args(["theme", "--show"])
        .assert()
        .success()
        .stdout("dark\n");
}

#[test]
fn test_sqlite_backend() {
    let tmp = TempDir::new().unwrap();
    qmt(&tmp)
        .env("QMT_BACKEND", "sqlite")
        .args(["theme"])
        .assert()
        .success();
    assert!(tmp.path().join("qmt.db").exists());

    qmt(&tmp)
        .env("QMT_BACKEND", "sqlite")
        .args(["theme", "--show"])
        .assert()
        .success()
        .stdout("dark\n");
}

#[test]
fn test_reset_restores_seed() {
    let tmp = TempDir::new().unwrap();
    qmt(&tmp).args(["doc", "delete", "1", "--yes"]).assert().success();
    qmt(&tmp)
        .args(["doc", "list", "--count"])
        .assert()
        .stdout("3\n");

    qmt(&tmp).args(["reset", "--yes"]).assert().success();
    qmt(&tmp)
        .args(["doc", "list", "--count"])
        .assert()
        .stdout("4\n");
}

// ============================================================================
// Record commands
// ============================================================================

#[test]
fn test_doc_new_requires_file_name() {
    let tmp = TempDir::new().unwrap();
    qmt(&tmp)
        .args(["doc", "new", "--title", "Manual"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("file"));
}

#[test]
fn test_doc_and_process_accept_version() {
    let tmp = TempDir::new().unwrap();
    let out = stdout_of(
        &tmp,
        &["doc", "new", "--title", "Manual", "--file-name", "a.pdf", "--version", "2.0"],
    );
    let id = created_id(&out);
    qmt(&tmp)
        .args(["doc", "show", &id, "-f", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"version\": \"2.0\""));

    qmt(&tmp)
        .args(["proc", "edit", "1", "--version", "3.1"])
        .assert()
        .success();
    qmt(&tmp)
        .args(["proc", "show", "1"])
        .assert()
        .stdout(predicate::str::contains("3.1"));
}

#[test]
fn test_doc_new_from_file() {
    let tmp = TempDir::new().unwrap();
    let file = tmp.path().join("manual.pdf");
    fs::write(&file, vec![0u8; 2048]).unwrap();

    let out = stdout_of(
        &tmp,
        &["doc", "new", "--title", "Manual", "--file", file.to_str().unwrap()],
    );
    let id = created_id(&out);

    qmt(&tmp)
        .args(["doc", "show", &id, "-f", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"fileName\": \"manual.pdf\""))
        .stdout(predicate::str::contains("2 KB"));
}

#[test]
fn test_show_missing_record_fails() {
    let tmp = TempDir::new().unwrap();
    qmt(&tmp)
        .args(["opp", "show", "99"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No opportunity found with id '99'"));
}

#[test]
fn test_process_steps() {
    let tmp = TempDir::new().unwrap();
    let out = stdout_of(&tmp, &["proc", "new", "--name", "Compras"]);
    let id = created_id(&out);

    qmt(&tmp)
        .args(["proc", "show", &id])
        .assert()
        .stdout(predicate::str::contains("incomplete"));

    qmt(&tmp)
        .args([
            "proc", "step", "add", &id, "--name", "Solicitud", "--responsible", "Compras",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("1 step(s)"));

    qmt(&tmp)
        .args(["proc", "show", &id])
        .assert()
        .stdout(predicate::str::contains("Solicitud"));
}

#[test]
fn test_pdca_move_next_phase() {
    let tmp = TempDir::new().unwrap();
    let out = stdout_of(
        &tmp,
        &["pdca", "new", "--title", "Reducir reprocesos", "--target", "2030-01-01"],
    );
    let id = created_id(&out);

    qmt(&tmp)
        .args(["pdca", "move", &id, "--next"])
        .assert()
        .success()
        .stdout(predicate::str::contains("30%"));

    qmt(&tmp)
        .args(["pdca", "move", &id, "--status", "completado"])
        .assert()
        .success()
        .stdout(predicate::str::contains("100%"));
}

#[test]
fn test_ncr_action_workflow() {
    let tmp = TempDir::new().unwrap();
    let out = stdout_of(&tmp, &["ncr", "new", "--title", "Producto sin etiqueta"]);
    let id = created_id(&out);

    qmt(&tmp)
        .args([
            "ncr", "action", "add", &id, "-d", "Reetiquetar lote", "--target", "2030-01-01",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("En Tratamiento"));

    let action = format!("{}-1", id);
    qmt(&tmp)
        .args(["ncr", "action", "status", &id, &action, "completada"])
        .assert()
        .success()
        .stdout(predicate::str::contains("En Verificación"));

    qmt(&tmp)
        .args(["ncr", "close", &id, "--yes"])
        .assert()
        .success();

    qmt(&tmp)
        .args(["ncr", "show", &id, "-f", "json"])
        .assert()
        .stdout(predicate::str::contains("\"status\": \"Cerrada\""));
}

#[test]
fn test_kpi_set_updates_trend() {
    let tmp = TempDir::new().unwrap();
    qmt(&tmp).args(["kpi", "set", "1", "1000"]).assert().success();

    qmt(&tmp)
        .args(["kpi", "show", "1", "-f", "json"])
        .assert()
        .stdout(predicate::str::contains("\"currentValue\": 1000.0"))
        .stdout(predicate::str::contains("\"trend\": \"up\""));
}

#[test]
fn test_kpi_list_below_achievement() {
    let tmp = TempDir::new().unwrap();
    qmt(&tmp)
        .args(["kpi", "list", "--below", "100", "-f", "id"])
        .assert()
        .success()
        .stdout("3\n5\n6\n");
}

// ============================================================================
// Dashboard, export and raw actions
// ============================================================================

#[test]
fn test_status_dashboard() {
    let tmp = TempDir::new().unwrap();
    qmt(&tmp)
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("Quality System Status"))
        .stdout(predicate::str::contains("NON-CONFORMITIES"));
}

#[test]
fn test_status_json() {
    let tmp = TempDir::new().unwrap();
    let out = stdout_of(&tmp, &["status", "-f", "json"]);
    let json: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(json["dashboard"]["totalDocuments"], 4);
    assert_eq!(json["dashboard"]["activeDocuments"], 2);
    assert_eq!(json["risks"]["total"], 3);
    assert_eq!(json["kpis"]["averageAchievement"], 97);
    assert!(json["kpis"].get("onTarget").is_none());
}

#[test]
fn test_export_csv() {
    let tmp = TempDir::new().unwrap();
    let out = stdout_of(&tmp, &["export", "risks"]);
    let mut lines = out.lines();
    assert!(lines.next().unwrap().starts_with("id,title"));
    assert_eq!(lines.count(), 3);
}

#[test]
fn test_export_to_file() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("kpis.csv");
    qmt(&tmp)
        .args(["export", "kpis", "-o", path.to_str().unwrap()])
        .assert()
        .success();
    let csv = fs::read_to_string(&path).unwrap();
    assert_eq!(csv.lines().count(), 7);
}

#[test]
fn test_dispatch_json_action() {
    let tmp = TempDir::new().unwrap();
    qmt(&tmp)
        .args(["dispatch", r#"{"type":"DELETE_RISK","payload":"1"}"#])
        .assert()
        .success()
        .stdout(predicate::str::contains("risks"));

    qmt(&tmp)
        .args(["risk", "list", "--count"])
        .assert()
        .stdout("2\n");
}

#[test]
fn test_dispatch_unknown_action_is_ignored() {
    let tmp = TempDir::new().unwrap();
    qmt(&tmp)
        .args(["dispatch", r#"{"type":"FLY_TO_MOON","payload":null}"#])
        .assert()
        .success()
        .stdout(predicate::str::contains("ignored"));

    qmt(&tmp)
        .args(["dispatch", "-"])
        .write_stdin("not json at all")
        .assert()
        .success()
        .stdout(predicate::str::contains("ignored"));
}

#[test]
fn test_theme_toggles() {
    let tmp = TempDir::new().unwrap();
    qmt(&tmp)
        .arg("theme")
        .assert()
        .success()
        .stdout(predicate::str::contains("dark"));
    qmt(&tmp)
        .args(["theme", "-q"])
        .assert()
        .success()
        .stdout("light\n");
}
