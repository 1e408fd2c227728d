//! End-to-end tests for the monthsync binary.
//!
//! Each test runs two devices in separate temporary data directories and
//! hands package files between them.

use assert_cmd::Command;
use predicates::prelude::*;
use std::path::Path;
use tempfile::{tempdir, TempDir};

fn monthsync(data_dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("monthsync").expect("Failed to find monthsync binary");
    cmd.arg("--data-dir").arg(data_dir).env_remove("RUST_LOG");
    cmd
}

fn device(name: &str) -> TempDir {
    let dir = tempdir().unwrap();
    monthsync(dir.path())
        .args(["init", "--name", name])
        .assert()
        .success()
        .stdout(predicate::str::contains("Device initialized"));
    dir
}

fn set(dir: &TempDir, month: &str, day: &str, title: &str, location: &str) {
    monthsync(dir.path())
        .args(["set", month, "--day", day, "--title", title, "--location", location])
        .assert()
        .success();
}

fn export(dir: &TempDir) -> std::path::PathBuf {
    let file = dir.path().join("package.json");
    monthsync(dir.path())
        .arg("export")
        .arg(&file)
        .assert()
        .success()
        .stdout(predicate::str::contains("Exported"));
    file
}

// =============================================================================
// Local editing
// =============================================================================

mod editing {
    use super::*;

    #[test]
    fn set_then_show() {
        let dir = device("Laptop");
        set(&dir, "april", "22", "Earth Day", "Park");

        monthsync(dir.path())
            .arg("show")
            .assert()
            .success()
            .stdout(predicate::str::contains("Earth Day @ Park"))
            .stdout(predicate::str::contains("(no event)"));
    }

    #[test]
    fn clear_removes_event() {
        let dir = device("Laptop");
        set(&dir, "10", "31", "Halloween", "");

        monthsync(dir.path()).args(["clear", "october"]).assert().success();

        monthsync(dir.path())
            .arg("show")
            .assert()
            .success()
            .stdout(predicate::str::contains("Halloween").not());
    }

    #[test]
    fn invalid_day_fails() {
        let dir = device("Laptop");
        monthsync(dir.path())
            .args(["set", "april", "--day", "31", "--title", "Nope"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Invalid event"));
    }

    #[test]
    fn unknown_month_fails() {
        let dir = device("Laptop");
        monthsync(dir.path())
            .args(["set", "13", "--day", "1", "--title", "Nope"])
            .assert()
            .failure();
    }

    #[test]
    fn second_init_fails() {
        let dir = device("Laptop");
        monthsync(dir.path())
            .args(["init", "--name", "Again"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("already initialized"));
    }
}

// =============================================================================
// Two-device exchange
// =============================================================================

mod exchange {
    use super::*;

    #[test]
    fn import_lists_numbered_proposals() {
        let phone = device("Phone");
        set(&phone, "4", "22", "Earth Day Festival", "Park");
        set(&phone, "6", "1", "Picnic", "Lake");
        let file = export(&phone);

        let laptop = device("Laptop");
        set(&laptop, "4", "22", "Earth Day", "Park");

        monthsync(laptop.path())
            .arg("import")
            .arg(&file)
            .assert()
            .success()
            .stdout(predicate::str::contains("2 proposed change(s)"))
            .stdout(predicate::str::contains("[1] April title from Phone"))
            .stdout(predicate::str::contains("[2] June new event from Phone"));
    }

    #[test]
    fn accept_all_converges() {
        let phone = device("Phone");
        set(&phone, "4", "22", "Earth Day Festival", "Park");
        set(&phone, "6", "1", "Picnic", "Lake");
        let file = export(&phone);

        let laptop = device("Laptop");
        set(&laptop, "4", "22", "Earth Day", "Park");

        monthsync(laptop.path())
            .arg("accept")
            .arg(&file)
            .arg("--all")
            .assert()
            .success()
            .stdout(predicate::str::contains("2 applied"));

        monthsync(laptop.path())
            .arg("import")
            .arg(&file)
            .assert()
            .success()
            .stdout(predicate::str::contains("Calendars already match"));
    }

    #[test]
    fn accept_with_amendment() {
        let phone = device("Phone");
        set(&phone, "4", "22", "Earth Day Festival", "Park");
        let file = export(&phone);

        let laptop = device("Laptop");
        set(&laptop, "4", "22", "Earth Day", "Park");

        monthsync(laptop.path())
            .arg("accept")
            .arg(&file)
            .args(["--only", "1", "--amend", "1=Earth Day Fair"])
            .assert()
            .success();

        monthsync(laptop.path())
            .arg("show")
            .assert()
            .success()
            .stdout(predicate::str::contains("Earth Day Fair @ Park"));
    }

    #[test]
    fn accept_needs_a_selection() {
        let phone = device("Phone");
        let file = export(&phone);
        let laptop = device("Laptop");

        monthsync(laptop.path())
            .arg("accept")
            .arg(&file)
            .assert()
            .failure()
            .stderr(predicate::str::contains("--all"));
    }

    #[test]
    fn stale_package_rejected() {
        let phone = device("Phone");
        set(&phone, "4", "22", "Earth Day", "Park");
        let file = export(&phone);

        let mut package: serde_json::Value =
            serde_json::from_slice(&std::fs::read(&file).unwrap()).unwrap();
        let old = chrono::Utc::now() - chrono::Duration::days(8);
        package["timestamp"] = serde_json::json!(old.to_rfc3339());
        std::fs::write(&file, serde_json::to_vec(&package).unwrap()).unwrap();

        let laptop = device("Laptop");
        monthsync(laptop.path())
            .arg("import")
            .arg(&file)
            .assert()
            .failure()
            .stderr(predicate::str::contains("stale"));

        // A wider window from settings.toml lets it through
        std::fs::write(
            laptop.path().join("settings.toml"),
            "max_package_age_days = 30\n",
        )
        .unwrap();
        monthsync(laptop.path())
            .arg("import")
            .arg(&file)
            .assert()
            .success()
            .stdout(predicate::str::contains("April new event"));
    }

    #[test]
    fn unsupported_version_rejected() {
        let phone = device("Phone");
        let file = export(&phone);

        let mut package: serde_json::Value =
            serde_json::from_slice(&std::fs::read(&file).unwrap()).unwrap();
        package["syncVersion"] = serde_json::json!("2.0");
        std::fs::write(&file, serde_json::to_vec(&package).unwrap()).unwrap();

        let laptop = device("Laptop");
        monthsync(laptop.path())
            .arg("import")
            .arg(&file)
            .assert()
            .failure()
            .stderr(predicate::str::contains("unsupported protocol version"));
    }
}

// =============================================================================
// Status
// =============================================================================

#[test]
fn status_reports_uninitialized_device() {
    let dir = tempdir().unwrap();
    monthsync(dir.path())
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("NOT INITIALIZED"));
}

#[test]
fn status_counts_scheduled_months() {
    let dir = device("Laptop");
    set(&dir, "1", "1", "New Year", "");
    set(&dir, "12", "25", "Holiday", "Home");

    monthsync(dir.path())
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("Scheduled: 2 of 12 months"));
}
