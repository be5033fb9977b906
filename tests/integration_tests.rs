//! Integration tests for the pb CLI
//!
//! These tests exercise the CLI commands end-to-end using assert_cmd.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

/// Helper to get a pb command
fn pb() -> Command {
    Command::cargo_bin("pb").unwrap()
}

/// Helper to create an initialized workspace in a temp directory
fn setup_workspace() -> TempDir {
    let tmp = TempDir::new().unwrap();
    pb().current_dir(tmp.path()).arg("init").assert().success();
    tmp
}

/// Helper to add a component
fn add_component(tmp: &TempDir, mpn: &str, stock: &str, min_stock: &str, price: &str) {
    pb().current_dir(tmp.path())
        .args([
            "cmp", "add", mpn, "-m", "Yageo", "--stock", stock, "--min-stock", min_stock,
            "--price", price,
        ])
        .assert()
        .success();
}

// ============================================================================
// Basics
// ============================================================================

#[test]
fn test_help_displays() {
    pb().arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("inventory"));
}

#[test]
fn test_init_creates_workspace() {
    let tmp = TempDir::new().unwrap();
    pb().current_dir(tmp.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Initialized"));

    assert!(tmp.path().join(".pb/inventory.db").exists());
    assert!(tmp.path().join(".pb/settings.json").exists());
    assert!(tmp.path().join(".pb/backups").is_dir());
}

#[test]
fn test_init_twice_is_not_an_error() {
    let tmp = setup_workspace();
    pb().current_dir(tmp.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("already exists"));
}

#[test]
fn test_commands_fail_outside_workspace() {
    let tmp = TempDir::new().unwrap();
    pb().current_dir(tmp.path())
        .args(["cmp", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("pb init"));
}

// ============================================================================
// Components
// ============================================================================

#[test]
fn test_cmp_add_and_list() {
    let tmp = setup_workspace();
    add_component(&tmp, "RC0402FR-071KL", "100", "10", "0.01");

    pb().current_dir(tmp.path())
        .args(["cmp", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("RC0402FR-071KL"))
        .stdout(predicate::str::contains("Yageo"));
}

#[test]
fn test_cmp_add_duplicate_mpn_fails() {
    let tmp = setup_workspace();
    add_component(&tmp, "R1K", "0", "0", "0.01");

    pb().current_dir(tmp.path())
        .args(["cmp", "add", "R1K", "-m", "Yageo"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
}

#[test]
fn test_cmp_search_filter() {
    let tmp = setup_workspace();
    add_component(&tmp, "STM32F103C8T6", "5", "0", "2.50");
    add_component(&tmp, "GRM155R71C104KA88D", "500", "0", "0.002");

    pb().current_dir(tmp.path())
        .args(["cmp", "list", "-s", "stm32"])
        .assert()
        .success()
        .stdout(predicate::str::contains("STM32F103C8T6"))
        .stdout(predicate::str::contains("GRM155").not());
}

#[test]
fn test_cmp_edit_lifecycle_and_rm() {
    let tmp = setup_workspace();
    add_component(&tmp, "R1K", "0", "0", "0.01");

    pb().current_dir(tmp.path())
        .args(["cmp", "edit", "R1K", "--lifecycle", "eol"])
        .assert()
        .success();
    pb().current_dir(tmp.path())
        .args(["cmp", "show", "R1K"])
        .assert()
        .success()
        .stdout(predicate::str::contains("EOL"));

    pb().current_dir(tmp.path())
        .args(["cmp", "rm", "R1K", "--yes"])
        .assert()
        .success();
    pb().current_dir(tmp.path())
        .args(["cmp", "list", "--count"])
        .assert()
        .success()
        .stdout(predicate::str::contains("0"));
}

#[test]
fn test_cmp_rm_works_after_price_update() {
    let tmp = setup_workspace();
    add_component(&tmp, "R1K", "0", "0", "0.01");

    // Build up price history first; removal must still succeed
    pb().current_dir(tmp.path())
        .args(["prices", "update"])
        .assert()
        .success();
    pb().current_dir(tmp.path())
        .args(["cmp", "rm", "R1K", "--yes"])
        .assert()
        .success();
    pb().current_dir(tmp.path())
        .args(["cmp", "list", "--count"])
        .assert()
        .success()
        .stdout(predicate::str::contains("0"));
}

#[test]
fn test_cmp_export_writes_csv() {
    let tmp = setup_workspace();
    add_component(&tmp, "R1K", "100", "10", "0.01");

    pb().current_dir(tmp.path())
        .args(["cmp", "export", "-o", "out.csv"])
        .assert()
        .success();

    let csv = fs::read_to_string(tmp.path().join("out.csv")).unwrap();
    assert!(csv.starts_with("MPN,Manufacturer,Description,Stock,Price"));
    assert!(csv.contains("R1K,Yageo"));
}

// ============================================================================
// Suppliers
// ============================================================================

#[test]
fn test_sup_add_link_and_offers() {
    let tmp = setup_workspace();
    add_component(&tmp, "R1K", "0", "0", "0.01");

    pb().current_dir(tmp.path())
        .args(["sup", "add", "Digi-Key", "-w", "https://digikey.com"])
        .assert()
        .success();
    pb().current_dir(tmp.path())
        .args([
            "sup", "link", "R1K", "Digi-Key", "--supplier-mpn", "311-1.0KLRCT-ND", "--price",
            "0.012", "--moq", "1",
        ])
        .assert()
        .success();

    pb().current_dir(tmp.path())
        .args(["sup", "offers", "R1K"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Digi-Key"))
        .stdout(predicate::str::contains("311-1.0KLRCT-ND"));
}

// ============================================================================
// Projects and BOM
// ============================================================================

#[test]
fn test_proj_new_and_list() {
    let tmp = setup_workspace();
    pb().current_dir(tmp.path())
        .args(["proj", "new", "Widget-A", "-d", "rev A mainboard"])
        .assert()
        .success();

    pb().current_dir(tmp.path())
        .args(["proj", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Widget-A"))
        .stdout(predicate::str::contains("rev A mainboard"));
}

#[test]
fn test_bom_import_and_cost() {
    let tmp = setup_workspace();
    pb().current_dir(tmp.path())
        .args(["proj", "new", "Widget-A"])
        .assert()
        .success();

    fs::write(
        tmp.path().join("bom.csv"),
        "MPN,Manufacturer,Description,Price,Reference,Qty\n\
         R1K,Yageo,1k resistor,0.01,\"R1,R2,R3,R4\",4\n",
    )
    .unwrap();

    pb().current_dir(tmp.path())
        .args(["bom", "import", "Widget-A", "bom.csv"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1 line(s) written"))
        .stdout(predicate::str::contains("1 component(s) created"));

    pb().current_dir(tmp.path())
        .args(["bom", "list", "Widget-A"])
        .assert()
        .success()
        .stdout(predicate::str::contains("R1,R2,R3,R4"));

    // 4 x $0.01 = $0.04 per unit, $4.00 at 100 units
    pb().current_dir(tmp.path())
        .args(["bom", "cost", "Widget-A"])
        .assert()
        .success()
        .stdout(predicate::str::contains("$0.04"))
        .stdout(predicate::str::contains("$4.00"));
}

#[test]
fn test_bom_import_is_idempotent() {
    let tmp = setup_workspace();
    pb().current_dir(tmp.path())
        .args(["proj", "new", "Widget-A"])
        .assert()
        .success();
    fs::write(
        tmp.path().join("bom.csv"),
        "MPN,Reference,Qty\nR1K,R1,1\n",
    )
    .unwrap();

    for _ in 0..2 {
        pb().current_dir(tmp.path())
            .args(["bom", "import", "Widget-A", "bom.csv"])
            .assert()
            .success();
    }

    pb().current_dir(tmp.path())
        .args(["bom", "list", "Widget-A"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1 line(s)."));
    pb().current_dir(tmp.path())
        .args(["cmp", "list", "--count"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1"));
}

// ============================================================================
// Alerts and status
// ============================================================================

#[test]
fn test_alerts_report_low_stock_and_lifecycle() {
    let tmp = setup_workspace();
    add_component(&tmp, "LOW-PART", "5", "10", "0.10");
    add_component(&tmp, "OBS-PART", "50", "0", "1.00");
    pb().current_dir(tmp.path())
        .args(["cmp", "edit", "OBS-PART", "--lifecycle", "obsolete"])
        .assert()
        .success();

    pb().current_dir(tmp.path())
        .arg("alerts")
        .assert()
        .success()
        .stdout(predicate::str::contains("LOW-PART"))
        .stdout(predicate::str::contains("OBS-PART"))
        .stdout(predicate::str::contains("Obsolete"));
}

#[test]
fn test_alerts_empty_when_healthy() {
    let tmp = setup_workspace();
    add_component(&tmp, "OK-PART", "100", "10", "0.10");

    pb().current_dir(tmp.path())
        .arg("alerts")
        .assert()
        .success()
        .stdout(predicate::str::contains("No alerts"));
}

#[test]
fn test_status_counts() {
    let tmp = setup_workspace();
    add_component(&tmp, "A", "1", "5", "0.10");
    pb().current_dir(tmp.path())
        .args(["proj", "new", "Widget-A"])
        .assert()
        .success();

    pb().current_dir(tmp.path())
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("Projects"))
        .stdout(predicate::str::contains("Components"))
        .stdout(predicate::str::contains("Low stock"));
}

// ============================================================================
// Prices
// ============================================================================

#[test]
fn test_prices_update_writes_history() {
    let tmp = setup_workspace();
    add_component(&tmp, "R1K", "0", "0", "0.01");

    // The simulated source can fail a lookup, so run enough batches that at
    // least one quote lands.
    for _ in 0..5 {
        pb().current_dir(tmp.path())
            .args(["prices", "update"])
            .assert()
            .success();
    }

    pb().current_dir(tmp.path())
        .args(["prices", "history", "R1K"])
        .assert()
        .success()
        .stdout(predicate::str::contains("simulated"));
}

// ============================================================================
// Reports
// ============================================================================

#[test]
fn test_report_bom_writes_html() {
    let tmp = setup_workspace();
    pb().current_dir(tmp.path())
        .args(["proj", "new", "Widget-A"])
        .assert()
        .success();
    fs::write(
        tmp.path().join("bom.csv"),
        "MPN,Manufacturer,Price,Reference,Qty\nR1K,Yageo,0.01,\"R1,R2,R3,R4\",4\n",
    )
    .unwrap();
    pb().current_dir(tmp.path())
        .args(["bom", "import", "Widget-A", "bom.csv"])
        .assert()
        .success();

    pb().current_dir(tmp.path())
        .args(["report", "bom", "Widget-A", "-o", "reports"])
        .assert()
        .success();

    let report = fs::read_dir(tmp.path().join("reports"))
        .unwrap()
        .next()
        .unwrap()
        .unwrap()
        .path();
    let name = report.file_name().unwrap().to_string_lossy().to_string();
    assert!(name.starts_with("Widget-A_"));
    assert!(name.ends_with(".html"));

    let html = fs::read_to_string(&report).unwrap();
    assert!(html.contains("Widget-A"));
    assert!(html.contains("0.04"));
    assert!(html.contains("4.00"));
}

// ============================================================================
// Backups
// ============================================================================

#[test]
fn test_backup_now_list_restore() {
    let tmp = setup_workspace();
    add_component(&tmp, "R1K", "0", "0", "0.01");

    pb().current_dir(tmp.path())
        .args(["backup", "now"])
        .assert()
        .success();

    let output = pb()
        .current_dir(tmp.path())
        .args(["backup", "list"])
        .output()
        .unwrap();
    let stdout = String::from_utf8_lossy(&output.stdout);
    let backup_name = stdout
        .lines()
        .find(|l| l.starts_with("inventory_"))
        .unwrap()
        .to_string();

    // Change state after the backup, then roll back to it
    pb().current_dir(tmp.path())
        .args(["cmp", "add", "C100N", "-m", "Murata"])
        .assert()
        .success();
    pb().current_dir(tmp.path())
        .args(["backup", "restore", &backup_name, "--yes"])
        .assert()
        .success();

    pb().current_dir(tmp.path())
        .args(["cmp", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("R1K"))
        .stdout(predicate::str::contains("C100N").not());
}

// ============================================================================
// End-to-end scenario
// ============================================================================

#[test]
fn test_widget_end_to_end() {
    let tmp = setup_workspace();

    add_component(&tmp, "R1K", "100", "10", "0.01");
    pb().current_dir(tmp.path())
        .args(["proj", "new", "Widget-A", "-d", "rev A mainboard"])
        .assert()
        .success();
    fs::write(
        tmp.path().join("widget.csv"),
        "MPN,Manufacturer,Description,Price,Reference,Qty\n\
         R1K,Yageo,1k resistor,0.01,\"R1,R2,R3,R4\",4\n",
    )
    .unwrap();

    pb().current_dir(tmp.path())
        .args(["bom", "import", "Widget-A", "widget.csv"])
        .assert()
        .success()
        // R1K already exists: the import links it instead of recreating it
        .stdout(predicate::str::contains("0 component(s) created"));

    pb().current_dir(tmp.path())
        .args(["proj", "open", "Widget-A"])
        .assert()
        .success();
    pb().current_dir(tmp.path())
        .args(["proj", "recent"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Widget-A"));

    pb().current_dir(tmp.path())
        .args(["bom", "cost", "Widget-A"])
        .assert()
        .success()
        .stdout(predicate::str::contains("$0.04"))
        .stdout(predicate::str::contains("$0.40"))
        .stdout(predicate::str::contains("$4.00"));
}
