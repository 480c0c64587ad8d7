use std::io::Write;
use std::path::PathBuf;
use std::process::Command;
use std::time::{SystemTime, UNIX_EPOCH};

use serde_json::Value;

fn workspace_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../..")
}

fn fixture_path() -> String {
    workspace_root()
        .join("tests/fixtures/sector12.json")
        .to_string_lossy()
        .to_string()
}

fn run_cli(args: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_bitburner-se"))
        .args(args)
        .output()
        .expect("failed to run bitburner-se CLI")
}

fn temp_path(prefix: &str, ext: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system time before unix epoch")
        .as_nanos();
    std::env::temp_dir().join(format!("{prefix}_{}_{}.{ext}", std::process::id(), nanos))
}

fn stdout_json(output: &std::process::Output) -> Value {
    assert!(
        output.status.success(),
        "{}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).expect("stdout should be json")
}

#[test]
fn cli_prints_full_text_report_by_default() {
    let output = run_cli(&[&fixture_path()]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    for heading in [
        " ::: Summary :::",
        " ::: Skills :::",
        " ::: Health :::",
        " ::: Multipliers :::",
        " ::: Augmentations :::",
    ] {
        assert!(stdout.contains(heading), "missing {heading}");
    }
    assert!(stdout.contains("Money: $1,234,567.50"));
}

#[test]
fn cli_prints_selected_text_sections_only() {
    let output = run_cli(&["--health", &fixture_path()]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.starts_with(" ::: Health :::"));
    assert!(!stdout.contains(" ::: Summary :::"));
    assert!(stdout.contains("Max HP"));
}

#[test]
fn cli_json_uses_canonical_order() {
    let value = stdout_json(&run_cli(&["--json", &fixture_path()]));
    let keys: Vec<&str> = value
        .as_object()
        .expect("object")
        .keys()
        .map(String::as_str)
        .collect();
    assert_eq!(
        keys,
        vec!["summary", "skills", "health", "multipliers", "augmentations"]
    );
}

#[test]
fn cli_json_field_selection() {
    let value = stdout_json(&run_cli(&[
        "--json",
        "--augmentations",
        "--summary",
        &fixture_path(),
    ]));
    let keys: Vec<&str> = value
        .as_object()
        .expect("object")
        .keys()
        .map(String::as_str)
        .collect();
    assert_eq!(keys, vec!["summary", "augmentations"]);
    assert_eq!(value["summary"]["bitnode"], 5);
    assert_eq!(value["augmentations"]["unrecognized"][0], "Mystery Implant");
}

#[test]
fn cli_verbose_adds_breakdowns() {
    let output = run_cli(&["--multipliers", "--verbose", &fixture_path()]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("SF1.1 Source Genesis"));
    assert!(stdout.contains("NeuroFlux Governor (level 2)"));
}

#[test]
fn cli_reports_missing_files() {
    let missing = temp_path("bitburner_se_missing", "json");
    let output = run_cli(&[&missing.to_string_lossy()]);
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Error reading"));
}

#[test]
fn cli_reports_malformed_saves() {
    let path = temp_path("bitburner_se_bad", "json");
    std::fs::write(&path, r#"{"ctor":"BitburnerSaveObject","data":{}}"#).expect("write");
    let output = run_cli(&[&path.to_string_lossy()]);
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Error parsing save file"));
    let _ = std::fs::remove_file(path);
}

#[test]
fn cli_loads_a_custom_catalog() {
    let path = temp_path("bitburner_se_catalog", "json");
    let mut file = std::fs::File::create(&path).expect("create catalog");
    file.write_all(
        br#"[{"key": "CombatRib1", "name": "Combat Rib I", "multipliers": {"strength": 3.0}}]"#,
    )
    .expect("write catalog");
    drop(file);

    let catalog_arg = path.to_string_lossy().to_string();
    let value = stdout_json(&run_cli(&[
        "--catalog",
        &catalog_arg,
        "--json",
        "--augmentations",
        &fixture_path(),
    ]));
    let owned = value["augmentations"]["owned"].as_array().expect("array");
    assert_eq!(owned.len(), 1);
    assert_eq!(owned[0]["key"], "CombatRib1");
    // Everything else the save owns is unknown to this catalog.
    let unrecognized = value["augmentations"]["unrecognized"]
        .as_array()
        .expect("array");
    assert_eq!(unrecognized.len(), 3);
    let _ = std::fs::remove_file(path);
}

#[test]
fn cli_rejects_invalid_catalogs() {
    let path = temp_path("bitburner_se_bad_catalog", "json");
    std::fs::write(
        &path,
        r#"[{"key": "A", "name": "A", "prerequisites": ["Missing"]}]"#,
    )
    .expect("write");
    let catalog_arg = path.to_string_lossy().to_string();
    let output = run_cli(&["--catalog", &catalog_arg, &fixture_path()]);
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Error loading catalog"));
    let _ = std::fs::remove_file(path);
}
