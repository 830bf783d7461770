use std::path::{Path, PathBuf};
use std::process::{Command, Output};

mod support;

fn seed_root(prefix: &str) -> PathBuf {
    let root = support::unique_temp_dir(prefix);
    std::fs::create_dir_all(root.join("postgres")).expect("should create postgres dir");
    std::fs::write(
        root.join("postgres/01_create_table.sql"),
        support::read_fixture("platform/postgres/01_create_table.sql"),
    )
    .expect("should seed fixture");
    root
}

fn write_config(root: &Path) -> PathBuf {
    let config = root.join("schemas.json");
    std::fs::write(
        &config,
        r#"{
            "schemas": [
                {
                    "name": "backend",
                    "label": "Backend",
                    "tables": ["sys_user", "sys_role", "sys_menu", "sys_user_role"],
                    "types": ["Status", "MenuType"],
                    "files": ["postgres/01_create_table.sql"]
                }
            ]
        }"#,
    )
    .expect("should write config");
    config
}

fn run_cli(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_schemafix"))
        .args(args)
        .output()
        .expect("should run schemafix binary")
}

#[test]
fn run_rewrites_files_and_prints_the_summary() {
    let root = seed_root("schemafix_cli_run");
    let config = write_config(&root);

    let output = run_cli(&[
        "--config",
        config.to_str().expect("utf-8 path"),
        "--root",
        root.to_str().expect("utf-8 path"),
    ]);

    assert_eq!(output.status.code(), Some(0), "expected success");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("fixed postgres/01_create_table.sql"));
    assert!(stdout.contains("1 files fixed"));

    let rewritten = std::fs::read_to_string(root.join("postgres/01_create_table.sql"))
        .expect("target should exist");
    assert!(rewritten.contains("CREATE TABLE backend.sys_role ("));
}

#[test]
fn dry_run_with_pending_rewrites_exits_one() {
    let root = seed_root("schemafix_cli_dry");
    let config = write_config(&root);

    let output = run_cli(&[
        "--config",
        config.to_str().expect("utf-8 path"),
        "--root",
        root.to_str().expect("utf-8 path"),
        "--dry-run",
    ]);

    assert_eq!(output.status.code(), Some(1), "pending rewrites exit 1");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("would fix postgres/01_create_table.sql"));

    let untouched = std::fs::read_to_string(root.join("postgres/01_create_table.sql"))
        .expect("target should exist");
    assert!(untouched.contains("CREATE TABLE sys_role ("), "dry run must not write");
}

#[test]
fn verbose_prints_per_rule_diagnostics() {
    let root = seed_root("schemafix_cli_verbose");
    let config = write_config(&root);

    let output = run_cli(&[
        "--config",
        config.to_str().expect("utf-8 path"),
        "--root",
        root.to_str().expect("utf-8 path"),
        "--verbose",
    ]);

    assert_eq!(output.status.code(), Some(0));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("create-table"));
    assert!(stderr.contains("search-path"));
}

#[test]
fn unknown_schema_exits_with_usage_error() {
    let root = seed_root("schemafix_cli_schema");
    let config = write_config(&root);

    let output = run_cli(&[
        "--config",
        config.to_str().expect("utf-8 path"),
        "--root",
        root.to_str().expect("utf-8 path"),
        "--schema",
        "warehouse",
    ]);

    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Unknown schema: warehouse"));
}

#[test]
fn missing_config_exits_with_usage_error() {
    let root = support::unique_temp_dir("schemafix_cli_config");
    let absent = root.join("absent.json");

    let output = run_cli(&["--config", absent.to_str().expect("utf-8 path")]);

    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Error loading config"));
}
