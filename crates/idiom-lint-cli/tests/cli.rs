//! Integration test: the `idiom-lint` binary end-to-end.

use std::fs;
use std::path::Path;
use std::process::{Command, Output};

fn idiom_lint(args: &[&str], cwd: &Path) -> Output {
    Command::new(env!("CARGO_BIN_EXE_idiom-lint"))
        .args(args)
        .current_dir(cwd)
        .env("IDIOM_LINT_CONFIG_DIR", cwd.join("no-global"))
        .output()
        .expect("binary should run")
}

#[test]
fn no_subcommand_prints_usage_and_fails() {
    let dir = tempfile::tempdir().unwrap();
    let out = idiom_lint(&[], dir.path());
    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("Usage"));
}

#[test]
fn missing_path_fails() {
    let dir = tempfile::tempdir().unwrap();
    let out = idiom_lint(&["check", "does-not-exist.rs"], dir.path());
    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("does-not-exist.rs"));
}

#[test]
fn blocking_sleep_fails_the_run() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("handler.rs"),
        "async fn f() {\n    std::thread::sleep(d);\n}\n",
    )
    .unwrap();

    let out = idiom_lint(&["check", "handler.rs", "--format", "compact"], dir.path());
    assert_eq!(out.status.code(), Some(1));
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("handler.rs:2: error [IL101]"), "{stdout}");
}

#[test]
fn json_output_and_fail_on_threshold() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("lib.rs"), "fn f() { let v = x.unwrap(); }\n").unwrap();

    let out = idiom_lint(&["check", "lib.rs", "--format", "json"], dir.path());
    assert!(out.status.success());
    let report: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(report["findings"][0]["pattern"], "unwrap");
    assert_eq!(report["counts"]["warnings"], 1);

    let out = idiom_lint(
        &["check", "lib.rs", "--format", "json", "--fail-on", "warning"],
        dir.path(),
    );
    assert_eq!(out.status.code(), Some(1));
}

#[test]
fn project_config_is_picked_up() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("lib.rs"), "fn f() { let v = x.unwrap(); }\n").unwrap();
    fs::write(dir.path().join("idiom-lint.toml"), "preset = \"strict\"\n").unwrap();

    let out = idiom_lint(&["check", "lib.rs", "--format", "compact"], dir.path());
    assert_eq!(out.status.code(), Some(1));
}

#[test]
fn manifest_command_reports_layout() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("Cargo.toml"),
        "[package]\nname = \"demo\"\nversion = \"0.1.0\"\n",
    )
    .unwrap();

    let out = idiom_lint(&["manifest", "--format", "compact"], dir.path());
    assert_eq!(out.status.code(), Some(1));
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("[IL503]"), "{stdout}");
    assert!(stdout.contains("[IL601]"), "{stdout}");
}

#[test]
fn manifest_markdown_lists_project_and_dependencies() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("Cargo.toml"),
        "[package]\nname = \"demo\"\nversion = \"0.3.0\"\n\n[dependencies]\nserde = \"1\"\n",
    )
    .unwrap();

    let out = idiom_lint(&["manifest", "--format", "markdown"], dir.path());
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("## Project information"), "{stdout}");
    assert!(stdout.contains("- **Version:** 0.3.0"), "{stdout}");
    assert!(stdout.contains("## Dependencies\n\n- `serde` 1"), "{stdout}");
}

#[test]
fn check_markdown_lists_types() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("lib.rs"),
        "#[derive(Debug, Clone)]\npub struct Point;\n",
    )
    .unwrap();

    let out = idiom_lint(&["check", "lib.rs", "--format", "markdown"], dir.path());
    assert!(out.status.success());
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("## Types found"), "{stdout}");
    assert!(stdout.contains("| `Point` | struct | lib.rs:2 | Clone, Debug |"), "{stdout}");
}

#[test]
fn init_writes_parseable_config() {
    let dir = tempfile::tempdir().unwrap();
    assert!(idiom_lint(&["init"], dir.path()).status.success());
    assert!(dir.path().join("idiom-lint.toml").is_file());
    assert!(!idiom_lint(&["init"], dir.path()).status.success());
}
