use std::process::{Command, Output};

fn siegeline(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_siegeline"))
        .current_dir(env!("CARGO_MANIFEST_DIR"))
        .env("RUST_LOG", "warn")
        .args(args)
        .output()
        .expect("failed to launch the siegeline binary")
}

#[test]
fn prints_the_final_score() {
    let output = siegeline(&[
        "--level",
        "tests/fixtures/five_cell_level.json",
        "--actions",
        "tests/fixtures/five_cell_actions.json",
    ]);

    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "5");
}

#[test]
fn json_summary_carries_the_digest() {
    let output = siegeline(&[
        "--level",
        "tests/fixtures/five_cell_level.json",
        "--actions",
        "tests/fixtures/five_cell_actions.json",
        "--json",
    ]);

    assert!(output.status.success());
    let summary: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("summary is json");
    assert_eq!(summary["score"], 5);
    assert_eq!(summary["lives"], 0);
    assert_eq!(summary["digest"].as_str().map(str::len), Some(64));
}

#[test]
fn out_of_order_logs_fail() {
    let output = siegeline(&[
        "--level",
        "tests/fixtures/five_cell_level.json",
        "--actions",
        "tests/fixtures/backwards_actions.json",
    ]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("precedes the current tick"), "{stderr}");
}

#[test]
fn missing_files_are_reported() {
    let output = siegeline(&[
        "--level",
        "tests/fixtures/no_such_level.json",
        "--actions",
        "tests/fixtures/five_cell_actions.json",
    ]);

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("no_such_level.json"));
}
