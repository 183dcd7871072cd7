use std::process::Command;

#[test]
fn cli_compiles_without_warnings() {
    let status = Command::new(env!("CARGO"))
        .current_dir(env!("CARGO_MANIFEST_DIR"))
        .args(["check", "--quiet", "--bin", "lane-tactics"])
        .status()
        .expect("failed to invoke cargo check for the lane-tactics binary");

    assert!(status.success(), "cargo check --bin lane-tactics should succeed");
}

#[test]
fn replay_prints_a_line_per_turn_and_the_final_layout() {
    let output = Command::new(env!("CARGO_BIN_EXE_lane-tactics"))
        .args(["--turns", "3", "--log", "off"])
        .output()
        .expect("failed to run the lane-tactics binary");

    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).expect("stdout is UTF-8");
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines.len(), 5, "three turn lines, the totals and the layout");
    assert!(lines[0].starts_with("turn 0 phase Accumulating"));
    assert!(lines[3].starts_with("final walls="));
    assert!(lines[4].starts_with("lane:v1:"));
}
