use std::{fs, process::Command};

fn algoview(args: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_algoview"))
        .args(args)
        .env("RUST_LOG", "warn")
        .output()
        .expect("failed to launch algoview binary")
}

#[test]
fn generates_and_solves_a_maze() {
    let output = algoview(&[
        "--width",
        "15",
        "--height",
        "9",
        "--seed",
        "3",
        "--speed",
        "30",
        "--algorithm",
        "maze,bfs",
    ]);
    assert!(output.status.success(), "algoview exited with {:?}", output.status);

    let stdout = String::from_utf8(output.stdout).expect("utf-8 output");
    assert!(stdout.starts_with("AlgoView v1.0"));
    assert!(stdout.contains("random maze:"));
    assert!(stdout.contains("bfs:"));
    assert!(stdout.contains("path of"), "maze should be solvable: {stdout}");
    assert!(stdout.contains('*'));
}

#[test]
fn walled_grid_reports_no_path() {
    let output = algoview(&["--width", "6", "--height", "3", "--algorithm", "a-star"]);
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).expect("utf-8 output");
    assert!(stdout.contains("a*:"));
    assert!(stdout.contains("no path"));
}

#[test]
fn exceeding_the_tick_budget_fails() {
    let output = algoview(&[
        "--width",
        "25",
        "--height",
        "25",
        "--speed",
        "0.01",
        "--max-ticks",
        "3",
        "--algorithm",
        "maze",
    ]);
    assert!(!output.status.success());

    let stderr = String::from_utf8(output.stderr).expect("utf-8 output");
    assert!(stderr.contains("did not finish within 3 ticks"), "{stderr}");
}

#[test]
fn configuration_file_supplies_defaults() {
    let dir = std::env::temp_dir().join(format!("algoview-config-{}", std::process::id()));
    fs::create_dir_all(&dir).expect("create temp dir");
    let path = dir.join("algoview.toml");
    fs::write(
        &path,
        "width = 9\nheight = 5\nseed = 11\nspeed = 10.0\nalgorithms = [\"maze\", \"bidirectional-bfs\"]\n",
    )
    .expect("write config");

    let output = algoview(&["--config", path.to_str().expect("utf-8 path")]);
    let _ = fs::remove_dir_all(&dir);
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).expect("utf-8 output");
    assert!(stdout.contains("bidirectional bfs:"));
    assert!(stdout.contains("+---------+"), "frame width follows the file");
}

#[test]
fn missing_configuration_file_is_reported() {
    let output = algoview(&["--config", "/nonexistent/algoview.toml"]);
    assert!(!output.status.success());

    let stderr = String::from_utf8(output.stderr).expect("utf-8 output");
    assert!(stderr.contains("failed to read configuration"), "{stderr}");
}
