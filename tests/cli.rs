mod common;

use std::process::Command;

fn covlua_bin() -> &'static str {
    env!("CARGO_BIN_EXE_covlua")
}

#[test]
fn cli_prints_listing_and_summary() {
    let dir = common::source_root(&[("src/game.lua", "local hp = 10\nhp = hp - 1\n")]);
    let profile = common::write_profile(&dir, &[("@src/game.lua:1", 1), ("@src/game.lua:2", 12)]);

    let output = Command::new(covlua_bin())
        .arg("-i")
        .arg(&profile)
        .arg("-path")
        .arg(dir.path())
        .output()
        .expect("failed to execute covlua");

    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.starts_with("total points = 2, files = 1\n"), "stdout: {stdout}");
    assert!(stdout.contains("coverage of "), "stdout: {stdout}");
    assert!(stdout.contains("1  local hp = 10\n"), "stdout: {stdout}");
    assert!(stdout.contains("12 hp = hp - 1\n"), "stdout: {stdout}");
    assert!(stdout.contains("game.lua total coverage 100% 2/2\n"), "stdout: {stdout}");
}

#[test]
fn cli_toggles_accept_false() {
    let dir = common::source_root(&[("a.lua", "print(1)\n")]);
    let profile = common::write_profile(&dir, &[("a.lua:1", 3)]);

    let output = Command::new(covlua_bin())
        .arg("-i")
        .arg(&profile)
        .arg("--path")
        .arg(dir.path())
        .arg("-showcode=false")
        .arg("-f")
        .arg("a")
        .output()
        .expect("failed to execute covlua");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(!stdout.contains("3 print(1)"), "stdout: {stdout}");
    assert!(stdout.contains("total coverage 100% 1/1"), "stdout: {stdout}");
}

#[test]
fn cli_without_input_prints_usage() {
    let output = Command::new(covlua_bin())
        .output()
        .expect("failed to execute covlua");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Usage"), "stdout: {stdout}");
}

#[test]
fn cli_fails_on_missing_source() {
    let dir = common::source_root(&[]);
    let profile = common::write_profile(&dir, &[("lost.lua:4", 1)]);

    let output = Command::new(covlua_bin())
        .arg("-i")
        .arg(&profile)
        .arg("-path")
        .arg(dir.path())
        .output()
        .expect("failed to execute covlua");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("lost.lua:4"), "stderr: {stderr}");
}
