use std::process::{Command, Output};

fn run_game(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_city_trader"))
        .args(args)
        .env("RUST_LOG", "warn,city_trader=info")
        .output()
        .expect("Failed to execute game")
}

/// Pull the number following `label` out of the log output
fn read_stat(stderr: &str, label: &str) -> i64 {
    let line = stderr
        .lines()
        .find(|line| line.contains(label))
        .unwrap_or_else(|| panic!("Could not find '{}' line", label));
    // Handle log format with timestamp
    let parts: Vec<&str> = line.split(label).collect();
    parts
        .get(1)
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or_else(|| panic!("Could not parse value from line: {}", line))
}

/// Test that a seeded game runs headless to completion
#[test]
fn test_headless_game_runs() {
    let output = run_game(&["--seed", "42"]);

    assert!(
        output.status.success(),
        "Game failed to run in headless mode. stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("GAME COMPLETE"),
        "Game did not complete properly. stderr: {}",
        stderr
    );
}

/// Test that final statistics are logged
#[test]
fn test_game_statistics_logged() {
    let output = run_game(&["--seed", "7"]);
    assert!(output.status.success(), "Game failed to run");

    let stderr = String::from_utf8_lossy(&output.stderr);
    for label in ["Final score:", "Turns played:", "Events seen:"] {
        assert!(stderr.contains(label), "Missing '{}' statistic", label);
    }

    let turns = read_stat(&stderr, "Turns played:");
    assert!((1..=40).contains(&turns), "Unexpected turn count {}", turns);
    assert!(read_stat(&stderr, "Events seen:") >= 1);
}

/// Test that the same seed plays the same game
#[test]
fn test_seeded_games_are_reproducible() {
    let first = run_game(&["--seed", "1234"]);
    let second = run_game(&["--seed", "1234"]);
    assert!(first.status.success() && second.status.success());

    let first = String::from_utf8_lossy(&first.stderr);
    let second = String::from_utf8_lossy(&second.stderr);
    assert_eq!(
        read_stat(&first, "Final score:"),
        read_stat(&second, "Final score:")
    );
    assert_eq!(
        read_stat(&first, "Turns played:"),
        read_stat(&second, "Turns played:")
    );
}

/// Test that the turn limit stops the bot early
#[test]
fn test_turn_limit_respected() {
    let output = run_game(&["--seed", "3", "--max-turns", "3"]);
    assert!(output.status.success(), "Game failed to run");

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(read_stat(&stderr, "Turns played:") <= 3);
}

/// Test that a save file is written to the save directory
#[test]
fn test_save_written_to_directory() {
    let dir = tempfile::tempdir().expect("tempdir");
    let save_dir = dir.path().to_string_lossy().to_string();
    let output = run_game(&["--seed", "5", "--max-turns", "2", "--save-dir", &save_dir]);
    assert!(output.status.success(), "Game failed to run");

    let save = std::fs::read_to_string(dir.path().join("city_trader_save.json"))
        .expect("save file written");
    assert!(save.contains("\"version\":\"2\""));
}

/// Test that an unreadable config file is reported as a failure
#[test]
fn test_bad_config_fails() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("config.json");
    std::fs::write(&path, "{ \"total_turns\": -1 }").expect("write config");

    let output = run_game(&["--config", &path.to_string_lossy()]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Invalid config file"), "stderr: {}", stderr);
}
