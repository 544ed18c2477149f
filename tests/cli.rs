use assert_cmd::Command;
use tempfile::tempdir;

fn wordfall(home: &std::path::Path) -> Command {
    let mut cmd = Command::cargo_bin("wordfall").unwrap();
    cmd.env("HOME", home)
        .env("XDG_CONFIG_HOME", home.join(".config"))
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn help_lists_the_game_options() {
    let home = tempdir().unwrap();
    let output = wordfall(home.path()).arg("--help").output().unwrap();
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    for flag in ["--enemies", "--min-delay-ms", "--words", "--lenient"] {
        assert!(stdout.contains(flag), "missing {flag} in help");
    }
}

#[test]
fn rejects_an_empty_delay_range() {
    let home = tempdir().unwrap();
    let output = wordfall(home.path())
        .args(["--min-delay-ms", "0"])
        .output()
        .unwrap();
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("delay"), "unexpected stderr: {stderr}");
}

#[test]
fn refuses_to_start_without_a_tty() {
    let home = tempdir().unwrap();
    let output = wordfall(home.path()).args(["-e", "1"]).output().unwrap();
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("tty"), "unexpected stderr: {stderr}");
}

#[test]
fn save_config_persists_cli_overrides() {
    let home = tempdir().unwrap();
    // exits on the tty check, after the config has been written
    let _ = wordfall(home.path())
        .args(["-e", "12", "--save-config"])
        .output()
        .unwrap();

    let path = home.path().join(".config").join("wordfall").join("config.json");
    let saved: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap();
    assert_eq!(saved["enemies"], 12);
}
