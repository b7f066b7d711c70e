use std::process::Command;

#[test]
fn init_creates_valid_toml() {
    let dir = tempfile::tempdir().unwrap();

    let output = Command::new(env!("CARGO_BIN_EXE_herald"))
        .arg("init")
        .current_dir(dir.path())
        .output()
        .unwrap();

    assert!(
        output.status.success(),
        "herald init failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let config_path = dir.path().join(".herald.toml");
    assert!(config_path.exists(), ".herald.toml should exist");

    let content = std::fs::read_to_string(&config_path).unwrap();
    assert!(content.contains("[history]"));
    assert!(content.contains("[output]"));
    assert!(content.contains("[analyzer]"));
    assert!(content.contains("[telegram]"));

    // Verify it's valid TOML that herald-core can parse
    let config: herald_core::HeraldConfig = toml::from_str(&content).unwrap();
    assert_eq!(config.output.dir, "outputs");
}

#[test]
fn init_refuses_if_exists() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join(".herald.toml"), "# existing").unwrap();

    let output = Command::new(env!("CARGO_BIN_EXE_herald"))
        .arg("init")
        .current_dir(dir.path())
        .output()
        .unwrap();

    assert!(!output.status.success());
}
