use std::process::Command;
use tempfile::TempDir;

#[test]
fn test_init_command() {
    let temp_dir = TempDir::new().unwrap();
    let temp_path = temp_dir.path();

    let output = Command::new(env!("CARGO_BIN_EXE_linkwatch"))
        .arg("init")
        .current_dir(temp_path)
        .env_remove("LINKWATCH_CONFIG")
        .output()
        .expect("Failed to run init command");

    assert!(output.status.success());

    // Check that config file was created
    let config_path = temp_path.join(".linkwatch/settings.toml");
    assert!(config_path.exists());

    let content = std::fs::read_to_string(&config_path).unwrap();
    assert!(content.contains("version = 1"));
    assert!(content.contains("[notify]"));
    assert!(content.contains("[server]"));

    // A second init without --force refuses to overwrite
    let again = Command::new(env!("CARGO_BIN_EXE_linkwatch"))
        .arg("init")
        .current_dir(temp_path)
        .env_remove("LINKWATCH_CONFIG")
        .output()
        .expect("Failed to run init command");
    assert!(!again.status.success());
}

#[test]
fn test_config_command() {
    let temp_dir = TempDir::new().unwrap();
    let temp_path = temp_dir.path();

    let config_dir = temp_path.join(".linkwatch");
    std::fs::create_dir_all(&config_dir).unwrap();

    let config_content = r#"
version = 2
[notify]
buffer_capacity = 131072
"#;
    std::fs::write(config_dir.join("settings.toml"), config_content).unwrap();

    let output = Command::new(env!("CARGO_BIN_EXE_linkwatch"))
        .arg("config")
        .current_dir(temp_path)
        .env_remove("LINKWATCH_CONFIG")
        .output()
        .expect("Failed to run config command");

    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("version = 2"));
    assert!(stdout.contains("buffer_capacity = 131072"));
}

#[test]
fn test_notify_without_target_fails() {
    let temp_dir = TempDir::new().unwrap();

    let output = Command::new(env!("CARGO_BIN_EXE_linkwatch"))
        .arg("notify")
        .current_dir(temp_dir.path())
        .env_remove("LINKWATCH_CONFIG")
        .env_remove("LW_NOTIFY__TARGET")
        .output()
        .expect("Failed to run notify command");

    assert!(!output.status.success());
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("Error:"));
}
