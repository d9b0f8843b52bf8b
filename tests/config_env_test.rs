use linkwatch::Settings;
use std::env;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

#[test]
fn test_env_override_with_custom_format() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("settings.toml");
    fs::write(
        &config_path,
        "[server]\nbind = \"127.0.0.1:7000\"\n\n[notify]\nbuffer_capacity = 70000\n",
    )
    .unwrap();

    unsafe {
        // Use double underscore to separate nested levels
        env::set_var("LW_SERVER__BIND", "127.0.0.1:9999");
        env::set_var("LW_NOTIFY__TARGET", "/srv/app/current");
        env::set_var("LW_LOGGING__DEFAULT", "debug");
    }

    let settings = Settings::load_from(&config_path).unwrap();

    // Environment wins over the file
    assert_eq!(settings.server.bind, "127.0.0.1:9999");
    // File value survives when no env var names it
    assert_eq!(settings.notify.buffer_capacity, 70000);
    assert_eq!(
        settings.notify.target,
        Some(PathBuf::from("/srv/app/current"))
    );
    assert_eq!(settings.logging.default, "debug");

    unsafe {
        // Clean up
        env::remove_var("LW_SERVER__BIND");
        env::remove_var("LW_NOTIFY__TARGET");
        env::remove_var("LW_LOGGING__DEFAULT");
    }
}
