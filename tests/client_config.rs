use std::time::Duration;

use datomic_flare::config::{ClientConfig, DEFAULT_ADDRESS};
use datomic_flare::overrides::{Basis, DatabaseOverride};

fn write_config(name: &str, content: &str) -> String {
    let path = std::env::temp_dir().join(format!("{}-{}.toml", name, std::process::id()));
    std::fs::write(&path, content).expect("config written");
    path.to_string_lossy().into_owned()
}

#[test]
fn address_defaults_and_trailing_slash() {
    assert_eq!(ClientConfig::default().address(), DEFAULT_ADDRESS);
    assert_eq!(ClientConfig::new("  ").address(), "http://localhost:3042");
    assert_eq!(ClientConfig::new("http://flare:3042/").address(), "http://flare:3042");
    assert_eq!(ClientConfig::new("http://flare:3042").address(), "http://flare:3042");
}

#[test]
fn timeouts_are_milliseconds() {
    let config = ClientConfig { timeout_ms: Some(1500), ..ClientConfig::default() };
    assert_eq!(config.timeout(), Some(Duration::from_millis(1500)));
    assert_eq!(config.connect_timeout(), None);
}

#[test]
fn loads_from_a_file() {
    let path = write_config(
        "flare-client",
        r#"
address = "http://flare:3042/"
timeout_ms = 5000

[dangerously_override.database]
name = "purple"
as_of = 13194139534323
"#,
    );
    let config = ClientConfig::load(&path).expect("loaded");
    assert_eq!(config.address(), "http://flare:3042");
    assert_eq!(config.timeout(), Some(Duration::from_millis(5000)));
    assert_eq!(
        config.dangerously_override.database,
        Some(DatabaseOverride {
            name: Some("purple".to_string()),
            as_of: Some(Basis::T(13_194_139_534_323)),
            latest: None,
        })
    );
    let _ = std::fs::remove_file(path);
}

#[test]
fn missing_file_falls_back_to_defaults() {
    let config = ClientConfig::load("/nonexistent/flare-client").expect("loaded");
    assert_eq!(config.address(), DEFAULT_ADDRESS);
    assert!(config.dangerously_override.database.is_none());
}

#[test]
fn unreadable_config_is_an_error() {
    let path = write_config("flare-broken", "timeout_ms = \"soon\"\n");
    assert!(ClientConfig::load(&path).is_err());
    let _ = std::fs::remove_file(path);
}
