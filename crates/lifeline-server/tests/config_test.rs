use lifeline_server::config::{load_config_with_env, ConfigError};
use lifeline_server::AppState;
use std::collections::HashMap;
use std::io::Write;
use std::net::{IpAddr, Ipv4Addr};

fn no_env(_: &str) -> Option<String> {
    None
}

fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |key: &str| map.get(key).cloned()
}

fn write_config(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

#[test]
fn test_missing_file_uses_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent.toml");

    let config = load_config_with_env(path.to_str(), no_env).unwrap();

    assert_eq!(config.server.host, IpAddr::V4(Ipv4Addr::LOCALHOST));
    assert_eq!(config.server.port, 8080);
    assert_eq!(config.lookup.base_url, "http://localhost:5000");
    assert_eq!(config.lookup.timeout_secs, 8);
    assert!(config.telephony.reroute_number.is_empty());
    assert_eq!(config.logging.level, "info");
    assert!(!config.logging.json);
}

#[test]
fn test_file_values_are_read() {
    let file = write_config(
        r#"
[server]
host = "0.0.0.0"
port = 9000

[telephony]
account_sid = "AC123"
auth_token = "secret-token"
reroute_number = "+13235550199"

[lookup]
base_url = "http://nlp.internal:5000"
timeout_secs = 4

[logging]
level = "debug"
json = true
"#,
    );

    let config = load_config_with_env(file.path().to_str(), no_env).unwrap();

    assert_eq!(config.server.host, IpAddr::V4(Ipv4Addr::UNSPECIFIED));
    assert_eq!(config.server.port, 9000);
    assert_eq!(config.telephony.account_sid, "AC123");
    assert_eq!(config.telephony.reroute_number, "+13235550199");
    assert_eq!(config.lookup.base_url, "http://nlp.internal:5000");
    assert_eq!(config.lookup.timeout_secs, 4);
    assert_eq!(config.logging.level, "debug");
    assert!(config.logging.json);
}

#[test]
fn test_environment_overrides_file() {
    let file = write_config("[server]\nport = 9000\n[telephony]\nreroute_number = \"+1000\"\n");
    let env = env_from(&[
        ("PORT", "7000"),
        ("TWILIO_ACC_ID", "AC999"),
        ("AUTH_TOKEN", "from-env"),
        ("TEAM_PHONE", "+15550000"),
        ("LIFELINE_LOOKUP_URL", "https://nlp.example.org"),
        ("LIFELINE_LOOKUP_TIMEOUT_SECS", "3"),
        ("LIFELINE_LOG_JSON", "1"),
    ]);

    let config = load_config_with_env(file.path().to_str(), env).unwrap();

    assert_eq!(config.server.port, 7000);
    assert_eq!(config.telephony.account_sid, "AC999");
    assert_eq!(config.telephony.auth_token, "from-env");
    assert_eq!(config.telephony.reroute_number, "+15550000");
    assert_eq!(config.lookup.base_url, "https://nlp.example.org");
    assert_eq!(config.lookup.timeout_secs, 3);
    assert!(config.logging.json);
}

#[test]
fn test_lifeline_port_wins_over_port_and_bad_values_are_ignored() {
    let env = env_from(&[
        ("LIFELINE_PORT", "6000"),
        ("PORT", "7000"),
        ("LIFELINE_HOST", "not-an-ip"),
        ("LIFELINE_LOOKUP_TIMEOUT_SECS", "soon"),
    ]);

    let config = load_config_with_env(None, env).unwrap();

    assert_eq!(config.server.port, 6000);
    assert_eq!(config.server.host, IpAddr::V4(Ipv4Addr::LOCALHOST));
    assert_eq!(config.lookup.timeout_secs, 8);
}

#[test]
fn test_invalid_toml_is_an_error() {
    let file = write_config("[server\nport = ");
    let err = load_config_with_env(file.path().to_str(), no_env).unwrap_err();
    assert!(matches!(err, ConfigError::Parse(_)));
}

#[test]
fn test_auth_token_is_redacted_in_debug_output() {
    let env = env_from(&[("AUTH_TOKEN", "super-secret")]);
    let config = load_config_with_env(None, env).unwrap();

    let debug = format!("{:?}", config);
    assert!(!debug.contains("super-secret"));
    assert!(debug.contains("[REDACTED]"));
}

#[test]
fn test_state_from_config_rejects_unusable_lookup_url() {
    let env = env_from(&[("LIFELINE_LOOKUP_URL", "localhost:5000")]);
    let config = load_config_with_env(None, env).unwrap();
    assert!(AppState::from_config(&config).is_err());

    let config = load_config_with_env(None, env_from(&[("TEAM_PHONE", "+15550000")])).unwrap();
    let state = AppState::from_config(&config).unwrap();
    assert_eq!(state.reroute_number, "+15550000");
    assert_eq!(state.lookup.endpoint(), "http://localhost:5000/process");
}
