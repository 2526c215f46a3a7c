use super::*;

use std::{
    env,
    time::{SystemTime, UNIX_EPOCH},
};

#[test]
fn file_overrides_defaults() {
    let mut settings = Settings::default();
    apply_file(
        &mut settings,
        r#"
base_url = "http://localhost:3000"
update_policy = "confirmed"
delete_policy = "Confirmed"
"#,
    )
    .expect("parse");

    assert_eq!(settings.base_url, "http://localhost:3000");
    assert_eq!(settings.policy.update, ReconcilePolicy::Confirmed);
    assert_eq!(settings.policy.delete, ReconcilePolicy::Confirmed);
    assert_eq!(settings.policy.create, ReconcilePolicy::Confirmed);
}

#[test]
fn unknown_policy_value_is_ignored() {
    let mut settings = Settings::default();
    apply_file(&mut settings, "create_policy = \"eventually\"").expect("parse");
    assert_eq!(settings.policy, SyncPolicy::default());
}

#[test]
fn app_prefixed_env_wins_over_plain_env() {
    let vars: HashMap<&str, &str> = HashMap::from([
        ("USERS_BASE_URL", "http://plain:1"),
        ("APP__BASE_URL", "http://prefixed:2"),
        ("APP__CREATE_POLICY", "optimistic"),
    ]);
    let mut settings = Settings::default();
    apply_env(&mut settings, |key| vars.get(key).map(|v| v.to_string()));

    assert_eq!(settings.base_url, "http://prefixed:2");
    assert_eq!(settings.policy.create, ReconcilePolicy::Optimistic);
}

#[test]
fn base_url_must_be_http() {
    assert_eq!(
        validate_base_url(" http://localhost:3000/ ").expect("valid"),
        "http://localhost:3000"
    );
    assert!(validate_base_url("ftp://localhost").is_err());
    assert!(validate_base_url("localhost:3000").is_err());
}

#[test]
fn command_line_override_beats_config_file() {
    let suffix = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock")
        .as_nanos();
    let path = env::temp_dir().join(format!("users_console_test_{suffix}.toml"));
    fs::write(&path, "base_url = \"http://from-file:8080\"\n").expect("write config");

    let settings =
        load_settings(&path, Some("http://from-cli:9090".to_string())).expect("load settings");
    assert_eq!(settings.base_url, "http://from-cli:9090");

    fs::remove_file(path).expect("cleanup");
}

#[test]
fn missing_config_file_falls_back_to_defaults() {
    let path = env::temp_dir().join("users_console_test_missing.toml");
    let settings =
        load_settings(&path, Some(DEFAULT_BASE_URL.to_string())).expect("load settings");
    assert_eq!(settings.base_url, DEFAULT_BASE_URL);
}
