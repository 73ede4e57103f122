use std::collections::HashMap;
use std::env::VarError;
use std::path::Path;

use super::*;

fn lookup_from_map<'a>(
    map: &'a HashMap<&'a str, &'a str>,
) -> impl Fn(&str) -> Result<String, VarError> + 'a {
    move |key| {
        map.get(key)
            .map(|v| (*v).to_string())
            .ok_or(VarError::NotPresent)
    }
}

#[test]
fn parse_environment_development() {
    assert_eq!(
        parse_environment("development").unwrap(),
        Environment::Development
    );
}

#[test]
fn parse_environment_test() {
    assert_eq!(parse_environment("test").unwrap(), Environment::Test);
}

#[test]
fn parse_environment_production() {
    assert_eq!(
        parse_environment("production").unwrap(),
        Environment::Production
    );
}

#[test]
fn parse_environment_unknown_fails() {
    let err = parse_environment("staging").unwrap_err();
    assert!(matches!(err, ConfigError::InvalidEnvVar { ref var, .. } if var == "AUTHSCORE_ENV"));
}

#[test]
fn build_app_config_defaults_with_empty_env() {
    let map: HashMap<&str, &str> = HashMap::new();
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.env, Environment::Development);
    assert_eq!(cfg.log_level, "info");
    assert!(cfg.policy_path.is_none());
    assert!(cfg.evidence_cap.is_none());
}

#[test]
fn build_app_config_reads_overrides() {
    let mut map = HashMap::new();
    map.insert("AUTHSCORE_ENV", "production");
    map.insert("AUTHSCORE_LOG_LEVEL", "debug");
    map.insert("AUTHSCORE_POLICY_PATH", "/etc/authscore/policy.yaml");
    map.insert("AUTHSCORE_EVIDENCE_CAP", "10");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.env, Environment::Production);
    assert_eq!(cfg.log_level, "debug");
    assert_eq!(
        cfg.policy_path.as_deref(),
        Some(Path::new("/etc/authscore/policy.yaml"))
    );
    assert_eq!(cfg.evidence_cap, Some(10));
}

#[test]
fn build_app_config_blank_policy_path_is_none() {
    let mut map = HashMap::new();
    map.insert("AUTHSCORE_POLICY_PATH", "  ");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert!(cfg.policy_path.is_none());
}

#[test]
fn build_app_config_invalid_evidence_cap() {
    let mut map = HashMap::new();
    map.insert("AUTHSCORE_EVIDENCE_CAP", "lots");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "AUTHSCORE_EVIDENCE_CAP"),
        "expected InvalidEnvVar(AUTHSCORE_EVIDENCE_CAP), got: {result:?}"
    );
}

#[test]
fn resolve_policy_applies_evidence_cap_override() {
    let cfg = AppConfig {
        env: Environment::Test,
        log_level: "info".to_string(),
        policy_path: None,
        evidence_cap: Some(2),
    };
    let policy = resolve_policy(&cfg).unwrap();
    assert_eq!(policy.comments.evidence_cap, 2);
    assert_eq!(policy.vision.evidence_cap, 2);
}

#[test]
fn resolve_policy_surfaces_missing_file() {
    let cfg = AppConfig {
        env: Environment::Test,
        log_level: "info".to_string(),
        policy_path: Some("/nonexistent/policy.yaml".into()),
        evidence_cap: None,
    };
    assert!(matches!(
        resolve_policy(&cfg),
        Err(ConfigError::PolicyFileIo { .. })
    ));
}
