use std::path::PathBuf;

use crate::app_config::{AppConfig, Environment};
use crate::policy::{load_policy, Policy};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Resolve the effective policy for a config: the file at `policy_path` when
/// set, otherwise the defaults, with the evidence-cap override applied.
///
/// # Errors
///
/// Returns `ConfigError` if the policy file cannot be loaded or is invalid.
pub fn resolve_policy(config: &AppConfig) -> Result<Policy, ConfigError> {
    let mut policy = match &config.policy_path {
        Some(path) => load_policy(path)?,
        None => Policy::default(),
    };
    if let Some(cap) = config.evidence_cap {
        policy.comments.evidence_cap = cap;
        policy.vision.evidence_cap = cap;
    }
    Ok(policy)
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the real environment so tests can use a plain `HashMap`.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let env = parse_environment(&or_default("AUTHSCORE_ENV", "development"))?;
    let log_level = or_default("AUTHSCORE_LOG_LEVEL", "info");
    let policy_path = lookup("AUTHSCORE_POLICY_PATH")
        .ok()
        .filter(|s| !s.trim().is_empty())
        .map(PathBuf::from);

    let evidence_cap = match lookup("AUTHSCORE_EVIDENCE_CAP") {
        Ok(raw) => Some(
            raw.parse::<usize>()
                .map_err(|e| ConfigError::InvalidEnvVar {
                    var: "AUTHSCORE_EVIDENCE_CAP".to_string(),
                    reason: e.to_string(),
                })?,
        ),
        Err(_) => None,
    };

    Ok(AppConfig {
        env,
        log_level,
        policy_path,
        evidence_cap,
    })
}

/// Parse a string into an `Environment` variant.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "AUTHSCORE_ENV".to_string(),
            reason: format!("expected development, test, or production; got '{other}'"),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
