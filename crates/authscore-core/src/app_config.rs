use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

/// Process-level settings for hosts embedding the engine.
///
/// Scoring thresholds live in the policy file, not here.
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub env: Environment,
    pub log_level: String,
    /// Policy YAML to load; `None` means built-in defaults.
    pub policy_path: Option<PathBuf>,
    /// Overrides the per-category evidence cap from the policy, if set.
    pub evidence_cap: Option<usize>,
}
