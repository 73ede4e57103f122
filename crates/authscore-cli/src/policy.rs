//! `policy` sub-commands: validate a policy file or print the effective policy.

use std::path::PathBuf;

use anyhow::Context;
use authscore_core::AppConfig;
use clap::Subcommand;
use serde_json::json;

use crate::io::write_json;

/// Sub-commands available under `policy`.
#[derive(Debug, Subcommand)]
pub enum PolicyCommands {
    /// Load and validate a policy file
    Check {
        /// Policy file to check; defaults to the configured policy
        #[arg(long)]
        path: Option<PathBuf>,
    },
    /// Print the effective policy after defaults and overrides
    Show,
}

pub(crate) fn run(command: &PolicyCommands, config: &AppConfig, pretty: bool) -> anyhow::Result<()> {
    match command {
        PolicyCommands::Check { path } => {
            let path = path.as_ref().or(config.policy_path.as_ref());
            match path {
                Some(path) => {
                    authscore_core::load_policy(path)
                        .with_context(|| format!("policy {} is invalid", path.display()))?;
                    tracing::info!(path = %path.display(), "policy is valid");
                    write_json(&json!({ "path": path, "valid": true }), pretty)
                }
                None => {
                    let policy = authscore_core::Policy::default();
                    authscore_core::validate_policy(&policy)
                        .context("built-in default policy is invalid")?;
                    write_json(&json!({ "path": null, "valid": true }), pretty)
                }
            }
        }
        PolicyCommands::Show => {
            let policy = authscore_core::resolve_policy(config)
                .context("failed to load scoring policy")?;
            write_json(&policy, pretty)
        }
    }
}
