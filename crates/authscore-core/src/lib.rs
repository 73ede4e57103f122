//! Shared types, input validation, and configuration for authscore.
//!
//! The engine crate consumes these records; hosts (the CLI, or a service that
//! embeds the engine) use [`load_app_config`] and [`load_policy`] to decide
//! which scoring policy applies.

pub mod app_config;
pub mod config;
pub mod policy;
pub mod types;
pub mod validate;

use thiserror::Error;

pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env, resolve_policy};
pub use policy::{
    load_policy, parse_policy, validate_policy, CommentPolicy, CommentWeights, EngagementPenalties,
    EngagementPolicy, FusionWeights, IntegrationPolicy, Policy, RiskTiers, ScoringPolicy,
    SimilarityTiers, VisionPolicy, MAX_TIMING_WINDOW_SECS,
};
pub use types::{
    BrandMatch, CampaignRulesCheck, CheckValue, Comment, EligibilityCheck, EngagementInput,
    EngagementSnapshot, FrameDetection, RuleCheck, SimilarityScore, SubmissionInput, VisionInput,
};
pub use validate::{validate_submission, ValidationError};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read policy file {path}: {source}")]
    PolicyFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse policy file: {0}")]
    PolicyFileParse(#[source] serde_yaml::Error),

    #[error("policy validation failed: {0}")]
    Validation(String),
}
