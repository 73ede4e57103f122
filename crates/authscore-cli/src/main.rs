mod io;
mod policy;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use authscore_core::validate::{validate_comments, validate_engagement, validate_vision};
use authscore_core::{Comment, EngagementInput, SubmissionInput, VisionInput};

use crate::io::{read_json, write_json};
use crate::policy::PolicyCommands;

#[derive(Debug, Parser)]
#[command(name = "authscore")]
#[command(about = "Authenticity and compliance scoring for sponsored content")]
struct Cli {
    /// Scoring policy YAML; overrides `AUTHSCORE_POLICY_PATH`
    #[arg(long, global = true)]
    policy: Option<PathBuf>,

    /// Pretty-print JSON output
    #[arg(long, global = true)]
    pretty: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Evaluate a full submission and print the report
    Evaluate {
        /// Submission JSON file (`-` for stdin)
        #[arg(long)]
        input: PathBuf,
        /// Run the three analyses on the blocking thread pool
        #[arg(long)]
        concurrent: bool,
    },
    /// Classify a JSON array of comments
    Comments {
        #[arg(long)]
        input: PathBuf,
    },
    /// Analyze an engagement snapshot and its history
    Engagement {
        #[arg(long)]
        input: PathBuf,
    },
    /// Aggregate per-frame vision detections for one brand
    Vision {
        #[arg(long)]
        input: PathBuf,
        /// Target brand to confirm
        #[arg(long)]
        brand: String,
    },
    /// Inspect the scoring policy
    Policy {
        #[command(subcommand)]
        command: PolicyCommands,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = authscore_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    if let Some(path) = cli.policy {
        config.policy_path = Some(path);
    }
    tracing::debug!(
        env = %config.env,
        policy_path = ?config.policy_path,
        "configuration loaded"
    );

    let load_policy =
        || authscore_core::resolve_policy(&config).context("failed to load scoring policy");

    match cli.command {
        Commands::Evaluate { input, concurrent } => {
            let submission: SubmissionInput = read_json(&input)?;
            let policy = load_policy()?;
            let report = if concurrent {
                authscore_engine::evaluate_submission_concurrent(
                    Arc::new(submission),
                    Arc::new(policy),
                )
                .await?
            } else {
                authscore_engine::evaluate_submission(&submission, &policy)?
            };
            write_json(&report, cli.pretty)?;
        }
        Commands::Comments { input } => {
            let comments: Vec<Comment> = read_json(&input)?;
            validate_comments(&comments, "comments")?;
            let analysis = authscore_engine::classify_comments(&comments, &load_policy()?.comments)?;
            write_json(&analysis, cli.pretty)?;
        }
        Commands::Engagement { input } => {
            let engagement: EngagementInput = read_json(&input)?;
            validate_engagement(&engagement, "engagement")?;
            let analysis = authscore_engine::analyze_engagement(
                &engagement.current,
                &engagement.history,
                engagement.follower_count,
                &load_policy()?.engagement,
            );
            write_json(&analysis, cli.pretty)?;
        }
        Commands::Vision { input, brand } => {
            let vision: VisionInput = read_json(&input)?;
            validate_vision(&vision, "vision")?;
            let summary = authscore_engine::aggregate_frames(
                &vision.frames,
                vision.frame_interval_sec,
                &brand,
                &load_policy()?.vision,
            );
            write_json(&summary, cli.pretty)?;
        }
        Commands::Policy { command } => policy::run(&command, &config, cli.pretty)?,
    }

    Ok(())
}
