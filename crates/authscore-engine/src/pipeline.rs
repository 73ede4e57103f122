//! End-to-end evaluation of one submission.
//!
//! 1. Validate the input at the boundary.
//! 2. Run the comment, engagement and vision analyses (independent leaves).
//! 3. Derive the authenticity and integration checks.
//! 4. Fuse everything into a [`VerificationVerdict`].

use std::sync::Arc;
use std::time::Instant;

use authscore_core::{validate_submission, Policy, SubmissionInput};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::checks::{BrandIntegrationCheck, ContentAuthenticityCheck};
use crate::comments::{classify_comments, CommentAnalysis};
use crate::engagement::{analyze_engagement, EngagementAnalysis};
use crate::error::EngineError;
use crate::scorer::{score_submission, VerificationVerdict};
use crate::vision::{aggregate_frames, VisualSummary};

/// Everything produced for one submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmissionReport {
    /// Echoed from the input.
    pub submission_id: Option<Uuid>,
    pub verdict: VerificationVerdict,
    pub comments: CommentAnalysis,
    pub engagement: EngagementAnalysis,
    pub visual: VisualSummary,
    /// Wall-clock time of the evaluation; the only non-deterministic field.
    pub processing_time_ms: u64,
}

/// Evaluate a submission, running the three analyses one after another.
///
/// # Errors
///
/// Returns [`EngineError::InvalidInput`] when the submission fails
/// validation and [`EngineError::InvalidPattern`] when a policy spam pattern
/// does not compile.
pub fn evaluate_submission(
    input: &SubmissionInput,
    policy: &Policy,
) -> Result<SubmissionReport, EngineError> {
    let started = Instant::now();
    validate_submission(input)?;

    let comments = classify_comments(&input.comments, &policy.comments)?;
    let engagement = run_engagement(input, policy);
    let visual = run_vision(input, policy);

    Ok(fuse(input, policy, comments, engagement, visual, started))
}

/// Evaluate a submission with the three analyses on the blocking thread pool.
///
/// Produces the same report as [`evaluate_submission`].
///
/// # Errors
///
/// As [`evaluate_submission`], plus [`EngineError::TaskJoin`] when an
/// analysis task panics.
pub async fn evaluate_submission_concurrent(
    input: Arc<SubmissionInput>,
    policy: Arc<Policy>,
) -> Result<SubmissionReport, EngineError> {
    let started = Instant::now();
    validate_submission(&input)?;

    let comments_task = {
        let input = Arc::clone(&input);
        let policy = Arc::clone(&policy);
        tokio::task::spawn_blocking(move || classify_comments(&input.comments, &policy.comments))
    };
    let engagement_task = {
        let input = Arc::clone(&input);
        let policy = Arc::clone(&policy);
        tokio::task::spawn_blocking(move || run_engagement(&input, &policy))
    };
    let vision_task = {
        let input = Arc::clone(&input);
        let policy = Arc::clone(&policy);
        tokio::task::spawn_blocking(move || run_vision(&input, &policy))
    };

    let (comments, engagement, visual) = tokio::try_join!(
        async { comments_task.await.map_err(join_error)? },
        async { engagement_task.await.map_err(join_error) },
        async { vision_task.await.map_err(join_error) },
    )?;

    Ok(fuse(&input, &policy, comments, engagement, visual, started))
}

fn join_error(e: tokio::task::JoinError) -> EngineError {
    EngineError::TaskJoin(e.to_string())
}

fn run_engagement(input: &SubmissionInput, policy: &Policy) -> EngagementAnalysis {
    analyze_engagement(
        &input.engagement.current,
        &input.engagement.history,
        input.engagement.follower_count,
        &policy.engagement,
    )
}

fn run_vision(input: &SubmissionInput, policy: &Policy) -> VisualSummary {
    aggregate_frames(
        &input.vision.frames,
        input.vision.frame_interval_sec,
        &input.target_brand,
        &policy.vision,
    )
}

fn fuse(
    input: &SubmissionInput,
    policy: &Policy,
    comments: CommentAnalysis,
    engagement: EngagementAnalysis,
    visual: VisualSummary,
    started: Instant,
) -> SubmissionReport {
    let authenticity = ContentAuthenticityCheck::from_analyses(&engagement, Some(&comments));
    let integration = BrandIntegrationCheck::from_visual(
        &visual,
        input.caption.as_deref(),
        &input.target_brand,
        &policy.integration,
    );
    let verdict = score_submission(
        &input.eligibility,
        &authenticity,
        &integration,
        &input.campaign_rules,
        &policy.scoring,
    );

    let processing_time_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
    tracing::debug!(
        submission_id = ?input.submission_id,
        status = %verdict.status,
        processing_time_ms,
        "submission evaluated"
    );

    SubmissionReport {
        submission_id: input.submission_id,
        verdict,
        comments,
        engagement,
        visual,
        processing_time_ms,
    }
}
