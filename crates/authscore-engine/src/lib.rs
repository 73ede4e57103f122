//! Authenticity and compliance scoring for sponsored social content.
//!
//! Three independent analyzers (comments, engagement, vision) each reduce raw
//! signals to an explainable result; the scorer fuses those results with the
//! externally supplied eligibility and campaign-rule checks into a single
//! [`VerificationVerdict`]. Everything here is pure and deterministic: the
//! same inputs and policy always produce the same output.

pub mod checks;
pub mod comments;
pub mod engagement;
pub mod error;
pub mod pipeline;
pub mod scorer;
pub mod vision;

mod text;

use serde::{Deserialize, Serialize};

pub use checks::{BrandIntegrationCheck, ContentAuthenticityCheck};
pub use comments::{classify_comments, CommentAnalysis, CommentClassifier, RiskLevel};
pub use engagement::{analyze_engagement, EngagementAnalysis};
pub use error::EngineError;
pub use pipeline::{evaluate_submission, evaluate_submission_concurrent, SubmissionReport};
pub use scorer::{score_submission, VerdictStatus, VerificationVerdict};
pub use vision::{aggregate_frames, VisualSummary};

/// One issue category: how many items were flagged and a bounded sample.
///
/// `count` is always the full number flagged; `examples` stops at the
/// policy's evidence cap.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Issue<T> {
    pub count: usize,
    pub examples: Vec<T>,
}

impl<T> Default for Issue<T> {
    fn default() -> Self {
        Self {
            count: 0,
            examples: Vec::new(),
        }
    }
}

impl<T> Issue<T> {
    pub(crate) fn record(&mut self, cap: usize, example: T) {
        self.count += 1;
        if self.examples.len() < cap {
            self.examples.push(example);
        }
    }
}
