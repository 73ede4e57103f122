//! Input records consumed by the scoring engine.
//!
//! Everything here is caller-owned and read-only to the engine. Shapes are
//! closed structs so a record is checked once by [`crate::validate`] and never
//! re-inspected by shape downstream.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A single viewer comment on a piece of content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub text: String,
    pub author: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub likes: Option<u64>,
}

/// Point-in-time engagement counters for a piece of content.
///
/// `views` and `shares` are optional because not every platform exposes them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngagementSnapshot {
    pub timestamp: DateTime<Utc>,
    pub likes: u64,
    #[serde(default)]
    pub views: Option<u64>,
    #[serde(default)]
    pub comments: u64,
    #[serde(default)]
    pub shares: Option<u64>,
}

/// A brand/logo match reported by the external detector for one frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BrandMatch {
    pub name: String,
    /// Detector confidence in `[0.0, 1.0]`.
    pub confidence: f64,
}

/// Embedding similarity between a frame and the campaign reference image.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimilarityScore {
    /// Cosine similarity clamped to `[0.0, 1.0]` by the producer.
    pub score: f64,
    #[serde(default)]
    pub is_match: bool,
}

/// Everything the vision collaborators detected on one sampled frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameDetection {
    /// Offset from the start of the video, in seconds.
    pub timestamp_sec: f64,
    #[serde(default)]
    pub objects: BTreeSet<String>,
    #[serde(default)]
    pub brand_matches: Vec<BrandMatch>,
    #[serde(default)]
    pub similarity: Option<SimilarityScore>,
    /// On-screen text recognized on the frame, if OCR ran.
    #[serde(default)]
    pub text: Option<String>,
}

/// Engagement inputs for one submission: the snapshot under evaluation plus
/// any earlier snapshots of the same content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngagementInput {
    pub current: EngagementSnapshot,
    #[serde(default)]
    pub history: Vec<EngagementSnapshot>,
    #[serde(default)]
    pub follower_count: Option<u64>,
}

/// Vision inputs for one submission, as produced by the media pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisionInput {
    #[serde(default)]
    pub frames: Vec<FrameDetection>,
    pub frame_interval_sec: f64,
    #[serde(default)]
    pub duration_sec: Option<f64>,
}

/// Outcome of one externally evaluated rule (eligibility or campaign rule).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleCheck {
    pub rule: String,
    pub passed: bool,
    #[serde(default)]
    pub actual: Option<CheckValue>,
    #[serde(default)]
    pub required: Option<CheckValue>,
    /// Relative weight inside its category. Defaults to `1.0`.
    #[serde(default = "default_weight")]
    pub weight: f64,
    /// A failing hard-gate check rejects the submission outright.
    #[serde(default)]
    pub hard_gate: bool,
}

impl RuleCheck {
    /// A unit-weight, non-gating check with no supporting values.
    #[must_use]
    pub fn new(rule: impl Into<String>, passed: bool) -> Self {
        Self {
            rule: rule.into(),
            passed,
            actual: None,
            required: None,
            weight: default_weight(),
            hard_gate: false,
        }
    }

    #[must_use]
    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = weight;
        self
    }

    #[must_use]
    pub fn with_values(mut self, actual: CheckValue, required: CheckValue) -> Self {
        self.actual = Some(actual);
        self.required = Some(required);
        self
    }

    #[must_use]
    pub fn gating(mut self) -> Self {
        self.hard_gate = true;
        self
    }
}

fn default_weight() -> f64 {
    1.0
}

/// Supporting value attached to a [`RuleCheck`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CheckValue {
    Flag(bool),
    Number(f64),
    Text(String),
}

impl std::fmt::Display for CheckValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CheckValue::Flag(b) => write!(f, "{b}"),
            CheckValue::Number(n) => write!(f, "{n}"),
            CheckValue::Text(s) => write!(f, "{s}"),
        }
    }
}

/// Creator eligibility results from the external eligibility checker.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EligibilityCheck {
    #[serde(default)]
    pub rules: Vec<RuleCheck>,
}

/// Campaign rule results from the external campaign-rule checker.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CampaignRulesCheck {
    #[serde(default)]
    pub rules: Vec<RuleCheck>,
}

/// Everything needed to evaluate one content submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmissionInput {
    #[serde(default)]
    pub submission_id: Option<Uuid>,
    pub target_brand: String,
    /// Post caption or transcript; searched for brand mentions.
    #[serde(default)]
    pub caption: Option<String>,
    #[serde(default)]
    pub comments: Vec<Comment>,
    pub engagement: EngagementInput,
    pub vision: VisionInput,
    #[serde(default)]
    pub eligibility: EligibilityCheck,
    #[serde(default)]
    pub campaign_rules: CampaignRulesCheck,
}
