//! Scoring policy: every tunable threshold, weight and pattern list.
//!
//! Policy is plain data loaded from YAML so it can be versioned and tuned per
//! campaign without recompiling. Every section and field is optional in the
//! file; omitted values fall back to the defaults below.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Phrases that carry no information about the content on their own.
const DEFAULT_GENERIC_TOKENS: &[&str] = &[
    "nice",
    "fire",
    "wow",
    "cool",
    "great",
    "amazing",
    "awesome",
    "lit",
    "lol",
    "omg",
    "beautiful",
    "first",
    "dope",
    "sick",
    "yes",
    "love it",
    "love this",
    "so good",
    "nice one",
    "great post",
];

/// Promotional-intent patterns. Matched case-insensitively.
const DEFAULT_SPAM_PATTERNS: &[&str] = &[
    r"\bfollow\s+(me|back)\b",
    r"\bcheck\s+(out\s+)?my\s+(page|profile|channel|account|bio|feed)\b",
    r"\blink\s+in\s+(my\s+)?bio\b",
    r"\b(follow|f)\s*(4|for)\s*(follow|f)\b",
    r"\b(like|l)\s*(4|for)\s*(like|l)\b",
    r"\bsub\s*(4|for)\s*sub\b",
    r"\bdm\s+(me|for)\b",
    r"\b(free|cheap)\s+(followers|likes|views)\b",
    r"\b(promo|collab)\b.*\b(dm|message|contact)\b",
    r"https?://\S+",
];

/// Longest accepted comment-burst window: one day.
pub const MAX_TIMING_WINDOW_SECS: i64 = 86_400;

/// Objects whose presence next to a sponsored product is a brand-safety concern.
const DEFAULT_NEGATIVE_CONTEXT_OBJECTS: &[&str] =
    &["knife", "gun", "cigarette", "syringe", "wine glass"];

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Policy {
    pub comments: CommentPolicy,
    pub engagement: EngagementPolicy,
    pub vision: VisionPolicy,
    pub integration: IntegrationPolicy,
    pub scoring: ScoringPolicy,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CommentPolicy {
    pub generic_tokens: Vec<String>,
    pub spam_patterns: Vec<String>,
    /// Maximum span, in seconds, of a run of consecutive comments.
    pub timing_window_secs: i64,
    /// Number of consecutive comments that make a run.
    pub timing_run_length: usize,
    /// Maximum examples kept per issue category.
    pub evidence_cap: usize,
    pub weights: CommentWeights,
    pub risk_tiers: RiskTiers,
}

impl Default for CommentPolicy {
    fn default() -> Self {
        Self {
            generic_tokens: to_strings(DEFAULT_GENERIC_TOKENS),
            spam_patterns: to_strings(DEFAULT_SPAM_PATTERNS),
            timing_window_secs: 60,
            timing_run_length: 3,
            evidence_cap: 5,
            weights: CommentWeights::default(),
            risk_tiers: RiskTiers::default(),
        }
    }
}

/// Contribution of each comment category to bot likelihood.
///
/// `timing` is a flat bonus applied once when any run is found; the others are
/// scaled by the share of comments in the category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CommentWeights {
    pub duplicate: f64,
    pub emoji_only: f64,
    pub generic: f64,
    pub spam: f64,
    pub timing: f64,
}

impl Default for CommentWeights {
    fn default() -> Self {
        Self {
            duplicate: 0.30,
            emoji_only: 0.20,
            generic: 0.20,
            spam: 0.15,
            timing: 0.15,
        }
    }
}

/// Lower bounds of the bot-likelihood risk tiers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskTiers {
    pub high: f64,
    pub moderate: f64,
    pub low: f64,
}

impl Default for RiskTiers {
    fn default() -> Self {
        Self {
            high: 0.7,
            moderate: 0.4,
            low: 0.2,
        }
    }
}

/// Engagement anomaly thresholds.
///
/// The defaults are uncalibrated heuristics; tune them per follower-count
/// regime rather than treating them as fixed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngagementPolicy {
    /// Like-to-view ratio above which engagement looks bought.
    pub ratio_high: f64,
    pub ratio_low: f64,
    /// The low-ratio rule only applies above this many views.
    pub ratio_low_min_views: u64,
    /// Engagement rate thresholds, in percent of followers.
    pub rate_high: f64,
    pub rate_low: f64,
    pub rate_low_min_followers: u64,
    pub spike_z_threshold: f64,
    pub growth_window_hours: f64,
    pub growth_likes_per_hour: f64,
    /// Accounts at or above this size are exempt from the rapid-growth rule.
    pub growth_follower_cutoff: u64,
    pub penalties: EngagementPenalties,
    pub authentic_threshold: f64,
}

impl Default for EngagementPolicy {
    fn default() -> Self {
        Self {
            ratio_high: 0.20,
            ratio_low: 0.001,
            ratio_low_min_views: 1_000,
            rate_high: 15.0,
            rate_low: 0.1,
            rate_low_min_followers: 1_000,
            spike_z_threshold: 2.0,
            growth_window_hours: 24.0,
            growth_likes_per_hour: 1_000.0,
            growth_follower_cutoff: 100_000,
            penalties: EngagementPenalties::default(),
            authentic_threshold: 0.6,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngagementPenalties {
    pub spike: f64,
    pub rate: f64,
    pub ratio: f64,
    pub growth: f64,
}

impl Default for EngagementPenalties {
    fn default() -> Self {
        Self {
            spike: 0.30,
            rate: 0.25,
            ratio: 0.25,
            growth: 0.20,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VisionPolicy {
    /// Brand matches below this confidence are treated as noise.
    pub min_brand_confidence: f64,
    pub negative_context_objects: Vec<String>,
    pub similarity_match_threshold: f64,
    pub similarity_tiers: SimilarityTiers,
    /// Sentiment scores at or above this are labelled positive.
    pub sentiment_positive_at: f64,
    /// Sentiment scores at or below this are labelled negative.
    pub sentiment_negative_at: f64,
    pub evidence_cap: usize,
}

impl Default for VisionPolicy {
    fn default() -> Self {
        Self {
            min_brand_confidence: 0.25,
            negative_context_objects: to_strings(DEFAULT_NEGATIVE_CONTEXT_OBJECTS),
            similarity_match_threshold: 0.30,
            similarity_tiers: SimilarityTiers::default(),
            sentiment_positive_at: 0.2,
            sentiment_negative_at: -0.2,
            evidence_cap: 5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimilarityTiers {
    pub high: f64,
    pub medium: f64,
    pub low: f64,
}

impl Default for SimilarityTiers {
    fn default() -> Self {
        Self {
            high: 0.45,
            medium: 0.35,
            low: 0.30,
        }
    }
}

/// Weights and minimums for the brand-integration checks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IntegrationPolicy {
    pub min_visible_seconds: f64,
    pub brand_mention_weight: f64,
    pub product_visibility_weight: f64,
    pub visible_duration_weight: f64,
    pub brand_safe_context_weight: f64,
}

impl Default for IntegrationPolicy {
    fn default() -> Self {
        Self {
            min_visible_seconds: 3.0,
            brand_mention_weight: 2.0,
            product_visibility_weight: 2.0,
            visible_duration_weight: 1.0,
            brand_safe_context_weight: 1.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringPolicy {
    pub weights: FusionWeights,
    /// Minimum overall score (0-100) for `approved`.
    pub approve_at: f64,
    /// Minimum overall score (0-100) for `needs_revision`.
    pub revise_at: f64,
    /// Eligibility rules whose failure rejects the submission outright.
    pub hard_gate_eligibility_rules: Vec<String>,
    /// Campaign rules whose failure rejects the submission outright.
    pub hard_gate_campaign_rules: Vec<String>,
    /// Inauthentic engagement rejects when the authenticity score is below this.
    pub authenticity_hard_fail_below: f64,
}

impl Default for ScoringPolicy {
    fn default() -> Self {
        Self {
            weights: FusionWeights::default(),
            approve_at: 80.0,
            revise_at: 50.0,
            hard_gate_eligibility_rules: vec!["follower_threshold".to_string()],
            hard_gate_campaign_rules: Vec::new(),
            authenticity_hard_fail_below: 0.4,
        }
    }
}

/// Category weights for the overall score. Must sum to 1.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FusionWeights {
    pub eligibility: f64,
    pub authenticity: f64,
    pub integration: f64,
    pub rules: f64,
}

impl FusionWeights {
    #[must_use]
    pub fn sum(&self) -> f64 {
        self.eligibility + self.authenticity + self.integration + self.rules
    }
}

impl Default for FusionWeights {
    fn default() -> Self {
        Self {
            eligibility: 0.25,
            authenticity: 0.25,
            integration: 0.30,
            rules: 0.20,
        }
    }
}

fn to_strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| (*s).to_string()).collect()
}

/// Load and validate a policy from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_policy(path: &Path) -> Result<Policy, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::PolicyFileIo {
        path: path.display().to_string(),
        source: e,
    })?;
    parse_policy(&content)
}

/// Parse and validate a policy from YAML text.
///
/// # Errors
///
/// Returns `ConfigError` if the YAML is malformed or fails validation.
pub fn parse_policy(yaml: &str) -> Result<Policy, ConfigError> {
    let policy: Policy = serde_yaml::from_str(yaml).map_err(ConfigError::PolicyFileParse)?;
    validate_policy(&policy)?;
    Ok(policy)
}

/// Check internal consistency of a policy.
///
/// Regex syntax is not checked here; the comment classifier compiles the
/// patterns and reports bad ones.
///
/// # Errors
///
/// Returns `ConfigError::Validation` describing the first problem found.
pub fn validate_policy(policy: &Policy) -> Result<(), ConfigError> {
    let c = &policy.comments;
    for (name, value) in [
        ("comments.weights.duplicate", c.weights.duplicate),
        ("comments.weights.emoji_only", c.weights.emoji_only),
        ("comments.weights.generic", c.weights.generic),
        ("comments.weights.spam", c.weights.spam),
        ("comments.weights.timing", c.weights.timing),
        ("vision.min_brand_confidence", policy.vision.min_brand_confidence),
        (
            "vision.similarity_match_threshold",
            policy.vision.similarity_match_threshold,
        ),
        (
            "engagement.authentic_threshold",
            policy.engagement.authentic_threshold,
        ),
        (
            "scoring.authenticity_hard_fail_below",
            policy.scoring.authenticity_hard_fail_below,
        ),
    ] {
        require_unit(name, value)?;
    }

    if !(c.risk_tiers.low <= c.risk_tiers.moderate && c.risk_tiers.moderate <= c.risk_tiers.high)
    {
        return Err(ConfigError::Validation(format!(
            "comments.risk_tiers must satisfy low <= moderate <= high (got {}, {}, {})",
            c.risk_tiers.low, c.risk_tiers.moderate, c.risk_tiers.high
        )));
    }
    if c.timing_run_length < 2 {
        return Err(ConfigError::Validation(format!(
            "comments.timing_run_length must be at least 2, got {}",
            c.timing_run_length
        )));
    }
    if !(0..=MAX_TIMING_WINDOW_SECS).contains(&c.timing_window_secs) {
        return Err(ConfigError::Validation(format!(
            "comments.timing_window_secs must be in [0, {MAX_TIMING_WINDOW_SECS}], got {}",
            c.timing_window_secs
        )));
    }
    if c.spam_patterns.iter().any(|p| p.trim().is_empty()) {
        return Err(ConfigError::Validation(
            "comments.spam_patterns must not contain empty patterns".to_string(),
        ));
    }

    let e = &policy.engagement;
    if e.ratio_low > e.ratio_high {
        return Err(ConfigError::Validation(format!(
            "engagement.ratio_low ({}) must not exceed ratio_high ({})",
            e.ratio_low, e.ratio_high
        )));
    }
    if e.rate_low > e.rate_high {
        return Err(ConfigError::Validation(format!(
            "engagement.rate_low ({}) must not exceed rate_high ({})",
            e.rate_low, e.rate_high
        )));
    }
    if e.growth_window_hours <= 0.0 {
        return Err(ConfigError::Validation(format!(
            "engagement.growth_window_hours must be > 0, got {}",
            e.growth_window_hours
        )));
    }
    for (name, value) in [
        ("engagement.penalties.spike", e.penalties.spike),
        ("engagement.penalties.rate", e.penalties.rate),
        ("engagement.penalties.ratio", e.penalties.ratio),
        ("engagement.penalties.growth", e.penalties.growth),
    ] {
        require_unit(name, value)?;
    }

    let v = &policy.vision;
    let t = &v.similarity_tiers;
    if !(t.low <= t.medium && t.medium <= t.high) {
        return Err(ConfigError::Validation(format!(
            "vision.similarity_tiers must satisfy low <= medium <= high (got {}, {}, {})",
            t.low, t.medium, t.high
        )));
    }
    if v.sentiment_negative_at > v.sentiment_positive_at {
        return Err(ConfigError::Validation(format!(
            "vision.sentiment_negative_at ({}) must not exceed sentiment_positive_at ({})",
            v.sentiment_negative_at, v.sentiment_positive_at
        )));
    }

    let i = &policy.integration;
    for (name, value) in [
        ("integration.brand_mention_weight", i.brand_mention_weight),
        (
            "integration.product_visibility_weight",
            i.product_visibility_weight,
        ),
        ("integration.visible_duration_weight", i.visible_duration_weight),
        (
            "integration.brand_safe_context_weight",
            i.brand_safe_context_weight,
        ),
        ("integration.min_visible_seconds", i.min_visible_seconds),
    ] {
        if !value.is_finite() || value < 0.0 {
            return Err(ConfigError::Validation(format!(
                "{name} must be finite and >= 0, got {value}"
            )));
        }
    }

    let s = &policy.scoring;
    for (name, value) in [
        ("scoring.weights.eligibility", s.weights.eligibility),
        ("scoring.weights.authenticity", s.weights.authenticity),
        ("scoring.weights.integration", s.weights.integration),
        ("scoring.weights.rules", s.weights.rules),
    ] {
        require_unit(name, value)?;
    }
    if (s.weights.sum() - 1.0).abs() > 1e-6 {
        return Err(ConfigError::Validation(format!(
            "scoring.weights must sum to 1.0, got {}",
            s.weights.sum()
        )));
    }
    if !(0.0..=100.0).contains(&s.revise_at)
        || !(0.0..=100.0).contains(&s.approve_at)
        || s.revise_at > s.approve_at
    {
        return Err(ConfigError::Validation(format!(
            "scoring thresholds must satisfy 0 <= revise_at <= approve_at <= 100 (got {}, {})",
            s.revise_at, s.approve_at
        )));
    }

    Ok(())
}

fn require_unit(name: &str, value: f64) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::Validation(format!(
            "{name} must be in [0, 1], got {value}"
        )))
    }
}

#[cfg(test)]
#[path = "policy_test.rs"]
mod tests;
