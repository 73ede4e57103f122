//! Derived check lists that feed the verification scorer.
//!
//! Eligibility and campaign-rule checks arrive from outside as
//! [`RuleCheck`] lists; the two lists built here come from the engine's own
//! analyses and use the same shape so the scorer treats all four alike.

use authscore_core::{CheckValue, IntegrationPolicy, RuleCheck};
use serde::{Deserialize, Serialize};

use crate::comments::CommentAnalysis;
use crate::engagement::EngagementAnalysis;
use crate::text::contains_ignore_case;
use crate::vision::{SentimentLabel, VisualSummary};

/// Weighted share of passing checks. An empty list scores `1.0`.
#[must_use]
pub fn weighted_pass_rate(checks: &[RuleCheck]) -> f64 {
    let total: f64 = checks.iter().map(|c| c.weight).sum();
    if checks.is_empty() || total <= 0.0 {
        return 1.0;
    }
    let passed: f64 = checks.iter().filter(|c| c.passed).map(|c| c.weight).sum();
    (passed / total).clamp(0.0, 1.0)
}

/// Authenticity checks derived from the engagement and comment analyses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentAuthenticityCheck {
    pub engagement_authentic: bool,
    /// `None` when no comments were analyzed.
    pub comments_authentic: Option<bool>,
    pub checks: Vec<RuleCheck>,
}

impl ContentAuthenticityCheck {
    /// Build the check list. The `comments_authentic` check is only added
    /// when a non-empty comment set was analyzed.
    #[must_use]
    pub fn from_analyses(
        engagement: &EngagementAnalysis,
        comments: Option<&CommentAnalysis>,
    ) -> Self {
        let anomalies = &engagement.anomalies;
        let mut checks = vec![
            RuleCheck {
                actual: Some(CheckValue::Number(engagement.authenticity_score)),
                ..RuleCheck::new("engagement_authentic", engagement.is_authentic)
            },
            RuleCheck {
                actual: anomalies.view_like_ratio.ratio.map(CheckValue::Number),
                ..RuleCheck::new("no_ratio_anomaly", !anomalies.view_like_ratio.detected)
            },
            RuleCheck {
                actual: anomalies.engagement_rate.rate.map(CheckValue::Number),
                ..RuleCheck::new("no_rate_anomaly", !anomalies.engagement_rate.detected)
            },
            RuleCheck {
                actual: anomalies.like_spike.z_score.map(CheckValue::Number),
                ..RuleCheck::new("no_like_spike", !anomalies.like_spike.detected)
            },
            RuleCheck {
                actual: anomalies.rapid_growth.likes_per_hour.map(CheckValue::Number),
                ..RuleCheck::new("no_rapid_growth", !anomalies.rapid_growth.detected)
            },
        ];

        let comments_authentic = comments
            .filter(|c| c.total_comments > 0)
            .map(|c| !c.is_likely_bot);
        if let (Some(passed), Some(analysis)) = (comments_authentic, comments) {
            checks.push(RuleCheck {
                actual: Some(CheckValue::Number(analysis.bot_likelihood)),
                ..RuleCheck::new("comments_authentic", passed)
            });
        }

        Self {
            engagement_authentic: engagement.is_authentic,
            comments_authentic,
            checks,
        }
    }

    #[must_use]
    pub fn score(&self) -> f64 {
        weighted_pass_rate(&self.checks)
    }
}

/// Brand-integration checks derived from the visual summary and caption.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BrandIntegrationCheck {
    pub brand: String,
    pub brand_detected: bool,
    pub visible_seconds: f64,
    pub checks: Vec<RuleCheck>,
}

impl BrandIntegrationCheck {
    #[must_use]
    pub fn from_visual(
        visual: &VisualSummary,
        caption: Option<&str>,
        target_brand: &str,
        policy: &IntegrationPolicy,
    ) -> Self {
        let target = &visual.target_brand;
        let in_caption = caption.is_some_and(|c| contains_ignore_case(c, target_brand));
        let on_screen = target.text_mentions > 0;
        let similarity_matched = visual
            .similarity
            .as_ref()
            .is_some_and(|s| s.matched_frames > 0);

        let checks = vec![
            RuleCheck {
                actual: Some(CheckValue::Flag(in_caption || on_screen)),
                required: Some(CheckValue::Flag(true)),
                ..RuleCheck::new("brand_mention", in_caption || on_screen)
                    .with_weight(policy.brand_mention_weight)
            },
            RuleCheck {
                actual: Some(CheckValue::Number(target.confidence)),
                ..RuleCheck::new("product_visibility", target.detected || similarity_matched)
                    .with_weight(policy.product_visibility_weight)
            },
            RuleCheck::new(
                "visible_duration",
                target.visible_seconds >= policy.min_visible_seconds,
            )
            .with_values(
                CheckValue::Number(target.visible_seconds),
                CheckValue::Number(policy.min_visible_seconds),
            )
            .with_weight(policy.visible_duration_weight),
            RuleCheck {
                actual: Some(CheckValue::Text(sentiment_label(visual.sentiment.label))),
                ..RuleCheck::new(
                    "brand_safe_context",
                    visual.sentiment.label != SentimentLabel::Negative,
                )
                .with_weight(policy.brand_safe_context_weight)
            },
        ];

        Self {
            brand: target_brand.trim().to_string(),
            brand_detected: target.detected,
            visible_seconds: target.visible_seconds,
            checks,
        }
    }

    #[must_use]
    pub fn score(&self) -> f64 {
        weighted_pass_rate(&self.checks)
    }
}

fn sentiment_label(label: SentimentLabel) -> String {
    match label {
        SentimentLabel::Positive => "positive",
        SentimentLabel::Neutral => "neutral",
        SentimentLabel::Negative => "negative",
    }
    .to_string()
}
