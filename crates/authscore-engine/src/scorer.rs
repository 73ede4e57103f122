//! Weighted fusion of the four check categories into a final verdict.

use std::fmt;

use authscore_core::{CampaignRulesCheck, EligibilityCheck, RuleCheck, ScoringPolicy};
use serde::{Deserialize, Serialize};

use crate::checks::{weighted_pass_rate, BrandIntegrationCheck, ContentAuthenticityCheck};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerdictStatus {
    Approved,
    NeedsRevision,
    Rejected,
}

impl fmt::Display for VerdictStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            VerdictStatus::Approved => "approved",
            VerdictStatus::NeedsRevision => "needs_revision",
            VerdictStatus::Rejected => "rejected",
        };
        f.write_str(s)
    }
}

/// Per-category sub-scores, each in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ComponentScores {
    pub eligibility: f64,
    pub authenticity: f64,
    pub integration: f64,
    pub rules: f64,
}

/// The checks each sub-score was computed from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentResults {
    pub eligibility: Vec<RuleCheck>,
    pub authenticity: ContentAuthenticityCheck,
    pub integration: BrandIntegrationCheck,
    pub rules: Vec<RuleCheck>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerificationVerdict {
    pub status: VerdictStatus,
    /// Weighted score in `[0, 100]`, rounded to two decimals.
    pub overall_score: f64,
    pub component_scores: ComponentScores,
    pub component_results: ComponentResults,
    /// One entry per failing check.
    pub issues: Vec<String>,
    /// Failures that forced rejection regardless of the score.
    pub hard_failures: Vec<String>,
}

/// Fuse the four check categories into a verdict.
///
/// `overall = 100 × Σ weightᵢ × subscoreᵢ`. Any hard failure rejects;
/// otherwise the score is compared against `approve_at` then `revise_at`.
#[must_use]
pub fn score_submission(
    eligibility: &EligibilityCheck,
    authenticity: &ContentAuthenticityCheck,
    integration: &BrandIntegrationCheck,
    rules: &CampaignRulesCheck,
    policy: &ScoringPolicy,
) -> VerificationVerdict {
    let scores = ComponentScores {
        eligibility: weighted_pass_rate(&eligibility.rules),
        authenticity: authenticity.score(),
        integration: integration.score(),
        rules: weighted_pass_rate(&rules.rules),
    };
    let overall_score = fuse(&scores, policy);

    let mut issues = Vec::new();
    collect_issues(&mut issues, "eligibility", &eligibility.rules);
    collect_issues(&mut issues, "authenticity", &authenticity.checks);
    collect_issues(&mut issues, "integration", &integration.checks);
    collect_issues(&mut issues, "campaign rule", &rules.rules);

    let mut hard_failures = Vec::new();
    collect_hard_failures(
        &mut hard_failures,
        "eligibility",
        &eligibility.rules,
        &policy.hard_gate_eligibility_rules,
    );
    collect_hard_failures(
        &mut hard_failures,
        "campaign rule",
        &rules.rules,
        &policy.hard_gate_campaign_rules,
    );
    if !authenticity.engagement_authentic
        && scores.authenticity < policy.authenticity_hard_fail_below
    {
        hard_failures.push(format!(
            "engagement is inauthentic (authenticity score {:.2} below {:.2})",
            scores.authenticity, policy.authenticity_hard_fail_below
        ));
    }

    let status = if !hard_failures.is_empty() {
        tracing::warn!(
            hard_failures = hard_failures.len(),
            first = %hard_failures[0],
            "hard gate rejected submission"
        );
        VerdictStatus::Rejected
    } else if overall_score >= policy.approve_at {
        VerdictStatus::Approved
    } else if overall_score >= policy.revise_at {
        VerdictStatus::NeedsRevision
    } else {
        VerdictStatus::Rejected
    };

    tracing::info!(
        status = %status,
        overall_score,
        eligibility = scores.eligibility,
        authenticity = scores.authenticity,
        integration = scores.integration,
        rules = scores.rules,
        issues = issues.len(),
        "verification verdict"
    );

    VerificationVerdict {
        status,
        overall_score,
        component_scores: scores,
        component_results: ComponentResults {
            eligibility: eligibility.rules.clone(),
            authenticity: authenticity.clone(),
            integration: integration.clone(),
            rules: rules.rules.clone(),
        },
        issues,
        hard_failures,
    }
}

fn fuse(scores: &ComponentScores, policy: &ScoringPolicy) -> f64 {
    let w = &policy.weights;
    let raw = w.eligibility * scores.eligibility
        + w.authenticity * scores.authenticity
        + w.integration * scores.integration
        + w.rules * scores.rules;
    let overall = (raw * 100.0).clamp(0.0, 100.0);
    (overall * 100.0).round() / 100.0
}

fn describe(check: &RuleCheck) -> String {
    match (&check.actual, &check.required) {
        (Some(actual), Some(required)) => {
            format!("{} failed (actual {actual}, required {required})", check.rule)
        }
        (Some(actual), None) => format!("{} failed (actual {actual})", check.rule),
        _ => format!("{} failed", check.rule),
    }
}

fn collect_issues(out: &mut Vec<String>, category: &str, checks: &[RuleCheck]) {
    out.extend(
        checks
            .iter()
            .filter(|c| !c.passed)
            .map(|c| format!("{category}: {}", describe(c))),
    );
}

fn collect_hard_failures(
    out: &mut Vec<String>,
    category: &str,
    checks: &[RuleCheck],
    gated_names: &[String],
) {
    out.extend(
        checks
            .iter()
            .filter(|c| !c.passed && (c.hard_gate || gated_names.iter().any(|n| *n == c.rule)))
            .map(|c| format!("{category}: {}", describe(c))),
    );
}

#[cfg(test)]
#[path = "scorer_test.rs"]
mod tests;
