//! Pattern-based bot classification for comment sets.
//!
//! Each comment is checked independently for duplicate, emoji-only, generic,
//! spam-patterned and burst-timed content. The category shares are combined
//! into a single bot likelihood using the weights from [`CommentPolicy`].

use std::collections::{BTreeMap, BTreeSet, HashSet};

use authscore_core::{Comment, CommentPolicy, CommentWeights, RiskTiers};
use chrono::{DateTime, Duration, Utc};
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::text::{is_emoji_only, normalize_for_duplicates, normalize_for_generic};
use crate::Issue;

/// Bot-likelihood tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Minimal,
    Low,
    Moderate,
    High,
}

impl RiskLevel {
    fn from_likelihood(likelihood: f64, tiers: &RiskTiers) -> Self {
        if likelihood >= tiers.high {
            Self::High
        } else if likelihood >= tiers.moderate {
            Self::Moderate
        } else if likelihood >= tiers.low {
            Self::Low
        } else {
            Self::Minimal
        }
    }
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RiskLevel::Minimal => write!(f, "minimal"),
            RiskLevel::Low => write!(f, "low"),
            RiskLevel::Moderate => write!(f, "moderate"),
            RiskLevel::High => write!(f, "high"),
        }
    }
}

/// A flagged comment, identified by its position in the input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommentExample {
    pub index: usize,
    pub author: String,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpamExample {
    pub index: usize,
    pub author: String,
    pub text: String,
    /// The first configured pattern that matched.
    pub pattern: String,
}

/// Comments sharing one normalized text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DuplicateGroup {
    pub normalized_text: String,
    pub count: usize,
    /// Distinct authors, sorted.
    pub authors: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimedComment {
    pub index: usize,
    pub author: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimingIssue {
    pub detected: bool,
    /// Number of windows of consecutive comments that fell inside the span.
    pub runs: usize,
    /// Distinct comments belonging to at least one run.
    pub count: usize,
    pub examples: Vec<TimedComment>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommentIssues {
    pub duplicates: Issue<DuplicateGroup>,
    pub emoji_only: Issue<CommentExample>,
    pub generic: Issue<CommentExample>,
    pub spam: Issue<SpamExample>,
    pub suspicious_timing: TimingIssue,
}

/// Result of classifying one comment set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommentAnalysis {
    pub total_comments: usize,
    pub suspicious_comments: usize,
    /// Share of comments flagged by at least one check, in `[0, 100]`.
    pub suspicious_comment_percentage: f64,
    /// Heuristic probability of automated activity, in `[0, 1]`.
    pub bot_likelihood: f64,
    pub risk_level: RiskLevel,
    /// `true` when the risk level is moderate or worse.
    pub is_likely_bot: bool,
    pub issues: CommentIssues,
    pub recommendations: Vec<String>,
}

/// Comment classifier with its spam patterns compiled.
///
/// Construct one per policy; it holds no per-call state and may be shared
/// across threads.
#[derive(Debug, Clone)]
pub struct CommentClassifier {
    generic_tokens: HashSet<String>,
    spam_patterns: Vec<(String, Regex)>,
    timing_window: Duration,
    timing_run_length: usize,
    evidence_cap: usize,
    weights: CommentWeights,
    risk_tiers: RiskTiers,
}

impl CommentClassifier {
    /// Compile a classifier from policy.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidPattern`] if a spam pattern is not a valid
    /// regular expression, or [`EngineError::InvalidTimingWindow`] if the
    /// timing window does not fit a [`Duration`].
    pub fn new(policy: &CommentPolicy) -> Result<Self, EngineError> {
        let spam_patterns = policy
            .spam_patterns
            .iter()
            .map(|pattern| {
                RegexBuilder::new(pattern)
                    .case_insensitive(true)
                    .build()
                    .map(|re| (pattern.clone(), re))
                    .map_err(|source| EngineError::InvalidPattern {
                        pattern: pattern.clone(),
                        source,
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let generic_tokens = policy
            .generic_tokens
            .iter()
            .map(|t| normalize_for_generic(t))
            .filter(|t| !t.is_empty())
            .collect();

        let timing_window = Duration::try_seconds(policy.timing_window_secs).ok_or(
            EngineError::InvalidTimingWindow(policy.timing_window_secs),
        )?;

        Ok(Self {
            generic_tokens,
            spam_patterns,
            timing_window,
            timing_run_length: policy.timing_run_length.max(2),
            evidence_cap: policy.evidence_cap,
            weights: policy.weights.clone(),
            risk_tiers: policy.risk_tiers.clone(),
        })
    }

    /// Classify a comment set.
    ///
    /// An empty set is not an error: it yields a zero-likelihood result with a
    /// "no data" recommendation.
    #[must_use]
    pub fn classify(&self, comments: &[Comment]) -> CommentAnalysis {
        if comments.is_empty() {
            return self.empty_analysis();
        }

        let mut suspicious: BTreeSet<usize> = BTreeSet::new();

        let mut emoji_only = Issue::default();
        let mut generic = Issue::default();
        let mut spam = Issue::default();

        for (index, comment) in comments.iter().enumerate() {
            if is_emoji_only(&comment.text) {
                suspicious.insert(index);
                emoji_only.record(self.evidence_cap, example(index, comment));
            }

            if self
                .generic_tokens
                .contains(&normalize_for_generic(&comment.text))
            {
                suspicious.insert(index);
                generic.record(self.evidence_cap, example(index, comment));
            }

            if let Some(pattern) = self.first_spam_match(&comment.text) {
                suspicious.insert(index);
                spam.record(
                    self.evidence_cap,
                    SpamExample {
                        index,
                        author: comment.author.clone(),
                        text: comment.text.clone(),
                        pattern: pattern.to_string(),
                    },
                );
            }
        }

        let duplicates = self.find_duplicates(comments, &mut suspicious);
        let suspicious_timing = self.find_timing_runs(comments, &mut suspicious);

        let total = comments.len();
        let bot_likelihood = self.bot_likelihood(
            total,
            duplicates.count,
            emoji_only.count,
            generic.count,
            spam.count,
            suspicious_timing.detected,
        );
        let risk_level = RiskLevel::from_likelihood(bot_likelihood, &self.risk_tiers);

        let issues = CommentIssues {
            duplicates,
            emoji_only,
            generic,
            spam,
            suspicious_timing,
        };
        let recommendations = self.recommendations(bot_likelihood, risk_level, &issues);

        #[allow(clippy::cast_precision_loss)]
        let suspicious_comment_percentage = suspicious.len() as f64 / total as f64 * 100.0;

        tracing::debug!(
            total,
            suspicious = suspicious.len(),
            bot_likelihood,
            risk = %risk_level,
            "classified comments"
        );

        CommentAnalysis {
            total_comments: total,
            suspicious_comments: suspicious.len(),
            suspicious_comment_percentage,
            bot_likelihood,
            risk_level,
            is_likely_bot: risk_level >= RiskLevel::Moderate,
            issues,
            recommendations,
        }
    }

    fn empty_analysis(&self) -> CommentAnalysis {
        CommentAnalysis {
            total_comments: 0,
            suspicious_comments: 0,
            suspicious_comment_percentage: 0.0,
            bot_likelihood: 0.0,
            risk_level: RiskLevel::Minimal,
            is_likely_bot: false,
            issues: CommentIssues {
                duplicates: Issue::default(),
                emoji_only: Issue::default(),
                generic: Issue::default(),
                spam: Issue::default(),
                suspicious_timing: TimingIssue {
                    detected: false,
                    runs: 0,
                    count: 0,
                    examples: Vec::new(),
                },
            },
            recommendations: vec![
                "No comments available for analysis; bot likelihood could not be assessed."
                    .to_string(),
            ],
        }
    }

    fn first_spam_match(&self, text: &str) -> Option<&str> {
        self.spam_patterns
            .iter()
            .find(|(_, re)| re.is_match(text))
            .map(|(pattern, _)| pattern.as_str())
    }

    /// Group comments by normalized text; every member of a group of two or
    /// more is a duplicate.
    fn find_duplicates(
        &self,
        comments: &[Comment],
        suspicious: &mut BTreeSet<usize>,
    ) -> Issue<DuplicateGroup> {
        let mut groups: BTreeMap<String, Vec<usize>> = BTreeMap::new();
        for (index, comment) in comments.iter().enumerate() {
            let key = normalize_for_duplicates(&comment.text);
            if !key.is_empty() {
                groups.entry(key).or_default().push(index);
            }
        }

        let mut dup_groups: Vec<DuplicateGroup> = Vec::new();
        let mut count = 0;
        for (normalized_text, members) in groups {
            if members.len() < 2 {
                continue;
            }
            count += members.len();
            suspicious.extend(members.iter().copied());
            let authors: BTreeSet<&str> = members
                .iter()
                .map(|&i| comments[i].author.as_str())
                .collect();
            dup_groups.push(DuplicateGroup {
                normalized_text,
                count: members.len(),
                authors: authors.into_iter().map(str::to_string).collect(),
            });
        }

        // Largest groups first; BTreeMap order breaks ties by text.
        dup_groups.sort_by(|a, b| b.count.cmp(&a.count));
        dup_groups.truncate(self.evidence_cap);

        Issue {
            count,
            examples: dup_groups,
        }
    }

    /// Flag every window of `timing_run_length` time-adjacent comments whose
    /// first and last timestamps are within `timing_window`.
    fn find_timing_runs(
        &self,
        comments: &[Comment],
        suspicious: &mut BTreeSet<usize>,
    ) -> TimingIssue {
        let mut order: Vec<usize> = (0..comments.len()).collect();
        order.sort_by_key(|&i| (comments[i].timestamp, i));

        let mut runs = 0;
        let mut flagged: BTreeSet<usize> = BTreeSet::new();
        for window in order.windows(self.timing_run_length) {
            let (Some(&first), Some(&last)) = (window.first(), window.last()) else {
                continue;
            };
            if comments[last].timestamp - comments[first].timestamp <= self.timing_window {
                runs += 1;
                flagged.extend(window.iter().copied());
            }
        }

        suspicious.extend(flagged.iter().copied());

        let examples = order
            .iter()
            .filter(|&&i| flagged.contains(&i))
            .take(self.evidence_cap)
            .map(|&i| TimedComment {
                index: i,
                author: comments[i].author.clone(),
                timestamp: comments[i].timestamp,
            })
            .collect();

        TimingIssue {
            detected: runs > 0,
            runs,
            count: flagged.len(),
            examples,
        }
    }

    fn bot_likelihood(
        &self,
        total: usize,
        duplicates: usize,
        emoji_only: usize,
        generic: usize,
        spam: usize,
        timing_detected: bool,
    ) -> f64 {
        #[allow(clippy::cast_precision_loss)]
        let share = |count: usize| (count as f64 / total as f64).min(1.0);

        let w = &self.weights;
        let mut likelihood = share(duplicates) * w.duplicate
            + share(emoji_only) * w.emoji_only
            + share(generic) * w.generic
            + share(spam) * w.spam;
        if timing_detected {
            likelihood += w.timing;
        }
        likelihood.clamp(0.0, 1.0)
    }

    fn recommendations(
        &self,
        bot_likelihood: f64,
        risk_level: RiskLevel,
        issues: &CommentIssues,
    ) -> Vec<String> {
        let mut out = vec![match risk_level {
            RiskLevel::High => format!(
                "High risk of inauthentic comment activity ({:.0}% bot likelihood); manual review required before approval.",
                bot_likelihood * 100.0
            ),
            RiskLevel::Moderate => {
                "Moderate bot activity detected; review flagged comments before approval."
                    .to_string()
            }
            RiskLevel::Low => {
                "Low level of suspicious comments; routine monitoring is sufficient.".to_string()
            }
            RiskLevel::Minimal => "Comment activity appears organic.".to_string(),
        }];

        if risk_level == RiskLevel::Minimal {
            return out;
        }

        if issues.duplicates.count > 0 {
            out.push(format!(
                "{} comments repeat identical text; check for coordinated posting.",
                issues.duplicates.count
            ));
        }
        if issues.spam.count > 0 {
            out.push(format!(
                "{} comments contain promotional or engagement-bait patterns.",
                issues.spam.count
            ));
        }
        if issues.suspicious_timing.detected {
            out.push(format!(
                "{} comments were posted in bursts of {} or more within {} seconds.",
                issues.suspicious_timing.count,
                self.timing_run_length,
                self.timing_window.num_seconds()
            ));
        }
        if issues.emoji_only.count > 0 {
            out.push(format!(
                "{} comments are emoji-only.",
                issues.emoji_only.count
            ));
        }
        if issues.generic.count > 0 {
            out.push(format!(
                "{} comments are generic low-information reactions.",
                issues.generic.count
            ));
        }
        out
    }
}

fn example(index: usize, comment: &Comment) -> CommentExample {
    CommentExample {
        index,
        author: comment.author.clone(),
        text: comment.text.clone(),
    }
}

/// Compile a classifier for `policy` and classify `comments` in one call.
///
/// # Errors
///
/// Returns [`EngineError::InvalidPattern`] if a configured spam pattern does
/// not compile.
pub fn classify_comments(
    comments: &[Comment],
    policy: &CommentPolicy,
) -> Result<CommentAnalysis, EngineError> {
    Ok(CommentClassifier::new(policy)?.classify(comments))
}

#[cfg(test)]
#[path = "comments_test.rs"]
mod tests;
