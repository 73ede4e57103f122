//! Temporal aggregation of per-frame vision detections.
//!
//! Frames are folded in timestamp order, so the summary does not depend on
//! the order of the input slice.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use authscore_core::{FrameDetection, SimilarityTiers, VisionPolicy};
use serde::{Deserialize, Serialize};

use crate::text::{contains_ignore_case, unique_words};
use crate::Issue;

/// Aggregated presence of one brand across the video.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BrandPresence {
    /// Spelling from the earliest frame the brand appeared on.
    pub name: String,
    pub max_confidence: f64,
    pub total_frames: usize,
    /// `total_frames × frame_interval_sec`.
    pub total_visible_seconds: f64,
    pub first_seen_sec: f64,
    pub last_seen_sec: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetBrandConfirmation {
    pub brand: String,
    pub detected: bool,
    /// Highest confidence among matching frames; `0.0` when not detected.
    pub confidence: f64,
    pub matched_frames: usize,
    pub visible_seconds: f64,
    /// Frames whose on-screen text mentions the brand.
    pub text_mentions: usize,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SentimentLabel {
    Positive,
    Neutral,
    Negative,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisualSentiment {
    pub label: SentimentLabel,
    /// Rule-based score in `[-1, 1]`.
    pub score: f64,
    pub rationale: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SimilarityConfidence {
    High,
    Medium,
    Low,
    None,
}

impl SimilarityConfidence {
    fn from_score(score: f64, tiers: &SimilarityTiers) -> Self {
        if score >= tiers.high {
            Self::High
        } else if score >= tiers.medium {
            Self::Medium
        } else if score >= tiers.low {
            Self::Low
        } else {
            Self::None
        }
    }
}

/// Reference-image similarity across the frames that carried a score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimilaritySummary {
    pub frames_scored: usize,
    pub average_score: f64,
    pub max_score: f64,
    pub matched_frames: usize,
    pub matched_visible_seconds: f64,
    /// Tier of `max_score`.
    pub confidence: SimilarityConfidence,
}

/// A frame showing a negative-context object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NegativeContextFrame {
    pub timestamp_sec: f64,
    pub objects: Vec<String>,
    /// The target brand was detected on the same frame.
    pub with_target_brand: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisionIssues {
    pub target_brand_missing: bool,
    pub negative_context: Issue<NegativeContextFrame>,
    /// Similarity scores were present but none reached the match threshold.
    pub weak_similarity: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisualSummary {
    pub frames_analyzed: usize,
    pub frame_interval_sec: f64,
    /// Sorted, lowercased object classes seen on any frame.
    pub unique_objects: Vec<String>,
    pub brands_detected: Vec<BrandPresence>,
    pub target_brand: TargetBrandConfirmation,
    pub sentiment: VisualSentiment,
    pub similarity: Option<SimilaritySummary>,
    /// On-screen words, deduplicated case-insensitively in first-seen order.
    pub detected_text: Vec<String>,
    /// Strength of the visual evidence for the target product, in `[0, 1]`.
    pub score: f64,
    pub issues: VisionIssues,
    pub recommendations: Vec<String>,
}

#[derive(Default)]
struct BrandAccumulator {
    name: String,
    max_confidence: f64,
    frames: usize,
    first_seen: f64,
    last_seen: f64,
}

/// Fold a frame sequence into a [`VisualSummary`] for `target_brand_name`.
///
/// An empty sequence yields an empty, not-detected summary.
#[must_use]
#[allow(clippy::cast_precision_loss, clippy::too_many_lines)]
pub fn aggregate_frames(
    frames: &[FrameDetection],
    frame_interval_sec: f64,
    target_brand_name: &str,
    policy: &VisionPolicy,
) -> VisualSummary {
    let mut ordered: Vec<&FrameDetection> = frames.iter().collect();
    ordered.sort_by(|a, b| a.timestamp_sec.total_cmp(&b.timestamp_sec));

    let negative: HashSet<String> = policy
        .negative_context_objects
        .iter()
        .map(|o| o.trim().to_lowercase())
        .collect();

    let mut unique_objects: BTreeSet<String> = BTreeSet::new();
    let mut brands: BTreeMap<String, BrandAccumulator> = BTreeMap::new();
    let mut target_frames = 0usize;
    let mut target_confidence = 0.0_f64;
    let mut text_mentions = 0usize;
    let mut negative_frames = 0usize;
    let mut negative_with_target = false;
    let mut negative_context: Issue<NegativeContextFrame> = Issue::default();
    let mut similarity_scores: Vec<f64> = Vec::new();

    for frame in &ordered {
        let objects: BTreeSet<String> = frame
            .objects
            .iter()
            .map(|o| o.trim().to_lowercase())
            .filter(|o| !o.is_empty())
            .collect();

        // Per-frame best confidence for each brand, so a frame counts once.
        let mut frame_brands: BTreeMap<String, (&str, f64)> = BTreeMap::new();
        for m in &frame.brand_matches {
            if m.confidence < policy.min_brand_confidence {
                continue;
            }
            let key = m.name.trim().to_lowercase();
            let entry = frame_brands.entry(key).or_insert((m.name.trim(), m.confidence));
            entry.1 = entry.1.max(m.confidence);
        }

        let mut frame_target: Option<f64> = None;
        for (key, (name, confidence)) in frame_brands {
            if contains_ignore_case(&key, target_brand_name) {
                frame_target = Some(frame_target.map_or(confidence, |c| c.max(confidence)));
            }
            let acc = brands.entry(key).or_insert_with(|| BrandAccumulator {
                name: name.to_string(),
                first_seen: frame.timestamp_sec,
                ..BrandAccumulator::default()
            });
            acc.frames += 1;
            acc.max_confidence = acc.max_confidence.max(confidence);
            acc.last_seen = frame.timestamp_sec;
        }

        if let Some(confidence) = frame_target {
            target_frames += 1;
            target_confidence = target_confidence.max(confidence);
        }

        if frame
            .text
            .as_deref()
            .is_some_and(|t| contains_ignore_case(t, target_brand_name))
        {
            text_mentions += 1;
        }

        let bad: Vec<String> = objects
            .iter()
            .filter(|o| negative.contains(*o))
            .cloned()
            .collect();
        if !bad.is_empty() {
            negative_frames += 1;
            negative_with_target |= frame_target.is_some();
            negative_context.record(
                policy.evidence_cap,
                NegativeContextFrame {
                    timestamp_sec: frame.timestamp_sec,
                    objects: bad,
                    with_target_brand: frame_target.is_some(),
                },
            );
        }

        if let Some(sim) = frame.similarity {
            similarity_scores.push(sim.score);
        }

        unique_objects.extend(objects);
    }

    let mut brands_detected: Vec<BrandPresence> = brands
        .into_values()
        .map(|acc| BrandPresence {
            name: acc.name,
            max_confidence: acc.max_confidence,
            total_frames: acc.frames,
            total_visible_seconds: acc.frames as f64 * frame_interval_sec,
            first_seen_sec: acc.first_seen,
            last_seen_sec: acc.last_seen,
        })
        .collect();
    brands_detected.sort_by(|a, b| {
        b.total_frames
            .cmp(&a.total_frames)
            .then_with(|| a.name.cmp(&b.name))
    });

    let detected = target_frames > 0;
    let visible_seconds = target_frames as f64 * frame_interval_sec;
    let brand = target_brand_name.trim().to_string();
    let message = if detected {
        format!(
            "Yes, {brand} is visible in the video ({target_frames} frames, about {visible_seconds:.0}s, max confidence {target_confidence:.2})."
        )
    } else {
        format!("No, {brand} was not detected in the video.")
    };
    let target = TargetBrandConfirmation {
        brand,
        detected,
        confidence: if detected { target_confidence } else { 0.0 },
        matched_frames: target_frames,
        visible_seconds,
        text_mentions,
        message,
    };

    let sentiment = visual_sentiment(
        ordered.len(),
        &target,
        negative_frames,
        negative_with_target,
        &negative_context,
        policy,
    );

    let similarity =
        summarize_similarity(&similarity_scores, frame_interval_sec, policy);

    let mut score = if detected { target_confidence } else { 0.0 };
    if let Some(sim) = &similarity {
        if sim.matched_frames > 0 {
            score = score.max(sim.max_score);
        }
    }

    let issues = VisionIssues {
        target_brand_missing: !detected,
        negative_context,
        weak_similarity: similarity.as_ref().is_some_and(|s| s.matched_frames == 0),
    };

    let recommendations = recommendations(ordered.len(), &target, &issues);

    tracing::debug!(
        frames = ordered.len(),
        brands = brands_detected.len(),
        target_detected = detected,
        sentiment = ?sentiment.label,
        "aggregated frames"
    );

    VisualSummary {
        frames_analyzed: ordered.len(),
        frame_interval_sec,
        unique_objects: unique_objects.into_iter().collect(),
        brands_detected,
        target_brand: target,
        sentiment,
        similarity,
        detected_text: unique_words(ordered.iter().filter_map(|f| f.text.as_deref())),
        score: score.clamp(0.0, 1.0),
        issues,
        recommendations,
    }
}

/// Rule-based sentiment from target presence and negative context.
///
/// `positive = max_confidence × (0.5 + 0.5 × coverage)` when the target is
/// detected; `negative` is the share of frames with negative-context objects,
/// doubled (capped at 1) when such an object shares a frame with the target.
#[allow(clippy::cast_precision_loss)]
fn visual_sentiment(
    total_frames: usize,
    target: &TargetBrandConfirmation,
    negative_frames: usize,
    negative_with_target: bool,
    negative_context: &Issue<NegativeContextFrame>,
    policy: &VisionPolicy,
) -> VisualSentiment {
    if total_frames == 0 {
        return VisualSentiment {
            label: SentimentLabel::Neutral,
            score: 0.0,
            rationale: "No frames were analyzed.".to_string(),
        };
    }

    let total = total_frames as f64;
    let coverage = target.matched_frames as f64 / total;
    let positive = if target.detected {
        target.confidence * (0.5 + 0.5 * coverage)
    } else {
        0.0
    };
    let mut negative = negative_frames as f64 / total;
    if negative_with_target {
        negative = (negative * 2.0).min(1.0);
    }
    let score = (positive - negative).clamp(-1.0, 1.0);

    let label = if score >= policy.sentiment_positive_at {
        SentimentLabel::Positive
    } else if score <= policy.sentiment_negative_at {
        SentimentLabel::Negative
    } else {
        SentimentLabel::Neutral
    };

    let mut rationale = if target.detected {
        format!(
            "{} visible in {} of {total_frames} frames (max confidence {:.2})",
            target.brand, target.matched_frames, target.confidence
        )
    } else {
        format!("{} not visible in any of {total_frames} frames", target.brand)
    };
    if negative_frames > 0 {
        let objects: BTreeSet<&str> = negative_context
            .examples
            .iter()
            .flat_map(|f| f.objects.iter().map(String::as_str))
            .collect();
        rationale.push_str(&format!(
            "; negative-context objects ({}) in {negative_frames} frames",
            objects.into_iter().collect::<Vec<_>>().join(", ")
        ));
        if negative_with_target {
            rationale.push_str(", including frames showing the brand");
        }
    }
    rationale.push('.');

    VisualSentiment {
        label,
        score,
        rationale,
    }
}

#[allow(clippy::cast_precision_loss)]
fn summarize_similarity(
    scores: &[f64],
    frame_interval_sec: f64,
    policy: &VisionPolicy,
) -> Option<SimilaritySummary> {
    if scores.is_empty() {
        return None;
    }
    let max_score = scores.iter().copied().fold(0.0_f64, f64::max);
    let average_score = scores.iter().sum::<f64>() / scores.len() as f64;
    let matched_frames = scores
        .iter()
        .filter(|&&s| s >= policy.similarity_match_threshold)
        .count();

    Some(SimilaritySummary {
        frames_scored: scores.len(),
        average_score,
        max_score,
        matched_frames,
        matched_visible_seconds: matched_frames as f64 * frame_interval_sec,
        confidence: SimilarityConfidence::from_score(max_score, &policy.similarity_tiers),
    })
}

fn recommendations(
    total_frames: usize,
    target: &TargetBrandConfirmation,
    issues: &VisionIssues,
) -> Vec<String> {
    if total_frames == 0 {
        return vec!["No frames were available for visual analysis.".to_string()];
    }

    let mut out = Vec::new();
    if issues.target_brand_missing {
        out.push(format!(
            "Make {} clearly visible on screen; it was not detected in any frame.",
            target.brand
        ));
    }
    if issues.negative_context.count > 0 {
        out.push(format!(
            "Review {} frames with brand-unsafe objects before approval.",
            issues.negative_context.count
        ));
    }
    if issues.weak_similarity {
        out.push(
            "Shown product does not match the campaign reference image; confirm the correct product is featured."
                .to_string(),
        );
    }
    if out.is_empty() {
        out.push("Brand presence is clear and brand-safe.".to_string());
    }
    out
}

#[cfg(test)]
#[path = "vision_test.rs"]
mod tests;
