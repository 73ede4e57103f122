//! Boundary validation for submission inputs.
//!
//! Shape problems that serde cannot catch (ranges, ordering, non-finite
//! floats) are rejected here with the path of the offending field. Nothing is
//! coerced: a record either passes as-is or the whole submission is refused.

use thiserror::Error;

use crate::types::{Comment, EngagementInput, FrameDetection, SubmissionInput, VisionInput};

/// A submission field that violates an input invariant.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid input at {field}: {reason}")]
pub struct ValidationError {
    /// Dotted/indexed path, e.g. `vision.frames[3].brand_matches[0].confidence`.
    pub field: String,
    pub reason: String,
}

impl ValidationError {
    fn new(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// Validate every part of a submission.
///
/// # Errors
///
/// Returns the first [`ValidationError`] found, in field order.
pub fn validate_submission(input: &SubmissionInput) -> Result<(), ValidationError> {
    if input.target_brand.trim().is_empty() {
        return Err(ValidationError::new(
            "target_brand",
            "target brand must be non-empty",
        ));
    }
    validate_comments(&input.comments, "comments")?;
    validate_engagement(&input.engagement, "engagement")?;
    validate_vision(&input.vision, "vision")?;

    for (prefix, rules) in [
        ("eligibility.rules", &input.eligibility.rules),
        ("campaign_rules.rules", &input.campaign_rules.rules),
    ] {
        for (i, rule) in rules.iter().enumerate() {
            if !rule.weight.is_finite() || rule.weight < 0.0 {
                return Err(ValidationError::new(
                    format!("{prefix}[{i}].weight"),
                    format!("weight must be finite and >= 0, got {}", rule.weight),
                ));
            }
        }
    }

    Ok(())
}

/// Validate a comment list.
///
/// # Errors
///
/// Returns [`ValidationError`] if any comment has a blank author.
pub fn validate_comments(comments: &[Comment], prefix: &str) -> Result<(), ValidationError> {
    for (i, comment) in comments.iter().enumerate() {
        if comment.author.trim().is_empty() {
            return Err(ValidationError::new(
                format!("{prefix}[{i}].author"),
                "author must be non-empty",
            ));
        }
    }
    Ok(())
}

/// Validate engagement inputs.
///
/// Counts are unsigned by construction; the only remaining invariant is that
/// history snapshots are not dated after the snapshot under evaluation.
///
/// # Errors
///
/// Returns [`ValidationError`] for a history snapshot newer than `current`.
pub fn validate_engagement(input: &EngagementInput, prefix: &str) -> Result<(), ValidationError> {
    for (i, snapshot) in input.history.iter().enumerate() {
        if snapshot.timestamp > input.current.timestamp {
            return Err(ValidationError::new(
                format!("{prefix}.history[{i}].timestamp"),
                format!(
                    "history snapshot at {} is later than current snapshot at {}",
                    snapshot.timestamp, input.current.timestamp
                ),
            ));
        }
    }
    Ok(())
}

/// Validate vision inputs: interval, duration, and every frame record.
///
/// # Errors
///
/// Returns [`ValidationError`] for a non-positive interval or duration, or for
/// the first frame that breaks an invariant (see [`validate_frames`]).
pub fn validate_vision(input: &VisionInput, prefix: &str) -> Result<(), ValidationError> {
    if !input.frame_interval_sec.is_finite() || input.frame_interval_sec <= 0.0 {
        return Err(ValidationError::new(
            format!("{prefix}.frame_interval_sec"),
            format!(
                "frame interval must be finite and > 0, got {}",
                input.frame_interval_sec
            ),
        ));
    }
    if let Some(duration) = input.duration_sec {
        if !duration.is_finite() || duration < 0.0 {
            return Err(ValidationError::new(
                format!("{prefix}.duration_sec"),
                format!("duration must be finite and >= 0, got {duration}"),
            ));
        }
    }
    validate_frames(&input.frames, input.duration_sec, &format!("{prefix}.frames"))
}

/// Validate a frame sequence.
///
/// Timestamps must be finite, non-negative, strictly increasing, and not past
/// `duration_sec` when one is known. Brand confidences and similarity scores
/// must lie in `[0.0, 1.0]`.
///
/// # Errors
///
/// Returns [`ValidationError`] naming the first offending field.
pub fn validate_frames(
    frames: &[FrameDetection],
    duration_sec: Option<f64>,
    prefix: &str,
) -> Result<(), ValidationError> {
    let mut previous: Option<f64> = None;

    for (i, frame) in frames.iter().enumerate() {
        let ts = frame.timestamp_sec;
        let field = || format!("{prefix}[{i}].timestamp_sec");

        if !ts.is_finite() || ts < 0.0 {
            return Err(ValidationError::new(
                field(),
                format!("timestamp must be finite and >= 0, got {ts}"),
            ));
        }
        if let Some(prev) = previous {
            if ts <= prev {
                return Err(ValidationError::new(
                    field(),
                    format!("timestamps must be strictly increasing ({ts} follows {prev})"),
                ));
            }
        }
        if let Some(duration) = duration_sec {
            if ts > duration {
                return Err(ValidationError::new(
                    field(),
                    format!("timestamp {ts} exceeds video duration {duration}"),
                ));
            }
        }
        previous = Some(ts);

        for (j, brand) in frame.brand_matches.iter().enumerate() {
            if brand.name.trim().is_empty() {
                return Err(ValidationError::new(
                    format!("{prefix}[{i}].brand_matches[{j}].name"),
                    "brand name must be non-empty",
                ));
            }
            if !is_unit_interval(brand.confidence) {
                return Err(ValidationError::new(
                    format!("{prefix}[{i}].brand_matches[{j}].confidence"),
                    format!("confidence must be in [0, 1], got {}", brand.confidence),
                ));
            }
        }

        if let Some(similarity) = frame.similarity {
            if !is_unit_interval(similarity.score) {
                return Err(ValidationError::new(
                    format!("{prefix}[{i}].similarity.score"),
                    format!("similarity must be in [0, 1], got {}", similarity.score),
                ));
            }
        }
    }

    Ok(())
}

fn is_unit_interval(value: f64) -> bool {
    (0.0..=1.0).contains(&value)
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::types::{BrandMatch, EngagementSnapshot, SimilarityScore};

    fn frame(ts: f64) -> FrameDetection {
        FrameDetection {
            timestamp_sec: ts,
            objects: Default::default(),
            brand_matches: vec![],
            similarity: None,
            text: None,
        }
    }

    fn vision(frames: Vec<FrameDetection>) -> VisionInput {
        VisionInput {
            frames,
            frame_interval_sec: 2.0,
            duration_sec: Some(20.0),
        }
    }

    #[test]
    fn accepts_well_formed_frames() {
        let frames = vec![frame(0.0), frame(2.0), frame(4.0)];
        assert!(validate_vision(&vision(frames), "vision").is_ok());
    }

    #[test]
    fn accepts_empty_frames() {
        assert!(validate_vision(&vision(vec![]), "vision").is_ok());
    }

    #[test]
    fn rejects_non_increasing_timestamps() {
        let frames = vec![frame(0.0), frame(2.0), frame(2.0)];
        let err = validate_vision(&vision(frames), "vision").unwrap_err();
        assert_eq!(err.field, "vision.frames[2].timestamp_sec");
    }

    #[test]
    fn rejects_timestamp_past_duration() {
        let frames = vec![frame(0.0), frame(22.0)];
        let err = validate_vision(&vision(frames), "vision").unwrap_err();
        assert_eq!(err.field, "vision.frames[1].timestamp_sec");
        assert!(err.reason.contains("duration"));
    }

    #[test]
    fn rejects_nan_timestamp() {
        let err = validate_frames(&[frame(f64::NAN)], None, "frames").unwrap_err();
        assert_eq!(err.field, "frames[0].timestamp_sec");
    }

    #[test]
    fn rejects_confidence_out_of_range() {
        let mut f = frame(0.0);
        f.brand_matches.push(BrandMatch {
            name: "Acme".to_string(),
            confidence: 1.2,
        });
        let err = validate_frames(&[f], None, "frames").unwrap_err();
        assert_eq!(err.field, "frames[0].brand_matches[0].confidence");
    }

    #[test]
    fn rejects_similarity_out_of_range() {
        let mut f = frame(0.0);
        f.similarity = Some(SimilarityScore {
            score: -0.1,
            is_match: false,
        });
        let err = validate_frames(&[f], None, "frames").unwrap_err();
        assert_eq!(err.field, "frames[0].similarity.score");
    }

    #[test]
    fn rejects_zero_frame_interval() {
        let mut input = vision(vec![]);
        input.frame_interval_sec = 0.0;
        let err = validate_vision(&input, "vision").unwrap_err();
        assert_eq!(err.field, "vision.frame_interval_sec");
    }

    #[test]
    fn rejects_history_newer_than_current() {
        let snap = |hour: u32| EngagementSnapshot {
            timestamp: Utc.with_ymd_and_hms(2025, 1, 1, hour, 0, 0).unwrap(),
            likes: 10,
            views: None,
            comments: 0,
            shares: None,
        };
        let input = EngagementInput {
            current: snap(1),
            history: vec![snap(0), snap(2)],
            follower_count: None,
        };
        let err = validate_engagement(&input, "engagement").unwrap_err();
        assert_eq!(err.field, "engagement.history[1].timestamp");
    }

    #[test]
    fn rejects_blank_author() {
        let comments = vec![Comment {
            text: "hi".to_string(),
            author: "  ".to_string(),
            timestamp: Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap(),
            likes: None,
        }];
        let err = validate_comments(&comments, "comments").unwrap_err();
        assert_eq!(err.field, "comments[0].author");
        assert_eq!(
            err.to_string(),
            "invalid input at comments[0].author: author must be non-empty"
        );
    }
}
