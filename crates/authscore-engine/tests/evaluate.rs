//! End-to-end tests for `evaluate_submission` and its concurrent variant.
//!
//! Fixtures are built as JSON, the same shape a host deserializes from the
//! media and social-data pipelines.

use std::sync::Arc;

use serde_json::{json, Value};

use authscore_core::{Policy, SubmissionInput};
use authscore_engine::{
    evaluate_submission, evaluate_submission_concurrent, EngineError, SubmissionReport,
    VerdictStatus,
};

/// A clean submission: organic comments, steady engagement, brand visible
/// for six seconds and named in the caption.
fn clean_submission() -> Value {
    let frames: Vec<Value> = (0..6_u32)
        .map(|i| {
            json!({
                "timestamp_sec": f64::from(i),
                "objects": ["person", "bottle"],
                "brand_matches": [{"name": "Acme", "confidence": 0.9}]
            })
        })
        .collect();

    json!({
        "submission_id": "6f1c2a4e-8d3b-4c7a-9e21-5b0d7f3a1c44",
        "target_brand": "Acme",
        "caption": "Morning run fueled by Acme",
        "comments": [
            {"text": "I tried this route last weekend", "author": "ana", "timestamp": "2025-03-01T12:00:00Z"},
            {"text": "Where did you get those shoes?", "author": "ben", "timestamp": "2025-03-01T12:10:00Z"},
            {"text": "The sunrise at the end is unreal", "author": "cho", "timestamp": "2025-03-01T12:20:00Z"},
            {"text": "How long did the whole loop take?", "author": "dev", "timestamp": "2025-03-01T12:30:00Z"}
        ],
        "engagement": {
            "current": {"timestamp": "2025-03-04T12:00:00Z", "likes": 500, "views": 20000, "comments": 40, "shares": 10},
            "history": [
                {"timestamp": "2025-03-01T12:00:00Z", "likes": 300, "comments": 20},
                {"timestamp": "2025-03-02T12:00:00Z", "likes": 400, "comments": 30},
                {"timestamp": "2025-03-03T12:00:00Z", "likes": 450, "comments": 35}
            ],
            "follower_count": 10000
        },
        "vision": {
            "frame_interval_sec": 1.0,
            "duration_sec": 6.0,
            "frames": frames
        },
        "eligibility": {
            "rules": [{"rule": "follower_threshold", "passed": true, "actual": 10000, "required": 1000}]
        },
        "campaign_rules": {
            "rules": [{"rule": "hashtag_present", "passed": true}]
        }
    })
}

fn parse(value: Value) -> SubmissionInput {
    serde_json::from_value(value).expect("fixture deserializes")
}

fn evaluate(value: Value) -> SubmissionReport {
    evaluate_submission(&parse(value), &Policy::default()).expect("evaluation succeeds")
}

/// Serialized report without the timing field.
fn stable_json(report: &SubmissionReport) -> String {
    let mut value = serde_json::to_value(report).unwrap();
    value.as_object_mut().unwrap().remove("processing_time_ms");
    value.to_string()
}

// ---------------------------------------------------------------------------
// verdicts
// ---------------------------------------------------------------------------

#[test]
fn clean_submission_is_approved() {
    let report = evaluate(clean_submission());

    assert_eq!(report.verdict.status, VerdictStatus::Approved);
    assert!((report.verdict.overall_score - 100.0).abs() < 1e-9);
    assert!(report.verdict.issues.is_empty(), "{:?}", report.verdict.issues);
    assert_eq!(report.comments.total_comments, 4);
    assert!(report.engagement.is_authentic);
    assert!(report.visual.target_brand.detected);
    assert_eq!(report.visual.brands_detected[0].total_frames, 6);
    assert_eq!(
        report.submission_id.map(|id| id.to_string()).as_deref(),
        Some("6f1c2a4e-8d3b-4c7a-9e21-5b0d7f3a1c44")
    );
}

#[test]
fn bot_comments_fail_the_comment_check() {
    let mut input = clean_submission();
    input["comments"] = json!([
        {"text": "fire", "author": "bot1", "timestamp": "2025-03-01T12:00:00Z"},
        {"text": "fire", "author": "bot1", "timestamp": "2025-03-01T12:00:04Z"},
        {"text": "fire", "author": "bot1", "timestamp": "2025-03-01T12:00:09Z"}
    ]);
    let report = evaluate(input);

    assert!(report.comments.is_likely_bot);
    assert_eq!(report.verdict.component_results.authenticity.comments_authentic, Some(false));
    assert!(report
        .verdict
        .issues
        .iter()
        .any(|i| i.starts_with("authenticity: comments_authentic failed")));
    assert!(report.verdict.overall_score < 100.0);
}

#[test]
fn failing_follower_threshold_rejects() {
    let mut input = clean_submission();
    input["eligibility"]["rules"][0]["passed"] = json!(false);
    input["eligibility"]["rules"][0]["actual"] = json!(400);
    let report = evaluate(input);

    assert_eq!(report.verdict.status, VerdictStatus::Rejected);
    assert_eq!(report.verdict.hard_failures.len(), 1);
    assert!(report.verdict.hard_failures[0].contains("follower_threshold"));
}

#[test]
fn missing_brand_needs_revision() {
    let mut input = clean_submission();
    input["caption"] = json!("Morning run");
    for frame in input["vision"]["frames"].as_array_mut().unwrap() {
        frame["brand_matches"] = json!([]);
    }
    let report = evaluate(input);

    assert!(!report.visual.target_brand.detected);
    // integration: only brand_safe_context (1 of 6) passes → 100 × (0.25 + 0.25 + 0.05 + 0.20)
    assert!((report.verdict.overall_score - 75.0).abs() < 1e-9);
    assert_eq!(report.verdict.status, VerdictStatus::NeedsRevision);
}

#[test]
fn empty_comments_and_frames_are_valid() {
    let mut input = clean_submission();
    input["comments"] = json!([]);
    input["vision"]["frames"] = json!([]);
    let report = evaluate(input);

    assert_eq!(report.comments.total_comments, 0);
    assert_eq!(report.visual.frames_analyzed, 0);
    assert_eq!(report.verdict.component_results.authenticity.comments_authentic, None);
}

// ---------------------------------------------------------------------------
// boundary validation
// ---------------------------------------------------------------------------

#[test]
fn out_of_range_confidence_is_rejected_with_its_path() {
    let mut input = clean_submission();
    input["vision"]["frames"][3]["brand_matches"][0]["confidence"] = json!(1.5);
    let err = evaluate_submission(&parse(input), &Policy::default()).unwrap_err();

    match err {
        EngineError::InvalidInput(e) => {
            assert_eq!(e.field, "vision.frames[3].brand_matches[0].confidence");
        }
        other => panic!("expected InvalidInput, got {other:?}"),
    }
}

#[test]
fn unordered_frames_are_rejected() {
    let mut input = clean_submission();
    input["vision"]["frames"][2]["timestamp_sec"] = json!(0.5);
    let err = evaluate_submission(&parse(input), &Policy::default()).unwrap_err();
    assert!(err.to_string().contains("vision.frames[2].timestamp_sec"), "{err}");
}

#[test]
fn negative_like_count_fails_deserialization() {
    let mut input = clean_submission();
    input["engagement"]["current"]["likes"] = json!(-1);
    assert!(serde_json::from_value::<SubmissionInput>(input).is_err());
}

#[test]
fn invalid_spam_pattern_is_reported() {
    let mut policy = Policy::default();
    policy.comments.spam_patterns.push("[unclosed".to_string());
    let err = evaluate_submission(&parse(clean_submission()), &policy).unwrap_err();
    assert!(matches!(err, EngineError::InvalidPattern { .. }));
}

// ---------------------------------------------------------------------------
// determinism and the concurrent path
// ---------------------------------------------------------------------------

#[test]
fn evaluation_is_idempotent() {
    let first = evaluate(clean_submission());
    let second = evaluate(clean_submission());
    assert_eq!(stable_json(&first), stable_json(&second));
}

#[tokio::test]
async fn concurrent_evaluation_matches_sequential() {
    let input = parse(clean_submission());
    let policy = Policy::default();
    let sequential = evaluate_submission(&input, &policy).unwrap();

    let concurrent = evaluate_submission_concurrent(Arc::new(input), Arc::new(policy))
        .await
        .unwrap();

    assert_eq!(stable_json(&sequential), stable_json(&concurrent));
}

#[tokio::test]
async fn concurrent_evaluation_validates_first() {
    let mut input = clean_submission();
    input["comments"][0]["author"] = json!("  ");
    let err = evaluate_submission_concurrent(Arc::new(parse(input)), Arc::new(Policy::default()))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidInput(ref e) if e.field == "comments[0].author"));
}
