use chrono::TimeZone;

use super::*;

fn at(secs: i64) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap() + Duration::seconds(secs)
}

fn comment(text: &str, author: &str, secs: i64) -> Comment {
    Comment {
        text: text.to_string(),
        author: author.to_string(),
        timestamp: at(secs),
        likes: None,
    }
}

fn classifier() -> CommentClassifier {
    CommentClassifier::new(&CommentPolicy::default()).expect("default patterns compile")
}

fn organic() -> Vec<Comment> {
    vec![
        comment("I tried this recipe last night and it worked", "ana", 0),
        comment("Where did you get that jacket?", "ben", 600),
        comment("The lighting in this one is really nice", "cho", 1_200),
        comment("Can you do a tutorial on the editing?", "dev", 1_800),
    ]
}

// -----------------------------------------------------------------------
// empty and organic inputs
// -----------------------------------------------------------------------

#[test]
fn empty_input_is_no_data_result() {
    let analysis = classifier().classify(&[]);
    assert_eq!(analysis.total_comments, 0);
    assert_eq!(analysis.suspicious_comments, 0);
    assert!(analysis.bot_likelihood.abs() < f64::EPSILON);
    assert_eq!(analysis.risk_level, RiskLevel::Minimal);
    assert_eq!(analysis.recommendations.len(), 1);
    assert!(
        analysis.recommendations[0].contains("No comments available"),
        "got: {:?}",
        analysis.recommendations
    );
}

#[test]
fn organic_comments_score_minimal() {
    let analysis = classifier().classify(&organic());
    assert_eq!(analysis.total_comments, 4);
    assert_eq!(analysis.suspicious_comments, 0);
    assert!(analysis.bot_likelihood.abs() < f64::EPSILON);
    assert_eq!(analysis.risk_level, RiskLevel::Minimal);
    assert!(!analysis.is_likely_bot);
    assert_eq!(
        analysis.recommendations,
        vec!["Comment activity appears organic.".to_string()]
    );
}

// -----------------------------------------------------------------------
// individual checks
// -----------------------------------------------------------------------

#[test]
fn repeated_fire_from_one_author_is_flagged() {
    let comments = vec![
        comment("fire", "bot1", 0),
        comment("fire", "bot1", 4),
        comment("fire", "bot1", 9),
    ];
    let analysis = classifier().classify(&comments);

    assert_eq!(analysis.issues.duplicates.count, 3);
    assert_eq!(analysis.issues.duplicates.examples.len(), 1);
    assert_eq!(analysis.issues.duplicates.examples[0].normalized_text, "fire");
    assert_eq!(analysis.issues.duplicates.examples[0].authors, vec!["bot1"]);
    assert!(analysis.issues.suspicious_timing.detected);
    assert_eq!(analysis.issues.generic.count, 3);
    assert!(analysis.bot_likelihood >= 0.3);
    // 0.30 duplicates + 0.20 generic + 0.15 timing
    assert!((analysis.bot_likelihood - 0.65).abs() < 1e-9);
    assert_eq!(analysis.risk_level, RiskLevel::Moderate);
    assert!(analysis.is_likely_bot);
    assert!((analysis.suspicious_comment_percentage - 100.0).abs() < 1e-9);
}

#[test]
fn emoji_only_comments_are_counted() {
    let mut comments = organic();
    comments.push(comment("🔥🔥🔥", "eve", 3_000));
    comments.push(comment("😍", "fay", 4_000));
    let analysis = classifier().classify(&comments);
    assert_eq!(analysis.issues.emoji_only.count, 2);
    assert_eq!(analysis.issues.emoji_only.examples[0].index, 4);
    assert_eq!(analysis.suspicious_comments, 2);
}

#[test]
fn spam_match_keeps_pattern_as_evidence() {
    let mut comments = organic();
    comments.push(comment("Follow me for daily tips!", "promo", 5_000));
    let analysis = classifier().classify(&comments);
    assert_eq!(analysis.issues.spam.count, 1);
    let spam = &analysis.issues.spam.examples[0];
    assert_eq!(spam.index, 4);
    assert_eq!(spam.author, "promo");
    assert_eq!(spam.pattern, r"\bfollow\s+(me|back)\b");
}

#[test]
fn spam_patterns_are_case_insensitive() {
    let analysis = classifier().classify(&[comment("LINK IN BIO", "x", 0)]);
    assert_eq!(analysis.issues.spam.count, 1);
}

#[test]
fn generic_match_ignores_case_and_edge_punctuation() {
    let analysis = classifier().classify(&[
        comment("WOW!!", "a", 0),
        comment("Love it 😍", "b", 1_000),
        comment("wow this changed how I cook", "c", 2_000),
    ]);
    assert_eq!(analysis.issues.generic.count, 2);
}

#[test]
fn duplicates_group_across_case_spacing_and_authors() {
    let analysis = classifier().classify(&[
        comment("Great video!", "zed", 0),
        comment("great   VIDEO", "amy", 1_000),
        comment("totally different", "kim", 2_000),
    ]);
    let dups = &analysis.issues.duplicates;
    assert_eq!(dups.count, 2);
    assert_eq!(dups.examples[0].count, 2);
    assert_eq!(dups.examples[0].authors, vec!["amy", "zed"]);
}

#[test]
fn punctuation_only_comments_never_group() {
    let analysis = classifier().classify(&[comment("!!!", "a", 0), comment("???", "b", 1_000)]);
    assert_eq!(analysis.issues.duplicates.count, 0);
}

#[test]
fn duplicate_groups_are_ordered_largest_first() {
    let analysis = classifier().classify(&[
        comment("alpha", "a", 0),
        comment("alpha", "b", 1_000),
        comment("zulu", "c", 2_000),
        comment("zulu", "d", 3_000),
        comment("zulu", "e", 4_000),
    ]);
    let groups = &analysis.issues.duplicates.examples;
    assert_eq!(groups[0].normalized_text, "zulu");
    assert_eq!(groups[1].normalized_text, "alpha");
    assert_eq!(analysis.issues.duplicates.count, 5);
}

// -----------------------------------------------------------------------
// timing
// -----------------------------------------------------------------------

#[test]
fn spread_out_comments_have_no_timing_run() {
    let analysis = classifier().classify(&organic());
    assert!(!analysis.issues.suspicious_timing.detected);
    assert_eq!(analysis.issues.suspicious_timing.runs, 0);
}

#[test]
fn burst_inside_window_is_detected_regardless_of_input_order() {
    let comments = vec![
        comment("first real thought", "a", 5_000),
        comment("second", "b", 30),
        comment("third", "c", 0),
        comment("fourth", "d", 59),
    ];
    let timing = classifier().classify(&comments).issues.suspicious_timing;
    assert!(timing.detected);
    assert_eq!(timing.runs, 1);
    assert_eq!(timing.count, 3);
    let indices: Vec<usize> = timing.examples.iter().map(|c| c.index).collect();
    assert_eq!(indices, vec![2, 1, 3]);
}

#[test]
fn run_spanning_exactly_the_window_counts() {
    let comments = vec![
        comment("one", "a", 0),
        comment("two", "b", 30),
        comment("three", "c", 60),
    ];
    assert!(classifier().classify(&comments).issues.suspicious_timing.detected);

    let comments = vec![
        comment("one", "a", 0),
        comment("two", "b", 30),
        comment("three", "c", 61),
    ];
    assert!(!classifier().classify(&comments).issues.suspicious_timing.detected);
}

#[test]
fn two_comments_cannot_form_a_run() {
    let comments = vec![comment("one", "a", 0), comment("two", "b", 1)];
    assert!(!classifier().classify(&comments).issues.suspicious_timing.detected);
}

// -----------------------------------------------------------------------
// scoring, evidence, recommendations
// -----------------------------------------------------------------------

#[test]
fn likelihood_and_percentage_stay_in_bounds() {
    let sets: Vec<Vec<Comment>> = vec![
        organic(),
        (0..20).map(|i| comment("🔥", "bot", i)).collect(),
        (0..20)
            .map(|i| comment("follow me fire", &format!("bot{i}"), i))
            .collect(),
        vec![comment("nice", "a", 0)],
    ];
    for comments in sets {
        let analysis = classifier().classify(&comments);
        assert!((0.0..=1.0).contains(&analysis.bot_likelihood));
        assert!((0.0..=100.0).contains(&analysis.suspicious_comment_percentage));
    }
}

#[test]
fn suspicious_percentage_counts_each_comment_once() {
    let mut comments = organic();
    comments[0].text = "nice".to_string();
    let analysis = classifier().classify(&comments);
    assert_eq!(analysis.suspicious_comments, 1);
    assert!((analysis.suspicious_comment_percentage - 25.0).abs() < 1e-9);
}

#[test]
fn evidence_is_capped_but_count_is_not() {
    let comments: Vec<Comment> = (0..10)
        .map(|i| comment("😂", &format!("u{i}"), i * 1_000))
        .collect();
    let analysis = classifier().classify(&comments);
    assert_eq!(analysis.issues.emoji_only.count, 10);
    assert_eq!(analysis.issues.emoji_only.examples.len(), 5);
}

#[test]
fn risk_tiers_follow_policy_thresholds() {
    let tiers = RiskTiers::default();
    assert_eq!(RiskLevel::from_likelihood(0.75, &tiers), RiskLevel::High);
    assert_eq!(RiskLevel::from_likelihood(0.7, &tiers), RiskLevel::High);
    assert_eq!(RiskLevel::from_likelihood(0.4, &tiers), RiskLevel::Moderate);
    assert_eq!(RiskLevel::from_likelihood(0.25, &tiers), RiskLevel::Low);
    assert_eq!(RiskLevel::from_likelihood(0.1, &tiers), RiskLevel::Minimal);
}

#[test]
fn flagged_sets_get_targeted_recommendations() {
    let comments = vec![
        comment("fire", "bot1", 0),
        comment("fire", "bot1", 4),
        comment("fire", "bot1", 9),
    ];
    let recs = classifier().classify(&comments).recommendations;
    assert!(recs[0].starts_with("Moderate bot activity"));
    assert!(recs.iter().any(|r| r.contains("repeat identical text")));
    assert!(recs.iter().any(|r| r.contains("bursts of 3 or more within 60 seconds")));
    assert!(recs.iter().any(|r| r.contains("generic")));
}

#[test]
fn invalid_pattern_is_reported() {
    let policy = CommentPolicy {
        spam_patterns: vec!["(unclosed".to_string()],
        ..CommentPolicy::default()
    };
    let err = CommentClassifier::new(&policy).unwrap_err();
    assert!(
        matches!(err, EngineError::InvalidPattern { ref pattern, .. } if pattern == "(unclosed")
    );
}

#[test]
fn unrepresentable_timing_window_is_an_error() {
    let policy = CommentPolicy {
        timing_window_secs: i64::MAX,
        ..CommentPolicy::default()
    };
    let err = CommentClassifier::new(&policy).unwrap_err();
    assert!(matches!(err, EngineError::InvalidTimingWindow(secs) if secs == i64::MAX));
}

#[test]
fn custom_generic_tokens_replace_defaults() {
    let policy = CommentPolicy {
        generic_tokens: vec!["meh".to_string()],
        ..CommentPolicy::default()
    };
    let analysis = classify_comments(
        &[comment("Meh.", "a", 0), comment("nice", "b", 1_000)],
        &policy,
    )
    .unwrap();
    assert_eq!(analysis.issues.generic.count, 1);
    assert_eq!(analysis.issues.generic.examples[0].index, 0);
}

#[test]
fn classification_is_idempotent() {
    let comments = vec![
        comment("fire", "bot1", 0),
        comment("follow me", "bot2", 4),
        comment("🔥", "bot3", 9),
        comment("a thoughtful reply", "human", 900),
    ];
    let c = classifier();
    let first = serde_json::to_string(&c.classify(&comments)).unwrap();
    let second = serde_json::to_string(&c.classify(&comments)).unwrap();
    assert_eq!(first, second);
}
