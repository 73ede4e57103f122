//! Engagement anomaly detection over a like/view/share time series.

use authscore_core::{EngagementPolicy, EngagementSnapshot};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnomalyDirection {
    High,
    Low,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngagementMetrics {
    /// `likes / views`; `None` when views are unknown or zero.
    pub like_to_view_ratio: Option<f64>,
    /// `comments / likes`; `None` when there are no likes.
    pub comment_to_like_ratio: Option<f64>,
    /// `(likes + comments + shares) / followers × 100`; `None` without followers.
    pub engagement_rate: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatioCheck {
    pub detected: bool,
    pub direction: Option<AnomalyDirection>,
    pub ratio: Option<f64>,
    pub views: Option<u64>,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateCheck {
    pub detected: bool,
    pub direction: Option<AnomalyDirection>,
    pub rate: Option<f64>,
    pub follower_count: Option<u64>,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpikeCheck {
    pub detected: bool,
    pub current_likes: u64,
    pub history_mean: Option<f64>,
    pub history_std_dev: Option<f64>,
    pub z_score: Option<f64>,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GrowthCheck {
    pub detected: bool,
    pub span_hours: Option<f64>,
    pub likes_per_hour: Option<f64>,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngagementAnomalies {
    pub view_like_ratio: RatioCheck,
    pub engagement_rate: RateCheck,
    pub like_spike: SpikeCheck,
    pub rapid_growth: GrowthCheck,
}

impl EngagementAnomalies {
    #[must_use]
    pub fn detected_count(&self) -> usize {
        [
            self.view_like_ratio.detected,
            self.engagement_rate.detected,
            self.like_spike.detected,
            self.rapid_growth.detected,
        ]
        .into_iter()
        .filter(|d| *d)
        .count()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngagementAnalysis {
    pub is_authentic: bool,
    /// `1.0` minus the penalty of each detected anomaly, in `[0, 1]`.
    pub authenticity_score: f64,
    pub metrics: EngagementMetrics,
    pub anomalies: EngagementAnomalies,
    pub recommendations: Vec<String>,
}

/// Analyze the snapshot under evaluation against its history.
///
/// Ratio and rate rules use `current` alone. Spike and growth rules need at
/// least two history snapshots and are reported as not detected otherwise.
/// Missing views, shares or follower count skip the rules that need them.
#[must_use]
pub fn analyze_engagement(
    current: &EngagementSnapshot,
    history: &[EngagementSnapshot],
    follower_count: Option<u64>,
    policy: &EngagementPolicy,
) -> EngagementAnalysis {
    let metrics = compute_metrics(current, follower_count);

    let anomalies = EngagementAnomalies {
        view_like_ratio: check_ratio(current, metrics.like_to_view_ratio, policy),
        engagement_rate: check_rate(metrics.engagement_rate, follower_count, policy),
        like_spike: check_spike(current, history, policy),
        rapid_growth: check_growth(current, history, follower_count, policy),
    };

    let p = &policy.penalties;
    let mut score: f64 = 1.0;
    if anomalies.like_spike.detected {
        score -= p.spike;
    }
    if anomalies.engagement_rate.detected {
        score -= p.rate;
    }
    if anomalies.view_like_ratio.detected {
        score -= p.ratio;
    }
    if anomalies.rapid_growth.detected {
        score -= p.growth;
    }
    let authenticity_score = score.clamp(0.0, 1.0);
    let is_authentic = authenticity_score >= policy.authentic_threshold;

    tracing::debug!(
        authenticity_score,
        is_authentic,
        anomalies = anomalies.detected_count(),
        "analyzed engagement"
    );

    let recommendations = recommendations(&anomalies, is_authentic);

    EngagementAnalysis {
        is_authentic,
        authenticity_score,
        metrics,
        anomalies,
        recommendations,
    }
}

#[allow(clippy::cast_precision_loss)]
fn compute_metrics(current: &EngagementSnapshot, follower_count: Option<u64>) -> EngagementMetrics {
    let likes = current.likes as f64;

    let like_to_view_ratio = current
        .views
        .filter(|&v| v > 0)
        .map(|v| likes / v as f64);

    let comment_to_like_ratio = (current.likes > 0).then(|| current.comments as f64 / likes);

    let engagement_rate = follower_count.filter(|&f| f > 0).map(|followers| {
        let total = current
            .likes
            .saturating_add(current.comments)
            .saturating_add(current.shares.unwrap_or(0));
        total as f64 / followers as f64 * 100.0
    });

    EngagementMetrics {
        like_to_view_ratio,
        comment_to_like_ratio,
        engagement_rate,
    }
}

fn check_ratio(
    current: &EngagementSnapshot,
    ratio: Option<f64>,
    policy: &EngagementPolicy,
) -> RatioCheck {
    let Some(r) = ratio else {
        return RatioCheck {
            detected: false,
            direction: None,
            ratio: None,
            views: current.views,
            description: "View count unavailable; like-to-view ratio not evaluated.".to_string(),
        };
    };

    let views = current.views.unwrap_or(0);
    let direction = if r > policy.ratio_high {
        Some(AnomalyDirection::High)
    } else if r < policy.ratio_low && views > policy.ratio_low_min_views {
        Some(AnomalyDirection::Low)
    } else {
        None
    };

    let description = match direction {
        Some(AnomalyDirection::High) => format!(
            "Like-to-view ratio {:.2}% is above the {:.2}% ceiling; likes may be purchased.",
            r * 100.0,
            policy.ratio_high * 100.0
        ),
        Some(AnomalyDirection::Low) => format!(
            "Like-to-view ratio {:.3}% is below the {:.3}% floor across {views} views; views may be inflated.",
            r * 100.0,
            policy.ratio_low * 100.0
        ),
        None => format!("Like-to-view ratio {:.2}% is within the expected range.", r * 100.0),
    };

    RatioCheck {
        detected: direction.is_some(),
        direction,
        ratio: Some(r),
        views: current.views,
        description,
    }
}

fn check_rate(
    rate: Option<f64>,
    follower_count: Option<u64>,
    policy: &EngagementPolicy,
) -> RateCheck {
    let Some(r) = rate else {
        return RateCheck {
            detected: false,
            direction: None,
            rate: None,
            follower_count,
            description: "Follower count unavailable; engagement rate not evaluated.".to_string(),
        };
    };

    let followers = follower_count.unwrap_or(0);
    let direction = if r > policy.rate_high {
        Some(AnomalyDirection::High)
    } else if r < policy.rate_low && followers > policy.rate_low_min_followers {
        Some(AnomalyDirection::Low)
    } else {
        None
    };

    let description = match direction {
        Some(AnomalyDirection::High) => format!(
            "Engagement rate {r:.2}% exceeds {:.2}% of {followers} followers.",
            policy.rate_high
        ),
        Some(AnomalyDirection::Low) => format!(
            "Engagement rate {r:.3}% is below {:.3}% for an audience of {followers}; followers may be inactive or purchased.",
            policy.rate_low
        ),
        None => format!("Engagement rate {r:.2}% is within the expected range."),
    };

    RateCheck {
        detected: direction.is_some(),
        direction,
        rate: Some(r),
        follower_count,
        description,
    }
}

/// Population mean and standard deviation.
#[allow(clippy::cast_precision_loss)]
fn mean_std_dev(values: &[f64]) -> (f64, f64) {
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    (mean, variance.sqrt())
}

#[allow(clippy::cast_precision_loss)]
fn check_spike(
    current: &EngagementSnapshot,
    history: &[EngagementSnapshot],
    policy: &EngagementPolicy,
) -> SpikeCheck {
    if history.len() < 2 {
        return SpikeCheck {
            detected: false,
            current_likes: current.likes,
            history_mean: None,
            history_std_dev: None,
            z_score: None,
            description: "Not enough history to evaluate like spikes.".to_string(),
        };
    }

    let likes: Vec<f64> = history.iter().map(|s| s.likes as f64).collect();
    let (mean, std_dev) = mean_std_dev(&likes);

    if std_dev <= 0.0 {
        return SpikeCheck {
            detected: false,
            current_likes: current.likes,
            history_mean: Some(mean),
            history_std_dev: Some(std_dev),
            z_score: None,
            description: "Historical likes have no variance; spike check not applicable."
                .to_string(),
        };
    }

    let z = (current.likes as f64 - mean) / std_dev;
    let detected = z > policy.spike_z_threshold;
    let description = if detected {
        format!(
            "Current likes ({}) are {z:.2} standard deviations above the historical mean of {mean:.1}.",
            current.likes
        )
    } else {
        format!("Current likes are consistent with history (z-score {z:.2}).")
    };

    SpikeCheck {
        detected,
        current_likes: current.likes,
        history_mean: Some(mean),
        history_std_dev: Some(std_dev),
        z_score: Some(z),
        description,
    }
}

#[allow(clippy::cast_precision_loss)]
fn check_growth(
    current: &EngagementSnapshot,
    history: &[EngagementSnapshot],
    follower_count: Option<u64>,
    policy: &EngagementPolicy,
) -> GrowthCheck {
    let insufficient = || GrowthCheck {
        detected: false,
        span_hours: None,
        likes_per_hour: None,
        description: "Not enough history to evaluate growth rate.".to_string(),
    };
    if history.len() < 2 {
        return insufficient();
    }

    let mut series: Vec<&EngagementSnapshot> = history.iter().chain([current]).collect();
    series.sort_by_key(|s| s.timestamp);

    let (Some(earliest), Some(latest)) = (series.first(), series.last()) else {
        return insufficient();
    };

    let span_hours = (latest.timestamp - earliest.timestamp).num_milliseconds() as f64 / 3_600_000.0;
    if span_hours <= 0.0 {
        return GrowthCheck {
            detected: false,
            span_hours: Some(span_hours),
            likes_per_hour: None,
            description: "Snapshots share one timestamp; growth rate not evaluated.".to_string(),
        };
    }

    let likes_per_hour = (latest.likes as f64 - earliest.likes as f64) / span_hours;
    let small_account = follower_count.map_or(true, |f| f < policy.growth_follower_cutoff);
    let detected = span_hours < policy.growth_window_hours
        && likes_per_hour > policy.growth_likes_per_hour
        && small_account;

    let description = if detected {
        format!(
            "Likes grew {likes_per_hour:.0}/hour over {span_hours:.1} hours, above {:.0}/hour.",
            policy.growth_likes_per_hour
        )
    } else {
        format!("Growth of {likes_per_hour:.0} likes/hour over {span_hours:.1} hours is not anomalous.")
    };

    GrowthCheck {
        detected,
        span_hours: Some(span_hours),
        likes_per_hour: Some(likes_per_hour),
        description,
    }
}

fn recommendations(anomalies: &EngagementAnomalies, is_authentic: bool) -> Vec<String> {
    let mut out = Vec::new();
    if anomalies.detected_count() == 0 {
        out.push("Engagement patterns look organic.".to_string());
        return out;
    }
    if !is_authentic {
        out.push(
            "Engagement authenticity is below threshold; request native platform analytics before approval."
                .to_string(),
        );
    }
    if anomalies.like_spike.detected {
        out.push("Investigate the sudden jump in likes against the creator's history.".to_string());
    }
    if anomalies.rapid_growth.detected {
        out.push("Check the like timeline for purchased engagement bursts.".to_string());
    }
    if anomalies.view_like_ratio.detected {
        out.push("Compare likes against views in platform analytics.".to_string());
    }
    if anomalies.engagement_rate.detected {
        out.push("Audit the follower base for inactive or purchased accounts.".to_string());
    }
    out
}
