//! Dashboard aggregation.
//!
//! This module turns a raw risk payload into an [`AggregateView`]: headline
//! counts, category distributions, average risk and top-N rankings.
//! Every function here is pure and leaves its input untouched.

use crate::models::{
    AggregateView, PostSummary, RawAccount, RawPayload, RawPost, AUTO_ACTION, NO_CONTENT,
    QUEUE_REVIEW, UNKNOWN_CATEGORY,
};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use tracing::debug;

/// Default number of posts in the top-risk table.
pub const DEFAULT_TOP_POSTS: usize = 5;

/// Default number of accounts in the top-risk table.
pub const DEFAULT_TOP_ACCOUNTS: usize = 10;

/// Caps applied to the ranked tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RankingLimits {
    pub top_posts: usize,
    pub top_accounts: usize,
}

impl Default for RankingLimits {
    fn default() -> Self {
        Self {
            top_posts: DEFAULT_TOP_POSTS,
            top_accounts: DEFAULT_TOP_ACCOUNTS,
        }
    }
}

/// A payload with absent collections replaced by empty slices and
/// headline counts resolved field by field.
#[derive(Debug, Clone, Copy)]
pub struct NormalizedPayload<'a> {
    pub posts: &'a [RawPost],
    pub accounts: &'a [RawAccount],
    pub total_posts: usize,
    pub auto_actions: usize,
    pub queue_review: usize,
}

/// Resolve absent fields of a payload.
///
/// Each summary field that the API omitted falls back to a value derived
/// from the posts; fields it did send are kept even when they disagree.
pub fn normalize(payload: &RawPayload) -> NormalizedPayload<'_> {
    let posts = payload.posts.as_deref().unwrap_or(&[]);
    let accounts = payload.accounts.as_deref().unwrap_or(&[]);
    let summary = payload.summary.unwrap_or_default();

    NormalizedPayload {
        posts,
        accounts,
        total_posts: summary.total_posts.unwrap_or(posts.len()),
        auto_actions: summary
            .auto_actions
            .unwrap_or_else(|| count_decision(posts, AUTO_ACTION)),
        queue_review: summary
            .queue_review
            .unwrap_or_else(|| count_decision(posts, QUEUE_REVIEW)),
    }
}

/// Count posts whose decision is exactly `decision`.
pub fn count_decision(posts: &[RawPost], decision: &str) -> usize {
    posts
        .iter()
        .filter(|p| p.decision.as_deref() == Some(decision))
        .count()
}

/// Map a missing or empty label to [`UNKNOWN_CATEGORY`].
fn category_label(label: Option<&str>) -> &str {
    match label {
        Some(l) if !l.is_empty() => l,
        _ => UNKNOWN_CATEGORY,
    }
}

fn count_by<'a, F>(posts: &'a [RawPost], key: F) -> BTreeMap<String, usize>
where
    F: Fn(&'a RawPost) -> Option<&'a str>,
{
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();

    for post in posts {
        *counts
            .entry(category_label(key(post)).to_string())
            .or_default() += 1;
    }

    counts
}

/// Number of posts per decision.
pub fn decision_counts(posts: &[RawPost]) -> BTreeMap<String, usize> {
    count_by(posts, |p| p.decision.as_deref())
}

/// Number of posts per reason category.
pub fn reason_counts(posts: &[RawPost]) -> BTreeMap<String, usize> {
    count_by(posts, |p| p.reason_category.as_deref())
}

/// Order two scores highest first. Scores are validated finite upstream.
fn descending(a: f64, b: f64) -> Ordering {
    b.partial_cmp(&a).unwrap_or(Ordering::Equal)
}

/// Rank items by descending score, ties kept in input order, and keep the first `n`.
fn rank_by_score<T, F>(items: &[T], n: usize, score: F) -> Vec<&T>
where
    F: Fn(&T) -> f64,
{
    let mut ranked: Vec<(usize, &T)> = items.iter().enumerate().collect();
    ranked.sort_by(|(ia, a), (ib, b)| {
        descending(score(*a), score(*b)).then_with(|| ia.cmp(ib))
    });
    ranked.truncate(n);
    ranked.into_iter().map(|(_, item)| item).collect()
}

impl From<&RawPost> for PostSummary {
    fn from(post: &RawPost) -> Self {
        let text = match post.text.as_deref() {
            Some(t) if !t.is_empty() => t.to_string(),
            _ => NO_CONTENT.to_string(),
        };

        Self {
            id: post.id,
            text,
            risk_score: post.risk_score,
            confidence: post.confidence,
            decision: post.decision.clone(),
            interpretation: post.interpretation.clone(),
        }
    }
}

/// The `n` highest-risk posts, highest first.
pub fn top_risk_posts(posts: &[RawPost], n: usize) -> Vec<PostSummary> {
    rank_by_score(posts, n, |p| p.risk_score)
        .into_iter()
        .map(PostSummary::from)
        .collect()
}

/// The `n` accounts with the highest average risk, highest first.
pub fn top_risk_accounts(accounts: &[RawAccount], n: usize) -> Vec<RawAccount> {
    rank_by_score(accounts, n, |a| a.avg_risk)
        .into_iter()
        .cloned()
        .collect()
}

/// Round to two decimal places, halves away from zero.
///
/// Operates on the binary value: `0.125` becomes `0.13`, and `0.995`
/// becomes `1.0` because `0.995 * 100.0` is exactly `99.5` as an `f64`.
pub fn round_to_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Mean post risk rounded to two places, or 0 for no posts.
pub fn average_risk(posts: &[RawPost]) -> f64 {
    if posts.is_empty() {
        return 0.0;
    }

    let sum: f64 = posts.iter().map(|p| p.risk_score).sum();
    round_to_cents(sum / posts.len() as f64)
}

/// Build the dashboard view with the default ranking caps.
pub fn aggregate(payload: &RawPayload) -> AggregateView {
    aggregate_with(payload, &RankingLimits::default())
}

/// Build the dashboard view with explicit ranking caps.
pub fn aggregate_with(payload: &RawPayload, limits: &RankingLimits) -> AggregateView {
    let normalized = normalize(payload);

    debug!(
        "Aggregating {} posts and {} accounts",
        normalized.posts.len(),
        normalized.accounts.len()
    );

    let view = AggregateView {
        total_posts: normalized.total_posts,
        auto_action_count: normalized.auto_actions,
        queue_review_count: normalized.queue_review,
        average_risk: average_risk(normalized.posts),
        decision_counts: decision_counts(normalized.posts),
        reason_counts: reason_counts(normalized.posts),
        top_risk_posts: top_risk_posts(normalized.posts, limits.top_posts),
        top_risk_accounts: top_risk_accounts(normalized.accounts, limits.top_accounts),
    };

    debug!(
        "Aggregate: {} decisions, {} reasons, average risk {:.2}",
        view.decision_counts.len(),
        view.reason_counts.len(),
        view.average_risk
    );

    view
}
