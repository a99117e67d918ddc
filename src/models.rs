//! Data models for the risk dashboard.
//!
//! This module contains the wire types delivered by the risk scoring API
//! and the derived view types produced by the aggregator.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Decision literal for posts actioned automatically by the scorer.
pub const AUTO_ACTION: &str = "AUTO_ACTION";

/// Decision literal for posts routed to human review.
pub const QUEUE_REVIEW: &str = "QUEUE_REVIEW";

/// Category label used when a post has no decision or reason category.
pub const UNKNOWN_CATEGORY: &str = "Unknown";

/// Text shown for ranked posts whose source text is missing or empty.
pub const NO_CONTENT: &str = "No Content";

/// A single scored post as delivered by the risk API.
///
/// Missing numeric fields read as zero; missing strings read as `None`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawPost {
    /// Upstream post identifier. Not required to be unique.
    #[serde(rename = "post_id")]
    pub id: i64,
    /// Post body.
    pub text: Option<String>,
    /// Upstream risk score, the primary ranking key.
    pub risk_score: f64,
    /// Scorer confidence in the risk score.
    pub confidence: f64,
    /// Decision assigned by the scorer (e.g. `AUTO_ACTION`).
    pub decision: Option<String>,
    /// Explanation label attached to the score.
    pub reason_category: Option<String>,
    /// Free-form explanation of the score.
    pub interpretation: Option<String>,
}

/// Per-account rollup as delivered by the risk API.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawAccount {
    /// Account identifier.
    pub account_id: String,
    /// Mean risk score over the account's posts.
    pub avg_risk: f64,
    /// Number of posts scored for the account.
    pub total_posts: usize,
    /// Highest post risk for the account, when the API reports it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_risk: Option<f64>,
    /// Mean scorer confidence, when the API reports it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avg_confidence: Option<f64>,
    /// Smoothed recent risk, when the API reports it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub risk_trend: Option<f64>,
}

/// Headline counts precomputed by the API. Every field may be absent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawSummary {
    pub total_posts: Option<usize>,
    pub auto_actions: Option<usize>,
    pub queue_review: Option<usize>,
}

/// The complete payload returned by the dashboard endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawPayload {
    pub posts: Option<Vec<RawPost>>,
    pub accounts: Option<Vec<RawAccount>>,
    pub summary: Option<RawSummary>,
}

/// A field in the payload that holds a value the aggregator cannot rank or average.
#[derive(Debug, Clone, PartialEq)]
pub struct InvalidField {
    /// Location of the value, e.g. `posts[3].risk_score`.
    pub field: String,
    /// The offending value.
    pub value: f64,
}

impl fmt::Display for InvalidField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} is not a finite number ({})", self.field, self.value)
    }
}

impl RawPayload {
    /// Check that every score the aggregator reads is a finite number.
    ///
    /// Returns the first offending field. Absent collections are valid.
    pub fn validate(&self) -> Result<(), InvalidField> {
        for (i, post) in self.posts.iter().flatten().enumerate() {
            check_finite(format_args!("posts[{}].risk_score", i), post.risk_score)?;
            check_finite(format_args!("posts[{}].confidence", i), post.confidence)?;
        }

        for (i, account) in self.accounts.iter().flatten().enumerate() {
            check_finite(format_args!("accounts[{}].avg_risk", i), account.avg_risk)?;
        }

        Ok(())
    }
}

fn check_finite(field: fmt::Arguments<'_>, value: f64) -> Result<(), InvalidField> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(InvalidField {
            field: field.to_string(),
            value,
        })
    }
}

/// A ranked post as shown in the top-risk table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostSummary {
    #[serde(rename = "post_id")]
    pub id: i64,
    /// Post text, or [`NO_CONTENT`] when the source text was missing or empty.
    pub text: String,
    pub risk_score: f64,
    pub confidence: f64,
    pub decision: Option<String>,
    /// Carried through from the source post without defaulting.
    pub interpretation: Option<String>,
}

/// The presentation-ready aggregate derived from one payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AggregateView {
    pub total_posts: usize,
    pub auto_action_count: usize,
    pub queue_review_count: usize,
    /// Mean post risk rounded to two decimal places; 0 when there are no posts.
    pub average_risk: f64,
    pub decision_counts: BTreeMap<String, usize>,
    pub reason_counts: BTreeMap<String, usize>,
    pub top_risk_posts: Vec<PostSummary>,
    pub top_risk_accounts: Vec<RawAccount>,
}
