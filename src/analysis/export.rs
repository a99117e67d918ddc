//! Serialized collections for client-side rendering.
//!
//! The presentation layer needs the full dataset next to the top-N
//! tables, so posts and accounts are also exported as compact JSON arrays
//! using the same field names as the risk API.

use super::aggregator::{aggregate_with, RankingLimits};
use crate::models::{AggregateView, RawAccount, RawPayload, RawPost};
use serde::Serialize;

/// An aggregate view bundled with the full post and account arrays.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dashboard {
    pub view: AggregateView,
    pub posts_json: String,
    pub accounts_json: String,
}

/// Serialize every post as a JSON array.
pub fn posts_json(posts: &[RawPost]) -> serde_json::Result<String> {
    serde_json::to_string(posts)
}

/// Serialize every account as a JSON array.
pub fn accounts_json(accounts: &[RawAccount]) -> serde_json::Result<String> {
    serde_json::to_string(accounts)
}

/// Aggregate a payload and export its collections.
///
/// Absent collections export as `[]`.
pub fn build_dashboard(payload: &RawPayload, limits: &RankingLimits) -> serde_json::Result<Dashboard> {
    let posts = payload.posts.as_deref().unwrap_or(&[]);
    let accounts = payload.accounts.as_deref().unwrap_or(&[]);

    Ok(Dashboard {
        view: aggregate_with(payload, limits),
        posts_json: posts_json(posts)?,
        accounts_json: accounts_json(accounts)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    fn fixture() -> RawPayload {
        serde_json::from_str(include_str!("../../fixtures/dashboard.json")).unwrap()
    }

    #[test]
    fn test_posts_json_uses_wire_names() {
        let posts = vec![RawPost {
            id: 9,
            text: None,
            risk_score: 0.7,
            confidence: 0.6,
            decision: Some("QUEUE_REVIEW".to_string()),
            reason_category: Some("Coordinated".to_string()),
            interpretation: None,
        }];

        let json = posts_json(&posts).unwrap();
        let value: Value = serde_json::from_str(&json).unwrap();
        let first = &value[0];

        assert_eq!(first["post_id"], 9);
        assert_eq!(first["risk_score"], 0.7);
        assert_eq!(first["reason_category"], "Coordinated");
        assert!(first["text"].is_null());
        assert!(first.get("id").is_none());
    }

    #[test]
    fn test_export_contains_all_items_not_just_top_n() {
        let payload = fixture();
        let dashboard = build_dashboard(&payload, &RankingLimits::default()).unwrap();

        let posts: Vec<Value> = serde_json::from_str(&dashboard.posts_json).unwrap();
        let accounts: Vec<Value> = serde_json::from_str(&dashboard.accounts_json).unwrap();

        assert_eq!(posts.len(), 8);
        assert_eq!(dashboard.view.top_risk_posts.len(), 5);
        assert_eq!(accounts.len(), 4);
        assert_eq!(accounts[0]["account_id"], "acc_alpha");
        assert_eq!(accounts[0]["avg_risk"], 0.745);
        assert!(accounts[1].get("max_risk").is_none());
    }

    #[test]
    fn test_export_preserves_input_order() {
        let dashboard = build_dashboard(&fixture(), &RankingLimits::default()).unwrap();
        let posts: Vec<RawPost> = serde_json::from_str(&dashboard.posts_json).unwrap();

        let ids: Vec<i64> = posts.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![101, 102, 103, 104, 105, 106, 107, 108]);
    }

    #[test]
    fn test_absent_collections_export_empty_arrays() {
        let dashboard = build_dashboard(&RawPayload::default(), &RankingLimits::default()).unwrap();
        assert_eq!(dashboard.posts_json, "[]");
        assert_eq!(dashboard.accounts_json, "[]");
        assert_eq!(dashboard.view, AggregateView::default());
    }
}
