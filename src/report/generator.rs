//! Dashboard report generation.
//!
//! This module produces the JSON document handed to the presentation
//! layer and a plain-text summary for terminals.

use crate::analysis::Dashboard;
use crate::models::AggregateView;
use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

/// Metadata about a dashboard run.
#[derive(Debug, Clone, Serialize)]
pub struct ReportMetadata {
    /// Where the payload came from (URL or file path).
    pub source: String,
    /// When the dashboard was generated.
    pub generated_at: DateTime<Utc>,
    /// Time spent fetching and aggregating, in seconds.
    pub duration_seconds: f64,
}

/// The complete dashboard document.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardReport {
    pub metadata: ReportMetadata,
    #[serde(flatten)]
    pub dashboard: Dashboard,
}

/// Generate the JSON document.
pub fn generate_json_report(report: &DashboardReport) -> Result<String> {
    serde_json::to_string_pretty(report).map_err(Into::into)
}

/// Counts ordered by count descending, then label.
fn sorted_counts(counts: &BTreeMap<String, usize>) -> Vec<(&String, &usize)> {
    let mut sorted: Vec<_> = counts.iter().collect();
    // BTreeMap iteration is label-ordered and sort_by_key is stable.
    sorted.sort_by_key(|(_, count)| std::cmp::Reverse(**count));
    sorted
}

/// Truncate text to `max` characters for table display.
fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        let head: String = text.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", head)
    }
}

/// Generate a plain-text summary of the view.
pub fn generate_text_summary(view: &AggregateView) -> String {
    let mut lines = Vec::new();

    lines.push("Risk Dashboard".to_string());
    lines.push("==============".to_string());
    lines.push(format!("Total posts:   {}", view.total_posts));
    lines.push(format!("Auto actions:  {}", view.auto_action_count));
    lines.push(format!("Queue review:  {}", view.queue_review_count));
    lines.push(format!("Average risk:  {:.2}", view.average_risk));

    if !view.decision_counts.is_empty() {
        lines.push(String::new());
        lines.push("By Decision:".to_string());
        for (decision, count) in sorted_counts(&view.decision_counts) {
            lines.push(format!("- {}: {}", decision, count));
        }
    }

    if !view.reason_counts.is_empty() {
        lines.push(String::new());
        lines.push("By Reason:".to_string());
        for (reason, count) in sorted_counts(&view.reason_counts) {
            lines.push(format!("- {}: {}", reason, count));
        }
    }

    if !view.top_risk_posts.is_empty() {
        lines.push(String::new());
        lines.push("Top Risk Posts:".to_string());
        for (i, post) in view.top_risk_posts.iter().enumerate() {
            lines.push(format!(
                "{}. [{:.2}] #{} {} ({})",
                i + 1,
                post.risk_score,
                post.id,
                truncate(&post.text, 60),
                post.decision.as_deref().unwrap_or("-")
            ));
        }
    }

    if !view.top_risk_accounts.is_empty() {
        lines.push(String::new());
        lines.push("Top Risk Accounts:".to_string());
        for (i, account) in view.top_risk_accounts.iter().enumerate() {
            lines.push(format!(
                "{}. [{:.2}] {} ({} posts)",
                i + 1,
                account.avg_risk,
                account.account_id,
                account.total_posts
            ));
        }
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{build_dashboard, RankingLimits};
    use crate::models::RawPayload;

    fn create_test_dashboard() -> Dashboard {
        let payload: RawPayload =
            serde_json::from_str(include_str!("../../fixtures/dashboard.json")).unwrap();
        build_dashboard(&payload, &RankingLimits::default()).unwrap()
    }

    fn create_test_report() -> DashboardReport {
        DashboardReport {
            metadata: ReportMetadata {
                source: "http://localhost:8000/api/dashboard".to_string(),
                generated_at: Utc::now(),
                duration_seconds: 0.4,
            },
            dashboard: create_test_dashboard(),
        }
    }

    #[test]
    fn test_generate_json_report() {
        let json = generate_json_report(&create_test_report()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["metadata"]["source"], "http://localhost:8000/api/dashboard");
        assert_eq!(value["view"]["total_posts"], 8);
        assert_eq!(value["view"]["top_risk_posts"][0]["post_id"], 105);
        assert_eq!(value["view"]["top_risk_posts"][0]["text"], "No Content");
        assert!(value["posts_json"].as_str().unwrap().starts_with('['));
        assert!(value["accounts_json"].as_str().unwrap().contains("acc_alpha"));
    }

    #[test]
    fn test_text_summary() {
        let dashboard = create_test_dashboard();
        let text = generate_text_summary(&dashboard.view);

        assert!(text.contains("Total posts:   8"));
        assert!(text.contains("Average risk:  0.51"));
        assert!(text.contains("1. [0.91] #105 No Content (AUTO_ACTION)"));
        // 0.745 is stored just below the halfway point.
        assert!(text.contains("1. [0.74] acc_alpha (2 posts)"));
        assert!(text.contains("- Unknown: 1"));
    }

    #[test]
    fn test_text_summary_orders_counts() {
        let dashboard = create_test_dashboard();
        let text = generate_text_summary(&dashboard.view);

        let copy_paste = text.find("- Copy-paste: 3").unwrap();
        let benign = text.find("- Benign: 2").unwrap();
        let coordinated = text.find("- Coordinated: 1").unwrap();
        assert!(copy_paste < benign);
        assert!(benign < coordinated);
    }

    #[test]
    fn test_text_summary_empty_view() {
        let text = generate_text_summary(&AggregateView::default());
        assert!(text.contains("Total posts:   0"));
        assert!(text.contains("Average risk:  0.00"));
        assert!(!text.contains("Top Risk Posts"));
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("abcdefghijkl", 8), "abcde...");
    }
}
