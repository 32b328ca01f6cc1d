// 📊 Overview Dashboard - headline metrics derived from the snapshot

use crate::data::Snapshot;
use crate::models::{EventRisk, RiskLevel, TimelineEvent};
use serde::Serialize;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DashboardMetrics {
    /// Sum of per-account transaction counts
    pub total_transactions: u64,
    pub high_risk_accounts: usize,
    pub total_accounts: usize,

    /// Distinct pattern names in first-seen order
    pub active_patterns: Vec<String>,

    pub graph_nodes: usize,
    pub graph_edges: usize,
    pub open_reports: usize,
}

impl DashboardMetrics {
    pub fn from_snapshot(snapshot: &Snapshot) -> Self {
        let mut active_patterns: Vec<String> = Vec::new();
        for pattern in snapshot.accounts.iter().flat_map(|a| a.patterns.iter()) {
            if !active_patterns.contains(pattern) {
                active_patterns.push(pattern.clone());
            }
        }

        DashboardMetrics {
            total_transactions: snapshot.accounts.iter().map(|a| a.transaction_count as u64).sum(),
            high_risk_accounts: snapshot
                .accounts
                .iter()
                .filter(|a| a.risk_level == RiskLevel::High)
                .count(),
            total_accounts: snapshot.accounts.len(),
            active_patterns,
            graph_nodes: snapshot.nodes.len(),
            graph_edges: snapshot.edges.len(),
            open_reports: snapshot.reports.iter().filter(|r| r.status.is_open()).count(),
        }
    }
}

/// High-risk events, newest first
pub fn recent_alerts(timeline: &[TimelineEvent], limit: usize) -> Vec<&TimelineEvent> {
    timeline
        .iter()
        .rev()
        .filter(|e| e.risk == EventRisk::High)
        .take(limit)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::SampleData;

    #[test]
    fn test_sample_metrics() {
        let snapshot = SampleData::snapshot().unwrap();
        let metrics = DashboardMetrics::from_snapshot(&snapshot);

        assert_eq!(metrics.total_transactions, 47 + 38 + 22 + 18 + 8 + 5);
        assert_eq!(metrics.high_risk_accounts, 2);
        assert_eq!(metrics.total_accounts, 6);
        assert_eq!(
            metrics.active_patterns,
            vec!["Smurfing", "Rapid Transfer", "Layering", "Burst Activity", "Correlation"]
        );
        assert_eq!(metrics.graph_nodes, 8);
        assert_eq!(metrics.graph_edges, 8);
        assert_eq!(metrics.open_reports, 3);
    }

    #[test]
    fn test_empty_snapshot() {
        let metrics = DashboardMetrics::from_snapshot(&Snapshot::default());
        assert_eq!(metrics, DashboardMetrics::default());
    }

    #[test]
    fn test_recent_alerts_newest_first() {
        let timeline = SampleData::snapshot().unwrap().timeline;
        let alerts: Vec<&str> = recent_alerts(&timeline, 3).iter().map(|e| e.id.as_str()).collect();
        assert_eq!(alerts, vec!["E010", "E006", "E005"]);
        assert!(recent_alerts(&[], 3).is_empty());
    }
}
