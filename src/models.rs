// 🗂️ Domain Model - Accounts, transaction graph, timeline events, reports
//
// Every entity is an immutable snapshot value handed over by a DataSource.
// The only things that change at runtime are the UI selections layered on top
// (filters, playback position, selected node), and those live in the views.

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

// ============================================================================
// RISK LEVEL
// ============================================================================

/// Coarse categorical severity attached to accounts, graph nodes and reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    High,
    Medium,
    Low,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::High => "high",
            RiskLevel::Medium => "medium",
            RiskLevel::Low => "low",
        }
    }

    /// Label used by the filter selectors
    pub fn label(&self) -> &'static str {
        match self {
            RiskLevel::High => "High Risk",
            RiskLevel::Medium => "Medium Risk",
            RiskLevel::Low => "Low Risk",
        }
    }

    /// Case-insensitive parse; anything outside the closed set is `None`
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "high" => Some(RiskLevel::High),
            "medium" => Some(RiskLevel::Medium),
            "low" => Some(RiskLevel::Low),
            _ => None,
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Accepts any string for a risk field; unknown values become `None`
/// so that rendering falls back to the neutral color.
fn lenient_risk<'de, D>(deserializer: D) -> Result<Option<RiskLevel>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.as_deref().and_then(RiskLevel::parse))
}

// ============================================================================
// RISK FILTER
// ============================================================================

/// The "All / High / Medium / Low" selector shared by the accounts table
/// and the timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskFilter {
    #[default]
    All,
    High,
    Medium,
    Low,
}

impl RiskFilter {
    /// Unrecognized values mean "no filter"
    pub fn parse(value: &str) -> Self {
        match RiskLevel::parse(value) {
            Some(level) => RiskFilter::from(level),
            None => RiskFilter::All,
        }
    }

    pub fn level(&self) -> Option<RiskLevel> {
        match self {
            RiskFilter::All => None,
            RiskFilter::High => Some(RiskLevel::High),
            RiskFilter::Medium => Some(RiskLevel::Medium),
            RiskFilter::Low => Some(RiskLevel::Low),
        }
    }

    pub fn matches(&self, level: RiskLevel) -> bool {
        match self.level() {
            None => true,
            Some(wanted) => wanted == level,
        }
    }

    /// Events carry an extra `none` risk which only the "all" filter admits
    pub fn matches_event(&self, risk: EventRisk) -> bool {
        match (self.level(), risk.level()) {
            (None, _) => true,
            (Some(wanted), Some(actual)) => wanted == actual,
            (Some(_), None) => false,
        }
    }

    /// Cycle order used by the selector key binding
    pub fn next(&self) -> Self {
        match self {
            RiskFilter::All => RiskFilter::High,
            RiskFilter::High => RiskFilter::Medium,
            RiskFilter::Medium => RiskFilter::Low,
            RiskFilter::Low => RiskFilter::All,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskFilter::All => "all",
            RiskFilter::High => "high",
            RiskFilter::Medium => "medium",
            RiskFilter::Low => "low",
        }
    }

    pub fn label(&self) -> &'static str {
        match self.level() {
            None => "All Risk Levels",
            Some(level) => level.label(),
        }
    }
}

impl From<RiskLevel> for RiskFilter {
    fn from(level: RiskLevel) -> Self {
        match level {
            RiskLevel::High => RiskFilter::High,
            RiskLevel::Medium => RiskFilter::Medium,
            RiskLevel::Low => RiskFilter::Low,
        }
    }
}

// ============================================================================
// ACCOUNT
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountStatus {
    Flagged,
    Investigating,
    Monitoring,
    Cleared,
}

impl AccountStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountStatus::Flagged => "flagged",
            AccountStatus::Investigating => "investigating",
            AccountStatus::Monitoring => "monitoring",
            AccountStatus::Cleared => "cleared",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            AccountStatus::Flagged => "Flagged",
            AccountStatus::Investigating => "Investigating",
            AccountStatus::Monitoring => "Monitoring",
            AccountStatus::Cleared => "Cleared",
        }
    }
}

/// An account under watch, as ranked by the upstream scoring service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    /// Unique account identifier (e.g. "ACC-7821")
    pub id: String,

    /// Risk score in [0, 1]
    pub risk_score: f64,

    pub risk_level: RiskLevel,

    pub total_sent: f64,
    pub total_received: f64,
    pub transaction_count: u32,

    /// Names of the patterns this account triggered (may be empty)
    #[serde(default)]
    pub patterns: Vec<String>,

    /// Graph degree
    pub connections: u32,

    /// Display-only relative time ("2 min ago")
    pub last_activity: String,

    pub status: AccountStatus,
}

impl Account {
    /// Received minus sent
    pub fn net_flow(&self) -> f64 {
        self.total_received - self.total_sent
    }

    pub fn has_patterns(&self) -> bool {
        !self.patterns.is_empty()
    }
}

// ============================================================================
// TRANSACTION GRAPH
// ============================================================================

/// 2-D layout coordinate (SVG convention: y grows downward)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Point { x, y }
    }

    pub fn midpoint(&self, other: &Point) -> Point {
        Point {
            x: (self.x + other.x) / 2.0,
            y: (self.y + other.y) / 2.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphNode {
    pub id: String,
    pub x: f64,
    pub y: f64,

    /// `None` when the snapshot carried an unrecognized risk value
    #[serde(default, deserialize_with = "lenient_risk")]
    pub risk: Option<RiskLevel>,

    pub label: String,
}

impl GraphNode {
    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

/// Directed money flow between two graph nodes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphEdge {
    pub from: String,
    pub to: String,
    pub amount: f64,
}

// ============================================================================
// TIMELINE
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventType {
    Transaction,
    Pattern,
    Alert,
    System,
}

impl EventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::Transaction => "transaction",
            EventType::Pattern => "pattern",
            EventType::Alert => "alert",
            EventType::System => "system",
        }
    }
}

/// Event risk: the three risk levels plus `none` for system events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventRisk {
    High,
    Medium,
    Low,
    None,
}

impl EventRisk {
    pub fn level(&self) -> Option<RiskLevel> {
        match self {
            EventRisk::High => Some(RiskLevel::High),
            EventRisk::Medium => Some(RiskLevel::Medium),
            EventRisk::Low => Some(RiskLevel::Low),
            EventRisk::None => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EventRisk::High => "high",
            EventRisk::Medium => "medium",
            EventRisk::Low => "low",
            EventRisk::None => "none",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineEvent {
    pub id: String,

    /// Wall-clock display time ("14:31:45")
    pub time: String,

    /// 1-based ordinal; ordering key of the sequence
    pub timestamp: u32,

    #[serde(rename = "type")]
    pub event_type: EventType,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,

    pub description: String,
    pub risk: EventRisk,
}

impl TimelineEvent {
    /// Source and destination of a transaction event, when both are known
    pub fn transfer(&self) -> Option<(&str, &str)> {
        if self.event_type != EventType::Transaction {
            return None;
        }
        match (self.from.as_deref(), self.to.as_deref()) {
            (Some(from), Some(to)) => Some((from, to)),
            _ => None,
        }
    }
}

// ============================================================================
// REPORTS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportType {
    Investigation,
    Summary,
    Str,
    Audit,
}

impl ReportType {
    pub const ALL: [ReportType; 4] = [
        ReportType::Investigation,
        ReportType::Str,
        ReportType::Summary,
        ReportType::Audit,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ReportType::Investigation => "investigation",
            ReportType::Summary => "summary",
            ReportType::Str => "str",
            ReportType::Audit => "audit",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ReportType::Investigation => "Investigation",
            ReportType::Summary => "Summary",
            ReportType::Str => "STR",
            ReportType::Audit => "Audit",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "investigation" => Some(ReportType::Investigation),
            "summary" => Some(ReportType::Summary),
            "str" => Some(ReportType::Str),
            "audit" => Some(ReportType::Audit),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportStatus {
    Draft,
    Pending,
    Submitted,
    Approved,
}

impl ReportStatus {
    pub fn label(&self) -> &'static str {
        match self {
            ReportStatus::Draft => "Draft",
            ReportStatus::Pending => "Pending Review",
            ReportStatus::Submitted => "Submitted",
            ReportStatus::Approved => "Approved",
        }
    }

    pub fn is_open(&self) -> bool {
        !matches!(self, ReportStatus::Approved)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub id: String,
    pub title: String,

    #[serde(rename = "type")]
    pub report_type: ReportType,

    pub status: ReportStatus,
    pub created_at: NaiveDate,

    /// Display-only relative time
    pub updated_at: String,

    /// Covered accounts; empty means the report applies to all accounts
    #[serde(default)]
    pub accounts: Vec<String>,

    pub risk_level: RiskLevel,
    pub assignee: String,
}

impl Report {
    pub fn applies_to(&self, account_id: &str) -> bool {
        self.accounts.is_empty() || self.accounts.iter().any(|a| a == account_id)
    }

    /// "All accounts" or the comma-separated account list
    pub fn account_scope(&self) -> String {
        if self.accounts.is_empty() {
            "All accounts".to_string()
        } else {
            self.accounts.join(", ")
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_risk_level_parse() {
        assert_eq!(RiskLevel::parse("high"), Some(RiskLevel::High));
        assert_eq!(RiskLevel::parse(" Medium "), Some(RiskLevel::Medium));
        assert_eq!(RiskLevel::parse("LOW"), Some(RiskLevel::Low));
        assert_eq!(RiskLevel::parse("critical"), None);
        assert_eq!(RiskLevel::parse(""), None);
    }

    #[test]
    fn test_risk_filter_unknown_means_all() {
        assert_eq!(RiskFilter::parse("high"), RiskFilter::High);
        assert_eq!(RiskFilter::parse("all"), RiskFilter::All);
        assert_eq!(RiskFilter::parse("severe"), RiskFilter::All);
    }

    #[test]
    fn test_risk_filter_event_matching() {
        assert!(RiskFilter::All.matches_event(EventRisk::None));
        assert!(RiskFilter::High.matches_event(EventRisk::High));
        assert!(!RiskFilter::High.matches_event(EventRisk::Medium));
        assert!(!RiskFilter::Low.matches_event(EventRisk::None));
    }

    #[test]
    fn test_risk_filter_cycle_returns_to_all() {
        let mut filter = RiskFilter::All;
        for _ in 0..4 {
            filter = filter.next();
        }
        assert_eq!(filter, RiskFilter::All);
    }

    #[test]
    fn test_graph_node_unknown_risk_is_none() {
        let node: GraphNode = serde_json::from_str(
            r#"{"id":"X","x":1,"y":2,"risk":"critical","label":"X"}"#,
        )
        .unwrap();
        assert_eq!(node.risk, None);
        assert_eq!(node.position(), Point::new(1.0, 2.0));

        let node: GraphNode =
            serde_json::from_str(r#"{"id":"Y","x":0,"y":0,"risk":"high","label":"Y"}"#).unwrap();
        assert_eq!(node.risk, Some(RiskLevel::High));
    }

    #[test]
    fn test_timeline_event_wire_names() {
        let event: TimelineEvent = serde_json::from_str(
            r#"{"id":"E1","time":"14:31:45","timestamp":2,"type":"transaction",
                "from":"ACC-1","to":"ACC-2","amount":4999,"description":"t","risk":"medium"}"#,
        )
        .unwrap();
        assert_eq!(event.event_type, EventType::Transaction);
        assert_eq!(event.risk, EventRisk::Medium);
        assert_eq!(event.transfer(), Some(("ACC-1", "ACC-2")));

        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "transaction");
    }

    #[test]
    fn test_system_event_has_no_transfer() {
        let event: TimelineEvent = serde_json::from_str(
            r#"{"id":"E1","time":"14:30:00","timestamp":1,"type":"system",
                "description":"Monitoring window started","risk":"none"}"#,
        )
        .unwrap();
        assert_eq!(event.transfer(), None);
        assert_eq!(event.risk.level(), None);
    }

    #[test]
    fn test_report_scope() {
        let report: Report = serde_json::from_str(
            r#"{"id":"RPT-003","title":"Weekly Summary","type":"summary","status":"approved",
                "createdAt":"2024-01-13","updatedAt":"1 day ago","accounts":[],
                "riskLevel":"medium","assignee":"System"}"#,
        )
        .unwrap();
        assert!(report.applies_to("ACC-0000"));
        assert_eq!(report.account_scope(), "All accounts");
        assert_eq!(report.created_at, NaiveDate::from_ymd_opt(2024, 1, 13).unwrap());
        assert!(!report.status.is_open());

        let scoped = Report {
            accounts: vec!["ACC-7821".to_string(), "ACC-3456".to_string()],
            ..report
        };
        assert!(scoped.applies_to("ACC-3456"));
        assert!(!scoped.applies_to("ACC-9012"));
        assert_eq!(scoped.account_scope(), "ACC-7821, ACC-3456");
    }

    #[test]
    fn test_report_labels() {
        assert_eq!(ReportType::Str.label(), "STR");
        assert_eq!(ReportStatus::Pending.label(), "Pending Review");
        assert_eq!(ReportType::parse("STR"), Some(ReportType::Str));
        assert_eq!(ReportType::parse("memo"), None);
    }

    #[test]
    fn test_account_net_flow() {
        let json = r#"{
            "id": "ACC-1", "riskScore": 0.5, "riskLevel": "medium",
            "totalSent": 12000, "totalReceived": 4500, "transactionCount": 3,
            "patterns": [], "connections": 2, "lastActivity": "1 hour ago", "status": "monitoring"
        }"#;
        let account: Account = serde_json::from_str(json).unwrap();
        assert_eq!(account.net_flow(), -7500.0);
        assert!(!account.has_patterns());
    }

    #[test]
    fn test_point_midpoint() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(10.0, 4.0);
        assert_eq!(a.midpoint(&b), Point::new(5.0, 2.0));
    }
}
