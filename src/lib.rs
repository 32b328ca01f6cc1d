// Fraud Investigation Dashboard - Core Library
// Exposes all modules for use in the terminal UI, API server, and tests

pub mod models;     // Entities: accounts, graph, timeline, reports
pub mod format;     // Amount / score formatting
pub mod config;     // Config file + environment overrides, tracing setup
pub mod data;       // DataSource boundary and snapshots
pub mod timeline;   // Playback + risk filter state machine
pub mod graph;      // Graph layout projection and node lookups
pub mod accounts;   // Accounts table query
pub mod reports;    // Reports list query
pub mod dashboard;  // Overview metrics

// Re-export commonly used types
pub use models::{
    Account, AccountStatus, EventRisk, EventType, GraphEdge, GraphNode, Point,
    Report, ReportStatus, ReportType, RiskFilter, RiskLevel, TimelineEvent,
};
pub use format::{format_amount, format_inr, format_score, truncate};
pub use config::{init_tracing, Config};
pub use data::{open_source, DataSource, SampleData, Snapshot, SnapshotFile};
pub use timeline::{TimelineController, TimelineSummary, VisibleEvent};
pub use graph::{
    color_for, index_nodes, node_degree, resolve_edge,
    Degree, EdgeGeometry, FlowStats, GraphLayoutProjector, GraphScene, Hsl,
    NodeDetail, NodeGlyph, NodeIndex, NodeLookup,
};
pub use accounts::{top_risk, AccountQuery, SortDirection, SortKey};
pub use reports::{latest_created, DateRange, ReportQuery, TypeFilter};
pub use dashboard::{recent_alerts, DashboardMetrics};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
