// 📦 Data Access - the boundary the views consume
//
// Views never own data loading. They receive a Snapshot built from some
// DataSource: the built-in sample set, or a JSON snapshot file.

use crate::config::Config;
use crate::models::{Account, GraphEdge, GraphNode, Report, TimelineEvent};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

const SAMPLE_SNAPSHOT: &str = include_str!("../data/sample_snapshot.json");

// ============================================================================
// DATA SOURCE
// ============================================================================

/// Supplies fully-formed, already-validated snapshots
pub trait DataSource {
    /// Accounts, risk-ranked
    fn load_accounts(&self) -> Result<Vec<Account>>;

    fn load_graph(&self) -> Result<(Vec<GraphNode>, Vec<GraphEdge>)>;

    /// Events in chronological order (matching their ordinal timestamps)
    fn load_timeline(&self) -> Result<Vec<TimelineEvent>>;

    fn load_reports(&self) -> Result<Vec<Report>>;
}

// ============================================================================
// SNAPSHOT
// ============================================================================

/// Everything the dashboard renders, loaded once
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub accounts: Vec<Account>,
    #[serde(default)]
    pub nodes: Vec<GraphNode>,
    #[serde(default)]
    pub edges: Vec<GraphEdge>,
    #[serde(default)]
    pub timeline: Vec<TimelineEvent>,
    #[serde(default)]
    pub reports: Vec<Report>,
}

impl Snapshot {
    pub fn load(source: &dyn DataSource) -> Result<Self> {
        let accounts = source.load_accounts().context("Failed to load accounts")?;
        let (nodes, edges) = source.load_graph().context("Failed to load graph")?;
        let timeline = source.load_timeline().context("Failed to load timeline")?;
        let reports = source.load_reports().context("Failed to load reports")?;

        info!(
            accounts = accounts.len(),
            nodes = nodes.len(),
            edges = edges.len(),
            events = timeline.len(),
            reports = reports.len(),
            "snapshot loaded"
        );

        Ok(Snapshot {
            accounts,
            nodes,
            edges,
            timeline,
            reports,
        })
    }

    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("Failed to parse snapshot JSON")
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("Failed to serialize snapshot")
    }

    pub fn write_to<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let json = self.to_json_pretty()?;
        fs::write(path.as_ref(), json)
            .with_context(|| format!("Failed to write snapshot: {:?}", path.as_ref()))
    }

    pub fn account(&self, id: &str) -> Option<&Account> {
        self.accounts.iter().find(|a| a.id == id)
    }
}

// ============================================================================
// SAMPLE DATA
// ============================================================================

/// The demonstration data set the dashboard ships with
#[derive(Debug, Clone, Copy, Default)]
pub struct SampleData;

impl SampleData {
    pub fn snapshot() -> Result<Snapshot> {
        Snapshot::from_json(SAMPLE_SNAPSHOT).context("Built-in sample snapshot is malformed")
    }
}

impl DataSource for SampleData {
    fn load_accounts(&self) -> Result<Vec<Account>> {
        Ok(SampleData::snapshot()?.accounts)
    }

    fn load_graph(&self) -> Result<(Vec<GraphNode>, Vec<GraphEdge>)> {
        let snapshot = SampleData::snapshot()?;
        Ok((snapshot.nodes, snapshot.edges))
    }

    fn load_timeline(&self) -> Result<Vec<TimelineEvent>> {
        Ok(SampleData::snapshot()?.timeline)
    }

    fn load_reports(&self) -> Result<Vec<Report>> {
        Ok(SampleData::snapshot()?.reports)
    }
}

// ============================================================================
// SNAPSHOT FILE
// ============================================================================

/// A JSON snapshot on disk, read once at construction
#[derive(Debug, Clone)]
pub struct SnapshotFile {
    path: PathBuf,
    snapshot: Snapshot,
}

impl SnapshotFile {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read snapshot file: {:?}", path.as_ref()))?;
        let snapshot = Snapshot::from_json(&content)
            .with_context(|| format!("Invalid snapshot file: {:?}", path.as_ref()))?;

        Ok(SnapshotFile {
            path: path.as_ref().to_path_buf(),
            snapshot,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl DataSource for SnapshotFile {
    fn load_accounts(&self) -> Result<Vec<Account>> {
        Ok(self.snapshot.accounts.clone())
    }

    fn load_graph(&self) -> Result<(Vec<GraphNode>, Vec<GraphEdge>)> {
        Ok((self.snapshot.nodes.clone(), self.snapshot.edges.clone()))
    }

    fn load_timeline(&self) -> Result<Vec<TimelineEvent>> {
        Ok(self.snapshot.timeline.clone())
    }

    fn load_reports(&self) -> Result<Vec<Report>> {
        Ok(self.snapshot.reports.clone())
    }
}

/// Pick the data source named by the configuration
pub fn open_source(config: &Config) -> Result<Box<dyn DataSource>> {
    match &config.snapshot_path {
        Some(path) => {
            info!(path = %path.display(), "using snapshot file");
            Ok(Box::new(SnapshotFile::open(path)?))
        }
        None => {
            info!("using built-in sample data");
            Ok(Box::new(SampleData))
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{EventType, RiskLevel};

    #[test]
    fn test_sample_snapshot_parses() {
        let snapshot = Snapshot::load(&SampleData).unwrap();

        assert_eq!(snapshot.accounts.len(), 6);
        assert_eq!(snapshot.nodes.len(), 8);
        assert_eq!(snapshot.edges.len(), 8);
        assert_eq!(snapshot.timeline.len(), 10);
        assert_eq!(snapshot.reports.len(), 4);

        assert_eq!(snapshot.accounts[0].id, "ACC-7821");
        assert_eq!(snapshot.accounts[0].risk_level, RiskLevel::High);
        assert_eq!(snapshot.timeline[4].event_type, EventType::Pattern);
    }

    #[test]
    fn test_sample_timeline_is_ordered() {
        let snapshot = SampleData::snapshot().unwrap();
        let ordinals: Vec<u32> = snapshot.timeline.iter().map(|e| e.timestamp).collect();
        let expected: Vec<u32> = (1..=10).collect();
        assert_eq!(ordinals, expected);
    }

    #[test]
    fn test_account_lookup() {
        let snapshot = SampleData::snapshot().unwrap();
        assert_eq!(snapshot.account("ACC-9012").map(|a| a.connections), Some(5));
        assert!(snapshot.account("ACC-0000").is_none());
    }

    #[test]
    fn test_snapshot_file_round_trip_through_disk() {
        let path = std::env::temp_dir().join(format!("fraud-snapshot-{}.json", std::process::id()));
        let original = SampleData::snapshot().unwrap();
        original.write_to(&path).unwrap();

        let file = SnapshotFile::open(&path).unwrap();
        assert_eq!(file.path(), path.as_path());
        let loaded = Snapshot::load(&file).unwrap();
        assert_eq!(loaded, original);

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_missing_snapshot_file() {
        let err = SnapshotFile::open("/nonexistent/snapshot.json").unwrap_err();
        assert!(format!("{:#}", err).contains("Failed to read snapshot file"));
    }

    #[test]
    fn test_partial_snapshot_defaults_to_empty_lists() {
        let snapshot = Snapshot::from_json(r#"{"nodes": []}"#).unwrap();
        assert!(snapshot.accounts.is_empty());
        assert!(snapshot.timeline.is_empty());
    }

    #[test]
    fn test_open_source_defaults_to_sample() {
        let source = open_source(&Config::default()).unwrap();
        assert_eq!(source.load_reports().unwrap().len(), 4);
    }
}
