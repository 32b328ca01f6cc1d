// Only compile UI module when TUI feature is enabled
#[cfg(feature = "tui")]
mod ui;

use anyhow::{Context, Result};
use std::env;
use std::path::Path;

// Use library instead of local modules
use fraud_investigation::{
    format_inr, init_tracing, open_source, Config, DashboardMetrics, SampleData, Snapshot,
};

fn main() -> Result<()> {
    let args: Vec<String> = env::args().collect();
    let config = Config::load()?;
    init_tracing(&config.log_level);

    match args.get(1).map(String::as_str) {
        Some("summary") => run_summary(&config)?,
        Some("export-sample") => {
            let path = args
                .get(2)
                .context("Usage: fraud-investigation export-sample <path>")?;
            run_export_sample(Path::new(path))?;
        }
        // UI mode (default)
        _ => run_ui_mode(&config)?,
    }

    Ok(())
}

fn load_snapshot(config: &Config) -> Result<Snapshot> {
    let source = open_source(config)?;
    Snapshot::load(source.as_ref())
}

fn run_summary(config: &Config) -> Result<()> {
    println!("🔎 Fraud Investigation Dashboard - Summary");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    let snapshot = load_snapshot(config)?;
    let metrics = DashboardMetrics::from_snapshot(&snapshot);

    println!("\n📊 Total transactions:  {}", metrics.total_transactions);
    println!("🚨 High risk accounts:  {} of {}", metrics.high_risk_accounts, metrics.total_accounts);
    println!("🧩 Active patterns:     {}", metrics.active_patterns.join(", "));
    println!("🕸️  Graph:               {} nodes, {} edges", metrics.graph_nodes, metrics.graph_edges);
    println!("📄 Open reports:        {}", metrics.open_reports);

    if let Some(top) = fraud_investigation::top_risk(&snapshot.accounts, 1).first() {
        println!(
            "\n⚠️  Highest risk: {} (score {:.2}, sent {})",
            top.id,
            top.risk_score,
            format_inr(top.total_sent)
        );
    }

    Ok(())
}

fn run_export_sample(path: &Path) -> Result<()> {
    let snapshot = SampleData::snapshot()?;
    snapshot.write_to(path)?;
    println!("✓ Sample snapshot written to {}", path.display());
    println!("   Load it with: FRAUD_SNAPSHOT={} fraud-investigation", path.display());
    Ok(())
}

#[cfg(feature = "tui")]
fn run_ui_mode(config: &Config) -> Result<()> {
    println!("🖥️  Loading Fraud Investigation Dashboard...\n");

    let snapshot = load_snapshot(config)?;
    println!(
        "✓ Loaded {} accounts, {} graph nodes, {} timeline events\n",
        snapshot.accounts.len(),
        snapshot.nodes.len(),
        snapshot.timeline.len()
    );
    println!("Starting UI... (Press 'q' to quit)\n");

    let mut app = ui::App::new(snapshot, config.reference_date);
    ui::run_ui(&mut app, config.tick_rate())?;

    println!("\n✅ UI closed successfully");

    Ok(())
}

#[cfg(not(feature = "tui"))]
fn run_ui_mode(_config: &Config) -> Result<()> {
    eprintln!("❌ TUI mode not available!");
    eprintln!("   Rebuild with: cargo build --features tui");
    eprintln!("   Or use the JSON API: cargo run --bin fraud-server --features server");
    std::process::exit(1);
}
