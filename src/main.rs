use anyhow::Context;
use chrono::Utc;
use clap::{Parser, Subcommand};
use comfy_table::Table;
use database::connection::connect;
use database::repository::EntityRepository;
use kpi_engine::{KpiEngine, KpiSnapshot};
use std::net::SocketAddr;
use tracing_subscriber::EnvFilter;

/// The main entry point for the Vantage back-office application.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from a .env file when present.
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Serve(args) => handle_serve(args).await,
        Commands::Snapshot(args) => handle_snapshot(args).await,
    }
}

// ==============================================================================
// CLI Structure
// ==============================================================================

/// Financial KPI aggregation service for the investment back-office.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the KPI web server.
    Serve(ServeArgs),
    /// Compute one KPI snapshot and print it to the console.
    Snapshot(SnapshotArgs),
}

#[derive(Parser)]
struct ServeArgs {
    /// Socket address to bind; defaults to the configured listen address.
    #[arg(long)]
    addr: Option<SocketAddr>,
}

#[derive(Parser)]
struct SnapshotArgs {
    /// Emit the full snapshot as pretty-printed JSON instead of a table.
    #[arg(long)]
    json: bool,
}

// ==============================================================================
// Command Logic
// ==============================================================================

async fn handle_serve(args: ServeArgs) -> anyhow::Result<()> {
    let addr = match args.addr {
        Some(addr) => addr,
        None => {
            let config = configuration::load_config()?;
            config
                .server
                .listen_addr
                .parse()
                .context("Invalid listen_addr in configuration")?
        }
    };
    web_server::run_server(addr).await
}

/// Fetches the entity collections once, computes the snapshot, and renders it.
async fn handle_snapshot(args: SnapshotArgs) -> anyhow::Result<()> {
    let config = configuration::load_config()?;
    let db_pool = connect().await?;
    let repo = EntityRepository::new(db_pool);
    let engine = KpiEngine::new(config.assumptions);

    let data = repo.fetch_snapshot().await?;
    let snapshot = engine.compute(&data, Utc::now())?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
    } else {
        println!("{}", render_summary(&snapshot));
    }

    Ok(())
}

/// Renders the headline KPIs as a console table.
fn render_summary(snapshot: &KpiSnapshot) -> Table {
    let mut table = Table::new();
    table.set_header(vec!["KPI", "Value"]);

    table.add_row(vec![
        "Total AUM".to_string(),
        snapshot.financial.total_aum.round_dp(2).to_string(),
    ]);
    table.add_row(vec![
        "New capital (month)".to_string(),
        snapshot.financial.new_capital_month.round_dp(2).to_string(),
    ]);
    table.add_row(vec![
        "Withdrawn capital (month)".to_string(),
        snapshot
            .financial
            .withdrawn_capital_month
            .round_dp(2)
            .to_string(),
    ]);
    table.add_row(vec![
        "Monthly growth %".to_string(),
        snapshot.financial.monthly_growth_ratio.round_dp(2).to_string(),
    ]);
    table.add_row(vec![
        "Avg portfolio return %".to_string(),
        snapshot
            .financial
            .average_portfolio_return
            .round_dp(2)
            .to_string(),
    ]);
    table.add_row(vec![
        "Liquidity 30/60/90d".to_string(),
        format!(
            "{} / {} / {}",
            snapshot.financial.liquidity_30_days.round_dp(2),
            snapshot.financial.liquidity_60_days.round_dp(2),
            snapshot.financial.liquidity_90_days.round_dp(2),
        ),
    ]);
    table.add_row(vec![
        "Active clients".to_string(),
        snapshot.clients.active_clients.to_string(),
    ]);
    table.add_row(vec![
        "Avg ticket per client".to_string(),
        snapshot
            .clients
            .average_ticket_per_client
            .round_dp(2)
            .to_string(),
    ]);
    table.add_row(vec![
        "Pending KYC".to_string(),
        format!(
            "{} ({}%)",
            snapshot.clients.pending_kyc,
            snapshot.clients.pending_kyc_percentage.round_dp(1)
        ),
    ]);
    table.add_row(vec![
        "Renewal rate %".to_string(),
        snapshot.clients.renewal_rate.round_dp(1).to_string(),
    ]);
    table.add_row(vec![
        "Revenue YTD".to_string(),
        snapshot.strategic.total_revenue_ytd.round_dp(2).to_string(),
    ]);
    table.add_row(vec![
        "Business health".to_string(),
        format!(
            "{} ({}%)",
            snapshot.business_health.status, snapshot.business_health.percentage
        ),
    ]);

    table
}
