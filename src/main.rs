use analytics::{AnalyticsEngine, PerformanceReport};
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use configuration::settings::Config;
use configuration::{LogLevel, init_tracing, load_config};
use core_types::{AccountSnapshot, TradeRecord};
use ledger::{AccountRegistry, Ledger, LedgerError, PortfolioStats, SellBreakdown, pnl_breakdown};
use render::Rejection;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::HashMap;
use std::path::PathBuf;

mod input;
mod render;

/// The main entry point for the Papertrail ledger and analytics tool.
fn main() -> Result<()> {
    // .env is optional; it only feeds PAPERTRAIL__* overrides.
    let dotenv = dotenvy::dotenv();

    let cli = Cli::parse();

    let mut config = load_config(cli.config.as_deref()).context("Failed to load configuration")?;
    if let Some(level) = cli.log_level {
        config.logging.level = level;
    }
    let _log_guard = init_tracing(&config.logging).context("Failed to initialize logging")?;
    if let Ok(path) = dotenv {
        tracing::debug!(path = %path.display(), "Loaded environment file");
    }

    match cli.command {
        Commands::Execute(args) => handle_execute(args, &config),
        Commands::Analyze(args) => handle_analyze(args, &config),
        Commands::Replay(args) => handle_replay(args, &config),
    }
}

// ==============================================================================
// CLI Structure
// ==============================================================================

/// A paper-trading ledger with performance analytics.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Configuration file. Defaults to ./config.toml when present.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Overrides [logging].level. RUST_LOG still takes precedence.
    #[arg(long, global = true, value_enum)]
    log_level: Option<LogLevel>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Execute an orders file against a fresh paper account and analyze the result.
    Execute(ExecuteArgs),
    /// Validate an existing trade log and print its performance report.
    Analyze(AnalyzeArgs),
    /// Rebuild an account from a trade log and verify its realized P&L.
    Replay(ReplayArgs),
}

#[derive(Parser)]
struct ExecuteArgs {
    /// JSON array of orders: symbol, side, quantity, price, optional commission and executed_at.
    #[arg(long)]
    orders: PathBuf,

    /// JSON object of mark prices by symbol, used to value open positions.
    #[arg(long)]
    marks: Option<PathBuf>,

    /// Print JSON instead of tables.
    #[arg(long)]
    json: bool,
}

#[derive(Parser)]
struct AnalyzeArgs {
    /// JSON array of trade records.
    #[arg(long)]
    trades: PathBuf,

    /// Account snapshot used to size capital exposure. When omitted the
    /// account is reconstructed by replaying the log from the configured cash.
    #[arg(long)]
    snapshot: Option<PathBuf>,

    #[arg(long)]
    json: bool,
}

#[derive(Parser)]
struct ReplayArgs {
    #[arg(long)]
    trades: PathBuf,

    /// Starting cash. Defaults to [account].initial_cash.
    #[arg(long)]
    initial_cash: Option<Decimal>,

    #[arg(long)]
    json: bool,
}

// ==============================================================================
// Command Logic
// ==============================================================================

#[derive(Serialize)]
struct ExecuteOutput<'a> {
    account: &'a AccountSnapshot,
    stats: &'a PortfolioStats,
    rejected: &'a [Rejection],
    trades: &'a [TradeRecord],
    pnl_breakdown: &'a [SellBreakdown],
    report: &'a PerformanceReport,
}

#[derive(Serialize)]
struct ReplayOutput<'a> {
    account: &'a AccountSnapshot,
    stats: &'a PortfolioStats,
    pnl_breakdown: &'a [SellBreakdown],
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value).context("Failed to serialize output")?);
    Ok(())
}

fn handle_execute(args: ExecuteArgs, config: &Config) -> Result<()> {
    let orders = input::read_orders(&args.orders)?;
    let marks = match &args.marks {
        Some(path) => input::read_marks(path)?,
        None => HashMap::new(),
    };

    let mut registry = AccountRegistry::new();
    let ledger = registry.open(&config.account);
    tracing::info!(
        account = %ledger.account_id(),
        orders = orders.len(),
        lot_matching = ?config.account.lot_matching,
        "Executing orders"
    );

    let mut rejected = Vec::new();
    for (index, order) in orders.iter().enumerate() {
        let request = order.request();
        let result = match order.executed_at {
            Some(at) => ledger.execute_at(&request, at),
            None => ledger.execute(&request),
        };
        match result {
            Ok(_) => {}
            Err(e @ LedgerError::LockPoisoned(_)) => return Err(e.into()),
            Err(e) => rejected.push(Rejection {
                index,
                symbol: order.symbol.clone(),
                side: order.side.to_string(),
                reason: e.to_string(),
            }),
        }
    }

    let trades = ledger.trades()?;
    let snapshot = ledger.snapshot(&marks)?;
    let (stats, breakdown) = ledger.with(|l| (l.stats(), l.pnl_breakdown()))?;
    let report = AnalyticsEngine::new(config.analytics.clone()).calculate(&trades, &snapshot);

    if args.json {
        return print_json(&ExecuteOutput {
            account: &snapshot,
            stats: &stats,
            rejected: &rejected,
            trades: &trades,
            pnl_breakdown: &breakdown,
            report: &report,
        });
    }

    render::print_account(&snapshot, &stats);
    render::print_rejections(&rejected);
    render::print_breakdown(&breakdown);
    render::print_report(&report);
    Ok(())
}

fn handle_analyze(args: AnalyzeArgs, config: &Config) -> Result<()> {
    let trades = input::read_trades(&args.trades)?;
    let snapshot = match &args.snapshot {
        Some(path) => input::read_snapshot(path)?,
        None => reconstruct_snapshot(&trades, config),
    };

    let report = AnalyticsEngine::new(config.analytics.clone()).calculate(&trades, &snapshot);
    if args.json {
        return print_json(&report);
    }

    render::print_breakdown(&pnl_breakdown(&trades));
    render::print_report(&report);
    Ok(())
}

/// Best-effort account for a log that came without one. A log that does not
/// replay from the configured cash is sized against that cash alone.
fn reconstruct_snapshot(trades: &[TradeRecord], config: &Config) -> AccountSnapshot {
    let account = &config.account;
    match Ledger::replay(account.account_id.clone(), account.initial_cash, account.lot_matching, trades) {
        Ok(ledger) => ledger.snapshot(&HashMap::new()),
        Err(e) => {
            tracing::warn!(error = %e, "Trade log does not replay from the configured cash; using cash only");
            AccountSnapshot {
                account_id: account.account_id.clone(),
                cash: account.initial_cash,
                positions: Default::default(),
            }
        }
    }
}

fn handle_replay(args: ReplayArgs, config: &Config) -> Result<()> {
    let trades = input::read_trades(&args.trades)?;
    let initial_cash = args.initial_cash.unwrap_or(config.account.initial_cash);

    let account_id = trades
        .first()
        .map(|t| t.account_id.clone())
        .unwrap_or_else(|| config.account.account_id.clone());
    let ledger = Ledger::replay(account_id, initial_cash, config.account.lot_matching, &trades)
        .context("Trade log does not replay")?;

    let snapshot = ledger.snapshot(&HashMap::new());
    let stats = ledger.stats();
    let breakdown = ledger.pnl_breakdown();
    tracing::info!(trades = trades.len(), cash = %stats.cash, "Replay verified");

    if args.json {
        return print_json(&ReplayOutput {
            account: &snapshot,
            stats: &stats,
            pnl_breakdown: &breakdown,
        });
    }

    render::print_account(&snapshot, &stats);
    render::print_breakdown(&breakdown);
    Ok(())
}
