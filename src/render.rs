use analytics::{BucketMap, ExpectancyBucket, OutcomeBucket, PerformanceReport};
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, ContentArrangement, Table};
use core_types::AccountSnapshot;
use ledger::{PortfolioStats, SellBreakdown};
use rust_decimal::Decimal;
use serde::Serialize;
use std::fmt::Display;

/// An order the ledger refused, as reported back to the user.
#[derive(Debug, Clone, Serialize)]
pub struct Rejection {
    pub index: usize,
    pub symbol: String,
    pub side: String,
    pub reason: String,
}

fn table(header: Vec<&str>) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header);
    table
}

fn money(value: Decimal) -> String {
    value.round_dp(2).to_string()
}

fn pct(value: Decimal) -> String {
    format!("{}%", value.round_dp(2))
}

/// Renders a 0..=1 fraction as a percentage.
fn rate(value: Decimal) -> String {
    pct(value * Decimal::ONE_HUNDRED)
}

fn section(title: &str, table: &Table) {
    println!("\n{}\n{}", title, table);
}

pub fn print_account(snapshot: &AccountSnapshot, stats: &PortfolioStats) {
    let mut summary = table(vec!["Account", "Cash", "Initial cash", "Realized P&L", "Trades", "Open positions", "Total capital"]);
    summary.add_row(vec![
        Cell::new(&snapshot.account_id),
        Cell::new(money(stats.cash)),
        Cell::new(money(stats.initial_cash)),
        Cell::new(money(stats.total_realized_pnl)),
        Cell::new(stats.trade_count),
        Cell::new(stats.open_positions),
        Cell::new(money(snapshot.total_capital())),
    ]);
    section("ACCOUNT", &summary);

    if snapshot.positions.is_empty() {
        return;
    }
    let mut positions = table(vec!["Symbol", "Quantity", "Avg price", "Market value"]);
    for (symbol, position) in &snapshot.positions {
        positions.add_row(vec![
            Cell::new(symbol),
            Cell::new(position.quantity),
            Cell::new(money(position.avg_price)),
            Cell::new(money(position.market_value)),
        ]);
    }
    section("POSITIONS", &positions);
}

pub fn print_rejections(rejections: &[Rejection]) {
    if rejections.is_empty() {
        return;
    }
    let mut rejected = table(vec!["#", "Symbol", "Side", "Reason"]);
    for rejection in rejections {
        rejected.add_row(vec![
            Cell::new(rejection.index),
            Cell::new(&rejection.symbol),
            Cell::new(&rejection.side),
            Cell::new(&rejection.reason),
        ]);
    }
    section("REJECTED ORDERS", &rejected);
}

pub fn print_breakdown(breakdown: &[SellBreakdown]) {
    if breakdown.is_empty() {
        return;
    }
    let mut sells = table(vec![
        "Sell", "Symbol", "Date", "Qty", "Price", "Avg-cost P&L", "FIFO P&L", "Commissions", "Matched buys",
    ]);
    for sell in breakdown {
        let matched = sell
            .matched_buys
            .iter()
            .map(|b| format!("{} x{} @ {}", b.buy_date, b.attributed_quantity, money(b.buy_price)))
            .collect::<Vec<_>>()
            .join("\n");
        sells.add_row(vec![
            Cell::new(sell.sell_trade_id),
            Cell::new(&sell.symbol),
            Cell::new(sell.sell_date),
            Cell::new(sell.sell_quantity),
            Cell::new(money(sell.sell_price)),
            Cell::new(money(sell.realized_pnl)),
            Cell::new(money(sell.fifo_realized_pnl)),
            Cell::new(money(sell.commission_total)),
            Cell::new(matched),
        ]);
    }
    section("REALIZED P&L BREAKDOWN", &sells);
}

pub fn print_report(report: &PerformanceReport) {
    let s = &report.summary;
    let mut headline = table(vec!["Metric", "Value"]);
    let rows: Vec<(&str, String)> = vec![
        ("Total trades", s.total_trades.to_string()),
        ("Closed / open", format!("{} / {}", s.closed_trades, s.open_trades)),
        ("Win rate", rate(s.win_rate)),
        ("Profit factor", money(s.profit_factor)),
        ("Total P&L", money(s.total_pnl)),
        ("Average win / loss", format!("{} / {}", money(s.average_win), money(s.average_loss))),
        ("Sharpe (annualized)", money(report.sharpe_ratio)),
        ("Max drawdown", format!("{} ({})", money(report.drawdown.max_drawdown_amount), pct(report.drawdown.max_drawdown_pct))),
        ("Max drawdown duration", report.drawdown.max_drawdown_duration.to_string()),
        ("Peak / final equity", format!("{} / {}", money(report.drawdown.peak_equity), money(report.drawdown.final_equity))),
        ("Rolling PF / Sharpe", format!("{} / {} ({:?})", money(report.rolling.current_profit_factor), money(report.rolling.current_sharpe), report.rolling.trend)),
        ("Average R (min / max)", format!("{} ({} / {})", money(report.r_multiples.average_r), money(report.r_multiples.min_r), money(report.r_multiples.max_r))),
        ("Avg MAE / MFE (est.)", format!("{} / {}", money(report.r_multiples.mae_mfe.avg_mae), money(report.r_multiples.mae_mfe.avg_mfe))),
        ("Top 10% / 20% of P&L", format!("{} / {} ({:?})", pct(report.pareto.top_10_pct), pct(report.pareto.top_20_pct), report.pareto.concentration_risk)),
        ("Exposure avg / max", format!("{} / {}", pct(report.capital_exposure.average_exposure_pct), pct(report.capital_exposure.max_exposure_pct))),
    ];
    for (metric, value) in rows {
        headline.add_row(vec![metric.to_string(), value]);
    }
    section("PERFORMANCE", &headline);

    if !report.symbols.is_empty() {
        let mut symbols = table(vec!["Symbol", "Trades", "P&L", "Volume", "Win rate", "Expectancy"]);
        for (symbol, perf) in report.symbols.iter() {
            symbols.add_row(vec![
                Cell::new(symbol),
                Cell::new(perf.trade_count),
                Cell::new(money(perf.total_pnl)),
                Cell::new(money(perf.total_volume)),
                Cell::new(rate(perf.win_rate)),
                Cell::new(money(perf.expectancy_per_trade)),
            ]);
        }
        section("BY SYMBOL", &symbols);
    }

    if !report.holding_periods.buckets.is_empty() || report.holding_periods.unavailable > 0 {
        let mut holding = table(vec!["Holding period", "Trades", "Win rate", "Avg P&L", "Best", "Worst"]);
        for (period, bucket) in report.holding_periods.buckets.iter() {
            holding.add_row(vec![
                Cell::new(format!("{:?}", period)),
                Cell::new(bucket.trade_count),
                Cell::new(rate(bucket.win_rate)),
                Cell::new(money(bucket.average_pnl)),
                Cell::new(money(bucket.best_pnl)),
                Cell::new(money(bucket.worst_pnl)),
            ]);
        }
        if report.holding_periods.unavailable > 0 {
            holding.add_row(vec![
                Cell::new("Unavailable"),
                Cell::new(report.holding_periods.unavailable),
            ]);
        }
        section("HOLDING PERIODS", &holding);
    }

    for (name, patterns) in [("EQUITIES", &report.time_patterns.equities), ("CRYPTO", &report.time_patterns.crypto)] {
        if patterns.trade_count == 0 {
            continue;
        }
        print_outcomes(&format!("{} BY HOUR", name), &patterns.by_hour);
        print_outcomes(&format!("{} BY DAY", name), &patterns.by_day);
    }

    print_expectancy("EXPECTANCY BY SYMBOL", &report.expectancy.by_symbol);
    print_expectancy("EXPECTANCY BY WEEKDAY", &report.expectancy.by_weekday);
}

fn print_outcomes<K: Ord + Display>(title: &str, buckets: &BucketMap<K, OutcomeBucket>) {
    if buckets.is_empty() {
        return;
    }
    let mut outcomes = table(vec!["Bucket", "Trades", "P&L", "Win rate"]);
    for (key, bucket) in buckets.iter() {
        outcomes.add_row(vec![
            Cell::new(key),
            Cell::new(bucket.trade_count),
            Cell::new(money(bucket.total_pnl)),
            Cell::new(rate(bucket.win_rate)),
        ]);
    }
    section(title, &outcomes);
}

fn print_expectancy<K: Ord + Display>(title: &str, buckets: &BucketMap<K, ExpectancyBucket>) {
    if buckets.is_empty() {
        return;
    }
    let mut expectancy = table(vec!["Bucket", "Trades", "$ / trade", "Win rate", "Avg win", "Avg loss", "R"]);
    for (key, bucket) in buckets.iter() {
        expectancy.add_row(vec![
            Cell::new(key),
            Cell::new(bucket.trade_count),
            Cell::new(money(bucket.avg_dollar_per_trade)),
            Cell::new(rate(bucket.win_rate)),
            Cell::new(money(bucket.average_win)),
            Cell::new(money(bucket.average_loss)),
            Cell::new(bucket.r_expectancy.round_dp(2)),
        ]);
    }
    section(title, &expectancy);
}
