use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use core_types::{OrderSide, TradeRecord};
use rust_decimal::Decimal;
use uuid::Uuid;

pub(crate) fn trade(
    symbol: &str,
    side: OrderSide,
    quantity: Decimal,
    price: Decimal,
    realized_pnl: Decimal,
    date: &str,
    time: &str,
) -> TradeRecord {
    let gross_value = quantity * price;
    TradeRecord {
        trade_id: Uuid::new_v4(),
        account_id: "test".to_string(),
        symbol: symbol.to_string(),
        side,
        quantity,
        price,
        commission: Decimal::ZERO,
        trade_date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
        trade_time: NaiveTime::parse_from_str(time, "%H:%M:%S").unwrap(),
        gross_value,
        net_value: gross_value,
        realized_pnl,
        matched_trade_ids: Vec::new(),
        opened_at: None,
    }
}

/// A one-share sell at 100 that realized `pnl`.
pub(crate) fn closed_trade(symbol: &str, pnl: Decimal, date: &str, time: &str) -> TradeRecord {
    trade(symbol, OrderSide::Sell, Decimal::ONE, Decimal::ONE_HUNDRED, pnl, date, time)
}

/// Closed trades one minute apart on Tuesday 2024-01-02, in the given order.
pub(crate) fn closed_series(symbol: &str, pnls: &[Decimal]) -> Vec<TradeRecord> {
    pnls.iter()
        .enumerate()
        .map(|(i, pnl)| {
            let time = format!("{:02}:{:02}:00", 10 + i / 60, i % 60);
            closed_trade(symbol, *pnl, "2024-01-02", &time)
        })
        .collect()
}

pub(crate) fn opened(trade: TradeRecord, at: &str) -> TradeRecord {
    let opened_at = DateTime::parse_from_rfc3339(at).unwrap().with_timezone(&Utc);
    TradeRecord {
        opened_at: Some(opened_at),
        ..trade
    }
}
