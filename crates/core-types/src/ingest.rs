use crate::error::CoreError;
use crate::structs::TradeRecord;
use std::collections::HashSet;

/// Parses and validates a JSON array of trade records.
///
/// Missing or malformed fields are rejected as `InvalidInput` instead of being
/// patched with defaults, and trade ids must be unique across the log.
pub fn ingest_trade_log(json: &str) -> Result<Vec<TradeRecord>, CoreError> {
    let trades: Vec<TradeRecord> = serde_json::from_str(json)
        .map_err(|e| CoreError::invalid("trade_log", e.to_string()))?;

    let mut seen = HashSet::with_capacity(trades.len());
    for trade in &trades {
        trade.validate()?;
        if !seen.insert(trade.trade_id) {
            return Err(CoreError::invalid(
                "trade_id",
                format!("duplicate trade id {}", trade.trade_id),
            ));
        }
    }

    tracing::debug!(count = trades.len(), "Ingested trade log");
    Ok(trades)
}

#[cfg(test)]
mod tests {
    use super::*;

    const BUY: &str = r#"{
        "trade_id": "6a2f41a3-c54c-4c3b-a6a5-8a1b53f1d6f1",
        "account_id": "acct",
        "symbol": "AAPL",
        "side": "BUY",
        "quantity": "10",
        "price": "100",
        "commission": "0",
        "trade_date": "2024-03-04",
        "trade_time": "14:30:00",
        "gross_value": "1000",
        "net_value": "1000",
        "realized_pnl": "0"
    }"#;

    #[test]
    fn accepts_well_formed_log() {
        let trades = ingest_trade_log(&format!("[{}]", BUY)).unwrap();
        assert_eq!(trades.len(), 1);
        assert!(trades[0].matched_trade_ids.is_empty());
        assert!(trades[0].opened_at.is_none());
    }

    #[test]
    fn missing_field_is_invalid_input() {
        let broken = BUY.replace("\"price\": \"100\",", "");
        assert!(matches!(
            ingest_trade_log(&format!("[{}]", broken)),
            Err(CoreError::InvalidInput(field, _)) if field == "trade_log"
        ));
    }

    #[test]
    fn unknown_side_is_invalid_input() {
        let broken = BUY.replace("\"BUY\"", "\"SHORT\"");
        assert!(ingest_trade_log(&format!("[{}]", broken)).is_err());
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        assert!(matches!(
            ingest_trade_log(&format!("[{},{}]", BUY, BUY)),
            Err(CoreError::InvalidInput(field, _)) if field == "trade_id"
        ));
    }

    #[test]
    fn empty_log_is_fine() {
        assert!(ingest_trade_log("[]").unwrap().is_empty());
    }
}
