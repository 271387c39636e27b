use core_types::CoreError;
use rust_decimal::Decimal;
use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum LedgerError {
    #[error(transparent)]
    InvalidInput(#[from] CoreError),

    #[error("Not enough cash available to execute trade. Required: {required}, Available: {available}")]
    InsufficientCash { required: Decimal, available: Decimal },

    #[error("Position not found for symbol: {0}")]
    NoPosition(String),

    #[error("Not enough shares of {symbol} to sell. Requested: {requested}, Available: {available}")]
    InsufficientShares {
        symbol: String,
        requested: Decimal,
        available: Decimal,
    },

    #[error("Ledger lock for account {0} was poisoned by a panicking writer")]
    LockPoisoned(String),

    #[error("Replaying trade {trade_id} realized {actual}, but the log recorded {expected}")]
    ReplayMismatch {
        trade_id: Uuid,
        expected: Decimal,
        actual: Decimal,
    },

    #[error("Replaying trade {trade_id} matched buys {actual:?}, but the log recorded {expected:?}")]
    MatchedTradesMismatch {
        trade_id: Uuid,
        expected: Vec<Uuid>,
        actual: Vec<Uuid>,
    },
}
