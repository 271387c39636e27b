pub mod enums;
pub mod error;
pub mod ingest;
pub mod structs;

// Re-export the core types to provide a clean public API.
pub use enums::{AssetClass, LotMatching, OrderSide};
pub use error::CoreError;
pub use ingest::ingest_trade_log;
pub use structs::{AccountSnapshot, Position, PositionSnapshot, TradeRecord, TradeRequest};
