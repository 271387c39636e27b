//! # Papertrail Ledger Crate
//!
//! This crate owns the state of a paper-trading account: cash, open positions and
//! the append-only log of executed trades. It also attributes every sell to the
//! buy lots it closed, producing an audit trail alongside the realized P&L.
//!
//! ## Architectural Principles
//!
//! - **Single writer:** `Ledger::execute` takes `&mut self`. Validation and
//!   mutation happen under the same borrow, and a rejected trade leaves the
//!   account untouched. `SharedLedger` extends the same guarantee across threads.
//! - **Replayable state:** positions and cash are derived state. Feeding the trade
//!   log back through `Ledger::replay` reproduces them exactly.
//! - **Two P&L views:** the ledger books average-cost P&L on each sell, while the
//!   lot matcher attributes the sell FIFO. Both are exposed and kept separate.
//!
//! ## Public API
//!
//! - `Ledger`: executes trades against an `Account`.
//! - `Account`: the cash/positions/trade-log aggregate.
//! - `lot_matcher`: FIFO attribution, both historical and consuming.
//! - `SharedLedger` / `AccountRegistry`: per-account serialization.
//! - `LedgerError`: the specific error types that can be returned from this crate.

// Declare the modules that constitute this crate.
pub mod account;
pub mod breakdown;
pub mod error;
pub mod ledger;
pub mod lot_matcher;
pub mod shared;

// Re-export the key components to provide a clean, public-facing API.
pub use account::{Account, PortfolioStats};
pub use breakdown::{MatchedBuy, SellBreakdown, pnl_breakdown};
pub use error::LedgerError;
pub use ledger::{Ledger, average_cost_realized_pnl};
pub use lot_matcher::{LotAllocation, OpenLotBook, allocate_fifo, fifo_realized_pnl, match_fifo};
pub use shared::{AccountRegistry, SharedLedger};
