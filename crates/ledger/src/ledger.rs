use crate::account::{Account, PortfolioStats};
use crate::breakdown::{self, SellBreakdown};
use crate::error::LedgerError;
use crate::lot_matcher::{self, LotAllocation, OpenLotBook};
use chrono::{DateTime, Utc};
use configuration::AccountSettings;
use core_types::{AccountSnapshot, LotMatching, OrderSide, TradeRecord, TradeRequest};
use rust_decimal::Decimal;
use std::collections::HashMap;
use uuid::Uuid;

/// Realized P&L of a sell under the average-cost method.
pub fn average_cost_realized_pnl(sell_price: Decimal, avg_price: Decimal, quantity: Decimal) -> Decimal {
    (sell_price - avg_price) * quantity
}

/// Executes trades against a single account.
///
/// The ledger is the only writer of its `Account`. Each successful call appends
/// exactly one `TradeRecord`; a failed call changes nothing.
#[derive(Debug, Clone)]
pub struct Ledger {
    account: Account,
    initial_cash: Decimal,
    lot_matching: LotMatching,
    open_lots: OpenLotBook,
    /// Lot allocations per sell, as decided at execution time.
    allocations: HashMap<Uuid, Vec<LotAllocation>>,
}

impl Ledger {
    pub fn new(account_id: impl Into<String>, initial_cash: Decimal) -> Self {
        Self {
            account: Account::new(account_id, initial_cash),
            initial_cash,
            lot_matching: LotMatching::default(),
            open_lots: OpenLotBook::new(),
            allocations: HashMap::new(),
        }
    }

    pub fn from_settings(settings: &AccountSettings) -> Self {
        Self::new(settings.account_id.clone(), settings.initial_cash)
            .with_lot_matching(settings.lot_matching)
    }

    pub fn with_lot_matching(mut self, lot_matching: LotMatching) -> Self {
        self.lot_matching = lot_matching;
        self
    }

    pub fn account(&self) -> &Account {
        &self.account
    }

    pub fn initial_cash(&self) -> Decimal {
        self.initial_cash
    }

    pub fn lot_matching(&self) -> LotMatching {
        self.lot_matching
    }

    pub fn trades(&self) -> &[TradeRecord] {
        self.account.trades()
    }

    /// Executes `request` at the current time.
    pub fn execute(&mut self, request: &TradeRequest) -> Result<TradeRecord, LedgerError> {
        self.execute_at(request, Utc::now())
    }

    /// Executes `request` as of `executed_at`, which becomes the record's
    /// `trade_date`/`trade_time`.
    pub fn execute_at(
        &mut self,
        request: &TradeRequest,
        executed_at: DateTime<Utc>,
    ) -> Result<TradeRecord, LedgerError> {
        match self.apply(request, executed_at, Uuid::new_v4()) {
            Ok(record) => {
                tracing::info!(
                    account = %self.account.account_id(),
                    trade_id = %record.trade_id,
                    side = %record.side,
                    symbol = %record.symbol,
                    quantity = %record.quantity,
                    price = %record.price,
                    realized_pnl = %record.realized_pnl,
                    "Trade executed"
                );
                Ok(record)
            }
            Err(e) => {
                tracing::warn!(
                    account = %self.account.account_id(),
                    symbol = %request.symbol,
                    side = %request.side,
                    error = %e,
                    "Trade rejected"
                );
                Err(e)
            }
        }
    }

    /// Validates and applies one trade. Every check runs before the first mutation.
    fn apply(
        &mut self,
        request: &TradeRequest,
        executed_at: DateTime<Utc>,
        trade_id: Uuid,
    ) -> Result<TradeRecord, LedgerError> {
        request.validate()?;

        let symbol = request.symbol.trim().to_uppercase();
        let gross_value = request.gross_value();

        let (realized_pnl, allocations, opened_at) = match request.side {
            OrderSide::Buy => {
                let cost = gross_value + request.commission;
                self.account.ensure_cash(cost)?;
                self.account
                    .apply_buy(&symbol, request.quantity, request.price, cost, executed_at);
                (Decimal::ZERO, Vec::new(), None)
            }
            OrderSide::Sell => {
                let position = self.account.ensure_shares(&symbol, request.quantity)?;
                let realized_pnl =
                    average_cost_realized_pnl(request.price, position.avg_price, request.quantity);
                let opened_at = position.first_purchase;

                let allocations = match self.lot_matching {
                    LotMatching::Historical => {
                        lot_matcher::allocate_fifo(&symbol, request.quantity, self.account.trades())
                    }
                    LotMatching::Consuming => self.open_lots.consume(&symbol, request.quantity),
                };

                self.account.apply_sell(
                    &symbol,
                    request.quantity,
                    gross_value - request.commission,
                    executed_at,
                );
                (realized_pnl, allocations, Some(opened_at))
            }
        };

        let record = TradeRecord {
            trade_id,
            account_id: self.account.account_id().to_string(),
            symbol,
            side: request.side,
            quantity: request.quantity,
            price: request.price,
            commission: request.commission,
            trade_date: executed_at.date_naive(),
            trade_time: executed_at.time(),
            gross_value,
            net_value: TradeRecord::net_value_for(request.side, gross_value, request.commission),
            realized_pnl,
            matched_trade_ids: allocations.iter().map(|a| a.buy_trade_id).collect(),
            opened_at,
        };

        match record.side {
            OrderSide::Buy => self.open_lots.open(&record),
            OrderSide::Sell => {
                self.allocations.insert(record.trade_id, allocations);
            }
        }
        self.account.append(record.clone());

        Ok(record)
    }

    /// Rebuilds a ledger by re-executing `trades` in log order from `initial_cash`.
    ///
    /// Trade ids and timestamps are preserved, so a faithful log reproduces the
    /// original cash, positions and records. A record whose realized P&L does not
    /// come out the same is reported as `ReplayMismatch`. A sell that logged its
    /// matched buys must match the same buys again, or it is reported as
    /// `MatchedTradesMismatch`; a log that omits them is not checked for it.
    pub fn replay(
        account_id: impl Into<String>,
        initial_cash: Decimal,
        lot_matching: LotMatching,
        trades: &[TradeRecord],
    ) -> Result<Self, LedgerError> {
        let mut ledger = Self::new(account_id, initial_cash).with_lot_matching(lot_matching);

        for logged in trades {
            let request = TradeRequest::new(logged.symbol.clone(), logged.side, logged.quantity, logged.price)
                .with_commission(logged.commission);
            let replayed = ledger.apply(&request, logged.executed_at(), logged.trade_id)?;

            if replayed.realized_pnl != logged.realized_pnl {
                return Err(LedgerError::ReplayMismatch {
                    trade_id: logged.trade_id,
                    expected: logged.realized_pnl,
                    actual: replayed.realized_pnl,
                });
            }
            if !logged.matched_trade_ids.is_empty() && replayed.matched_trade_ids != logged.matched_trade_ids {
                return Err(LedgerError::MatchedTradesMismatch {
                    trade_id: logged.trade_id,
                    expected: logged.matched_trade_ids.clone(),
                    actual: replayed.matched_trade_ids,
                });
            }
        }

        tracing::debug!(
            account = %ledger.account.account_id(),
            trades = trades.len(),
            cash = %ledger.account.cash(),
            "Ledger replayed"
        );
        Ok(ledger)
    }

    /// Restores the starting cash and forgets every position and trade.
    pub fn reset(&mut self) {
        tracing::info!(account = %self.account.account_id(), "Resetting account");
        self.account = Account::new(self.account.account_id().to_string(), self.initial_cash);
        self.open_lots.clear();
        self.allocations.clear();
    }

    pub fn snapshot(&self, market_prices: &HashMap<String, Decimal>) -> AccountSnapshot {
        self.account.snapshot(market_prices)
    }

    pub fn stats(&self) -> PortfolioStats {
        self.account.stats(self.initial_cash)
    }

    /// The lots a sell was attributed to when it executed.
    pub fn allocations_for(&self, sell_trade_id: &Uuid) -> Option<&[LotAllocation]> {
        self.allocations.get(sell_trade_id).map(Vec::as_slice)
    }

    /// Per-sell audit report using the allocations recorded at execution time.
    pub fn pnl_breakdown(&self) -> Vec<SellBreakdown> {
        breakdown::breakdown_with(self.account.trades(), |sell| {
            self.allocations.get(&sell.trade_id).cloned()
        })
    }
}
