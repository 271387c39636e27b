use crate::error::LedgerError;
use crate::ledger::Ledger;
use chrono::{DateTime, Utc};
use configuration::AccountSettings;
use core_types::{AccountSnapshot, TradeRecord, TradeRequest};
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

/// A ledger that can be shared between threads.
///
/// Every call holds the account's lock for its whole validate-then-mutate
/// sequence, so two concurrent sells can never both pass the shares check.
#[derive(Debug, Clone)]
pub struct SharedLedger {
    account_id: String,
    inner: Arc<Mutex<Ledger>>,
}

impl SharedLedger {
    pub fn new(ledger: Ledger) -> Self {
        Self {
            account_id: ledger.account().account_id().to_string(),
            inner: Arc::new(Mutex::new(ledger)),
        }
    }

    pub fn account_id(&self) -> &str {
        &self.account_id
    }

    fn lock(&self) -> Result<MutexGuard<'_, Ledger>, LedgerError> {
        self.inner
            .lock()
            .map_err(|_| LedgerError::LockPoisoned(self.account_id.clone()))
    }

    pub fn execute(&self, request: &TradeRequest) -> Result<TradeRecord, LedgerError> {
        self.lock()?.execute(request)
    }

    pub fn execute_at(&self, request: &TradeRequest, executed_at: DateTime<Utc>) -> Result<TradeRecord, LedgerError> {
        self.lock()?.execute_at(request, executed_at)
    }

    /// A copy of the trade log, for analytics to read without holding the lock.
    pub fn trades(&self) -> Result<Vec<TradeRecord>, LedgerError> {
        Ok(self.lock()?.trades().to_vec())
    }

    pub fn snapshot(&self, market_prices: &HashMap<String, Decimal>) -> Result<AccountSnapshot, LedgerError> {
        Ok(self.lock()?.snapshot(market_prices))
    }

    pub fn reset(&self) -> Result<(), LedgerError> {
        self.lock()?.reset();
        Ok(())
    }

    /// Runs `f` against the ledger while holding its lock.
    pub fn with<R>(&self, f: impl FnOnce(&Ledger) -> R) -> Result<R, LedgerError> {
        let guard = self.lock()?;
        Ok(f(&guard))
    }
}

/// One ledger per account id. Owned by the caller, never global.
#[derive(Debug, Default)]
pub struct AccountRegistry {
    accounts: HashMap<String, SharedLedger>,
}

impl AccountRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the ledger for `settings.account_id`, creating it on first use.
    pub fn open(&mut self, settings: &AccountSettings) -> SharedLedger {
        self.accounts
            .entry(settings.account_id.clone())
            .or_insert_with(|| {
                tracing::debug!(account = %settings.account_id, "Opening account");
                SharedLedger::new(Ledger::from_settings(settings))
            })
            .clone()
    }

    pub fn get(&self, account_id: &str) -> Option<SharedLedger> {
        self.accounts.get(account_id).cloned()
    }

    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }
}
