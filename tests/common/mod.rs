#![allow(dead_code)]

use chrono::NaiveDate;
use std::cell::RefCell;
use tradelog::adapters::sqlite_adapter::SqliteAdapter;
use tradelog::domain::error::TradelogError;
use tradelog::domain::trade::{AssetType, NewTrade, TradePatch, TradeRecord, TradeType};
use tradelog::ports::journal_port::JournalStore;

/// In-memory journal store with per-call error injection, for exercising
/// the facade's error wrapping without a database.
pub struct MockJournalStore {
    pub trades: RefCell<Vec<TradeRecord>>,
    pub next_id: RefCell<i64>,
    pub error: Option<String>,
}

impl MockJournalStore {
    pub fn new() -> Self {
        Self {
            trades: RefCell::new(Vec::new()),
            next_id: RefCell::new(1),
            error: None,
        }
    }

    pub fn with_error(reason: &str) -> Self {
        Self {
            error: Some(reason.to_string()),
            ..Self::new()
        }
    }

    fn check(&self) -> Result<(), TradelogError> {
        match &self.error {
            Some(reason) => Err(TradelogError::Database {
                reason: reason.clone(),
            }),
            None => Ok(()),
        }
    }
}

impl JournalStore for MockJournalStore {
    fn add_trade(&self, trade: &NewTrade) -> Result<i64, TradelogError> {
        self.check()?;
        let mut next = self.next_id.borrow_mut();
        let id = *next;
        *next += 1;
        self.trades.borrow_mut().push(TradeRecord {
            id,
            symbol: trade.symbol.clone(),
            asset_type: trade.asset_type,
            entry_date: trade.entry_date,
            entry_price: trade.entry_price,
            quantity: trade.quantity,
            trade_type: trade.trade_type,
            notes: trade.notes.clone(),
            tags: trade.tags.clone(),
        });
        Ok(id)
    }

    fn update_trade(&self, id: i64, patch: &TradePatch) -> Result<bool, TradelogError> {
        self.check()?;
        let mut trades = self.trades.borrow_mut();
        let Some(trade) = trades.iter_mut().find(|t| t.id == id) else {
            return Ok(false);
        };
        if let Some(ref s) = patch.symbol {
            trade.symbol = s.clone();
        }
        if let Some(a) = patch.asset_type {
            trade.asset_type = a;
        }
        if let Some(d) = patch.entry_date {
            trade.entry_date = d;
        }
        if let Some(p) = patch.entry_price {
            trade.entry_price = p;
        }
        if let Some(q) = patch.quantity {
            trade.quantity = q;
        }
        if let Some(t) = patch.trade_type {
            trade.trade_type = t;
        }
        if let Some(ref n) = patch.notes {
            trade.notes = n.clone();
        }
        if let Some(ref t) = patch.tags {
            trade.tags = t.clone();
        }
        Ok(true)
    }

    fn delete_trade(&self, id: i64) -> Result<bool, TradelogError> {
        self.check()?;
        let mut trades = self.trades.borrow_mut();
        let before = trades.len();
        trades.retain(|t| t.id != id);
        Ok(trades.len() < before)
    }

    fn get_trade(&self, id: i64) -> Result<Option<TradeRecord>, TradelogError> {
        self.check()?;
        Ok(self.trades.borrow().iter().find(|t| t.id == id).cloned())
    }

    fn get_all_trades(
        &self,
        limit: Option<usize>,
        offset: usize,
    ) -> Result<Vec<TradeRecord>, TradelogError> {
        self.check()?;
        let trades = self.trades.borrow();
        let iter = trades.iter().skip(offset);
        Ok(match limit {
            Some(n) => iter.take(n).cloned().collect(),
            None => iter.cloned().collect(),
        })
    }

    fn get_trades_by_symbol(&self, symbol: &str) -> Result<Vec<TradeRecord>, TradelogError> {
        self.check()?;
        Ok(self
            .trades
            .borrow()
            .iter()
            .filter(|t| t.symbol == symbol)
            .cloned()
            .collect())
    }

    fn get_trades_by_asset_type(
        &self,
        asset_type: AssetType,
    ) -> Result<Vec<TradeRecord>, TradelogError> {
        self.check()?;
        Ok(self
            .trades
            .borrow()
            .iter()
            .filter(|t| t.asset_type == asset_type)
            .cloned()
            .collect())
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn make_trade(
    symbol: &str,
    trade_type: TradeType,
    price: f64,
    quantity: f64,
) -> NewTrade {
    NewTrade {
        symbol: symbol.to_string(),
        asset_type: AssetType::Stock,
        entry_date: date(2024, 1, 20),
        entry_price: price,
        quantity,
        trade_type,
        notes: String::new(),
        tags: String::new(),
    }
}

pub fn memory_store() -> SqliteAdapter {
    let adapter = SqliteAdapter::in_memory().unwrap();
    adapter.initialize_schema().unwrap();
    adapter
}
