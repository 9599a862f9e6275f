//! Trading journal facade: validate inputs, normalize them, and delegate
//! persistence to a [`JournalStore`].
//!
//! All operations are synchronous validate-then-delegate steps. Absence on
//! reads is `Ok(None)`; mutations addressing a missing id fail with
//! `NotFound`; invalid input fails with `Validation` before the store is
//! touched.

use crate::domain::error::TradelogError;
use crate::domain::trade::{AssetType, NewTrade, TradePatch, TradeRecord, TradeType};
use crate::domain::validate;
use crate::ports::journal_port::JournalStore;
use chrono::NaiveDate;
use std::collections::{BTreeMap, BTreeSet};

pub struct TradingJournal<'a> {
    store: &'a dyn JournalStore,
}

/// Aggregate counts and volumes over the whole journal.
#[derive(Debug, Clone, Default)]
pub struct TradeSummary {
    pub total_trades: usize,
    pub by_trade_type: BTreeMap<TradeType, usize>,
    pub by_asset_type: BTreeMap<AssetType, usize>,
    pub total_volume: f64,
    pub symbols_traded: BTreeSet<String>,
}

impl TradeSummary {
    pub fn unique_symbols(&self) -> usize {
        self.symbols_traded.len()
    }
}

/// Per-symbol buy/sell breakdown with volume-weighted average prices.
#[derive(Debug, Clone)]
pub struct SymbolPerformance {
    pub symbol: String,
    pub total_trades: usize,
    pub buy_trades: usize,
    pub sell_trades: usize,
    pub total_quantity_bought: f64,
    pub total_quantity_sold: f64,
    pub average_buy_price: f64,
    pub average_sell_price: f64,
    pub total_volume: f64,
}

impl<'a> TradingJournal<'a> {
    pub fn new(store: &'a dyn JournalStore) -> Self {
        Self { store }
    }

    /// Validate and insert a trade. Returns the id assigned by the store.
    pub fn add_trade(&self, trade: NewTrade) -> Result<i64, TradelogError> {
        let symbol = validate::symbol(&trade.symbol)?;
        validate::positive("entry_price", trade.entry_price)?;
        validate::positive("quantity", trade.quantity)?;

        let trade = NewTrade { symbol, ..trade };
        let id = self.store.add_trade(&trade)?;
        log::info!(
            "added trade {}: {} {} {}@{}",
            id,
            trade.symbol,
            trade.trade_type,
            trade.quantity,
            trade.entry_price
        );
        Ok(id)
    }

    /// Apply a partial update. Only supplied fields are validated and changed.
    /// An empty patch is a no-op returning `Ok(false)`.
    pub fn update_trade(&self, id: i64, patch: TradePatch) -> Result<bool, TradelogError> {
        if self.store.get_trade(id)?.is_none() {
            return Err(TradelogError::NotFound { entity: "trade", id });
        }
        if patch.is_empty() {
            return Ok(false);
        }

        let mut patch = patch;
        if let Some(ref raw) = patch.symbol {
            patch.symbol = Some(validate::symbol(raw)?);
        }
        if let Some(price) = patch.entry_price {
            validate::positive("entry_price", price)?;
        }
        if let Some(quantity) = patch.quantity {
            validate::positive("quantity", quantity)?;
        }

        let updated = self.store.update_trade(id, &patch)?;
        if updated {
            log::info!("updated trade {id}");
        }
        Ok(updated)
    }

    pub fn delete_trade(&self, id: i64) -> Result<bool, TradelogError> {
        if self.store.get_trade(id)?.is_none() {
            return Err(TradelogError::NotFound { entity: "trade", id });
        }
        let deleted = self.store.delete_trade(id)?;
        if deleted {
            log::info!("deleted trade {id}");
        }
        Ok(deleted)
    }

    pub fn get_trade(&self, id: i64) -> Result<Option<TradeRecord>, TradelogError> {
        self.store.get_trade(id)
    }

    /// All trades in insertion order, with optional pagination.
    pub fn all_trades(
        &self,
        limit: Option<usize>,
        offset: usize,
    ) -> Result<Vec<TradeRecord>, TradelogError> {
        self.store.get_all_trades(limit, offset)
    }

    pub fn trades_by_symbol(&self, symbol: &str) -> Result<Vec<TradeRecord>, TradelogError> {
        let symbol = validate::symbol(symbol)?;
        self.store.get_trades_by_symbol(&symbol)
    }

    pub fn trades_by_asset_type(
        &self,
        asset_type: AssetType,
    ) -> Result<Vec<TradeRecord>, TradelogError> {
        self.store.get_trades_by_asset_type(asset_type)
    }

    pub fn trades_by_type(
        &self,
        trade_type: TradeType,
    ) -> Result<Vec<TradeRecord>, TradelogError> {
        let trades = self.store.get_all_trades(None, 0)?;
        Ok(trades
            .into_iter()
            .filter(|t| t.trade_type == trade_type)
            .collect())
    }

    pub fn trades_by_date_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<TradeRecord>, TradelogError> {
        validate::date_range(start, end)?;
        let trades = self.store.get_all_trades(None, 0)?;
        Ok(trades
            .into_iter()
            .filter(|t| t.entry_date >= start && t.entry_date <= end)
            .collect())
    }

    /// Trades whose tag field contains `tag` (case-insensitive substring).
    pub fn trades_by_tag(&self, tag: &str) -> Result<Vec<TradeRecord>, TradelogError> {
        let tag = tag.trim();
        if tag.is_empty() {
            return Err(TradelogError::validation(
                "tag",
                "is required and cannot be empty",
            ));
        }
        let trades = self.store.get_all_trades(None, 0)?;
        Ok(trades.into_iter().filter(|t| t.has_tag(tag)).collect())
    }

    pub fn summary(&self) -> Result<TradeSummary, TradelogError> {
        let trades = self.store.get_all_trades(None, 0)?;
        let mut summary = TradeSummary {
            total_trades: trades.len(),
            ..TradeSummary::default()
        };

        for trade in &trades {
            *summary.by_trade_type.entry(trade.trade_type).or_insert(0) += 1;
            *summary.by_asset_type.entry(trade.asset_type).or_insert(0) += 1;
            summary.total_volume += trade.notional();
            summary.symbols_traded.insert(trade.symbol.clone());
        }

        Ok(summary)
    }

    /// Buy/sell breakdown for one symbol. `Ok(None)` when the symbol has no
    /// trades, so callers never see zero-quantity averages.
    pub fn symbol_performance(
        &self,
        symbol: &str,
    ) -> Result<Option<SymbolPerformance>, TradelogError> {
        let symbol = validate::symbol(symbol)?;
        let trades = self.store.get_trades_by_symbol(&symbol)?;
        if trades.is_empty() {
            return Ok(None);
        }

        let buys: Vec<&TradeRecord> = trades
            .iter()
            .filter(|t| t.trade_type.is_buy_side())
            .collect();
        let sells: Vec<&TradeRecord> = trades
            .iter()
            .filter(|t| t.trade_type.is_sell_side())
            .collect();

        let quantity_bought: f64 = buys.iter().map(|t| t.quantity).sum();
        let quantity_sold: f64 = sells.iter().map(|t| t.quantity).sum();
        let buy_value: f64 = buys.iter().map(|t| t.notional()).sum();
        let sell_value: f64 = sells.iter().map(|t| t.notional()).sum();

        Ok(Some(SymbolPerformance {
            symbol,
            total_trades: trades.len(),
            buy_trades: buys.len(),
            sell_trades: sells.len(),
            total_quantity_bought: quantity_bought,
            total_quantity_sold: quantity_sold,
            average_buy_price: if quantity_bought > 0.0 {
                buy_value / quantity_bought
            } else {
                0.0
            },
            average_sell_price: if quantity_sold > 0.0 {
                sell_value / quantity_sold
            } else {
                0.0
            },
            total_volume: trades.iter().map(|t| t.notional()).sum(),
        }))
    }
}
