//! Open-position book: CRUD over a [`PositionStore`] plus price-map driven
//! P&L analytics.
//!
//! Valuation never fetches quotes itself; callers pass a `symbol -> price`
//! map and positions without a supplied price are reported as unpriced
//! rather than valued at zero.

use crate::domain::error::TradelogError;
use crate::domain::trade::AssetType;
use crate::domain::validate;
use crate::ports::position_port::PositionStore;
use chrono::NaiveDate;
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq)]
pub struct PositionRecord {
    pub id: i64,
    pub symbol: String,
    pub asset_type: AssetType,
    pub entry_date: NaiveDate,
    pub entry_price: f64,
    pub quantity: f64,
}

impl PositionRecord {
    pub fn cost_basis(&self) -> f64 {
        self.entry_price * self.quantity
    }

    pub fn market_value(&self, price: f64) -> f64 {
        self.quantity * price
    }

    pub fn unrealized_pnl(&self, price: f64) -> f64 {
        self.quantity * (price - self.entry_price)
    }
}

#[derive(Debug, Clone)]
pub struct NewPosition {
    pub symbol: String,
    pub asset_type: AssetType,
    pub entry_date: NaiveDate,
    pub entry_price: f64,
    pub quantity: f64,
}

#[derive(Debug, Clone, Default)]
pub struct PositionPatch {
    pub symbol: Option<String>,
    pub asset_type: Option<AssetType>,
    pub entry_date: Option<NaiveDate>,
    pub entry_price: Option<f64>,
    pub quantity: Option<f64>,
}

/// One position valued against a supplied price.
#[derive(Debug, Clone)]
pub struct PositionPnl {
    pub symbol: String,
    pub quantity: f64,
    pub entry_price: f64,
    pub current_price: f64,
    pub cost_basis: f64,
    pub market_value: f64,
    pub unrealized_pnl: f64,
    pub pnl_pct: f64,
}

/// Portfolio-wide valuation result.
#[derive(Debug, Clone, Default)]
pub struct PortfolioPnl {
    pub positions: Vec<PositionPnl>,
    pub total_cost_basis: f64,
    pub total_market_value: f64,
    pub total_pnl: f64,
    pub total_pnl_pct: f64,
    /// Symbols held but absent from the supplied price map.
    pub missing_prices: Vec<String>,
}

pub struct PositionBook<'a> {
    store: &'a dyn PositionStore,
}

impl<'a> PositionBook<'a> {
    pub fn new(store: &'a dyn PositionStore) -> Self {
        Self { store }
    }

    pub fn add_position(&self, position: NewPosition) -> Result<i64, TradelogError> {
        let symbol = validate::symbol(&position.symbol)?;
        validate::positive("entry_price", position.entry_price)?;
        validate::positive("quantity", position.quantity)?;

        let position = NewPosition { symbol, ..position };
        let id = self.store.add_position(&position)?;
        log::info!(
            "added position {}: {} {}@{}",
            id,
            position.symbol,
            position.quantity,
            position.entry_price
        );
        Ok(id)
    }

    pub fn update_position(&self, id: i64, patch: PositionPatch) -> Result<bool, TradelogError> {
        if self.store.get_position(id)?.is_none() {
            return Err(TradelogError::NotFound {
                entity: "position",
                id,
            });
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
        self.store.update_position(id, &patch)
    }

    pub fn delete_position(&self, id: i64) -> Result<bool, TradelogError> {
        if self.store.get_position(id)?.is_none() {
            return Err(TradelogError::NotFound {
                entity: "position",
                id,
            });
        }
        self.store.delete_position(id)
    }

    pub fn get_position(&self, id: i64) -> Result<Option<PositionRecord>, TradelogError> {
        self.store.get_position(id)
    }

    pub fn all_positions(&self) -> Result<Vec<PositionRecord>, TradelogError> {
        self.store.get_all_positions()
    }

    pub fn position_by_symbol(
        &self,
        symbol: &str,
    ) -> Result<Option<PositionRecord>, TradelogError> {
        let symbol = validate::symbol(symbol)?;
        self.store.get_position_by_symbol(&symbol)
    }

    pub fn positions_by_asset_type(
        &self,
        asset_type: AssetType,
    ) -> Result<Vec<PositionRecord>, TradelogError> {
        self.store.get_positions_by_asset_type(asset_type)
    }

    /// Value every position against the supplied prices. Positions whose
    /// symbol is missing from the map are collected into `missing_prices`
    /// and excluded from the totals.
    pub fn portfolio_pnl(
        &self,
        prices: &HashMap<String, f64>,
    ) -> Result<PortfolioPnl, TradelogError> {
        let positions = self.store.get_all_positions()?;
        let mut result = PortfolioPnl::default();

        for position in &positions {
            let Some(&price) = prices.get(&position.symbol) else {
                result.missing_prices.push(position.symbol.clone());
                continue;
            };

            let cost_basis = position.cost_basis();
            let pnl = position.unrealized_pnl(price);
            result.positions.push(PositionPnl {
                symbol: position.symbol.clone(),
                quantity: position.quantity,
                entry_price: position.entry_price,
                current_price: price,
                cost_basis,
                market_value: position.market_value(price),
                unrealized_pnl: pnl,
                pnl_pct: if cost_basis > 0.0 {
                    pnl / cost_basis * 100.0
                } else {
                    0.0
                },
            });
            result.total_cost_basis += cost_basis;
            result.total_market_value += position.market_value(price);
            result.total_pnl += pnl;
        }

        if result.total_cost_basis > 0.0 {
            result.total_pnl_pct = result.total_pnl / result.total_cost_basis * 100.0;
        }
        Ok(result)
    }

    /// Priced positions ranked by P&L percentage, best first.
    pub fn top_performers(
        &self,
        prices: &HashMap<String, f64>,
        limit: usize,
    ) -> Result<Vec<PositionPnl>, TradelogError> {
        let mut pnl = self.portfolio_pnl(prices)?.positions;
        pnl.sort_by(|a, b| {
            b.pnl_pct
                .partial_cmp(&a.pnl_pct)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        pnl.truncate(limit);
        Ok(pnl)
    }
}
