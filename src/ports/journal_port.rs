//! Trade storage port trait.

use crate::domain::error::TradelogError;
use crate::domain::trade::{AssetType, NewTrade, TradePatch, TradeRecord};

/// The storage collaborator contract for the trading journal. Implementors
/// assign ids on insert and return records in insertion (id) order.
pub trait JournalStore {
    fn add_trade(&self, trade: &NewTrade) -> Result<i64, TradelogError>;

    fn update_trade(&self, id: i64, patch: &TradePatch) -> Result<bool, TradelogError>;

    fn delete_trade(&self, id: i64) -> Result<bool, TradelogError>;

    fn get_trade(&self, id: i64) -> Result<Option<TradeRecord>, TradelogError>;

    fn get_all_trades(
        &self,
        limit: Option<usize>,
        offset: usize,
    ) -> Result<Vec<TradeRecord>, TradelogError>;

    fn get_trades_by_symbol(&self, symbol: &str) -> Result<Vec<TradeRecord>, TradelogError>;

    fn get_trades_by_asset_type(
        &self,
        asset_type: AssetType,
    ) -> Result<Vec<TradeRecord>, TradelogError>;
}
