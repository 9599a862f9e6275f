//! Position storage port trait.

use crate::domain::error::TradelogError;
use crate::domain::position::{NewPosition, PositionPatch, PositionRecord};
use crate::domain::trade::AssetType;

pub trait PositionStore {
    fn add_position(&self, position: &NewPosition) -> Result<i64, TradelogError>;

    fn update_position(&self, id: i64, patch: &PositionPatch) -> Result<bool, TradelogError>;

    fn delete_position(&self, id: i64) -> Result<bool, TradelogError>;

    fn get_position(&self, id: i64) -> Result<Option<PositionRecord>, TradelogError>;

    fn get_all_positions(&self) -> Result<Vec<PositionRecord>, TradelogError>;

    fn get_position_by_symbol(
        &self,
        symbol: &str,
    ) -> Result<Option<PositionRecord>, TradelogError>;

    fn get_positions_by_asset_type(
        &self,
        asset_type: AssetType,
    ) -> Result<Vec<PositionRecord>, TradelogError>;
}
