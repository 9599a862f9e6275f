//! Trade records and the closed asset/trade type enumerations.
//!
//! Asset and trade types are parsed once at the boundary (CLI arguments,
//! database rows) and carried as enums from then on. Their string form is
//! always lowercase; symbols are always uppercase.

use crate::domain::error::TradelogError;
use chrono::NaiveDate;
use std::fmt;
use std::str::FromStr;

/// Maximum symbol length accepted by validation.
pub const MAX_SYMBOL_LEN: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum AssetType {
    Stock,
    Etf,
    Crypto,
    Forex,
    Commodity,
    Option,
    Future,
    Bond,
}

impl AssetType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssetType::Stock => "stock",
            AssetType::Etf => "etf",
            AssetType::Crypto => "crypto",
            AssetType::Forex => "forex",
            AssetType::Commodity => "commodity",
            AssetType::Option => "option",
            AssetType::Future => "future",
            AssetType::Bond => "bond",
        }
    }
}

impl fmt::Display for AssetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AssetType {
    type Err = TradelogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "stock" => Ok(AssetType::Stock),
            "etf" => Ok(AssetType::Etf),
            "crypto" => Ok(AssetType::Crypto),
            "forex" => Ok(AssetType::Forex),
            "commodity" => Ok(AssetType::Commodity),
            "option" => Ok(AssetType::Option),
            "future" => Ok(AssetType::Future),
            "bond" => Ok(AssetType::Bond),
            _ => Err(TradelogError::validation(
                "asset_type",
                "must be one of: bond, commodity, crypto, etf, forex, future, option, stock",
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TradeType {
    Buy,
    Sell,
    Short,
    Cover,
}

impl TradeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TradeType::Buy => "buy",
            TradeType::Sell => "sell",
            TradeType::Short => "short",
            TradeType::Cover => "cover",
        }
    }

    pub fn is_buy_side(&self) -> bool {
        matches!(self, TradeType::Buy)
    }

    pub fn is_sell_side(&self) -> bool {
        matches!(self, TradeType::Sell)
    }
}

impl fmt::Display for TradeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TradeType {
    type Err = TradelogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "buy" => Ok(TradeType::Buy),
            "sell" => Ok(TradeType::Sell),
            "short" => Ok(TradeType::Short),
            "cover" => Ok(TradeType::Cover),
            _ => Err(TradelogError::validation(
                "trade_type",
                "must be one of: buy, cover, sell, short",
            )),
        }
    }
}

/// A persisted trade. `id` is assigned by the store on insert.
#[derive(Debug, Clone, PartialEq)]
pub struct TradeRecord {
    pub id: i64,
    pub symbol: String,
    pub asset_type: AssetType,
    pub entry_date: NaiveDate,
    pub entry_price: f64,
    pub quantity: f64,
    pub trade_type: TradeType,
    pub notes: String,
    pub tags: String,
}

impl TradeRecord {
    /// Notional volume of this trade (price times quantity).
    pub fn notional(&self) -> f64 {
        self.entry_price * self.quantity
    }

    /// Case-insensitive substring match against the comma-separated tag field.
    pub fn has_tag(&self, tag: &str) -> bool {
        !self.tags.is_empty() && self.tags.to_lowercase().contains(&tag.to_lowercase())
    }
}

/// Fields for a trade about to be created.
#[derive(Debug, Clone)]
pub struct NewTrade {
    pub symbol: String,
    pub asset_type: AssetType,
    pub entry_date: NaiveDate,
    pub entry_price: f64,
    pub quantity: f64,
    pub trade_type: TradeType,
    pub notes: String,
    pub tags: String,
}

/// Partial update applied field-by-field; `None` leaves the stored value unchanged.
#[derive(Debug, Clone, Default)]
pub struct TradePatch {
    pub symbol: Option<String>,
    pub asset_type: Option<AssetType>,
    pub entry_date: Option<NaiveDate>,
    pub entry_price: Option<f64>,
    pub quantity: Option<f64>,
    pub trade_type: Option<TradeType>,
    pub notes: Option<String>,
    pub tags: Option<String>,
}

impl TradePatch {
    pub fn is_empty(&self) -> bool {
        self.symbol.is_none()
            && self.asset_type.is_none()
            && self.entry_date.is_none()
            && self.entry_price.is_none()
            && self.quantity.is_none()
            && self.trade_type.is_none()
            && self.notes.is_none()
            && self.tags.is_none()
    }
}

/// Parse a `YYYY-MM-DD` date, reporting the failing field on error.
pub fn parse_date(field: &'static str, value: &str) -> Result<NaiveDate, TradelogError> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|_| {
        TradelogError::validation(field, "must be a valid date in YYYY-MM-DD format")
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn asset_type_parses_case_insensitive() {
        assert_eq!("stock".parse::<AssetType>().unwrap(), AssetType::Stock);
        assert_eq!("CRYPTO".parse::<AssetType>().unwrap(), AssetType::Crypto);
        assert_eq!(" Etf ".parse::<AssetType>().unwrap(), AssetType::Etf);
    }

    #[test]
    fn asset_type_rejects_unknown() {
        let err = "bogus".parse::<AssetType>().unwrap_err();
        assert!(matches!(
            err,
            TradelogError::Validation { field: "asset_type", .. }
        ));
    }

    #[test]
    fn asset_type_display_is_lowercase() {
        assert_eq!(AssetType::Commodity.to_string(), "commodity");
        assert_eq!(AssetType::Bond.to_string(), "bond");
    }

    #[test]
    fn trade_type_round_trip() {
        for t in [
            TradeType::Buy,
            TradeType::Sell,
            TradeType::Short,
            TradeType::Cover,
        ] {
            assert_eq!(t.as_str().parse::<TradeType>().unwrap(), t);
        }
    }

    #[test]
    fn trade_type_rejects_unknown() {
        assert!("hold".parse::<TradeType>().is_err());
    }

    #[test]
    fn buy_and_sell_sides() {
        assert!(TradeType::Buy.is_buy_side());
        assert!(!TradeType::Cover.is_buy_side());
        assert!(TradeType::Sell.is_sell_side());
        assert!(!TradeType::Short.is_sell_side());
    }

    #[test]
    fn notional_is_price_times_quantity() {
        let trade = TradeRecord {
            id: 1,
            symbol: "AAPL".into(),
            asset_type: AssetType::Stock,
            entry_date: NaiveDate::from_ymd_opt(2024, 1, 20).unwrap(),
            entry_price: 150.25,
            quantity: 10.0,
            trade_type: TradeType::Buy,
            notes: String::new(),
            tags: String::new(),
        };
        assert!((trade.notional() - 1502.5).abs() < f64::EPSILON);
    }

    #[test]
    fn has_tag_is_case_insensitive_substring() {
        let mut trade = TradeRecord {
            id: 1,
            symbol: "AAPL".into(),
            asset_type: AssetType::Stock,
            entry_date: NaiveDate::from_ymd_opt(2024, 1, 20).unwrap(),
            entry_price: 150.0,
            quantity: 10.0,
            trade_type: TradeType::Buy,
            notes: String::new(),
            tags: "Tech,Growth".into(),
        };
        assert!(trade.has_tag("tech"));
        assert!(trade.has_tag("GROWTH"));
        assert!(!trade.has_tag("crypto"));

        trade.tags = String::new();
        assert!(!trade.has_tag("tech"));
    }

    #[test]
    fn parse_date_valid() {
        let date = parse_date("entry_date", "2024-01-20").unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2024, 1, 20).unwrap());
    }

    #[test]
    fn parse_date_invalid_format() {
        let err = parse_date("entry_date", "20/01/2024").unwrap_err();
        assert!(matches!(
            err,
            TradelogError::Validation { field: "entry_date", .. }
        ));
    }

    #[test]
    fn parse_date_invalid_calendar_day() {
        assert!(parse_date("entry_date", "2024-02-30").is_err());
    }

    #[test]
    fn empty_patch_is_empty() {
        assert!(TradePatch::default().is_empty());
        let patch = TradePatch {
            quantity: Some(5.0),
            ..TradePatch::default()
        };
        assert!(!patch.is_empty());
    }
}
