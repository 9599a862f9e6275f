//! Shared input validation for the facade layer.
//!
//! Every function names the failing field in the returned error so callers
//! can surface it directly.

use crate::domain::error::TradelogError;
use crate::domain::trade::MAX_SYMBOL_LEN;
use chrono::NaiveDate;

/// Maximum length for expense categories and savings sources.
pub const MAX_LABEL_LEN: usize = 50;

/// Trim, reject empty/oversized, and uppercase a trading symbol.
pub fn symbol(value: &str) -> Result<String, TradelogError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(TradelogError::validation(
            "symbol",
            "is required and cannot be empty",
        ));
    }
    if trimmed.len() > MAX_SYMBOL_LEN {
        return Err(TradelogError::validation(
            "symbol",
            format!("cannot be longer than {MAX_SYMBOL_LEN} characters"),
        ));
    }
    Ok(trimmed.to_uppercase())
}

/// Require a strictly positive, finite number.
pub fn positive(field: &'static str, value: f64) -> Result<f64, TradelogError> {
    if !value.is_finite() || value <= 0.0 {
        return Err(TradelogError::validation(
            field,
            "must be a positive number",
        ));
    }
    Ok(value)
}

/// Trim and bound a free-text label (expense category, savings source).
pub fn label(field: &'static str, value: &str) -> Result<String, TradelogError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(TradelogError::validation(
            field,
            "is required and cannot be empty",
        ));
    }
    if trimmed.len() > MAX_LABEL_LEN {
        return Err(TradelogError::validation(
            field,
            format!("cannot be longer than {MAX_LABEL_LEN} characters"),
        ));
    }
    Ok(trimmed.to_string())
}

/// Reject inverted date ranges.
pub fn date_range(start: NaiveDate, end: NaiveDate) -> Result<(), TradelogError> {
    if start > end {
        return Err(TradelogError::validation(
            "start_date",
            "must be before or equal to end_date",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn symbol_normalizes_to_uppercase() {
        assert_eq!(symbol("aapl").unwrap(), "AAPL");
        assert_eq!(symbol("  btc-usd  ").unwrap(), "BTC-USD");
    }

    #[test]
    fn symbol_rejects_empty() {
        assert!(symbol("").is_err());
        assert!(symbol("   ").is_err());
    }

    #[test]
    fn symbol_rejects_oversized() {
        let long = "A".repeat(MAX_SYMBOL_LEN + 1);
        assert!(symbol(&long).is_err());
        let max = "A".repeat(MAX_SYMBOL_LEN);
        assert_eq!(symbol(&max).unwrap(), max);
    }

    #[test]
    fn positive_rejects_zero_negative_and_nan() {
        assert!(positive("entry_price", 0.0).is_err());
        assert!(positive("entry_price", -1.5).is_err());
        assert!(positive("entry_price", f64::NAN).is_err());
        assert!(positive("entry_price", f64::INFINITY).is_err());
        assert_eq!(positive("entry_price", 0.01).unwrap(), 0.01);
    }

    #[test]
    fn label_trims_and_bounds() {
        assert_eq!(label("category", " groceries ").unwrap(), "groceries");
        assert!(label("category", "").is_err());
        assert!(label("category", &"x".repeat(MAX_LABEL_LEN + 1)).is_err());
    }

    #[test]
    fn date_range_rejects_inverted() {
        let early = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let late = NaiveDate::from_ymd_opt(2024, 2, 1).unwrap();
        assert!(date_range(early, late).is_ok());
        assert!(date_range(early, early).is_ok());
        assert!(date_range(late, early).is_err());
    }
}
