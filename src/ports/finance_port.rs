//! Expense and savings storage port trait.

use crate::domain::error::TradelogError;
use crate::domain::finance::{Expense, ExpensePatch, NewExpense, NewSaving, Saving, SavingPatch};
use chrono::NaiveDate;

pub trait FinanceStore {
    fn add_expense(&self, expense: &NewExpense) -> Result<i64, TradelogError>;

    fn update_expense(&self, id: i64, patch: &ExpensePatch) -> Result<bool, TradelogError>;

    fn delete_expense(&self, id: i64) -> Result<bool, TradelogError>;

    fn get_expense(&self, id: i64) -> Result<Option<Expense>, TradelogError>;

    fn get_all_expenses(
        &self,
        limit: Option<usize>,
        offset: usize,
    ) -> Result<Vec<Expense>, TradelogError>;

    fn get_expenses_by_category(&self, category: &str) -> Result<Vec<Expense>, TradelogError>;

    fn get_expenses_by_date_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Expense>, TradelogError>;

    fn add_saving(&self, saving: &NewSaving) -> Result<i64, TradelogError>;

    fn update_saving(&self, id: i64, patch: &SavingPatch) -> Result<bool, TradelogError>;

    fn delete_saving(&self, id: i64) -> Result<bool, TradelogError>;

    fn get_saving(&self, id: i64) -> Result<Option<Saving>, TradelogError>;

    fn get_all_savings(
        &self,
        limit: Option<usize>,
        offset: usize,
    ) -> Result<Vec<Saving>, TradelogError>;

    fn get_savings_by_source(&self, source: &str) -> Result<Vec<Saving>, TradelogError>;
}
