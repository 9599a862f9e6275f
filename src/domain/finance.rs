//! Personal finance facade: expenses and savings over a [`FinanceStore`].
//!
//! Same validate-then-delegate discipline as the trading journal.

use crate::domain::error::TradelogError;
use crate::domain::validate;
use crate::ports::finance_port::FinanceStore;
use chrono::NaiveDate;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq)]
pub struct Expense {
    pub id: i64,
    pub date: NaiveDate,
    pub category: String,
    pub amount: f64,
    pub note: String,
}

#[derive(Debug, Clone)]
pub struct NewExpense {
    pub date: NaiveDate,
    pub category: String,
    pub amount: f64,
    pub note: String,
}

#[derive(Debug, Clone, Default)]
pub struct ExpensePatch {
    pub date: Option<NaiveDate>,
    pub category: Option<String>,
    pub amount: Option<f64>,
    pub note: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Saving {
    pub id: i64,
    pub date: NaiveDate,
    pub source: String,
    pub amount: f64,
    pub note: String,
}

#[derive(Debug, Clone)]
pub struct NewSaving {
    pub date: NaiveDate,
    pub source: String,
    pub amount: f64,
    pub note: String,
}

#[derive(Debug, Clone, Default)]
pub struct SavingPatch {
    pub date: Option<NaiveDate>,
    pub source: Option<String>,
    pub amount: Option<f64>,
    pub note: Option<String>,
}

/// Savings minus expenses over an optional date range.
#[derive(Debug, Clone, Copy)]
pub struct NetPosition {
    pub total_savings: f64,
    pub total_expenses: f64,
    pub net: f64,
}

pub struct PersonalFinance<'a> {
    store: &'a dyn FinanceStore,
}

impl<'a> PersonalFinance<'a> {
    pub fn new(store: &'a dyn FinanceStore) -> Self {
        Self { store }
    }

    pub fn add_expense(&self, expense: NewExpense) -> Result<i64, TradelogError> {
        let category = validate::label("category", &expense.category)?;
        validate::positive("amount", expense.amount)?;
        let expense = NewExpense { category, ..expense };
        let id = self.store.add_expense(&expense)?;
        log::info!("added expense {}: {} {}", id, expense.category, expense.amount);
        Ok(id)
    }

    pub fn update_expense(&self, id: i64, patch: ExpensePatch) -> Result<bool, TradelogError> {
        if self.store.get_expense(id)?.is_none() {
            return Err(TradelogError::NotFound {
                entity: "expense",
                id,
            });
        }
        let mut patch = patch;
        if let Some(ref raw) = patch.category {
            patch.category = Some(validate::label("category", raw)?);
        }
        if let Some(amount) = patch.amount {
            validate::positive("amount", amount)?;
        }
        self.store.update_expense(id, &patch)
    }

    pub fn delete_expense(&self, id: i64) -> Result<bool, TradelogError> {
        if self.store.get_expense(id)?.is_none() {
            return Err(TradelogError::NotFound {
                entity: "expense",
                id,
            });
        }
        self.store.delete_expense(id)
    }

    pub fn get_expense(&self, id: i64) -> Result<Option<Expense>, TradelogError> {
        self.store.get_expense(id)
    }

    pub fn all_expenses(
        &self,
        limit: Option<usize>,
        offset: usize,
    ) -> Result<Vec<Expense>, TradelogError> {
        self.store.get_all_expenses(limit, offset)
    }

    pub fn expenses_by_category(&self, category: &str) -> Result<Vec<Expense>, TradelogError> {
        let category = validate::label("category", category)?;
        self.store.get_expenses_by_category(&category)
    }

    pub fn expenses_by_date_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Expense>, TradelogError> {
        validate::date_range(start, end)?;
        self.store.get_expenses_by_date_range(start, end)
    }

    pub fn add_saving(&self, saving: NewSaving) -> Result<i64, TradelogError> {
        let source = validate::label("source", &saving.source)?;
        validate::positive("amount", saving.amount)?;
        let saving = NewSaving { source, ..saving };
        let id = self.store.add_saving(&saving)?;
        log::info!("added saving {}: {} {}", id, saving.source, saving.amount);
        Ok(id)
    }

    pub fn update_saving(&self, id: i64, patch: SavingPatch) -> Result<bool, TradelogError> {
        if self.store.get_saving(id)?.is_none() {
            return Err(TradelogError::NotFound {
                entity: "saving",
                id,
            });
        }
        let mut patch = patch;
        if let Some(ref raw) = patch.source {
            patch.source = Some(validate::label("source", raw)?);
        }
        if let Some(amount) = patch.amount {
            validate::positive("amount", amount)?;
        }
        self.store.update_saving(id, &patch)
    }

    pub fn delete_saving(&self, id: i64) -> Result<bool, TradelogError> {
        if self.store.get_saving(id)?.is_none() {
            return Err(TradelogError::NotFound {
                entity: "saving",
                id,
            });
        }
        self.store.delete_saving(id)
    }

    pub fn get_saving(&self, id: i64) -> Result<Option<Saving>, TradelogError> {
        self.store.get_saving(id)
    }

    pub fn all_savings(
        &self,
        limit: Option<usize>,
        offset: usize,
    ) -> Result<Vec<Saving>, TradelogError> {
        self.store.get_all_savings(limit, offset)
    }

    pub fn savings_by_source(&self, source: &str) -> Result<Vec<Saving>, TradelogError> {
        let source = validate::label("source", source)?;
        self.store.get_savings_by_source(&source)
    }

    /// Total expenses, optionally restricted to a date range or a category.
    pub fn expense_total(
        &self,
        range: Option<(NaiveDate, NaiveDate)>,
        category: Option<&str>,
    ) -> Result<f64, TradelogError> {
        let expenses = match (range, category) {
            (Some((start, end)), _) => self.expenses_by_date_range(start, end)?,
            (None, Some(category)) => self.expenses_by_category(category)?,
            (None, None) => self.store.get_all_expenses(None, 0)?,
        };
        Ok(expenses.iter().map(|e| e.amount).sum())
    }

    /// Total savings, optionally restricted to a date range or a source.
    pub fn savings_total(
        &self,
        range: Option<(NaiveDate, NaiveDate)>,
        source: Option<&str>,
    ) -> Result<f64, TradelogError> {
        let mut savings = match source {
            Some(source) => self.savings_by_source(source)?,
            None => self.store.get_all_savings(None, 0)?,
        };
        if let Some((start, end)) = range {
            validate::date_range(start, end)?;
            savings.retain(|s| s.date >= start && s.date <= end);
        }
        Ok(savings.iter().map(|s| s.amount).sum())
    }

    pub fn net_position(
        &self,
        range: Option<(NaiveDate, NaiveDate)>,
    ) -> Result<NetPosition, TradelogError> {
        let total_savings = self.savings_total(range, None)?;
        let total_expenses = self.expense_total(range, None)?;
        Ok(NetPosition {
            total_savings,
            total_expenses,
            net: total_savings - total_expenses,
        })
    }

    /// Per-category expense totals, optionally restricted to a date range.
    pub fn expense_breakdown(
        &self,
        range: Option<(NaiveDate, NaiveDate)>,
    ) -> Result<BTreeMap<String, f64>, TradelogError> {
        let expenses = match range {
            Some((start, end)) => self.expenses_by_date_range(start, end)?,
            None => self.store.get_all_expenses(None, 0)?,
        };
        let mut breakdown = BTreeMap::new();
        for expense in expenses {
            *breakdown.entry(expense.category).or_insert(0.0) += expense.amount;
        }
        Ok(breakdown)
    }
}
