//! SQLite storage adapter backing all three store ports.
//!
//! Dates are stored as `YYYY-MM-DD` text and enums as their lowercase
//! string form, so rows stay readable with any sqlite shell.

use crate::domain::error::TradelogError;
use crate::domain::finance::{Expense, ExpensePatch, NewExpense, NewSaving, Saving, SavingPatch};
use crate::domain::position::{NewPosition, PositionPatch, PositionRecord};
use crate::domain::trade::{AssetType, NewTrade, TradePatch, TradeRecord, TradeType};
use crate::ports::config_port::ConfigPort;
use crate::ports::finance_port::FinanceStore;
use crate::ports::journal_port::JournalStore;
use crate::ports::position_port::PositionStore;
use chrono::NaiveDate;
use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::types::ToSql;
use rusqlite::{params, params_from_iter};
use std::path::Path;

const DATE_FMT: &str = "%Y-%m-%d";

/// Record counts per table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DatabaseStats {
    pub expenses: usize,
    pub savings: usize,
    pub trades: usize,
    pub positions: usize,
}

pub struct SqliteAdapter {
    pool: Pool<SqliteConnectionManager>,
}

fn pool_err(e: r2d2::Error) -> TradelogError {
    TradelogError::Database {
        reason: e.to_string(),
    }
}

fn query_err(e: rusqlite::Error) -> TradelogError {
    TradelogError::DatabaseQuery {
        reason: e.to_string(),
    }
}

fn column_err(
    idx: usize,
    err: impl std::error::Error + Send + Sync + 'static,
) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(err))
}

fn parse_date_column(row: &rusqlite::Row<'_>, idx: usize) -> rusqlite::Result<NaiveDate> {
    let text: String = row.get(idx)?;
    NaiveDate::parse_from_str(&text, DATE_FMT).map_err(|e| column_err(idx, e))
}

fn parse_asset_column(row: &rusqlite::Row<'_>, idx: usize) -> rusqlite::Result<AssetType> {
    let text: String = row.get(idx)?;
    text.parse::<AssetType>().map_err(|e| column_err(idx, e))
}

fn map_trade_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<TradeRecord> {
    let trade_type: String = row.get(6)?;
    Ok(TradeRecord {
        id: row.get(0)?,
        symbol: row.get(1)?,
        asset_type: parse_asset_column(row, 2)?,
        entry_date: parse_date_column(row, 3)?,
        entry_price: row.get(4)?,
        quantity: row.get(5)?,
        trade_type: trade_type
            .parse::<TradeType>()
            .map_err(|e| column_err(6, e))?,
        notes: row.get::<_, Option<String>>(7)?.unwrap_or_default(),
        tags: row.get::<_, Option<String>>(8)?.unwrap_or_default(),
    })
}

fn map_expense_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Expense> {
    Ok(Expense {
        id: row.get(0)?,
        date: parse_date_column(row, 1)?,
        category: row.get(2)?,
        amount: row.get(3)?,
        note: row.get::<_, Option<String>>(4)?.unwrap_or_default(),
    })
}

fn map_saving_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Saving> {
    Ok(Saving {
        id: row.get(0)?,
        date: parse_date_column(row, 1)?,
        source: row.get(2)?,
        amount: row.get(3)?,
        note: row.get::<_, Option<String>>(4)?.unwrap_or_default(),
    })
}

fn map_position_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<PositionRecord> {
    Ok(PositionRecord {
        id: row.get(0)?,
        symbol: row.get(1)?,
        asset_type: parse_asset_column(row, 2)?,
        entry_date: parse_date_column(row, 3)?,
        entry_price: row.get(4)?,
        quantity: row.get(5)?,
    })
}

/// Append `LIMIT`/`OFFSET` clauses. SQLite needs `LIMIT -1` to offset
/// without a limit.
fn paginate(base: &str, limit: Option<usize>, offset: usize) -> String {
    match (limit, offset) {
        (Some(n), _) => format!("{base} LIMIT {n} OFFSET {offset}"),
        (None, 0) => base.to_string(),
        (None, _) => format!("{base} LIMIT -1 OFFSET {offset}"),
    }
}

impl SqliteAdapter {
    pub fn from_config(config: &dyn ConfigPort) -> Result<Self, TradelogError> {
        let db_path =
            config
                .get_string("database", "path")
                .ok_or_else(|| TradelogError::ConfigMissing {
                    section: "database".into(),
                    key: "path".into(),
                })?;
        let pool_size = config.get_int("database", "pool_size", 4) as u32;

        let manager = SqliteConnectionManager::file(&db_path);
        let pool = Pool::builder()
            .max_size(pool_size)
            .build(manager)
            .map_err(pool_err)?;

        Ok(Self { pool })
    }

    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, TradelogError> {
        let manager = SqliteConnectionManager::file(path);
        let pool = Pool::builder()
            .max_size(4)
            .build(manager)
            .map_err(pool_err)?;
        Ok(Self { pool })
    }

    pub fn in_memory() -> Result<Self, TradelogError> {
        let manager = SqliteConnectionManager::memory();
        let pool = Pool::builder()
            .max_size(1)
            .build(manager)
            .map_err(pool_err)?;
        Ok(Self { pool })
    }

    pub fn initialize_schema(&self) -> Result<(), TradelogError> {
        let conn = self.pool.get().map_err(pool_err)?;
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS expenses (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                date TEXT NOT NULL,
                category TEXT NOT NULL,
                amount REAL NOT NULL,
                note TEXT
            );
            CREATE TABLE IF NOT EXISTS savings (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                date TEXT NOT NULL,
                source TEXT NOT NULL,
                amount REAL NOT NULL,
                note TEXT
            );
            CREATE TABLE IF NOT EXISTS trades (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                symbol TEXT NOT NULL,
                asset_type TEXT NOT NULL,
                entry_date TEXT NOT NULL,
                entry_price REAL NOT NULL,
                quantity REAL NOT NULL,
                trade_type TEXT NOT NULL,
                notes TEXT,
                tags TEXT
            );
            CREATE TABLE IF NOT EXISTS positions (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                symbol TEXT NOT NULL,
                asset_type TEXT NOT NULL,
                entry_date TEXT NOT NULL,
                entry_price REAL NOT NULL,
                quantity REAL NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_trades_symbol ON trades(symbol);
            CREATE INDEX IF NOT EXISTS idx_trades_entry_date ON trades(entry_date);
            CREATE INDEX IF NOT EXISTS idx_expenses_date ON expenses(date);",
        )
        .map_err(query_err)?;
        log::info!("database schema initialized");
        Ok(())
    }

    pub fn stats(&self) -> Result<DatabaseStats, TradelogError> {
        let conn = self.pool.get().map_err(pool_err)?;
        let count = |table: &str| -> Result<usize, TradelogError> {
            let n: i64 = conn
                .query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| {
                    row.get(0)
                })
                .map_err(query_err)?;
            Ok(n as usize)
        };
        Ok(DatabaseStats {
            expenses: count("expenses")?,
            savings: count("savings")?,
            trades: count("trades")?,
            positions: count("positions")?,
        })
    }

    fn query_rows<T>(
        &self,
        sql: &str,
        params: &[&dyn ToSql],
        map: fn(&rusqlite::Row<'_>) -> rusqlite::Result<T>,
    ) -> Result<Vec<T>, TradelogError> {
        let conn = self.pool.get().map_err(pool_err)?;
        let mut stmt = conn.prepare(sql).map_err(query_err)?;
        let rows = stmt
            .query_map(params_from_iter(params.iter()), map)
            .map_err(query_err)?;

        let mut out = Vec::new();
        for row in rows {
            out.push(row.map_err(query_err)?);
        }
        Ok(out)
    }

    fn query_one<T>(
        &self,
        sql: &str,
        params: &[&dyn ToSql],
        map: fn(&rusqlite::Row<'_>) -> rusqlite::Result<T>,
    ) -> Result<Option<T>, TradelogError> {
        let conn = self.pool.get().map_err(pool_err)?;
        let mut stmt = conn.prepare(sql).map_err(query_err)?;
        let mut rows = stmt
            .query_map(params_from_iter(params.iter()), map)
            .map_err(query_err)?;
        match rows.next() {
            Some(row) => Ok(Some(row.map_err(query_err)?)),
            None => Ok(None),
        }
    }

    fn execute(&self, sql: &str, params: &[&dyn ToSql]) -> Result<usize, TradelogError> {
        let conn = self.pool.get().map_err(pool_err)?;
        conn.execute(sql, params_from_iter(params.iter()))
            .map_err(query_err)
    }

    fn insert(&self, sql: &str, params: &[&dyn ToSql]) -> Result<i64, TradelogError> {
        let conn = self.pool.get().map_err(pool_err)?;
        conn.execute(sql, params_from_iter(params.iter()))
            .map_err(query_err)?;
        Ok(conn.last_insert_rowid())
    }

    /// Run a dynamic partial `UPDATE`. Returns false for an empty patch or
    /// an unmatched id.
    fn update_dynamic(
        &self,
        table: &str,
        id: i64,
        sets: Vec<&str>,
        mut values: Vec<Box<dyn ToSql>>,
    ) -> Result<bool, TradelogError> {
        if sets.is_empty() {
            return Ok(false);
        }
        values.push(Box::new(id));
        let sql = format!("UPDATE {} SET {} WHERE id = ?", table, sets.join(", "));
        let conn = self.pool.get().map_err(pool_err)?;
        let changed = conn
            .execute(&sql, params_from_iter(values.iter().map(|v| v.as_ref())))
            .map_err(query_err)?;
        Ok(changed > 0)
    }
}

const TRADE_COLS: &str =
    "id, symbol, asset_type, entry_date, entry_price, quantity, trade_type, notes, tags";

impl JournalStore for SqliteAdapter {
    fn add_trade(&self, trade: &NewTrade) -> Result<i64, TradelogError> {
        self.insert(
            "INSERT INTO trades (symbol, asset_type, entry_date, entry_price, quantity, trade_type, notes, tags)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                trade.symbol,
                trade.asset_type.as_str(),
                trade.entry_date.format(DATE_FMT).to_string(),
                trade.entry_price,
                trade.quantity,
                trade.trade_type.as_str(),
                trade.notes,
                trade.tags,
            ],
        )
    }

    fn update_trade(&self, id: i64, patch: &TradePatch) -> Result<bool, TradelogError> {
        let mut sets: Vec<&str> = Vec::new();
        let mut values: Vec<Box<dyn ToSql>> = Vec::new();

        if let Some(ref symbol) = patch.symbol {
            sets.push("symbol = ?");
            values.push(Box::new(symbol.clone()));
        }
        if let Some(asset_type) = patch.asset_type {
            sets.push("asset_type = ?");
            values.push(Box::new(asset_type.as_str()));
        }
        if let Some(entry_date) = patch.entry_date {
            sets.push("entry_date = ?");
            values.push(Box::new(entry_date.format(DATE_FMT).to_string()));
        }
        if let Some(entry_price) = patch.entry_price {
            sets.push("entry_price = ?");
            values.push(Box::new(entry_price));
        }
        if let Some(quantity) = patch.quantity {
            sets.push("quantity = ?");
            values.push(Box::new(quantity));
        }
        if let Some(trade_type) = patch.trade_type {
            sets.push("trade_type = ?");
            values.push(Box::new(trade_type.as_str()));
        }
        if let Some(ref notes) = patch.notes {
            sets.push("notes = ?");
            values.push(Box::new(notes.clone()));
        }
        if let Some(ref tags) = patch.tags {
            sets.push("tags = ?");
            values.push(Box::new(tags.clone()));
        }

        self.update_dynamic("trades", id, sets, values)
    }

    fn delete_trade(&self, id: i64) -> Result<bool, TradelogError> {
        Ok(self.execute("DELETE FROM trades WHERE id = ?1", &[&id])? > 0)
    }

    fn get_trade(&self, id: i64) -> Result<Option<TradeRecord>, TradelogError> {
        self.query_one(
            &format!("SELECT {TRADE_COLS} FROM trades WHERE id = ?1"),
            &[&id],
            map_trade_row,
        )
    }

    fn get_all_trades(
        &self,
        limit: Option<usize>,
        offset: usize,
    ) -> Result<Vec<TradeRecord>, TradelogError> {
        let sql = paginate(
            &format!("SELECT {TRADE_COLS} FROM trades ORDER BY id"),
            limit,
            offset,
        );
        self.query_rows(&sql, &[], map_trade_row)
    }

    fn get_trades_by_symbol(&self, symbol: &str) -> Result<Vec<TradeRecord>, TradelogError> {
        self.query_rows(
            &format!("SELECT {TRADE_COLS} FROM trades WHERE symbol = ?1 ORDER BY id"),
            &[&symbol],
            map_trade_row,
        )
    }

    fn get_trades_by_asset_type(
        &self,
        asset_type: AssetType,
    ) -> Result<Vec<TradeRecord>, TradelogError> {
        self.query_rows(
            &format!("SELECT {TRADE_COLS} FROM trades WHERE asset_type = ?1 ORDER BY id"),
            &[&asset_type.as_str()],
            map_trade_row,
        )
    }
}

impl FinanceStore for SqliteAdapter {
    fn add_expense(&self, expense: &NewExpense) -> Result<i64, TradelogError> {
        self.insert(
            "INSERT INTO expenses (date, category, amount, note) VALUES (?1, ?2, ?3, ?4)",
            params![
                expense.date.format(DATE_FMT).to_string(),
                expense.category,
                expense.amount,
                expense.note,
            ],
        )
    }

    fn update_expense(&self, id: i64, patch: &ExpensePatch) -> Result<bool, TradelogError> {
        let mut sets: Vec<&str> = Vec::new();
        let mut values: Vec<Box<dyn ToSql>> = Vec::new();

        if let Some(date) = patch.date {
            sets.push("date = ?");
            values.push(Box::new(date.format(DATE_FMT).to_string()));
        }
        if let Some(ref category) = patch.category {
            sets.push("category = ?");
            values.push(Box::new(category.clone()));
        }
        if let Some(amount) = patch.amount {
            sets.push("amount = ?");
            values.push(Box::new(amount));
        }
        if let Some(ref note) = patch.note {
            sets.push("note = ?");
            values.push(Box::new(note.clone()));
        }

        self.update_dynamic("expenses", id, sets, values)
    }

    fn delete_expense(&self, id: i64) -> Result<bool, TradelogError> {
        Ok(self.execute("DELETE FROM expenses WHERE id = ?1", &[&id])? > 0)
    }

    fn get_expense(&self, id: i64) -> Result<Option<Expense>, TradelogError> {
        self.query_one(
            "SELECT id, date, category, amount, note FROM expenses WHERE id = ?1",
            &[&id],
            map_expense_row,
        )
    }

    fn get_all_expenses(
        &self,
        limit: Option<usize>,
        offset: usize,
    ) -> Result<Vec<Expense>, TradelogError> {
        let sql = paginate(
            "SELECT id, date, category, amount, note FROM expenses ORDER BY id",
            limit,
            offset,
        );
        self.query_rows(&sql, &[], map_expense_row)
    }

    fn get_expenses_by_category(&self, category: &str) -> Result<Vec<Expense>, TradelogError> {
        self.query_rows(
            "SELECT id, date, category, amount, note FROM expenses WHERE category = ?1 ORDER BY id",
            &[&category],
            map_expense_row,
        )
    }

    fn get_expenses_by_date_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Expense>, TradelogError> {
        let start = start.format(DATE_FMT).to_string();
        let end = end.format(DATE_FMT).to_string();
        self.query_rows(
            "SELECT id, date, category, amount, note FROM expenses
             WHERE date >= ?1 AND date <= ?2 ORDER BY id",
            &[&start, &end],
            map_expense_row,
        )
    }

    fn add_saving(&self, saving: &NewSaving) -> Result<i64, TradelogError> {
        self.insert(
            "INSERT INTO savings (date, source, amount, note) VALUES (?1, ?2, ?3, ?4)",
            params![
                saving.date.format(DATE_FMT).to_string(),
                saving.source,
                saving.amount,
                saving.note,
            ],
        )
    }

    fn update_saving(&self, id: i64, patch: &SavingPatch) -> Result<bool, TradelogError> {
        let mut sets: Vec<&str> = Vec::new();
        let mut values: Vec<Box<dyn ToSql>> = Vec::new();

        if let Some(date) = patch.date {
            sets.push("date = ?");
            values.push(Box::new(date.format(DATE_FMT).to_string()));
        }
        if let Some(ref source) = patch.source {
            sets.push("source = ?");
            values.push(Box::new(source.clone()));
        }
        if let Some(amount) = patch.amount {
            sets.push("amount = ?");
            values.push(Box::new(amount));
        }
        if let Some(ref note) = patch.note {
            sets.push("note = ?");
            values.push(Box::new(note.clone()));
        }

        self.update_dynamic("savings", id, sets, values)
    }

    fn delete_saving(&self, id: i64) -> Result<bool, TradelogError> {
        Ok(self.execute("DELETE FROM savings WHERE id = ?1", &[&id])? > 0)
    }

    fn get_saving(&self, id: i64) -> Result<Option<Saving>, TradelogError> {
        self.query_one(
            "SELECT id, date, source, amount, note FROM savings WHERE id = ?1",
            &[&id],
            map_saving_row,
        )
    }

    fn get_all_savings(
        &self,
        limit: Option<usize>,
        offset: usize,
    ) -> Result<Vec<Saving>, TradelogError> {
        let sql = paginate(
            "SELECT id, date, source, amount, note FROM savings ORDER BY id",
            limit,
            offset,
        );
        self.query_rows(&sql, &[], map_saving_row)
    }

    fn get_savings_by_source(&self, source: &str) -> Result<Vec<Saving>, TradelogError> {
        self.query_rows(
            "SELECT id, date, source, amount, note FROM savings WHERE source = ?1 ORDER BY id",
            &[&source],
            map_saving_row,
        )
    }
}

impl PositionStore for SqliteAdapter {
    fn add_position(&self, position: &NewPosition) -> Result<i64, TradelogError> {
        self.insert(
            "INSERT INTO positions (symbol, asset_type, entry_date, entry_price, quantity)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                position.symbol,
                position.asset_type.as_str(),
                position.entry_date.format(DATE_FMT).to_string(),
                position.entry_price,
                position.quantity,
            ],
        )
    }

    fn update_position(&self, id: i64, patch: &PositionPatch) -> Result<bool, TradelogError> {
        let mut sets: Vec<&str> = Vec::new();
        let mut values: Vec<Box<dyn ToSql>> = Vec::new();

        if let Some(ref symbol) = patch.symbol {
            sets.push("symbol = ?");
            values.push(Box::new(symbol.clone()));
        }
        if let Some(asset_type) = patch.asset_type {
            sets.push("asset_type = ?");
            values.push(Box::new(asset_type.as_str()));
        }
        if let Some(entry_date) = patch.entry_date {
            sets.push("entry_date = ?");
            values.push(Box::new(entry_date.format(DATE_FMT).to_string()));
        }
        if let Some(entry_price) = patch.entry_price {
            sets.push("entry_price = ?");
            values.push(Box::new(entry_price));
        }
        if let Some(quantity) = patch.quantity {
            sets.push("quantity = ?");
            values.push(Box::new(quantity));
        }

        self.update_dynamic("positions", id, sets, values)
    }

    fn delete_position(&self, id: i64) -> Result<bool, TradelogError> {
        Ok(self.execute("DELETE FROM positions WHERE id = ?1", &[&id])? > 0)
    }

    fn get_position(&self, id: i64) -> Result<Option<PositionRecord>, TradelogError> {
        self.query_one(
            "SELECT id, symbol, asset_type, entry_date, entry_price, quantity
             FROM positions WHERE id = ?1",
            &[&id],
            map_position_row,
        )
    }

    fn get_all_positions(&self) -> Result<Vec<PositionRecord>, TradelogError> {
        self.query_rows(
            "SELECT id, symbol, asset_type, entry_date, entry_price, quantity
             FROM positions ORDER BY id",
            &[],
            map_position_row,
        )
    }

    fn get_position_by_symbol(
        &self,
        symbol: &str,
    ) -> Result<Option<PositionRecord>, TradelogError> {
        self.query_one(
            "SELECT id, symbol, asset_type, entry_date, entry_price, quantity
             FROM positions WHERE symbol = ?1 ORDER BY id",
            &[&symbol],
            map_position_row,
        )
    }

    fn get_positions_by_asset_type(
        &self,
        asset_type: AssetType,
    ) -> Result<Vec<PositionRecord>, TradelogError> {
        self.query_rows(
            "SELECT id, symbol, asset_type, entry_date, entry_price, quantity
             FROM positions WHERE asset_type = ?1 ORDER BY id",
            &[&asset_type.as_str()],
            map_position_row,
        )
    }
}
