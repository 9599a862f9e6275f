//! CLI definition and dispatch.
//!
//! Status and progress lines go to stderr, data rows to stdout, so output
//! stays pipeable.

use clap::{Parser, Subcommand};
use std::collections::HashMap;
use std::path::PathBuf;
use std::process::ExitCode;

use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::sqlite_adapter::SqliteAdapter;
use crate::domain::error::TradelogError;
use crate::domain::finance::{NewExpense, NewSaving, PersonalFinance};
use crate::domain::journal::TradingJournal;
use crate::domain::position::PositionBook;
use crate::domain::simulation;
use crate::domain::trade::{parse_date, AssetType, NewTrade, TradePatch, TradeRecord, TradeType};

const DEFAULT_DB_PATH: &str = "tradelog.db";

#[derive(Parser, Debug)]
#[command(name = "tradelog", about = "Personal finance and trading journal")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create the database schema
    Init {
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Record a trade
    AddTrade {
        #[arg(long)]
        symbol: String,
        #[arg(long, default_value = "stock")]
        asset_type: String,
        #[arg(long)]
        date: String,
        #[arg(long)]
        price: f64,
        #[arg(long)]
        quantity: f64,
        #[arg(long, default_value = "buy")]
        trade_type: String,
        #[arg(long, default_value = "")]
        notes: String,
        #[arg(long, default_value = "")]
        tags: String,
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// List trades, optionally filtered
    ListTrades {
        #[arg(long)]
        symbol: Option<String>,
        #[arg(long)]
        asset_type: Option<String>,
        #[arg(long)]
        trade_type: Option<String>,
        #[arg(long)]
        tag: Option<String>,
        #[arg(long)]
        from: Option<String>,
        #[arg(long)]
        to: Option<String>,
        #[arg(long)]
        limit: Option<usize>,
        #[arg(long, default_value_t = 0)]
        offset: usize,
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Update fields of an existing trade
    UpdateTrade {
        id: i64,
        #[arg(long)]
        symbol: Option<String>,
        #[arg(long)]
        asset_type: Option<String>,
        #[arg(long)]
        date: Option<String>,
        #[arg(long)]
        price: Option<f64>,
        #[arg(long)]
        quantity: Option<f64>,
        #[arg(long)]
        trade_type: Option<String>,
        #[arg(long)]
        notes: Option<String>,
        #[arg(long)]
        tags: Option<String>,
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Delete a trade
    DeleteTrade {
        id: i64,
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Journal-wide trade summary
    Summary {
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Per-symbol performance breakdown
    Performance {
        symbol: String,
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Record an expense
    AddExpense {
        #[arg(long)]
        date: String,
        #[arg(long)]
        category: String,
        #[arg(long)]
        amount: f64,
        #[arg(long, default_value = "")]
        note: String,
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Record a savings contribution
    AddSaving {
        #[arg(long)]
        date: String,
        #[arg(long)]
        source: String,
        #[arg(long)]
        amount: f64,
        #[arg(long, default_value = "")]
        note: String,
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Net savings position (savings minus expenses)
    Net {
        #[arg(long)]
        from: Option<String>,
        #[arg(long)]
        to: Option<String>,
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Open positions with unrealized P&L at given prices
    Positions {
        /// Current price as SYMBOL=VALUE, repeatable
        #[arg(long = "price", value_parser = parse_price_pair)]
        prices: Vec<(String, f64)>,
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Amortized loan payment schedule
    Loan {
        #[arg(long)]
        amount: f64,
        #[arg(long)]
        rate: f64,
        #[arg(long)]
        years: u32,
    },
    /// Database record counts
    Stats {
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Init { config } => run_init(config.as_ref()),
        Command::AddTrade {
            symbol,
            asset_type,
            date,
            price,
            quantity,
            trade_type,
            notes,
            tags,
            config,
        } => run_add_trade(
            &symbol,
            &asset_type,
            &date,
            price,
            quantity,
            &trade_type,
            notes,
            tags,
            config.as_ref(),
        ),
        Command::ListTrades {
            symbol,
            asset_type,
            trade_type,
            tag,
            from,
            to,
            limit,
            offset,
            config,
        } => run_list_trades(
            symbol.as_deref(),
            asset_type.as_deref(),
            trade_type.as_deref(),
            tag.as_deref(),
            from.as_deref(),
            to.as_deref(),
            limit,
            offset,
            config.as_ref(),
        ),
        Command::UpdateTrade {
            id,
            symbol,
            asset_type,
            date,
            price,
            quantity,
            trade_type,
            notes,
            tags,
            config,
        } => run_update_trade(
            id,
            symbol,
            asset_type.as_deref(),
            date.as_deref(),
            price,
            quantity,
            trade_type.as_deref(),
            notes,
            tags,
            config.as_ref(),
        ),
        Command::DeleteTrade { id, config } => run_delete_trade(id, config.as_ref()),
        Command::Summary { config } => run_summary(config.as_ref()),
        Command::Performance { symbol, config } => run_performance(&symbol, config.as_ref()),
        Command::AddExpense {
            date,
            category,
            amount,
            note,
            config,
        } => run_add_expense(&date, category, amount, note, config.as_ref()),
        Command::AddSaving {
            date,
            source,
            amount,
            note,
            config,
        } => run_add_saving(&date, source, amount, note, config.as_ref()),
        Command::Net { from, to, config } => {
            run_net(from.as_deref(), to.as_deref(), config.as_ref())
        }
        Command::Positions { prices, config } => run_positions(&prices, config.as_ref()),
        Command::Loan {
            amount,
            rate,
            years,
        } => run_loan(amount, rate, years),
        Command::Stats { config } => run_stats(config.as_ref()),
    }
}

pub fn load_config(path: &PathBuf) -> Result<FileConfigAdapter, ExitCode> {
    FileConfigAdapter::from_file(path).map_err(|e| {
        let err = TradelogError::ConfigParse {
            file: path.display().to_string(),
            reason: e.to_string(),
        };
        eprintln!("error: {err}");
        ExitCode::from(&err)
    })
}

/// Open the store from an INI config, or fall back to `tradelog.db` in the
/// working directory. The schema is created on first use.
pub fn open_store(config_path: Option<&PathBuf>) -> Result<SqliteAdapter, ExitCode> {
    let store = match config_path {
        Some(path) => {
            let config = load_config(path)?;
            SqliteAdapter::from_config(&config)
        }
        None => SqliteAdapter::open(DEFAULT_DB_PATH),
    }
    .map_err(|e| {
        eprintln!("error: {e}");
        ExitCode::from(&e)
    })?;

    store.initialize_schema().map_err(|e| {
        eprintln!("error: {e}");
        ExitCode::from(&e)
    })?;
    Ok(store)
}

/// Parse a `SYMBOL=VALUE` price pair for the positions command.
pub fn parse_price_pair(s: &str) -> Result<(String, f64), String> {
    let (symbol, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected SYMBOL=VALUE, got '{s}'"))?;
    let symbol = symbol.trim().to_uppercase();
    if symbol.is_empty() {
        return Err(format!("empty symbol in '{s}'"));
    }
    let price: f64 = value
        .trim()
        .parse()
        .map_err(|_| format!("invalid price '{}' for {}", value.trim(), symbol))?;
    if !price.is_finite() || price <= 0.0 {
        return Err(format!("price for {symbol} must be positive"));
    }
    Ok((symbol, price))
}

fn fail(e: &TradelogError) -> ExitCode {
    eprintln!("error: {e}");
    e.into()
}

fn page(trades: Vec<TradeRecord>, limit: Option<usize>, offset: usize) -> Vec<TradeRecord> {
    let iter = trades.into_iter().skip(offset);
    match limit {
        Some(n) => iter.take(n).collect(),
        None => iter.collect(),
    }
}

fn print_trade(trade: &TradeRecord) {
    println!(
        "{:>4}  {}  {:<10} {:<5} {:>12.2} x {:<10} [{}]{}",
        trade.id,
        trade.entry_date,
        trade.symbol,
        trade.trade_type,
        trade.entry_price,
        trade.quantity,
        trade.asset_type,
        if trade.tags.is_empty() {
            String::new()
        } else {
            format!("  tags: {}", trade.tags)
        },
    );
}

fn run_init(config_path: Option<&PathBuf>) -> ExitCode {
    match open_store(config_path) {
        Ok(_) => {
            eprintln!("Database initialized");
            ExitCode::SUCCESS
        }
        Err(code) => code,
    }
}

#[allow(clippy::too_many_arguments)]
fn run_add_trade(
    symbol: &str,
    asset_type: &str,
    date: &str,
    price: f64,
    quantity: f64,
    trade_type: &str,
    notes: String,
    tags: String,
    config_path: Option<&PathBuf>,
) -> ExitCode {
    let asset_type: AssetType = match asset_type.parse() {
        Ok(a) => a,
        Err(e) => return fail(&e),
    };
    let trade_type: TradeType = match trade_type.parse() {
        Ok(t) => t,
        Err(e) => return fail(&e),
    };
    let entry_date = match parse_date("date", date) {
        Ok(d) => d,
        Err(e) => return fail(&e),
    };

    let store = match open_store(config_path) {
        Ok(s) => s,
        Err(code) => return code,
    };
    let journal = TradingJournal::new(&store);

    match journal.add_trade(NewTrade {
        symbol: symbol.to_string(),
        asset_type,
        entry_date,
        entry_price: price,
        quantity,
        trade_type,
        notes,
        tags,
    }) {
        Ok(id) => {
            eprintln!("Trade {id} recorded");
            println!("{id}");
            ExitCode::SUCCESS
        }
        Err(e) => fail(&e),
    }
}

#[allow(clippy::too_many_arguments)]
fn run_list_trades(
    symbol: Option<&str>,
    asset_type: Option<&str>,
    trade_type: Option<&str>,
    tag: Option<&str>,
    from: Option<&str>,
    to: Option<&str>,
    limit: Option<usize>,
    offset: usize,
    config_path: Option<&PathBuf>,
) -> ExitCode {
    let store = match open_store(config_path) {
        Ok(s) => s,
        Err(code) => return code,
    };
    let journal = TradingJournal::new(&store);

    // Filtered branches paginate in memory so --limit/--offset apply uniformly.
    let trades = if let Some(symbol) = symbol {
        journal.trades_by_symbol(symbol).map(|t| page(t, limit, offset))
    } else if let Some(asset_type) = asset_type {
        match asset_type.parse::<AssetType>() {
            Ok(a) => journal
                .trades_by_asset_type(a)
                .map(|t| page(t, limit, offset)),
            Err(e) => return fail(&e),
        }
    } else if let Some(trade_type) = trade_type {
        match trade_type.parse::<TradeType>() {
            Ok(t) => journal.trades_by_type(t).map(|t| page(t, limit, offset)),
            Err(e) => return fail(&e),
        }
    } else if let Some(tag) = tag {
        journal.trades_by_tag(tag).map(|t| page(t, limit, offset))
    } else if from.is_some() || to.is_some() {
        let (Some(from), Some(to)) = (from, to) else {
            eprintln!("error: --from and --to must be given together");
            return ExitCode::from(4);
        };
        let start = match parse_date("from", from) {
            Ok(d) => d,
            Err(e) => return fail(&e),
        };
        let end = match parse_date("to", to) {
            Ok(d) => d,
            Err(e) => return fail(&e),
        };
        journal
            .trades_by_date_range(start, end)
            .map(|t| page(t, limit, offset))
    } else {
        journal.all_trades(limit, offset)
    };

    let trades = match trades {
        Ok(t) => t,
        Err(e) => return fail(&e),
    };

    if trades.is_empty() {
        eprintln!("No trades found");
    } else {
        for trade in &trades {
            print_trade(trade);
        }
        eprintln!("{} trades", trades.len());
    }
    ExitCode::SUCCESS
}

#[allow(clippy::too_many_arguments)]
fn run_update_trade(
    id: i64,
    symbol: Option<String>,
    asset_type: Option<&str>,
    date: Option<&str>,
    price: Option<f64>,
    quantity: Option<f64>,
    trade_type: Option<&str>,
    notes: Option<String>,
    tags: Option<String>,
    config_path: Option<&PathBuf>,
) -> ExitCode {
    let mut patch = TradePatch {
        symbol,
        entry_price: price,
        quantity,
        notes,
        tags,
        ..TradePatch::default()
    };
    if let Some(asset_type) = asset_type {
        patch.asset_type = match asset_type.parse() {
            Ok(a) => Some(a),
            Err(e) => return fail(&e),
        };
    }
    if let Some(date) = date {
        patch.entry_date = match parse_date("date", date) {
            Ok(d) => Some(d),
            Err(e) => return fail(&e),
        };
    }
    if let Some(trade_type) = trade_type {
        patch.trade_type = match trade_type.parse() {
            Ok(t) => Some(t),
            Err(e) => return fail(&e),
        };
    }

    if patch.is_empty() {
        eprintln!("Trade {id} unchanged (no fields given)");
        return ExitCode::SUCCESS;
    }

    let store = match open_store(config_path) {
        Ok(s) => s,
        Err(code) => return code,
    };
    let journal = TradingJournal::new(&store);

    match journal.update_trade(id, patch) {
        Ok(true) => {
            eprintln!("Trade {id} updated");
            ExitCode::SUCCESS
        }
        Ok(false) => {
            eprintln!("Trade {id} unchanged (no fields given)");
            ExitCode::SUCCESS
        }
        Err(e) => fail(&e),
    }
}

fn run_delete_trade(id: i64, config_path: Option<&PathBuf>) -> ExitCode {
    let store = match open_store(config_path) {
        Ok(s) => s,
        Err(code) => return code,
    };
    let journal = TradingJournal::new(&store);

    match journal.delete_trade(id) {
        Ok(_) => {
            eprintln!("Trade {id} deleted");
            ExitCode::SUCCESS
        }
        Err(e) => fail(&e),
    }
}

fn run_summary(config_path: Option<&PathBuf>) -> ExitCode {
    let store = match open_store(config_path) {
        Ok(s) => s,
        Err(code) => return code,
    };
    let journal = TradingJournal::new(&store);

    let summary = match journal.summary() {
        Ok(s) => s,
        Err(e) => return fail(&e),
    };

    println!("Total trades:   {}", summary.total_trades);
    println!("Total volume:   {:.2}", summary.total_volume);
    println!("Unique symbols: {}", summary.unique_symbols());

    if !summary.by_trade_type.is_empty() {
        println!("\nBy trade type:");
        for (trade_type, count) in &summary.by_trade_type {
            println!("  {:<6} {}", trade_type, count);
        }
    }
    if !summary.by_asset_type.is_empty() {
        println!("\nBy asset type:");
        for (asset_type, count) in &summary.by_asset_type {
            println!("  {:<10} {}", asset_type, count);
        }
    }
    ExitCode::SUCCESS
}

fn run_performance(symbol: &str, config_path: Option<&PathBuf>) -> ExitCode {
    let store = match open_store(config_path) {
        Ok(s) => s,
        Err(code) => return code,
    };
    let journal = TradingJournal::new(&store);

    match journal.symbol_performance(symbol) {
        Ok(Some(perf)) => {
            println!("{}:", perf.symbol);
            println!("  Trades:          {}", perf.total_trades);
            println!(
                "  Buys / Sells:    {} / {}",
                perf.buy_trades, perf.sell_trades
            );
            println!("  Qty bought:      {:.2}", perf.total_quantity_bought);
            println!("  Qty sold:        {:.2}", perf.total_quantity_sold);
            println!("  Avg buy price:   {:.2}", perf.average_buy_price);
            println!("  Avg sell price:  {:.2}", perf.average_sell_price);
            println!("  Total volume:    {:.2}", perf.total_volume);
            ExitCode::SUCCESS
        }
        Ok(None) => {
            eprintln!("No trades recorded for {}", symbol.to_uppercase());
            ExitCode::SUCCESS
        }
        Err(e) => fail(&e),
    }
}

fn run_add_expense(
    date: &str,
    category: String,
    amount: f64,
    note: String,
    config_path: Option<&PathBuf>,
) -> ExitCode {
    let date = match parse_date("date", date) {
        Ok(d) => d,
        Err(e) => return fail(&e),
    };
    let store = match open_store(config_path) {
        Ok(s) => s,
        Err(code) => return code,
    };
    let finance = PersonalFinance::new(&store);

    match finance.add_expense(NewExpense {
        date,
        category,
        amount,
        note,
    }) {
        Ok(id) => {
            eprintln!("Expense {id} recorded");
            println!("{id}");
            ExitCode::SUCCESS
        }
        Err(e) => fail(&e),
    }
}

fn run_add_saving(
    date: &str,
    source: String,
    amount: f64,
    note: String,
    config_path: Option<&PathBuf>,
) -> ExitCode {
    let date = match parse_date("date", date) {
        Ok(d) => d,
        Err(e) => return fail(&e),
    };
    let store = match open_store(config_path) {
        Ok(s) => s,
        Err(code) => return code,
    };
    let finance = PersonalFinance::new(&store);

    match finance.add_saving(NewSaving {
        date,
        source,
        amount,
        note,
    }) {
        Ok(id) => {
            eprintln!("Saving {id} recorded");
            println!("{id}");
            ExitCode::SUCCESS
        }
        Err(e) => fail(&e),
    }
}

fn run_net(from: Option<&str>, to: Option<&str>, config_path: Option<&PathBuf>) -> ExitCode {
    let range = match (from, to) {
        (None, None) => None,
        (Some(from), Some(to)) => {
            let start = match parse_date("from", from) {
                Ok(d) => d,
                Err(e) => return fail(&e),
            };
            let end = match parse_date("to", to) {
                Ok(d) => d,
                Err(e) => return fail(&e),
            };
            Some((start, end))
        }
        _ => {
            eprintln!("error: --from and --to must be given together");
            return ExitCode::from(4);
        }
    };

    let store = match open_store(config_path) {
        Ok(s) => s,
        Err(code) => return code,
    };
    let finance = PersonalFinance::new(&store);

    match finance.net_position(range) {
        Ok(net) => {
            println!("Savings:  {:>12.2}", net.total_savings);
            println!("Expenses: {:>12.2}", net.total_expenses);
            println!("Net:      {:>12.2}", net.net);
            ExitCode::SUCCESS
        }
        Err(e) => fail(&e),
    }
}

fn run_positions(prices: &[(String, f64)], config_path: Option<&PathBuf>) -> ExitCode {
    let store = match open_store(config_path) {
        Ok(s) => s,
        Err(code) => return code,
    };
    let book = PositionBook::new(&store);

    let price_map: HashMap<String, f64> = prices.iter().cloned().collect();
    let portfolio = match book.portfolio_pnl(&price_map) {
        Ok(p) => p,
        Err(e) => return fail(&e),
    };

    if portfolio.positions.is_empty() && portfolio.missing_prices.is_empty() {
        eprintln!("No open positions");
        return ExitCode::SUCCESS;
    }

    for pos in &portfolio.positions {
        let sign = if pos.unrealized_pnl >= 0.0 { "+" } else { "" };
        println!(
            "{:<10} {:>10.2} @ {:>10.2} -> {:>10.2}  {}{:.2} ({}{:.2}%)",
            pos.symbol,
            pos.quantity,
            pos.entry_price,
            pos.current_price,
            sign,
            pos.unrealized_pnl,
            sign,
            pos.pnl_pct,
        );
    }

    if !portfolio.positions.is_empty() {
        let sign = if portfolio.total_pnl >= 0.0 { "+" } else { "" };
        println!(
            "\nCost basis:   {:.2}\nMarket value: {:.2}\nTotal P&L:    {}{:.2} ({}{:.2}%)",
            portfolio.total_cost_basis,
            portfolio.total_market_value,
            sign,
            portfolio.total_pnl,
            sign,
            portfolio.total_pnl_pct,
        );
    }

    for symbol in &portfolio.missing_prices {
        eprintln!("warning: no price given for {symbol}");
    }
    ExitCode::SUCCESS
}

fn run_loan(amount: f64, rate: f64, years: u32) -> ExitCode {
    match simulation::loan_payment(amount, rate, years) {
        Ok(schedule) => {
            println!("Loan amount:     {:.2}", schedule.loan_amount);
            println!("Monthly payment: {:.2}", schedule.monthly_payment);
            println!("Payments:        {}", schedule.num_payments);
            println!("Total interest:  {:.2}", schedule.total_interest);
            println!("Total paid:      {:.2}", schedule.total_paid);
            ExitCode::SUCCESS
        }
        Err(e) => fail(&e),
    }
}

fn run_stats(config_path: Option<&PathBuf>) -> ExitCode {
    let store = match open_store(config_path) {
        Ok(s) => s,
        Err(code) => return code,
    };

    match store.stats() {
        Ok(stats) => {
            println!("trades:    {}", stats.trades);
            println!("positions: {}", stats.positions);
            println!("expenses:  {}", stats.expenses);
            println!("savings:   {}", stats.savings);
            ExitCode::SUCCESS
        }
        Err(e) => fail(&e),
    }
}
