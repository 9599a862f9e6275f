//! CLI integration tests for config loading and store wiring.
//!
//! Tests cover:
//! - Config parsing (load_config) with real INI files on disk
//! - Store construction from config (SqliteAdapter::from_config)
//! - Persistence across adapter reopens against a file-backed database
//! - Price pair parsing for the positions command

mod common;

use common::*;
use std::io::Write;
use tradelog::adapters::file_config_adapter::FileConfigAdapter;
use tradelog::adapters::sqlite_adapter::SqliteAdapter;
use tradelog::cli;
use tradelog::domain::journal::TradingJournal;
use tradelog::domain::trade::TradeType;
use tradelog::ports::config_port::ConfigPort;

fn write_temp_ini(content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

mod config_loading {
    use super::*;

    #[test]
    fn load_config_reads_database_section() {
        let file = write_temp_ini("[database]\npath = journal.db\npool_size = 2\n");
        let config = cli::load_config(&file.path().to_path_buf()).unwrap();
        assert_eq!(
            config.get_string("database", "path"),
            Some("journal.db".to_string())
        );
        assert_eq!(config.get_int("database", "pool_size", 4), 2);
    }

    #[test]
    fn load_config_missing_file_fails() {
        let path = std::path::PathBuf::from("/nonexistent/tradelog.ini");
        assert!(cli::load_config(&path).is_err());
    }
}

mod store_wiring {
    use super::*;

    #[test]
    fn from_config_opens_file_backed_store() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("journal.db");
        let ini = format!("[database]\npath = {}\n", db_path.display());
        let config = FileConfigAdapter::from_string(&ini).unwrap();

        let store = SqliteAdapter::from_config(&config).unwrap();
        store.initialize_schema().unwrap();
        assert!(db_path.exists());
    }

    #[test]
    fn trades_persist_across_reopens() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("journal.db");

        let id = {
            let store = SqliteAdapter::open(&db_path).unwrap();
            store.initialize_schema().unwrap();
            let journal = TradingJournal::new(&store);
            journal
                .add_trade(make_trade("AAPL", TradeType::Buy, 150.0, 10.0))
                .unwrap()
        };

        let store = SqliteAdapter::open(&db_path).unwrap();
        store.initialize_schema().unwrap();
        let journal = TradingJournal::new(&store);
        let trade = journal.get_trade(id).unwrap().unwrap();
        assert_eq!(trade.symbol, "AAPL");
        assert_eq!(trade.entry_date, date(2024, 1, 20));
    }

    #[test]
    fn open_store_uses_config_path() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("from_ini.db");
        let ini = format!("[database]\npath = {}\n", db_path.display());
        let file = write_temp_ini(&ini);

        let store = cli::open_store(Some(&file.path().to_path_buf())).unwrap();
        let journal = TradingJournal::new(&store);
        journal
            .add_trade(make_trade("MSFT", TradeType::Buy, 400.0, 2.0))
            .unwrap();
        assert!(db_path.exists());
        assert_eq!(store.stats().unwrap().trades, 1);
    }
}

mod price_pairs {
    use super::*;

    #[test]
    fn parses_and_normalizes() {
        assert_eq!(
            cli::parse_price_pair("msft = 402.5").unwrap(),
            ("MSFT".to_string(), 402.5)
        );
    }

    #[test]
    fn rejects_malformed_pairs() {
        assert!(cli::parse_price_pair("MSFT").is_err());
        assert!(cli::parse_price_pair("MSFT=").is_err());
        assert!(cli::parse_price_pair("MSFT=0").is_err());
    }
}
