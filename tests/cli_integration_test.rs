//! CLI integration tests for the assess command orchestration.
//!
//! Tests cover:
//! - Argument parsing for each subcommand
//! - Config loading and command-line overrides
//! - Data port selection from config
//! - Symbol resolution and data-range listing for the info command
//! - Dry-run style validation with real INI files on disk
//! - Full pipeline with MockPriceDataPort and the rendered summary

mod common;

use assess::adapters::file_config_adapter::FileConfigAdapter;
use assess::cli::{self, Cli, Command, Overrides};
use assess::domain::aligner::Calendar;
use assess::domain::config_validation::{build_assess_config, validate_assess_config};
use assess::domain::error::AssessError;
use assess::ports::config_port::ConfigPort;
use clap::Parser;
use common::*;
use std::io::Write;
use std::path::PathBuf;

fn write_temp_ini(content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

const VALID_INI: &str = r#"
[data]
source = csv
dir = ./data

[portfolio]
start_date = 2010-01-01
end_date = 2010-12-31
symbols = GOOG:0.2, AAPL:0.3, GLD:0.4, XOM:0.1
start_value = 1000000
"#;

mod argument_parsing {
    use super::*;

    #[test]
    fn run_with_overrides() {
        let cli = Cli::try_parse_from([
            "assess",
            "run",
            "--start",
            "2010-06-01",
            "--symbols",
            "GOOG:1.0",
            "--start-value",
            "5000",
            "--dry-run",
        ])
        .unwrap();

        match cli.command {
            Command::Run {
                config,
                overrides,
                dry_run,
            } => {
                assert!(config.is_none());
                assert!(dry_run);
                assert_eq!(overrides.start.as_deref(), Some("2010-06-01"));
                assert_eq!(overrides.symbols.as_deref(), Some("GOOG:1.0"));
                assert_eq!(overrides.start_value, Some(5000.0));
                assert!(overrides.end.is_none());
            }
            other => panic!("expected Run, got {other:?}"),
        }
    }

    #[test]
    fn verbose_is_global() {
        let cli = Cli::try_parse_from(["assess", "list-symbols", "-v", "--data-dir", "/tmp"])
            .unwrap();
        assert!(cli.verbose);
        assert!(matches!(
            cli.command,
            Command::ListSymbols { data_dir: Some(_), .. }
        ));
    }

    #[test]
    fn validate_requires_config() {
        assert!(Cli::try_parse_from(["assess", "validate"]).is_err());
        let cli = Cli::try_parse_from(["assess", "validate", "-c", "assess.ini"]).unwrap();
        assert!(matches!(cli.command, Command::Validate { config } if config == PathBuf::from("assess.ini")));
    }

    #[test]
    fn info_symbol() {
        let cli = Cli::try_parse_from(["assess", "info", "--symbol", "spy"]).unwrap();
        assert!(matches!(cli.command, Command::Info { symbol: Some(s), .. } if s == "spy"));
    }
}

mod config_loading {
    use super::*;

    #[test]
    fn load_config_from_file() {
        let file = write_temp_ini(VALID_INI);
        let adapter = cli::load_config(Some(file.path())).unwrap();
        assert_eq!(adapter.get_string("data", "dir").as_deref(), Some("./data"));
    }

    #[test]
    fn load_config_missing_file_fails() {
        let result = cli::load_config(Some(std::path::Path::new("/nonexistent/assess.ini")));
        match result {
            Err(AssessError::ConfigParse { file, .. }) => {
                assert_eq!(file, "/nonexistent/assess.ini");
            }
            Err(other) => panic!("expected ConfigParse, got: {other}"),
            Ok(_) => panic!("expected error, got Ok"),
        }
    }

    #[test]
    fn load_config_none_is_empty() {
        let adapter = cli::load_config(None).unwrap();
        assert!(adapter.get_string("portfolio", "symbols").is_none());
    }

    #[test]
    fn overrides_replace_file_values() {
        let mut adapter = FileConfigAdapter::from_string(VALID_INI).unwrap();
        cli::apply_overrides(
            &mut adapter,
            &Overrides {
                start: Some("2010-06-01".into()),
                symbols: Some("GLD:1.0".into()),
                start_value: Some(250.5),
                calendar: Some("spy".into()),
                ..Overrides::default()
            },
        );

        let config = build_assess_config(&adapter).unwrap();
        assert_eq!(config.range.start_date(), date(2010, 6, 1));
        assert_eq!(config.range.end_date(), date(2010, 12, 31));
        assert_eq!(config.allocation.symbols().collect::<Vec<_>>(), vec!["GLD"]);
        assert_eq!(config.start_value, 250.5);
        assert_eq!(config.calendar, Calendar::Reference("SPY".into()));
    }

    #[test]
    fn overrides_alone_build_a_config() {
        let mut adapter = FileConfigAdapter::empty();
        cli::apply_overrides(
            &mut adapter,
            &Overrides {
                start: Some("2010-01-01".into()),
                end: Some("2010-01-31".into()),
                symbols: Some("axp:0.9,ibm:0.1".into()),
                start_value: Some(1_000_000.0),
                data_dir: Some(PathBuf::from("/data/prices")),
                calendar: None,
            },
        );

        let config = build_assess_config(&adapter).unwrap();
        assert_eq!(config.allocation.symbols().collect::<Vec<_>>(), vec!["AXP", "IBM"]);
        assert_eq!(adapter.get_string("data", "source").as_deref(), Some("csv"));
        assert_eq!(adapter.get_string("data", "dir").as_deref(), Some("/data/prices"));
    }

    #[test]
    fn missing_start_value_is_reported() {
        let ini = VALID_INI.replace("start_value = 1000000", "");
        let adapter = FileConfigAdapter::from_string(&ini).unwrap();
        let err = build_assess_config(&adapter).unwrap_err();
        assert!(matches!(err, AssessError::ConfigMissing { ref key, .. } if key == "start_value"));
        assert_eq!(err.exit_status(), 2);
    }

    #[test]
    fn bad_allocation_is_reported() {
        let ini = VALID_INI.replace("XOM:0.1", "XOM");
        let adapter = FileConfigAdapter::from_string(&ini).unwrap();
        let err = validate_assess_config(&adapter).unwrap_err();
        assert!(matches!(err, AssessError::ConfigInvalid { key, .. } if key == "symbols"));
    }
}

mod data_source {
    use super::*;

    #[test]
    fn csv_source_lists_directory() {
        let dir = tempfile::TempDir::new().unwrap();
        std::fs::write(dir.path().join("SPY.csv"), "Date,Adj Close\n2010-01-04,100\n").unwrap();
        std::fs::write(dir.path().join("GLD.csv"), "Date,Adj Close\n2010-01-04,50\n").unwrap();

        let mut adapter = FileConfigAdapter::empty();
        cli::apply_overrides(
            &mut adapter,
            &Overrides {
                data_dir: Some(dir.path().to_path_buf()),
                ..Overrides::default()
            },
        );
        let port = cli::open_data_port(&adapter).unwrap();
        assert_eq!(port.list_symbols().unwrap(), vec!["GLD", "SPY"]);
    }

    #[test]
    fn csv_source_requires_dir() {
        let adapter = FileConfigAdapter::from_string("[data]\nsource = csv\n").unwrap();
        let err = cli::open_data_port(&adapter).err().unwrap();
        assert!(matches!(err, AssessError::ConfigMissing { key, .. } if key == "dir"));
    }

    #[test]
    fn unknown_source_is_invalid() {
        let adapter = FileConfigAdapter::from_string("[data]\nsource = parquet\n").unwrap();
        let err = cli::open_data_port(&adapter).err().unwrap();
        assert!(matches!(err, AssessError::ConfigInvalid { key, .. } if key == "source"));
    }

    #[cfg(feature = "sqlite")]
    #[test]
    fn sqlite_source_opens_database_file() {
        use assess::adapters::sqlite_adapter::SqliteAdapter;

        let dir = tempfile::TempDir::new().unwrap();
        let db_path = dir.path().join("prices.db");
        let ini = format!("[data]\nsource = sqlite\npath = {}\n", db_path.display());
        let adapter = FileConfigAdapter::from_string(&ini).unwrap();

        let seeded = SqliteAdapter::from_config(&adapter).unwrap();
        seeded.initialize_schema().unwrap();
        seeded
            .insert_bars(&weekday_bars("XOM", "2010-01-04", &[64.55, 65.41]))
            .unwrap();

        let port = cli::open_data_port(&adapter).unwrap();
        assert_eq!(
            port.get_data_range("XOM").unwrap(),
            Some((date(2010, 1, 4), date(2010, 1, 5), 2))
        );
    }
}

mod symbol_resolution {
    use super::*;

    #[test]
    fn explicit_symbol_wins() {
        let adapter = FileConfigAdapter::from_string(VALID_INI).unwrap();
        let symbols = cli::resolve_symbols(Some(" gld "), &adapter, &sample_port()).unwrap();
        assert_eq!(symbols, vec!["GLD"]);
    }

    #[test]
    fn allocation_symbols_in_order() {
        let adapter = FileConfigAdapter::from_string(VALID_INI).unwrap();
        let symbols = cli::resolve_symbols(None, &adapter, &sample_port()).unwrap();
        assert_eq!(symbols, vec!["GOOG", "AAPL", "GLD", "XOM"]);
    }

    #[test]
    fn falls_back_to_all_symbols() {
        let adapter = FileConfigAdapter::empty();
        let symbols = cli::resolve_symbols(None, &adapter, &sample_port()).unwrap();
        assert_eq!(symbols, vec!["AAPL", "GLD", "GOOG", "XOM"]);
    }
}

mod data_ranges {
    use super::*;

    #[test]
    fn one_line_per_symbol() {
        let symbols = vec!["GLD".to_string(), "HNZ".to_string()];
        let text = cli::format_data_ranges(&symbols, &sample_port()).unwrap();
        assert_eq!(
            text,
            "GLD: 260 rows, 2010-01-04 to 2010-12-31\nHNZ: no data found\n"
        );
    }

    #[test]
    fn failed_query_returns_its_error() {
        let port = sample_port().with_error("XOM", "disk I/O error");
        let symbols = vec!["GLD".to_string(), "XOM".to_string()];
        let err = cli::format_data_ranges(&symbols, &port).unwrap_err();
        assert!(matches!(&err, AssessError::DataSource { reason } if reason == "disk I/O error"));
        assert_eq!(err.exit_status(), 3);
    }
}

mod dry_run {
    use super::*;

    #[test]
    fn valid_config_describes_allocation() {
        let file = write_temp_ini(VALID_INI);
        let adapter = cli::load_config(Some(file.path())).unwrap();
        let config = build_assess_config(&adapter).unwrap();

        let description = cli::describe_config(&config);
        assert!(description.contains("2010-01-01 to 2010-12-31"));
        assert!(description.contains("GOOG: 0.2"));
        assert!(description.contains("common trading days"));
        assert!(description.ends_with("Samples/yr:  252\n"));
    }

    #[test]
    fn reversed_dates_fail() {
        let file = write_temp_ini(&VALID_INI.replace("2010-12-31", "2009-12-31"));
        let adapter = cli::load_config(Some(file.path())).unwrap();
        let err = build_assess_config(&adapter).unwrap_err();
        assert!(matches!(err, AssessError::ConfigInvalid { key, .. } if key == "start_date"));
    }
}

mod pipeline_mock {
    use super::*;

    #[test]
    fn summary_lists_statistics() {
        let adapter = FileConfigAdapter::from_string(VALID_INI).unwrap();
        let config = build_assess_config(&adapter).unwrap();

        let summary = cli::run_assess_pipeline(&sample_port(), &config).unwrap();

        for label in [
            "Start Date:",
            "End Date:",
            "Sharpe Ratio:",
            "Volatility:",
            "Average Daily Return:",
            "Cumulative Return:",
            "End Value:",
        ] {
            assert!(summary.contains(label), "missing {label} in:\n{summary}");
        }
        assert!(summary.contains("GOOG, AAPL, GLD, XOM"));
        assert!(summary.contains("2010-01-04"));
        assert!(!summary.contains("undefined"));
    }

    #[test]
    fn single_day_prints_undefined() {
        let ini = VALID_INI.replace("2010-12-31", "2010-01-04");
        let adapter = FileConfigAdapter::from_string(&ini).unwrap();
        let config = build_assess_config(&adapter).unwrap();

        let summary = cli::run_assess_pipeline(&sample_port(), &config).unwrap();
        assert!(summary.contains("Sharpe Ratio:          undefined"));
        assert!(summary.contains("End Value:             1000000.00"));
    }

    #[test]
    fn unknown_symbol_fails_with_unavailable() {
        let ini = VALID_INI.replace("XOM:0.1", "HNZ:0.1");
        let adapter = FileConfigAdapter::from_string(&ini).unwrap();
        let config = build_assess_config(&adapter).unwrap();

        let err = cli::run_assess_pipeline(&sample_port(), &config).unwrap_err();
        assert!(matches!(&err, AssessError::DataUnavailable { symbol } if symbol == "HNZ"));
        assert_eq!(err.exit_status(), 5);
    }

    #[test]
    fn csv_directory_end_to_end() {
        let dir = tempfile::TempDir::new().unwrap();
        std::fs::write(
            dir.path().join("AAA.csv"),
            "Date,Adj Close\n2010-01-06,12\n2010-01-05,11\n2010-01-04,10\n",
        )
        .unwrap();

        let mut adapter = FileConfigAdapter::empty();
        cli::apply_overrides(
            &mut adapter,
            &Overrides {
                start: Some("2010-01-01".into()),
                end: Some("2010-01-31".into()),
                symbols: Some("AAA:1.0".into()),
                start_value: Some(100.0),
                data_dir: Some(dir.path().to_path_buf()),
                calendar: None,
            },
        );
        let config = build_assess_config(&adapter).unwrap();
        let port = cli::open_data_port(&adapter).unwrap();

        let summary = cli::run_assess_pipeline(port.as_ref(), &config).unwrap();
        assert!(summary.contains("Trading Days:          3"));
        assert!(summary.contains("End Value:             120.00"));
    }
}
