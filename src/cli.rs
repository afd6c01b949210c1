//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use std::fmt;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::domain::aligner::Calendar;
use crate::domain::assess::{assess_portfolio, AssessConfig, Assessment};
use crate::domain::config_validation::{
    build_assess_config, data_source, validate_assess_config, validate_data_config,
};
use crate::domain::error::AssessError;
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::PriceDataPort;

#[derive(Parser, Debug)]
#[command(name = "assess", about = "Buy-and-hold portfolio performance evaluator")]
pub struct Cli {
    /// Log at debug level (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Values that replace or supply config file entries.
#[derive(clap::Args, Debug, Default, Clone)]
pub struct Overrides {
    /// First date, YYYY-MM-DD
    #[arg(long)]
    pub start: Option<String>,
    /// Last date, YYYY-MM-DD
    #[arg(long)]
    pub end: Option<String>,
    /// Allocation list, e.g. GOOG:0.2,AAPL:0.8
    #[arg(long)]
    pub symbols: Option<String>,
    #[arg(long)]
    pub start_value: Option<f64>,
    /// Directory of <SYMBOL>.csv price files
    #[arg(long)]
    pub data_dir: Option<PathBuf>,
    /// Reference symbol whose trading days define the calendar
    #[arg(long)]
    pub calendar: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Evaluate a portfolio and print its statistics
    Run {
        #[arg(short, long)]
        config: Option<PathBuf>,
        #[command(flatten)]
        overrides: Overrides,
        #[arg(long)]
        dry_run: bool,
    },
    /// List symbols available in the configured data source
    ListSymbols {
        #[arg(short, long)]
        config: Option<PathBuf>,
        #[arg(long)]
        data_dir: Option<PathBuf>,
    },
    /// Show data range for symbol(s)
    Info {
        #[arg(long)]
        symbol: Option<String>,
        #[arg(short, long)]
        config: Option<PathBuf>,
        #[arg(long)]
        data_dir: Option<PathBuf>,
    },
    /// Validate a configuration file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
}

pub fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Run {
            config,
            overrides,
            dry_run,
        } => run_assess(config.as_deref(), &overrides, dry_run),
        Command::ListSymbols { config, data_dir } => {
            run_list_symbols(config.as_deref(), data_dir.as_deref())
        }
        Command::Info {
            symbol,
            config,
            data_dir,
        } => run_info(symbol.as_deref(), config.as_deref(), data_dir.as_deref()),
        Command::Validate { config } => run_validate(&config),
    }
}

fn report(err: &AssessError) -> ExitCode {
    eprintln!("error: {err}");
    ExitCode::from(err)
}

/// Load the config file if given, otherwise start from an empty one.
pub fn load_config(path: Option<&Path>) -> Result<FileConfigAdapter, AssessError> {
    match path {
        Some(path) => {
            FileConfigAdapter::from_file(path).map_err(|e| AssessError::ConfigParse {
                file: path.display().to_string(),
                reason: e.to_string(),
            })
        }
        None => Ok(FileConfigAdapter::empty()),
    }
}

pub fn apply_overrides(config: &mut FileConfigAdapter, overrides: &Overrides) {
    if let Some(start) = &overrides.start {
        config.set("portfolio", "start_date", start);
    }
    if let Some(end) = &overrides.end {
        config.set("portfolio", "end_date", end);
    }
    if let Some(symbols) = &overrides.symbols {
        config.set("portfolio", "symbols", symbols);
    }
    if let Some(start_value) = overrides.start_value {
        config.set("portfolio", "start_value", &start_value.to_string());
    }
    if let Some(dir) = &overrides.data_dir {
        config.set("data", "source", "csv");
        config.set("data", "dir", &dir.display().to_string());
    }
    if let Some(reference) = &overrides.calendar {
        config.set("calendar", "reference", reference);
    }
}

pub fn open_data_port(config: &dyn ConfigPort) -> Result<Box<dyn PriceDataPort>, AssessError> {
    validate_data_config(config)?;
    match data_source(config).as_str() {
        "sqlite" => open_sqlite(config),
        _ => {
            let dir = config
                .get_non_empty("data", "dir")
                .ok_or_else(|| AssessError::ConfigMissing {
                    section: "data".into(),
                    key: "dir".into(),
                })?;
            info!(dir = %dir, "reading prices from CSV directory");
            Ok(Box::new(CsvAdapter::new(PathBuf::from(dir))))
        }
    }
}

#[cfg(feature = "sqlite")]
fn open_sqlite(config: &dyn ConfigPort) -> Result<Box<dyn PriceDataPort>, AssessError> {
    use crate::adapters::sqlite_adapter::SqliteAdapter;

    info!("reading prices from SQLite");
    Ok(Box::new(SqliteAdapter::from_config(config)?))
}

#[cfg(not(feature = "sqlite"))]
fn open_sqlite(_config: &dyn ConfigPort) -> Result<Box<dyn PriceDataPort>, AssessError> {
    Err(AssessError::ConfigInvalid {
        section: "data".into(),
        key: "source".into(),
        reason: "sqlite feature is required for source = sqlite".into(),
    })
}

fn run_assess(config_path: Option<&Path>, overrides: &Overrides, dry_run: bool) -> ExitCode {
    let mut adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(e) => return report(&e),
    };
    apply_overrides(&mut adapter, overrides);

    let assess_config = match build_assess_config(&adapter) {
        Ok(c) => c,
        Err(e) => return report(&e),
    };

    if dry_run {
        if let Err(e) = validate_data_config(&adapter) {
            return report(&e);
        }
        eprint!("{}", describe_config(&assess_config));
        eprintln!("\nDry run complete: configuration is valid");
        return ExitCode::SUCCESS;
    }

    let data_port = match open_data_port(&adapter) {
        Ok(p) => p,
        Err(e) => return report(&e),
    };

    match run_assess_pipeline(data_port.as_ref(), &assess_config) {
        Ok(summary) => {
            print!("{summary}");
            ExitCode::SUCCESS
        }
        Err(e) => report(&e),
    }
}

/// Assess the portfolio and render the console summary.
pub fn run_assess_pipeline(
    data_port: &dyn PriceDataPort,
    config: &AssessConfig,
) -> Result<String, AssessError> {
    let assessment = assess_portfolio(data_port, config)?;
    Ok(format_summary(config, &assessment))
}

pub fn describe_config(config: &AssessConfig) -> String {
    ConfigDescription(config).to_string()
}

struct ConfigDescription<'a>(&'a AssessConfig);

impl fmt::Display for ConfigDescription<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let config = self.0;
        writeln!(f, "Range:       {}", config.range)?;
        writeln!(f, "Start value: {}", config.start_value)?;
        writeln!(f, "Allocation:")?;
        for (symbol, weight) in config.allocation.iter() {
            writeln!(f, "  {symbol}: {weight}")?;
        }
        writeln!(f, "  (sum {})", config.allocation.weight_sum())?;
        match &config.calendar {
            Calendar::Intersection => writeln!(f, "Calendar:    common trading days")?,
            Calendar::Reference(symbol) => writeln!(f, "Calendar:    trading days of {symbol}")?,
        }
        writeln!(f, "Samples/yr:  {}", config.samples_per_year)
    }
}

fn format_statistic(value: Option<f64>) -> String {
    value.map_or_else(|| "undefined".to_string(), |v| v.to_string())
}

pub fn format_summary(config: &AssessConfig, assessment: &Assessment) -> String {
    Summary { config, assessment }.to_string()
}

struct Summary<'a> {
    config: &'a AssessConfig,
    assessment: &'a Assessment,
}

impl fmt::Display for Summary<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let stats = &self.assessment.statistics;
        let series = &self.assessment.series;
        let symbols: Vec<&str> = self.config.allocation.symbols().collect();
        let weights: Vec<String> = self
            .config
            .allocation
            .weights()
            .map(|w| w.to_string())
            .collect();

        if let (Some(first), Some(last)) = (series.first(), series.last()) {
            writeln!(f, "Start Date:            {}", first.date)?;
            writeln!(f, "End Date:              {}", last.date)?;
        }
        writeln!(f, "Trading Days:          {}", series.len())?;
        writeln!(f, "Symbols:               {}", symbols.join(", "))?;
        writeln!(f, "Allocations:           {}", weights.join(", "))?;
        writeln!(f, "Sharpe Ratio:          {}", format_statistic(stats.sharpe_ratio))?;
        writeln!(f, "Volatility:            {}", format_statistic(stats.stdev_daily_ret))?;
        writeln!(f, "Average Daily Return:  {}", format_statistic(stats.avg_daily_ret))?;
        writeln!(f, "Cumulative Return:     {}", stats.cum_ret)?;
        writeln!(f, "Start Value:           {}", self.config.start_value)?;
        writeln!(f, "End Value:             {:.2}", stats.end_value)
    }
}

fn data_only_config(
    config_path: Option<&Path>,
    data_dir: Option<&Path>,
) -> Result<FileConfigAdapter, AssessError> {
    let mut adapter = load_config(config_path)?;
    if let Some(dir) = data_dir {
        apply_overrides(
            &mut adapter,
            &Overrides {
                data_dir: Some(dir.to_path_buf()),
                ..Overrides::default()
            },
        );
    }
    Ok(adapter)
}

fn run_list_symbols(config_path: Option<&Path>, data_dir: Option<&Path>) -> ExitCode {
    let symbols = match data_only_config(config_path, data_dir)
        .and_then(|c| open_data_port(&c))
        .and_then(|port| port.list_symbols())
    {
        Ok(s) => s,
        Err(e) => return report(&e),
    };

    if symbols.is_empty() {
        eprintln!("No symbols found");
    } else {
        for symbol in &symbols {
            println!("{}", symbol);
        }
        eprintln!("{} symbols found", symbols.len());
    }
    ExitCode::SUCCESS
}

/// Symbols to describe: the explicit one, else the configured allocation,
/// else everything the source holds.
pub fn resolve_symbols(
    symbol: Option<&str>,
    config: &dyn ConfigPort,
    data_port: &dyn PriceDataPort,
) -> Result<Vec<String>, AssessError> {
    if let Some(s) = symbol {
        return Ok(vec![s.trim().to_uppercase()]);
    }
    if let Some(raw) = config.get_non_empty("portfolio", "symbols") {
        let allocation = crate::domain::allocation::parse_allocation(&raw)?;
        return Ok(allocation.symbols().map(str::to_string).collect());
    }
    data_port.list_symbols()
}

/// One line per symbol: row count and date span, or `no data found`.
/// Stops at the first symbol whose range cannot be read.
pub fn format_data_ranges(
    symbols: &[String],
    data_port: &dyn PriceDataPort,
) -> Result<String, AssessError> {
    let mut out = String::new();
    for s in symbols {
        let line = match data_port.get_data_range(s)? {
            Some((min_date, max_date, count)) => {
                format!("{}: {} rows, {} to {}\n", s, count, min_date, max_date)
            }
            None => format!("{}: no data found\n", s),
        };
        out.push_str(&line);
    }
    Ok(out)
}

fn run_info(symbol: Option<&str>, config_path: Option<&Path>, data_dir: Option<&Path>) -> ExitCode {
    let config = match data_only_config(config_path, data_dir) {
        Ok(c) => c,
        Err(e) => return report(&e),
    };
    let data_port = match open_data_port(&config) {
        Ok(p) => p,
        Err(e) => return report(&e),
    };
    let ranges = resolve_symbols(symbol, &config, data_port.as_ref())
        .and_then(|symbols| format_data_ranges(&symbols, data_port.as_ref()));

    match ranges {
        Ok(text) => {
            print!("{text}");
            ExitCode::SUCCESS
        }
        Err(e) => report(&e),
    }
}

fn run_validate(config_path: &Path) -> ExitCode {
    eprintln!("Validating config: {}", config_path.display());
    let adapter = match load_config(Some(config_path)) {
        Ok(a) => a,
        Err(e) => return report(&e),
    };

    if let Err(e) = validate_data_config(&adapter) {
        return report(&e);
    }
    if let Err(e) = validate_assess_config(&adapter) {
        return report(&e);
    }

    eprintln!("Configuration is valid.");
    ExitCode::SUCCESS
}
