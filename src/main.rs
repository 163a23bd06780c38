use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use folio::config::Config;
use folio::import::parse_holdings_csv;
use folio::metrics::HoldingMetrics;
use folio::models::StoredHolding;
use folio::sources::create_sources;
use folio::storage::{self, HoldingsStore, JsonFileStore};
use folio::sync::sync_sources;

#[derive(Parser)]
#[command(name = "folio")]
#[command(about = "Portfolio holdings toolkit")]
struct Cli {
    /// Path to config file
    #[arg(short, long, default_value = "folio.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List stored holdings
    List,
    /// Add or replace a holding
    Add {
        symbol: String,
        quantity: f64,
        avg_price: f64,
    },
    /// Remove a holding by symbol
    Remove { symbol: String },
    /// Import holdings from a CSV file, replacing the stored collection
    Import { file: PathBuf },
    /// Fetch every enabled source and print the merged positions
    Sync,
    /// Show current configuration
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let config = Config::load_or_default(&cli.config)?;
    let config_dir = cli
        .config
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."));
    let data_dir = config.resolve_data_dir(&config_dir);
    let store = JsonFileStore::new(Config::holdings_path(&data_dir));

    match cli.command {
        Command::List => list(&store).await?,
        Command::Add {
            symbol,
            quantity,
            avg_price,
        } => add(&store, &symbol, quantity, avg_price).await?,
        Command::Remove { symbol } => remove(&store, &symbol).await?,
        Command::Import { file } => import(&store, &file).await?,
        Command::Sync => sync(&config).await?,
        Command::Config => {
            println!("Config file: {}", cli.config.display());
            println!("Data directory: {}", data_dir.display());
            println!("Holdings file: {}", store.path().display());
            println!(
                "Sources: cmc {}, xtb {}",
                if config.sources.cmc.enabled { "on" } else { "off" },
                if config.sources.xtb.enabled { "on" } else { "off" },
            );
        }
    }

    Ok(())
}

async fn list(store: &JsonFileStore) -> Result<()> {
    let holdings = store.load().await?;

    if holdings.is_empty() {
        println!("No holdings stored.");
        return Ok(());
    }

    println!("{:<8} {:>12} {:>12} {:>14}", "SYMBOL", "QUANTITY", "AVG PRICE", "INVESTED");
    for holding in &holdings {
        println!(
            "{:<8} {:>12} {:>12.2} {:>14.2}",
            holding.symbol,
            holding.quantity,
            holding.avg_price,
            holding.quantity * holding.avg_price,
        );
    }

    Ok(())
}

async fn add(store: &JsonFileStore, symbol: &str, quantity: f64, avg_price: f64) -> Result<()> {
    let holding = StoredHolding::normalized(symbol, quantity, avg_price);
    if !holding.is_valid() {
        anyhow::bail!(
            "Invalid holding: symbol must be non-empty, quantity > 0, avg price >= 0"
        );
    }

    let symbol = holding.symbol.clone();
    let holdings = storage::upsert(store, holding).await?;
    println!("Saved {} ({} holdings stored).", symbol, holdings.len());

    Ok(())
}

async fn remove(store: &JsonFileStore, symbol: &str) -> Result<()> {
    let (holdings, removed) = storage::remove(store, symbol).await?;

    if removed {
        println!("Removed {} ({} holdings left).", symbol.to_uppercase(), holdings.len());
    } else {
        println!("No holding named {}.", symbol.to_uppercase());
    }

    Ok(())
}

async fn import(store: &JsonFileStore, file: &PathBuf) -> Result<()> {
    let content = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read file: {}", file.display()))?;

    let imported = parse_holdings_csv(&content);
    if imported.is_empty() {
        anyhow::bail!("No importable rows found in {}", file.display());
    }

    let stored: Vec<StoredHolding> = imported
        .iter()
        .map(|h| StoredHolding::normalized(&h.symbol, h.quantity, h.avg_price))
        .collect();
    store.replace(&stored).await?;

    println!("Imported {} holdings from {}.", stored.len(), file.display());
    Ok(())
}

async fn sync(config: &Config) -> Result<()> {
    let sources = create_sources(&config.sources);
    if sources.is_empty() {
        println!("No sources enabled. Enable one under [sources] in the config file.");
        return Ok(());
    }

    let outcome = sync_sources(&sources).await;

    if !outcome.merged.is_empty() {
        println!(
            "{:<8} {:>12} {:>12} {:>12} {:>9}  {}",
            "SYMBOL", "QUANTITY", "AVG PRICE", "PRICE", "PNL %", "SOURCES"
        );
        for merged in &outcome.merged {
            let metrics = HoldingMetrics::for_merged(merged);
            let sources: Vec<&str> = merged.sources.iter().map(|s| s.as_str()).collect();
            println!(
                "{:<8} {:>12} {:>12.2} {:>12.2} {:>8.2}%  {}",
                merged.symbol,
                merged.quantity,
                merged.avg_price,
                merged.current_price,
                metrics.pnl_pct,
                sources.join(","),
            );
        }
    } else {
        println!("No holdings returned by the enabled sources.");
    }

    for error in &outcome.errors {
        eprintln!("warning: {error}");
    }

    Ok(())
}
