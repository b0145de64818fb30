use clap::Parser;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::info;
use tracing_subscriber::EnvFilter;
use trendbot::config::BotConfig;
use trendbot::exchange::PaperExchange;
use trendbot::execution::{PositionLifecycleManager, TradingMode};
use trendbot::journal::JsonSignalStore;
use trendbot::notify::LogNotifier;
use trendbot::risk::RiskEngine;
use trendbot::scheduler::TradingLoop;
use trendbot::trend::MultiTimeframeAligner;

#[derive(Parser, Debug)]
#[command(name = "trendbot", about = "Multi-timeframe trend-following trading bot")]
struct Cli {
    /// Trading pair, e.g. BTC/USDT
    #[arg(long)]
    symbol: Option<String>,

    /// Seconds between analysis cycles
    #[arg(long)]
    interval: Option<u64>,

    /// Directory for the latest/history signal files
    #[arg(long)]
    output: Option<String>,

    /// Seed for the paper exchange's market
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Starting paper equity in quote currency
    #[arg(long, default_value_t = 10_000.0)]
    equity: f64,

    /// Analyze and journal signals without placing orders
    #[arg(long)]
    analysis_only: bool,
}

fn setup_logging() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("trendbot=info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    setup_logging();

    let cli = Cli::parse();
    let mut config = BotConfig::load()?;
    if let Some(symbol) = cli.symbol {
        config.symbol = symbol;
    }
    if let Some(interval) = cli.interval {
        config.check_interval_secs = interval;
    }
    if let Some(output) = cli.output {
        config.output_dir = output;
    }

    info!(
        symbol = %config.symbol,
        long = %config.long_timeframe,
        mid = %config.mid_timeframe,
        short = %config.short_timeframe,
        "starting trendbot"
    );

    let exchange = Arc::new(PaperExchange::new(cli.seed, cli.equity));
    let risk = RiskEngine::new(config.risk.clone());
    let aligner = MultiTimeframeAligner::new(config.symbol.clone(), risk.clone());

    let mode = if cli.analysis_only {
        TradingMode::AnalysisOnly
    } else {
        TradingMode::Full
    };
    let lifecycle = PositionLifecycleManager::new(risk, Arc::new(LogNotifier))
        .with_mode(mode)
        .with_consolidation_lookback(config.consolidation_lookback);

    let store = JsonSignalStore::new(&config.output_dir)?;
    let mut trading_loop = TradingLoop::new(
        config,
        exchange,
        aligner,
        lifecycle,
        Some(store),
    );

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let handle = tokio::spawn(async move {
        trading_loop.run(shutdown_rx).await;
    });

    tokio::signal::ctrl_c().await?;
    info!("shutdown requested");
    shutdown_tx.send(true).ok();
    handle.await?;
    Ok(())
}
