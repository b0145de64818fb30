use std::sync::Arc;
use tokio::sync::watch;
use trendbot::config::BotConfig;
use trendbot::exchange::PaperExchange;
use trendbot::execution::{PositionLifecycleManager, TradingMode};
use trendbot::journal::JsonSignalStore;
use trendbot::notify::LogNotifier;
use trendbot::risk::RiskEngine;
use trendbot::scheduler::TradingLoop;
use trendbot::trend::MultiTimeframeAligner;

fn build_loop(config: BotConfig, store: Option<JsonSignalStore>) -> TradingLoop {
    build_loop_with_mode(config, store, TradingMode::Full)
}

fn build_loop_with_mode(
    config: BotConfig,
    store: Option<JsonSignalStore>,
    mode: TradingMode,
) -> TradingLoop {
    let exchange = Arc::new(PaperExchange::new(42, 10_000.0));
    let risk = RiskEngine::new(config.risk.clone());
    let aligner = MultiTimeframeAligner::new(config.symbol.clone(), risk.clone());
    let lifecycle =
        PositionLifecycleManager::new(risk, Arc::new(LogNotifier)).with_mode(mode);
    TradingLoop::new(config, exchange, aligner, lifecycle, store)
}

#[tokio::test]
async fn paper_cycle_populates_journal() {
    let config = BotConfig::default();
    let mut trading_loop = build_loop(config, None);

    trading_loop.run_cycle().await.unwrap();

    let journal = trading_loop.journal();
    assert!(!journal.is_empty());
    let latest = journal.latest().expect("cycle should emit a signal");
    assert_eq!(latest.symbol, "BTC/USDT");
    assert!(latest.current_price > 0.0);
    assert!(!latest.market_state.is_empty());
}

#[tokio::test]
async fn repeated_cycles_accumulate_history() {
    let config = BotConfig::default();
    let mut trading_loop = build_loop(config, None);

    for _ in 0..3 {
        trading_loop.run_cycle().await.unwrap();
    }
    // At least the three signals; fills may add more entries
    assert!(trading_loop.journal().len() >= 3);
}

#[tokio::test]
async fn store_writes_latest_and_history() {
    let dir = tempfile::tempdir().unwrap();
    let config = BotConfig::default();
    let store = JsonSignalStore::new(dir.path()).unwrap();
    let mut trading_loop = build_loop(config, Some(store));

    trading_loop.run_cycle().await.unwrap();

    let latest = dir.path().join("BTC_USDT_latest.json");
    let history = dir.path().join("BTC_USDT_history.json");
    assert!(latest.exists());
    assert!(history.exists());

    let parsed: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(latest).unwrap()).unwrap();
    assert_eq!(parsed["symbol"], "BTC/USDT");
    assert!(parsed["market_state"].is_string());
}

#[tokio::test]
async fn status_file_reflects_trading_mode() {
    let dir = tempfile::tempdir().unwrap();
    let config = BotConfig::default();
    let store = JsonSignalStore::new(dir.path()).unwrap();
    let mut trading_loop =
        build_loop_with_mode(config, Some(store), TradingMode::AnalysisOnly);

    trading_loop.run_cycle().await.unwrap();

    let status: serde_json::Value = serde_json::from_str(
        &std::fs::read_to_string(dir.path().join("BTC_USDT_status.json")).unwrap(),
    )
    .unwrap();
    assert_eq!(status["mode"], "analysis_only");
}

#[tokio::test]
async fn shutdown_stops_loop() {
    let config = BotConfig {
        check_interval_secs: 3600,
        ..BotConfig::default()
    };
    let mut trading_loop = build_loop(config, None);

    let (tx, rx) = watch::channel(false);
    tx.send(true).unwrap();
    // A pre-signalled shutdown returns promptly instead of sleeping out
    // the hour-long interval.
    tokio::time::timeout(std::time::Duration::from_secs(30), trading_loop.run(rx))
        .await
        .expect("loop should exit on shutdown");
}
