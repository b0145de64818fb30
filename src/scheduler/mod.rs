use crate::config::BotConfig;
use crate::exchange::ExchangeClient;
use crate::execution::PositionLifecycleManager;
use crate::journal::store::BotStatus;
use crate::journal::{JsonSignalStore, SignalJournal};
use crate::trend::MultiTimeframeAligner;
use crate::Result;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::watch;
use tracing::{error, info, warn};

/// The polling loop: every interval, fetch fresh candles for the three
/// timeframes, fuse them into a composite signal, journal and persist
/// it, and drive the position lifecycle. Sleeps for the interval minus
/// the time the cycle itself took.
pub struct TradingLoop {
    config: BotConfig,
    exchange: Arc<dyn ExchangeClient>,
    aligner: MultiTimeframeAligner,
    lifecycle: PositionLifecycleManager,
    journal: SignalJournal,
    store: Option<JsonSignalStore>,
}

impl TradingLoop {
    pub fn new(
        config: BotConfig,
        exchange: Arc<dyn ExchangeClient>,
        aligner: MultiTimeframeAligner,
        lifecycle: PositionLifecycleManager,
        store: Option<JsonSignalStore>,
    ) -> Self {
        let journal = SignalJournal::new(config.symbol.clone());
        Self {
            config,
            exchange,
            aligner,
            lifecycle,
            journal,
            store,
        }
    }

    pub fn journal(&self) -> &SignalJournal {
        &self.journal
    }

    pub fn lifecycle(&self) -> &PositionLifecycleManager {
        &self.lifecycle
    }

    /// One fetch-analyze-act cycle.
    pub async fn run_cycle(&mut self) -> Result<()> {
        let limit = self.config.candle_limit;
        let long = self
            .exchange
            .fetch_ohlcv(self.config.long_timeframe, limit)
            .await?;
        let mid = self
            .exchange
            .fetch_ohlcv(self.config.mid_timeframe, limit)
            .await?;
        let short = self
            .exchange
            .fetch_ohlcv(self.config.short_timeframe, limit)
            .await?;
        let equity = self.exchange.fetch_equity().await?;

        let signal = self.aligner.align(&long, &mid, &short, equity)?;
        self.journal.record_signal(signal.clone());

        self.lifecycle
            .process_cycle(self.exchange.as_ref(), &signal, &short, &mut self.journal)
            .await?;

        if let Some(store) = &self.store {
            store.save(&self.journal)?;
            let status = BotStatus {
                mode: self.lifecycle.mode(),
                position: self.lifecycle.position_status(signal.current_price),
            };
            store.save_status(self.journal.symbol(), &status)?;
        }
        Ok(())
    }

    /// Run until the shutdown channel flips to true. A failed cycle is
    /// logged and the loop carries on; the loop itself never crashes.
    pub async fn run(&mut self, mut shutdown: watch::Receiver<bool>) {
        let interval = Duration::from_secs(self.config.check_interval_secs);
        info!(
            symbol = %self.config.symbol,
            interval_secs = self.config.check_interval_secs,
            "trading loop started"
        );

        loop {
            if *shutdown.borrow() {
                break;
            }

            let started = Instant::now();
            match self.run_cycle().await {
                Ok(()) => {}
                Err(e) if e.is_transient() => {
                    warn!(error = %e, "cycle skipped on transient error");
                }
                Err(e) => {
                    error!(error = %e, "cycle failed");
                }
            }

            let sleep_for = interval.saturating_sub(started.elapsed());
            tokio::select! {
                _ = tokio::time::sleep(sleep_for) => {}
                _ = shutdown.changed() => {
                    if *shutdown.borrow() {
                        break;
                    }
                }
            }
        }
        info!("trading loop stopped");
    }
}
