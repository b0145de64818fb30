use crate::error::BotError;
use crate::exchange::{ExchangeClient, OrderSide};
use crate::indicators::atr;
use crate::journal::SignalJournal;
use crate::models::{
    Candle, CloseReason, CompositeSignal, OpenPosition, PositionSide, PositionStatus,
    SignalType, TradeRecord, TradeSide,
};
use crate::notify::{format_signal_message, format_trade_message, Notifier};
use crate::risk::RiskEngine;
use crate::Result;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};

/// Whether the bot may place orders or only analyze. Persisted with
/// the status view so a degraded bot is visible off-process, not just
/// in the logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TradingMode {
    Full,
    AnalysisOnly,
}

/// Drives the FLAT / LONG / SHORT position lifecycle from composite
/// signals, one cycle at a time.
///
/// Per cycle the checks run in a fixed order: trend-reversal close
/// first, then stop/target close, then entry. A cycle that closed a
/// position never re-enters in the same cycle. All state transitions
/// happen only after the exchange confirms the fill.
pub struct PositionLifecycleManager {
    risk: RiskEngine,
    notifier: Arc<dyn Notifier>,
    position: Option<OpenPosition>,
    mode: TradingMode,
    permission_warned: bool,
    last_notified: Option<CompositeSignal>,
    consolidation_lookback: usize,
    consolidation_fraction: f64,
}

impl PositionLifecycleManager {
    pub fn new(risk: RiskEngine, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            risk,
            notifier,
            position: None,
            mode: TradingMode::Full,
            permission_warned: false,
            last_notified: None,
            consolidation_lookback: 20,
            consolidation_fraction: 0.5,
        }
    }

    pub fn with_mode(mut self, mode: TradingMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_consolidation_lookback(mut self, bars: usize) -> Self {
        self.consolidation_lookback = bars;
        self
    }

    pub fn mode(&self) -> TradingMode {
        self.mode
    }

    pub fn position(&self) -> Option<&OpenPosition> {
        self.position.as_ref()
    }

    /// Dashboard view of the open position at the given price.
    pub fn position_status(&self, current_price: f64) -> Option<PositionStatus> {
        self.position.as_ref().map(|p| PositionStatus {
            side: p.side,
            size: p.size,
            entry_price: p.entry_price,
            stop_loss: p.stop_loss,
            take_profit: p.take_profit,
            unrealized_pnl: p.unrealized_pnl(current_price),
        })
    }

    fn is_reversal(&self, signal: SignalType) -> bool {
        match &self.position {
            Some(p) => matches!(
                (p.side, signal),
                (PositionSide::Long, SignalType::Sell) | (PositionSide::Short, SignalType::Buy)
            ),
            None => false,
        }
    }

    fn exit_reason(&self, price: f64) -> Option<CloseReason> {
        let p = self.position.as_ref()?;
        match p.side {
            PositionSide::Long => {
                if price <= p.stop_loss {
                    Some(CloseReason::StopLoss)
                } else if price >= p.take_profit {
                    Some(CloseReason::TakeProfit)
                } else {
                    None
                }
            }
            PositionSide::Short => {
                if price >= p.stop_loss {
                    Some(CloseReason::StopLoss)
                } else if price <= p.take_profit {
                    Some(CloseReason::TakeProfit)
                } else {
                    None
                }
            }
        }
    }

    /// Consolidation check on the short timeframe: the close range over
    /// the lookback window is narrower than two ATRs.
    fn is_consolidating(&self, candles: &[Candle]) -> bool {
        if candles.len() < self.consolidation_lookback {
            return false;
        }
        let Ok(atr_value) = atr(candles, self.risk.config().atr_period) else {
            return false;
        };
        let window = &candles[candles.len() - self.consolidation_lookback..];
        let highest = window.iter().map(|c| c.close).fold(f64::MIN, f64::max);
        let lowest = window.iter().map(|c| c.close).fold(f64::MAX, f64::min);
        highest - lowest < 2.0 * atr_value
    }

    /// Size fraction for a prospective entry, or None when the short
    /// timeframe vetoes it. Short-timeframe confirmation takes the full
    /// planned size; a consolidating short timeframe that is not
    /// opposing takes a reduced stake.
    fn entry_fraction(&self, signal: &CompositeSignal, short_candles: &[Candle]) -> Option<f64> {
        let wanted = match signal.signal {
            SignalType::Buy => crate::models::TrendDirection::Uptrend,
            SignalType::Sell => crate::models::TrendDirection::Downtrend,
            SignalType::Hold => return None,
        };
        if signal.short_trend == wanted {
            Some(1.0)
        } else if signal.short_trend != wanted.opposite() && self.is_consolidating(short_candles) {
            Some(self.consolidation_fraction)
        } else {
            None
        }
    }

    fn enter_analysis_only(&mut self, context: &str) {
        self.mode = TradingMode::AnalysisOnly;
        if !self.permission_warned {
            self.permission_warned = true;
            warn!("trading permission denied while {context}; continuing in analysis-only mode");
            self.notifier.notify(
                "trading disabled",
                "exchange rejected order permissions; running analysis-only",
            );
        }
    }

    /// Run one lifecycle cycle against a fresh composite signal.
    pub async fn process_cycle(
        &mut self,
        exchange: &dyn ExchangeClient,
        signal: &CompositeSignal,
        short_candles: &[Candle],
        journal: &mut SignalJournal,
    ) -> Result<()> {
        let mut closed_this_cycle = false;

        if self.is_reversal(signal.signal) {
            closed_this_cycle = self
                .close(exchange, signal.current_price, CloseReason::TrendReversal, journal)
                .await?;
        } else if let Some(reason) = self.exit_reason(signal.current_price) {
            closed_this_cycle = self
                .close(exchange, signal.current_price, reason, journal)
                .await?;
        }

        if self.position.is_none()
            && !closed_this_cycle
            && signal.signal != SignalType::Hold
            && signal.position_size > 0.0
        {
            if let Some(fraction) = self.entry_fraction(signal, short_candles) {
                self.open(exchange, signal, fraction, journal).await?;
            } else {
                info!(signal = %signal.signal, "entry vetoed by short timeframe");
            }
        }

        self.notify_if_changed(signal);
        Ok(())
    }

    /// Open a position per the signal's plan, scaled by `fraction`.
    /// Returns without touching state when the order is not filled.
    async fn open(
        &mut self,
        exchange: &dyn ExchangeClient,
        signal: &CompositeSignal,
        fraction: f64,
        journal: &mut SignalJournal,
    ) -> Result<()> {
        let (side, order_side, trade_side) = match signal.signal {
            SignalType::Buy => (PositionSide::Long, OrderSide::Buy, TradeSide::Buy),
            SignalType::Sell => (PositionSide::Short, OrderSide::Sell, TradeSide::Sell),
            SignalType::Hold => return Ok(()),
        };
        let size = signal.position_size * fraction;

        if self.mode == TradingMode::AnalysisOnly {
            info!(%side, size, "analysis-only: would open position");
            return Ok(());
        }

        let fill = match exchange.place_market_order(order_side, size).await {
            Ok(fill) => fill,
            Err(BotError::PermissionDenied(_)) => {
                self.enter_analysis_only("opening position");
                return Ok(());
            }
            Err(e) => return Err(e),
        };
        if !fill.is_filled() {
            warn!(%side, size, "entry order rejected, staying flat");
            return Ok(());
        }

        self.position = Some(OpenPosition {
            side,
            size: fill.size,
            entry_price: fill.price,
            stop_loss: signal.stop_loss,
            take_profit: signal.take_profit,
            opened_at: Utc::now(),
        });

        let record = TradeRecord::open(
            trade_side,
            fill.price,
            fill.size,
            signal.stop_loss,
            signal.take_profit,
        );
        info!(%side, size = fill.size, price = fill.price, "opened position");
        self.notifier.notify("position opened", &format_trade_message(&record));
        journal.record_trade(record);
        Ok(())
    }

    /// Close the open position. Returns true when a position was
    /// actually closed.
    async fn close(
        &mut self,
        exchange: &dyn ExchangeClient,
        price: f64,
        reason: CloseReason,
        journal: &mut SignalJournal,
    ) -> Result<bool> {
        let Some(position) = self.position.clone() else {
            return Ok(false);
        };

        if self.mode == TradingMode::AnalysisOnly {
            info!(side = %position.side, %reason, "analysis-only: would close position");
            return Ok(false);
        }

        // Closing order trades against the position side
        let (order_side, trade_side) = match position.side {
            PositionSide::Long => (OrderSide::Sell, TradeSide::Sell),
            PositionSide::Short => (OrderSide::Buy, TradeSide::Buy),
        };

        let fill = match exchange.close_position(order_side, position.size).await {
            Ok(fill) => fill,
            Err(BotError::PermissionDenied(_)) => {
                self.enter_analysis_only("closing position");
                return Ok(false);
            }
            Err(e) => return Err(e),
        };
        if !fill.is_filled() {
            warn!(side = %position.side, %reason, "close order rejected, position kept");
            return Ok(false);
        }

        let pnl = position.unrealized_pnl(fill.price);
        self.position = None;

        let record = TradeRecord::close(trade_side, fill.price, position.size, pnl, reason);
        info!(side = %position.side, %reason, pnl, price, "closed position");
        self.notifier.notify("position closed", &format_trade_message(&record));
        journal.record_trade(record);
        Ok(true)
    }

    /// Notify on the first signal and whenever the signal materially
    /// changes; repeated identical readings stay quiet.
    fn notify_if_changed(&mut self, signal: &CompositeSignal) {
        let changed = match &self.last_notified {
            Some(prev) => prev.materially_differs(signal),
            None => true,
        };
        if changed {
            self.notifier
                .notify("market update", &format_signal_message(signal));
            self.last_notified = Some(signal.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exchange::{FillConfirmation, OrderStatus};
    use crate::models::{Advice, Confidence, Timeframe, TrendDirection};
    use crate::risk::RiskConfig;
    use async_trait::async_trait;
    use chrono::Duration;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    struct StubExchange {
        deny: bool,
        orders: Mutex<Vec<(OrderSide, f64)>>,
        fill_price: Mutex<f64>,
    }

    impl StubExchange {
        fn new(fill_price: f64) -> Self {
            Self {
                deny: false,
                orders: Mutex::new(Vec::new()),
                fill_price: Mutex::new(fill_price),
            }
        }

        fn denying() -> Self {
            Self {
                deny: true,
                ..Self::new(100.0)
            }
        }

        fn set_fill_price(&self, price: f64) {
            *self.fill_price.lock().unwrap() = price;
        }

        fn order_count(&self) -> usize {
            self.orders.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl ExchangeClient for StubExchange {
        async fn fetch_ohlcv(&self, _timeframe: Timeframe, _limit: usize) -> Result<Vec<Candle>> {
            Ok(Vec::new())
        }

        async fn fetch_equity(&self) -> Result<f64> {
            Ok(10_000.0)
        }

        async fn fetch_current_price(&self) -> Result<f64> {
            Ok(*self.fill_price.lock().unwrap())
        }

        async fn place_market_order(&self, side: OrderSide, size: f64) -> Result<FillConfirmation> {
            if self.deny {
                return Err(BotError::PermissionDenied("no trade rights".to_string()));
            }
            self.orders.lock().unwrap().push((side, size));
            Ok(FillConfirmation {
                price: *self.fill_price.lock().unwrap(),
                size,
                status: OrderStatus::Filled,
            })
        }

        async fn close_position(&self, side: OrderSide, size: f64) -> Result<FillConfirmation> {
            self.place_market_order(side, size).await
        }
    }

    #[derive(Default)]
    struct CountingNotifier {
        count: AtomicUsize,
    }

    impl Notifier for CountingNotifier {
        fn notify(&self, _title: &str, _body: &str) {
            self.count.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn signal(kind: SignalType, short_trend: TrendDirection, price: f64) -> CompositeSignal {
        let (stop, target) = match kind {
            SignalType::Buy => (price - 200.0, price + 300.0),
            SignalType::Sell => (price + 200.0, price - 300.0),
            SignalType::Hold => (0.0, 0.0),
        };
        CompositeSignal {
            symbol: "BTC/USDT".to_string(),
            signal: kind,
            long_trend: TrendDirection::Uptrend,
            mid_trend: TrendDirection::Uptrend,
            short_trend,
            trend_aligned: short_trend == TrendDirection::Uptrend,
            current_price: price,
            stop_loss: stop,
            take_profit: target,
            position_size: if kind == SignalType::Hold { 0.0 } else { 1.0 },
            position_ratio: 0.5,
            advice: match kind {
                SignalType::Buy => Advice::StrongBuy,
                SignalType::Sell => Advice::StrongSell,
                SignalType::Hold => Advice::Wait,
            },
            confidence: Confidence::High,
            market_state: "strong rally, bull market".to_string(),
            timestamp: Utc::now(),
        }
    }

    fn flat_candles(count: usize, spread: f64) -> Vec<Candle> {
        let start = Utc::now();
        (0..count)
            .map(|i| Candle {
                timestamp: start + Duration::hours(i as i64),
                open: 1000.0,
                high: 1000.0 + spread,
                low: 1000.0 - spread,
                close: 1000.0,
                volume: 10.0,
            })
            .collect()
    }

    fn manager() -> PositionLifecycleManager {
        PositionLifecycleManager::new(
            RiskEngine::new(RiskConfig::default()),
            Arc::new(CountingNotifier::default()),
        )
    }

    #[tokio::test]
    async fn test_confirmed_buy_opens_long() {
        let exchange = StubExchange::new(50_000.0);
        let mut journal = SignalJournal::new("BTC/USDT");
        let mut mgr = manager();
        let sig = signal(SignalType::Buy, TrendDirection::Uptrend, 50_000.0);

        mgr.process_cycle(&exchange, &sig, &flat_candles(30, 50.0), &mut journal)
            .await
            .unwrap();

        let p = mgr.position().expect("expected open long");
        assert_eq!(p.side, PositionSide::Long);
        assert_eq!(p.size, 1.0);
        assert!(p.stop_loss < p.entry_price);
        assert!(p.take_profit > p.entry_price);
        assert_eq!(exchange.order_count(), 1);
        // One fill entry besides the signal notification
        assert_eq!(journal.len(), 1);
    }

    #[tokio::test]
    async fn test_reversal_closes_without_same_cycle_reentry() {
        let exchange = StubExchange::new(50_000.0);
        let mut journal = SignalJournal::new("BTC/USDT");
        let mut mgr = manager();

        let buy = signal(SignalType::Buy, TrendDirection::Uptrend, 50_000.0);
        mgr.process_cycle(&exchange, &buy, &flat_candles(30, 50.0), &mut journal)
            .await
            .unwrap();
        assert!(mgr.position().is_some());

        // Opposing signal closes the long but must not flip short yet
        let sell = signal(SignalType::Sell, TrendDirection::Downtrend, 50_500.0);
        mgr.process_cycle(&exchange, &sell, &flat_candles(30, 50.0), &mut journal)
            .await
            .unwrap();
        assert!(mgr.position().is_none());
        assert_eq!(exchange.order_count(), 2);

        // Next cycle the fresh sell is allowed to enter short
        mgr.process_cycle(&exchange, &sell, &flat_candles(30, 50.0), &mut journal)
            .await
            .unwrap();
        assert_eq!(mgr.position().unwrap().side, PositionSide::Short);
    }

    #[tokio::test]
    async fn test_stop_loss_exit() {
        let exchange = StubExchange::new(50_000.0);
        let mut journal = SignalJournal::new("BTC/USDT");
        let mut mgr = manager();

        let buy = signal(SignalType::Buy, TrendDirection::Uptrend, 50_000.0);
        mgr.process_cycle(&exchange, &buy, &flat_candles(30, 50.0), &mut journal)
            .await
            .unwrap();

        // Price through the stop; still a buy signal, so not a reversal
        exchange.set_fill_price(49_000.0);
        let mut stopped = buy.clone();
        stopped.current_price = 49_000.0;
        mgr.process_cycle(&exchange, &stopped, &flat_candles(30, 50.0), &mut journal)
            .await
            .unwrap();
        assert!(mgr.position().is_none());

        let reasons: Vec<_> = journal
            .history()
            .filter_map(|e| match e {
                crate::journal::JournalEntry::Trade(t) => t.close_reason,
                _ => None,
            })
            .collect();
        assert_eq!(reasons, vec![CloseReason::StopLoss]);
    }

    #[tokio::test]
    async fn test_take_profit_exit_for_short() {
        let exchange = StubExchange::new(50_000.0);
        let mut journal = SignalJournal::new("BTC/USDT");
        let mut mgr = manager();

        let sell = signal(SignalType::Sell, TrendDirection::Downtrend, 50_000.0);
        mgr.process_cycle(&exchange, &sell, &flat_candles(30, 50.0), &mut journal)
            .await
            .unwrap();
        assert_eq!(mgr.position().unwrap().side, PositionSide::Short);

        // Target is 300 under entry; close fills down there
        exchange.set_fill_price(49_500.0);
        let mut target_hit = sell.clone();
        target_hit.current_price = 49_500.0;
        mgr.process_cycle(&exchange, &target_hit, &flat_candles(30, 50.0), &mut journal)
            .await
            .unwrap();
        assert!(mgr.position().is_none());

        let closed: Vec<_> = journal
            .history()
            .filter_map(|e| match e {
                crate::journal::JournalEntry::Trade(t) => t.pnl.zip(t.close_reason),
                _ => None,
            })
            .collect();
        assert_eq!(closed.len(), 1);
        let (pnl, reason) = closed[0];
        assert_eq!(reason, CloseReason::TakeProfit);
        assert!(pnl > 0.0);
    }

    #[tokio::test]
    async fn test_consolidation_entry_takes_half_size() {
        let exchange = StubExchange::new(50_000.0);
        let mut journal = SignalJournal::new("BTC/USDT");
        let mut mgr = manager();

        // Short timeframe sideways but consolidating: close range is 0,
        // well under two ATRs of the non-zero high/low spread
        let sig = signal(SignalType::Buy, TrendDirection::Sideways, 50_000.0);
        mgr.process_cycle(&exchange, &sig, &flat_candles(30, 50.0), &mut journal)
            .await
            .unwrap();

        let p = mgr.position().expect("expected consolidation entry");
        assert_eq!(p.size, 0.5);
    }

    #[tokio::test]
    async fn test_opposing_short_trend_vetoes_entry() {
        let exchange = StubExchange::new(50_000.0);
        let mut journal = SignalJournal::new("BTC/USDT");
        let mut mgr = manager();

        let sig = signal(SignalType::Buy, TrendDirection::Downtrend, 50_000.0);
        mgr.process_cycle(&exchange, &sig, &flat_candles(30, 50.0), &mut journal)
            .await
            .unwrap();
        assert!(mgr.position().is_none());
        assert_eq!(exchange.order_count(), 0);
    }

    #[tokio::test]
    async fn test_permission_denied_degrades_to_analysis_only() {
        let exchange = StubExchange::denying();
        let mut journal = SignalJournal::new("BTC/USDT");
        let mut mgr = manager();

        let sig = signal(SignalType::Buy, TrendDirection::Uptrend, 50_000.0);
        mgr.process_cycle(&exchange, &sig, &flat_candles(30, 50.0), &mut journal)
            .await
            .unwrap();

        assert_eq!(mgr.mode(), TradingMode::AnalysisOnly);
        assert!(mgr.position().is_none());

        // Later cycles keep analyzing without erroring
        mgr.process_cycle(&exchange, &sig, &flat_candles(30, 50.0), &mut journal)
            .await
            .unwrap();
        assert!(mgr.position().is_none());
    }

    #[tokio::test]
    async fn test_analysis_only_never_places_orders() {
        let exchange = StubExchange::new(50_000.0);
        let mut journal = SignalJournal::new("BTC/USDT");
        let mut mgr = manager().with_mode(TradingMode::AnalysisOnly);

        let sig = signal(SignalType::Buy, TrendDirection::Uptrend, 50_000.0);
        mgr.process_cycle(&exchange, &sig, &flat_candles(30, 50.0), &mut journal)
            .await
            .unwrap();
        assert!(mgr.position().is_none());
        assert_eq!(exchange.order_count(), 0);
    }

    #[tokio::test]
    async fn test_notification_dedup() {
        let exchange = StubExchange::new(50_000.0);
        let mut journal = SignalJournal::new("BTC/USDT");
        let notifier = Arc::new(CountingNotifier::default());
        let mut mgr = PositionLifecycleManager::new(
            RiskEngine::new(RiskConfig::default()),
            notifier.clone(),
        )
        .with_mode(TradingMode::AnalysisOnly);

        let hold = signal(SignalType::Hold, TrendDirection::Sideways, 50_000.0);
        mgr.process_cycle(&exchange, &hold, &flat_candles(30, 50.0), &mut journal)
            .await
            .unwrap();
        let after_first = notifier.count.load(Ordering::SeqCst);
        assert_eq!(after_first, 1);

        // Identical reading apart from price and timestamp: quiet
        let mut same = hold.clone();
        same.current_price = 50_100.0;
        same.timestamp = Utc::now();
        mgr.process_cycle(&exchange, &same, &flat_candles(30, 50.0), &mut journal)
            .await
            .unwrap();
        assert_eq!(notifier.count.load(Ordering::SeqCst), 1);

        // Material change notifies again
        let buy = signal(SignalType::Buy, TrendDirection::Uptrend, 50_200.0);
        mgr.process_cycle(&exchange, &buy, &flat_candles(30, 50.0), &mut journal)
            .await
            .unwrap();
        assert_eq!(notifier.count.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_position_status_reports_pnl() {
        let exchange = StubExchange::new(50_000.0);
        let mut journal = SignalJournal::new("BTC/USDT");
        let mut mgr = manager();

        assert!(mgr.position_status(50_000.0).is_none());

        let sig = signal(SignalType::Buy, TrendDirection::Uptrend, 50_000.0);
        mgr.process_cycle(&exchange, &sig, &flat_candles(30, 50.0), &mut journal)
            .await
            .unwrap();

        let status = mgr.position_status(50_500.0).unwrap();
        assert_eq!(status.side, PositionSide::Long);
        assert_eq!(status.unrealized_pnl, 500.0);
    }
}
