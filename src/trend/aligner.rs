use crate::models::{Candle, CompositeSignal, SignalType, TrendDirection};
use crate::risk::RiskEngine;
use crate::strategy::{Strategy, TrendStrategy};
use crate::trend::classifier::{EmaPeriods, TrendClassifier};
use crate::trend::market_state::{enhance, summarize};
use crate::Result;
use chrono::Utc;
use tracing::{info, warn};

/// Fuses three timeframes into a single composite signal per cycle.
///
/// Execution rule: a signal executes when all three timeframes agree, or
/// when the long and mid timeframes agree on a direction and the short
/// timeframe does not outright oppose it. Everything else is a hold.
pub struct MultiTimeframeAligner {
    symbol: String,
    classifier: TrendClassifier,
    strategy: Box<dyn Strategy>,
    risk: RiskEngine,
}

impl MultiTimeframeAligner {
    pub fn new(symbol: impl Into<String>, risk: RiskEngine) -> Self {
        Self {
            symbol: symbol.into(),
            classifier: TrendClassifier::default(),
            strategy: Box::new(TrendStrategy::single_timeframe()),
            risk,
        }
    }

    /// Swap in a different signal generator for the executed timeframe.
    pub fn with_strategy(mut self, strategy: Box<dyn Strategy>) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// Run one fusion pass over fresh candles for the three timeframes.
    pub fn align(
        &self,
        long_candles: &[Candle],
        mid_candles: &[Candle],
        short_candles: &[Candle],
        equity: f64,
    ) -> Result<CompositeSignal> {
        let long_trend = self.classifier.classify(long_candles, EmaPeriods::LONG_HORIZON)?;
        let mid_trend = self.classifier.classify(mid_candles, EmaPeriods::MID_HORIZON)?;
        let short_trend = self.classifier.classify(short_candles, EmaPeriods::SHORT_HORIZON)?;

        let trend_aligned =
            long_trend == mid_trend && mid_trend == short_trend;
        let slower_agree_directional =
            long_trend == mid_trend && long_trend != TrendDirection::Sideways;
        let executes = trend_aligned
            || (slower_agree_directional && short_trend != long_trend.opposite());

        let mut signal = if executes {
            self.strategy.generate_signal(short_candles)?
        } else {
            SignalType::Hold
        };

        let current_price = short_candles[short_candles.len() - 1].close;
        let (mut stop_loss, mut take_profit, mut position_size) = (0.0, 0.0, 0.0);

        if signal != SignalType::Hold {
            match self.risk.plan_entry(short_candles, signal, equity) {
                Ok(plan) => {
                    stop_loss = plan.stop_loss;
                    take_profit = plan.take_profit;
                    position_size = plan.size;
                }
                Err(e) => {
                    // An entry we cannot size is not an entry
                    warn!(symbol = %self.symbol, error = %e, "sizing failed, downgrading to hold");
                    signal = SignalType::Hold;
                }
            }
        }

        let (advice, confidence, position_ratio) = enhance(signal, trend_aligned);
        let market_state = summarize(long_trend, mid_trend, short_trend);

        info!(
            symbol = %self.symbol,
            %signal,
            %long_trend,
            %mid_trend,
            %short_trend,
            trend_aligned,
            %advice,
            "composite signal"
        );

        Ok(CompositeSignal {
            symbol: self.symbol.clone(),
            signal,
            long_trend,
            mid_trend,
            short_trend,
            trend_aligned,
            current_price,
            stop_loss,
            take_profit,
            position_size,
            position_ratio,
            advice,
            confidence,
            market_state,
            timestamp: Utc::now(),
        })
    }
}
