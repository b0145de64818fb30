use crate::models::{Candle, SignalType, TrendDirection};
use crate::strategy::Strategy;
use crate::trend::classifier::{EmaPeriods, TrendClassifier};
use crate::Result;

/// Trend-following strategy: classifies the timeframe with the
/// four-indicator vote and maps the direction straight to a signal.
#[derive(Debug, Clone)]
pub struct TrendStrategy {
    classifier: TrendClassifier,
    ema_periods: EmaPeriods,
}

impl TrendStrategy {
    pub fn new(classifier: TrendClassifier, ema_periods: EmaPeriods) -> Self {
        Self {
            classifier,
            ema_periods,
        }
    }

    /// Strategy with the single-timeframe EMA defaults. These are
    /// slower than the aligner's short-horizon trend preset, so the
    /// executed signal is a separate opinion from the short trend.
    pub fn single_timeframe() -> Self {
        Self::new(TrendClassifier::default(), EmaPeriods::SINGLE_TIMEFRAME)
    }
}

impl Strategy for TrendStrategy {
    fn generate_signal(&self, candles: &[Candle]) -> Result<SignalType> {
        let direction = self.classifier.classify(candles, self.ema_periods)?;
        Ok(match direction {
            TrendDirection::Uptrend => SignalType::Buy,
            TrendDirection::Downtrend => SignalType::Sell,
            TrendDirection::Sideways => SignalType::Hold,
        })
    }

    fn name(&self) -> &str {
        "trend_following"
    }

    fn min_candles_required(&self) -> usize {
        // EMA needs the longest period; MACD's slow+signal and the RSI
        // and KDJ warm-ups all fit inside it for the presets we use.
        self.ema_periods.max_period().max(26 + 9)
    }
}
