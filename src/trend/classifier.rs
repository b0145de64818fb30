use crate::indicators::{ema, kdj, macd_default, rsi};
use crate::models::{Candle, TrendDirection};
use crate::Result;
use tracing::debug;

/// EMA period triple used for the moving-average verdict. Each horizon
/// gets its own preset so that a daily chart and an hourly chart read
/// comparable spans of calendar time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmaPeriods {
    pub short: usize,
    pub mid: usize,
    pub long: usize,
}

impl EmaPeriods {
    /// Long-horizon preset (e.g. daily candles).
    pub const LONG_HORIZON: EmaPeriods = EmaPeriods {
        short: 6,
        mid: 10,
        long: 20,
    };

    /// Mid-horizon preset (e.g. 4h candles).
    pub const MID_HORIZON: EmaPeriods = EmaPeriods {
        short: 20,
        mid: 50,
        long: 100,
    };

    /// Short-horizon preset (e.g. 1h candles).
    pub const SHORT_HORIZON: EmaPeriods = EmaPeriods {
        short: 5,
        mid: 20,
        long: 50,
    };

    /// Preset for the executed single-timeframe strategy, deliberately
    /// slower than the short-horizon trend read so the two can disagree.
    pub const SINGLE_TIMEFRAME: EmaPeriods = EmaPeriods {
        short: 30,
        mid: 60,
        long: 120,
    };

    pub fn max_period(self) -> usize {
        self.short.max(self.mid).max(self.long)
    }
}

/// Majority vote over indicator verdicts. Returns the direction backed
/// by at least `threshold` votes, Sideways when no direction reaches it.
pub fn majority(verdicts: &[TrendDirection], threshold: usize) -> TrendDirection {
    let up = verdicts
        .iter()
        .filter(|v| **v == TrendDirection::Uptrend)
        .count();
    let down = verdicts
        .iter()
        .filter(|v| **v == TrendDirection::Downtrend)
        .count();
    if up >= threshold {
        TrendDirection::Uptrend
    } else if down >= threshold {
        TrendDirection::Downtrend
    } else {
        TrendDirection::Sideways
    }
}

/// Classifies a single timeframe's candles into a trend direction by
/// majority vote over four indicator verdicts (EMA stack, MACD, RSI, KDJ).
#[derive(Debug, Clone)]
pub struct TrendClassifier {
    pub rsi_period: usize,
    pub rsi_overbought: f64,
    pub rsi_oversold: f64,
    pub kdj_n: usize,
    pub majority_threshold: usize,
}

impl Default for TrendClassifier {
    fn default() -> Self {
        Self {
            rsi_period: 14,
            rsi_overbought: 70.0,
            rsi_oversold: 30.0,
            kdj_n: 9,
            majority_threshold: 3,
        }
    }
}

impl TrendClassifier {
    /// EMA stack verdict: short > mid > long is an uptrend, the strict
    /// inverse a downtrend, anything tangled is sideways.
    pub fn ema_verdict(&self, closes: &[f64], periods: EmaPeriods) -> Result<TrendDirection> {
        let short = ema(closes, periods.short)?;
        let mid = ema(closes, periods.mid)?;
        let long = ema(closes, periods.long)?;

        Ok(if short > mid && mid > long {
            TrendDirection::Uptrend
        } else if short < mid && mid < long {
            TrendDirection::Downtrend
        } else {
            TrendDirection::Sideways
        })
    }

    /// MACD verdict: line and histogram both positive is up, both
    /// negative is down. Short of that, a histogram rising (or falling)
    /// over the last three bars still counts as an early turn.
    pub fn macd_verdict(&self, closes: &[f64]) -> Result<TrendDirection> {
        let out = macd_default(closes)?;
        let last = out.histogram.len() - 1;
        let line = out.macd_line[last];
        let hist = &out.histogram;

        Ok(if line > 0.0 && hist[last] > 0.0 {
            TrendDirection::Uptrend
        } else if line < 0.0 && hist[last] < 0.0 {
            TrendDirection::Downtrend
        } else if last >= 2 && hist[last] > hist[last - 1] && hist[last - 1] > hist[last - 2] {
            TrendDirection::Uptrend
        } else if last >= 2 && hist[last] < hist[last - 1] && hist[last - 1] < hist[last - 2] {
            TrendDirection::Downtrend
        } else {
            TrendDirection::Sideways
        })
    }

    /// RSI verdict, read as continuation: overbought confirms the up
    /// move, oversold confirms the down move.
    pub fn rsi_verdict(&self, closes: &[f64]) -> Result<TrendDirection> {
        let v = rsi(closes, self.rsi_period)?;
        Ok(if v > self.rsi_overbought {
            TrendDirection::Uptrend
        } else if v < self.rsi_oversold {
            TrendDirection::Downtrend
        } else {
            TrendDirection::Sideways
        })
    }

    /// KDJ verdict: K above D with J leading is up, the mirror is down.
    pub fn kdj_verdict(&self, candles: &[Candle]) -> Result<TrendDirection> {
        let out = kdj(candles, self.kdj_n, 3.0, 3.0)?;
        let last = out.k.len() - 1;
        let (k, d, j) = (out.k[last], out.d[last], out.j[last]);

        Ok(if k > d && j > k {
            TrendDirection::Uptrend
        } else if k < d && j < k {
            TrendDirection::Downtrend
        } else {
            TrendDirection::Sideways
        })
    }

    /// Full classification for one timeframe.
    pub fn classify(&self, candles: &[Candle], periods: EmaPeriods) -> Result<TrendDirection> {
        let closes: Vec<f64> = candles.iter().map(|c| c.close).collect();

        let verdicts = [
            self.ema_verdict(&closes, periods)?,
            self.macd_verdict(&closes)?,
            self.rsi_verdict(&closes)?,
            self.kdj_verdict(candles)?,
        ];
        let direction = majority(&verdicts, self.majority_threshold);
        debug!(
            ema = %verdicts[0],
            macd = %verdicts[1],
            rsi = %verdicts[2],
            kdj = %verdicts[3],
            %direction,
            "trend vote"
        );
        Ok(direction)
    }
}
