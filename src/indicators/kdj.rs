use crate::error::BotError;
use crate::models::Candle;
use crate::Result;

/// KDJ stochastic output. Entries start at the first bar with a full
/// `n`-bar lookback window, so each series is `candles.len() - n + 1`
/// long; index the end for the latest reading.
#[derive(Debug, Clone, PartialEq)]
pub struct Kdj {
    pub k: Vec<f64>,
    pub d: Vec<f64>,
    pub j: Vec<f64>,
}

/// KDJ stochastic oscillator.
///
/// RSV is the close's position inside the `n`-bar high/low range scaled
/// to 0..100, taken as 50 when the range is degenerate (flat window).
/// The first emitted bar seeds K with its RSV and D with K; later bars
/// smooth with factors `m1` and `m2`. J = 3K - 2D (J may leave the
/// 0..100 band).
pub fn kdj(candles: &[Candle], n: usize, m1: f64, m2: f64) -> Result<Kdj> {
    if n == 0 || candles.len() < n {
        return Err(BotError::insufficient_data(n.max(1), candles.len()));
    }

    let count = candles.len() - n + 1;
    let mut k_series = Vec::with_capacity(count);
    let mut d_series = Vec::with_capacity(count);
    let mut j_series = Vec::with_capacity(count);

    let mut k = 0.0;
    let mut d = 0.0;

    for i in (n - 1)..candles.len() {
        let window = &candles[i + 1 - n..=i];
        let highest = window.iter().map(|c| c.high).fold(f64::MIN, f64::max);
        let lowest = window.iter().map(|c| c.low).fold(f64::MAX, f64::min);

        let rsv = if highest == lowest {
            50.0
        } else {
            (candles[i].close - lowest) / (highest - lowest) * 100.0
        };

        if i == n - 1 {
            k = rsv;
            d = k;
        } else {
            k = (m1 * k + rsv) / (m1 + 1.0);
            d = (m2 * d + k) / (m2 + 1.0);
        }

        k_series.push(k);
        d_series.push(d);
        j_series.push(3.0 * k - 2.0 * d);
    }

    Ok(Kdj {
        k: k_series,
        d: d_series,
        j: j_series,
    })
}

/// KDJ with the conventional 9/3/3 parameters.
pub fn kdj_default(candles: &[Candle]) -> Result<Kdj> {
    kdj(candles, 9, 3.0, 3.0)
}
