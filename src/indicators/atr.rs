use crate::error::BotError;
use crate::models::Candle;
use crate::Result;

/// Average True Range with Wilder smoothing.
///
/// True range per bar is the max of high-low, |high - prev close| and
/// |low - prev close|, so `period + 1` candles are needed. The first ATR
/// is the simple mean of the first `period` true ranges, then
/// `atr = (prev * (period - 1) + tr) / period`.
pub fn atr_series(candles: &[Candle], period: usize) -> Result<Vec<f64>> {
    if period == 0 || candles.len() < period + 1 {
        return Err(BotError::insufficient_data(period + 1, candles.len()));
    }

    let true_ranges: Vec<f64> = candles
        .windows(2)
        .map(|w| {
            let prev_close = w[0].close;
            let c = &w[1];
            let hl = c.high - c.low;
            let hc = (c.high - prev_close).abs();
            let lc = (c.low - prev_close).abs();
            hl.max(hc).max(lc)
        })
        .collect();

    let mut value = true_ranges[..period].iter().sum::<f64>() / period as f64;
    let mut out = Vec::with_capacity(true_ranges.len() - period + 1);
    out.push(value);

    for &tr in &true_ranges[period..] {
        value = (value * (period as f64 - 1.0) + tr) / period as f64;
        out.push(value);
    }
    Ok(out)
}

/// Latest ATR value.
pub fn atr(candles: &[Candle], period: usize) -> Result<f64> {
    let series = atr_series(candles, period)?;
    Ok(series[series.len() - 1])
}
