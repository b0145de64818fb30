use crate::error::BotError;
use crate::Result;

/// Exponential moving average over the whole series.
///
/// Seeded with the simple mean of the first `period` values at index 0,
/// then the standard recurrence `ema = alpha * value + (1 - alpha) * prev`
/// with `alpha = 2 / (period + 1)` across the rest of the input. Output
/// length equals input length.
pub fn ema_series(values: &[f64], period: usize) -> Result<Vec<f64>> {
    if period == 0 {
        return Err(BotError::insufficient_data(1, 0));
    }
    if values.len() < period {
        return Err(BotError::insufficient_data(period, values.len()));
    }

    let alpha = 2.0 / (period as f64 + 1.0);
    let seed: f64 = values[..period].iter().sum::<f64>() / period as f64;

    let mut out = Vec::with_capacity(values.len());
    let mut prev = seed;
    out.push(seed);
    for &value in &values[1..] {
        prev = alpha * value + (1.0 - alpha) * prev;
        out.push(prev);
    }
    Ok(out)
}

/// Latest EMA value.
pub fn ema(values: &[f64], period: usize) -> Result<f64> {
    let series = ema_series(values, period)?;
    Ok(series[series.len() - 1])
}
