use crate::error::BotError;
use crate::Result;

/// Relative Strength Index with Wilder smoothing.
///
/// Needs `period + 1` values (one extra to form the first delta). The
/// average gain/loss are seeded with the simple mean of the first
/// `period` deltas, then smoothed with `avg = (avg * (period - 1) + x) / period`.
/// When the average loss is zero the relative strength is taken as 1,
/// which pins RSI at 50 for a gains-only series.
pub fn rsi_series(values: &[f64], period: usize) -> Result<Vec<f64>> {
    if period == 0 {
        return Err(BotError::insufficient_data(2, values.len()));
    }
    if values.len() < period + 1 {
        return Err(BotError::insufficient_data(period + 1, values.len()));
    }

    let deltas: Vec<f64> = values.windows(2).map(|w| w[1] - w[0]).collect();

    let mut avg_gain = deltas[..period]
        .iter()
        .map(|d| d.max(0.0))
        .sum::<f64>()
        / period as f64;
    let mut avg_loss = deltas[..period]
        .iter()
        .map(|d| (-d).max(0.0))
        .sum::<f64>()
        / period as f64;

    let mut out = Vec::with_capacity(deltas.len() - period + 1);
    out.push(rsi_from(avg_gain, avg_loss));

    for &delta in &deltas[period..] {
        let gain = delta.max(0.0);
        let loss = (-delta).max(0.0);
        avg_gain = (avg_gain * (period as f64 - 1.0) + gain) / period as f64;
        avg_loss = (avg_loss * (period as f64 - 1.0) + loss) / period as f64;
        out.push(rsi_from(avg_gain, avg_loss));
    }
    Ok(out)
}

/// Latest RSI value.
pub fn rsi(values: &[f64], period: usize) -> Result<f64> {
    let series = rsi_series(values, period)?;
    Ok(series[series.len() - 1])
}

fn rsi_from(avg_gain: f64, avg_loss: f64) -> f64 {
    let rs = if avg_loss == 0.0 {
        1.0
    } else {
        avg_gain / avg_loss
    };
    100.0 - 100.0 / (1.0 + rs)
}
