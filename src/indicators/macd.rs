use crate::error::BotError;
use crate::indicators::ema::ema_series;
use crate::Result;

/// MACD output: the three series share the input's length.
#[derive(Debug, Clone, PartialEq)]
pub struct Macd {
    pub macd_line: Vec<f64>,
    pub signal_line: Vec<f64>,
    pub histogram: Vec<f64>,
}

/// MACD: fast EMA minus slow EMA, a signal EMA over that difference,
/// and the histogram between the two.
pub fn macd(values: &[f64], fast: usize, slow: usize, signal: usize) -> Result<Macd> {
    let required = slow.max(signal);
    if values.len() < required {
        return Err(BotError::insufficient_data(required, values.len()));
    }

    let fast_ema = ema_series(values, fast)?;
    let slow_ema = ema_series(values, slow)?;
    let macd_line: Vec<f64> = fast_ema
        .iter()
        .zip(&slow_ema)
        .map(|(f, s)| f - s)
        .collect();
    let signal_line = ema_series(&macd_line, signal)?;
    let histogram: Vec<f64> = macd_line
        .iter()
        .zip(&signal_line)
        .map(|(m, s)| m - s)
        .collect();

    Ok(Macd {
        macd_line,
        signal_line,
        histogram,
    })
}

/// MACD with the conventional 12/26/9 parameters.
pub fn macd_default(values: &[f64]) -> Result<Macd> {
    macd(values, 12, 26, 9)
}
