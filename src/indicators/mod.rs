// Technical indicators
//
// Pure series math over candle closes (ATR also reads highs/lows). Every
// function returns `BotError::InsufficientData` instead of a partial or
// padded result when the input is too short, so callers never see
// undefined warm-up values.
pub mod atr;
pub mod ema;
pub mod kdj;
pub mod macd;
pub mod rsi;

pub use atr::{atr, atr_series};
pub use ema::{ema, ema_series};
pub use kdj::{kdj, kdj_default, Kdj};
pub use macd::{macd, macd_default, Macd};
pub use rsi::{rsi, rsi_series};
