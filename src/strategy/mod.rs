// Strategy trait - seam for plugging signal generators into the loop
mod trend;

pub use trend::TrendStrategy;

use crate::models::{Candle, SignalType};
use crate::Result;

/// A signal generator over a single timeframe's candles.
pub trait Strategy: Send + Sync {
    /// Generate a trading signal from the candle history.
    fn generate_signal(&self, candles: &[Candle]) -> Result<SignalType>;

    /// Strategy name for logging.
    fn name(&self) -> &str;

    /// Minimum candles needed before a signal can be produced.
    fn min_candles_required(&self) -> usize;
}
