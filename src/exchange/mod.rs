// Exchange port - the only surface the rest of the crate talks to
pub mod paper;

pub use paper::PaperExchange;

use crate::models::{Candle, Timeframe};
use crate::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderSide {
    Buy,
    Sell,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Filled,
    Rejected,
}

/// Execution report for a market order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FillConfirmation {
    pub price: f64,
    pub size: f64,
    pub status: OrderStatus,
}

impl FillConfirmation {
    pub fn is_filled(&self) -> bool {
        self.status == OrderStatus::Filled
    }
}

/// Async port to the market. Implementations are expected to surface
/// transient connectivity problems as `BotError::TransientIo` and
/// authorization failures as `BotError::PermissionDenied`.
#[async_trait]
pub trait ExchangeClient: Send + Sync {
    /// Most recent `limit` closed candles, oldest first.
    async fn fetch_ohlcv(&self, timeframe: Timeframe, limit: usize) -> Result<Vec<Candle>>;

    /// Account equity in quote currency.
    async fn fetch_equity(&self) -> Result<f64>;

    /// Latest traded price.
    async fn fetch_current_price(&self) -> Result<f64>;

    /// Open a position with a market order.
    async fn place_market_order(&self, side: OrderSide, size: f64) -> Result<FillConfirmation>;

    /// Close (part of) a position with a market order on the opposite side.
    async fn close_position(&self, side: OrderSide, size: f64) -> Result<FillConfirmation>;
}
