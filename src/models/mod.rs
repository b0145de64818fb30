use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// OHLCV candlestick for a single timeframe. Sequences are ordered by
/// strictly increasing timestamp and treated as immutable snapshots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

/// Discrete trend direction for one timeframe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendDirection {
    Uptrend,
    Downtrend,
    Sideways,
}

impl TrendDirection {
    /// The contradicting direction; Sideways contradicts nothing.
    pub fn opposite(self) -> TrendDirection {
        match self {
            TrendDirection::Uptrend => TrendDirection::Downtrend,
            TrendDirection::Downtrend => TrendDirection::Uptrend,
            TrendDirection::Sideways => TrendDirection::Sideways,
        }
    }
}

impl fmt::Display for TrendDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TrendDirection::Uptrend => "uptrend",
            TrendDirection::Downtrend => "downtrend",
            TrendDirection::Sideways => "sideways",
        };
        write!(f, "{s}")
    }
}

/// Trading signal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignalType {
    Buy,
    Sell,
    Hold,
}

impl fmt::Display for SignalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SignalType::Buy => "buy",
            SignalType::Sell => "sell",
            SignalType::Hold => "hold",
        };
        write!(f, "{s}")
    }
}

/// Candle timeframes supported by the exchange port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Timeframe {
    #[serde(rename = "1m")]
    M1,
    #[serde(rename = "5m")]
    M5,
    #[serde(rename = "15m")]
    M15,
    #[serde(rename = "30m")]
    M30,
    #[serde(rename = "1h")]
    H1,
    #[serde(rename = "4h")]
    H4,
    #[serde(rename = "8h")]
    H8,
    #[serde(rename = "1d")]
    D1,
    #[serde(rename = "1w")]
    W1,
}

impl Timeframe {
    pub fn as_str(self) -> &'static str {
        match self {
            Timeframe::M1 => "1m",
            Timeframe::M5 => "5m",
            Timeframe::M15 => "15m",
            Timeframe::M30 => "30m",
            Timeframe::H1 => "1h",
            Timeframe::H4 => "4h",
            Timeframe::H8 => "8h",
            Timeframe::D1 => "1d",
            Timeframe::W1 => "1w",
        }
    }

    pub fn minutes(self) -> i64 {
        match self {
            Timeframe::M1 => 1,
            Timeframe::M5 => 5,
            Timeframe::M15 => 15,
            Timeframe::M30 => 30,
            Timeframe::H1 => 60,
            Timeframe::H4 => 240,
            Timeframe::H8 => 480,
            Timeframe::D1 => 1440,
            Timeframe::W1 => 10_080,
        }
    }
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Confidence attached to the emitted advice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    High,
    Medium,
    Low,
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Confidence::High => "high",
            Confidence::Medium => "medium",
            Confidence::Low => "low",
        };
        write!(f, "{s}")
    }
}

/// Suggested action accompanying a composite signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Advice {
    StrongBuy,
    ScaleInBuy,
    StrongSell,
    ScaleInSell,
    Wait,
}

impl fmt::Display for Advice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Advice::StrongBuy => "strong buy",
            Advice::ScaleInBuy => "scale-in buy",
            Advice::StrongSell => "strong sell",
            Advice::ScaleInSell => "scale-in sell",
            Advice::Wait => "wait and see",
        };
        write!(f, "{s}")
    }
}

/// Fused multi-timeframe signal produced once per polling cycle.
///
/// Immutable once emitted; persisted as the "latest" view and journaled
/// into history. `stop_loss`, `take_profit` and `position_size` are zero
/// for hold signals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompositeSignal {
    pub symbol: String,
    pub signal: SignalType,
    pub long_trend: TrendDirection,
    pub mid_trend: TrendDirection,
    pub short_trend: TrendDirection,
    pub trend_aligned: bool,
    pub current_price: f64,
    pub stop_loss: f64,
    pub take_profit: f64,
    pub position_size: f64,
    pub position_ratio: f64,
    pub advice: Advice,
    pub confidence: Confidence,
    pub market_state: String,
    pub timestamp: DateTime<Utc>,
}

impl CompositeSignal {
    /// Notification deduplication key: a change in any of signal, advice,
    /// confidence or market state is a material change.
    pub fn materially_differs(&self, other: &CompositeSignal) -> bool {
        self.signal != other.signal
            || self.advice != other.advice
            || self.confidence != other.confidence
            || self.market_state != other.market_state
    }
}

/// Direction of an open position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PositionSide {
    Long,
    Short,
}

impl fmt::Display for PositionSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PositionSide::Long => "long",
            PositionSide::Short => "short",
        };
        write!(f, "{s}")
    }
}

/// An open position; a flat book is represented by `Option::None`, so a
/// position that exists always has a side, a size and an entry price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpenPosition {
    pub side: PositionSide,
    pub size: f64,
    pub entry_price: f64,
    pub stop_loss: f64,
    pub take_profit: f64,
    pub opened_at: DateTime<Utc>,
}

impl OpenPosition {
    /// Unrealized P&L at the given price: (price - entry) * size for a
    /// long position, inverted for a short.
    pub fn unrealized_pnl(&self, current_price: f64) -> f64 {
        match self.side {
            PositionSide::Long => (current_price - self.entry_price) * self.size,
            PositionSide::Short => (self.entry_price - current_price) * self.size,
        }
    }
}

/// Position view served to the dashboard on demand.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PositionStatus {
    pub side: PositionSide,
    pub size: f64,
    pub entry_price: f64,
    pub stop_loss: f64,
    pub take_profit: f64,
    pub unrealized_pnl: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TradeSide {
    Buy,
    Sell,
}

impl fmt::Display for TradeSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TradeSide::Buy => "buy",
            TradeSide::Sell => "sell",
        };
        write!(f, "{s}")
    }
}

/// Why a position was closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CloseReason {
    #[serde(rename = "trend reversal")]
    TrendReversal,
    #[serde(rename = "stop-loss")]
    StopLoss,
    #[serde(rename = "take-profit")]
    TakeProfit,
}

impl fmt::Display for CloseReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CloseReason::TrendReversal => "trend reversal",
            CloseReason::StopLoss => "stop-loss",
            CloseReason::TakeProfit => "take-profit",
        };
        write!(f, "{s}")
    }
}

/// A fill recorded on open or close; never mutated after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeRecord {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub side: TradeSide,
    pub price: f64,
    pub amount: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop_loss: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub take_profit: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pnl: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub close_reason: Option<CloseReason>,
}

impl TradeRecord {
    pub fn open(side: TradeSide, price: f64, amount: f64, stop_loss: f64, take_profit: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            side,
            price,
            amount,
            stop_loss: Some(stop_loss),
            take_profit: Some(take_profit),
            pnl: None,
            close_reason: None,
        }
    }

    pub fn close(side: TradeSide, price: f64, amount: f64, pnl: f64, reason: CloseReason) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            side,
            price,
            amount,
            stop_loss: None,
            take_profit: None,
            pnl: Some(pnl),
            close_reason: Some(reason),
        }
    }
}
