use crate::error::BotError;
use crate::indicators::atr;
use crate::models::{Candle, PositionSide, SignalType};
use crate::Result;
use serde::{Deserialize, Serialize};
use tracing::debug;

fn default_risk_per_trade() -> f64 {
    0.02
}
fn default_sl_multiplier() -> f64 {
    2.0
}
fn default_tp_multiplier() -> f64 {
    3.0
}
fn default_max_utilization() -> f64 {
    0.95
}
fn default_atr_period() -> usize {
    14
}

/// Risk parameters. Defaults: risk 2% of equity per trade, stop at
/// 2×ATR, target at 3×ATR, never commit more than 95% of equity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskConfig {
    #[serde(default = "default_risk_per_trade")]
    pub risk_per_trade: f64,
    #[serde(default = "default_sl_multiplier")]
    pub sl_atr_multiplier: f64,
    #[serde(default = "default_tp_multiplier")]
    pub tp_atr_multiplier: f64,
    #[serde(default = "default_max_utilization")]
    pub max_utilization: f64,
    #[serde(default = "default_atr_period")]
    pub atr_period: usize,
}

impl Default for RiskConfig {
    fn default() -> Self {
        Self {
            risk_per_trade: default_risk_per_trade(),
            sl_atr_multiplier: default_sl_multiplier(),
            tp_atr_multiplier: default_tp_multiplier(),
            max_utilization: default_max_utilization(),
            atr_period: default_atr_period(),
        }
    }
}

/// Fully-specified entry: size and protective levels computed before any
/// order is placed.
#[derive(Debug, Clone, PartialEq)]
pub struct EntryPlan {
    pub side: PositionSide,
    pub size: f64,
    pub stop_loss: f64,
    pub take_profit: f64,
    pub atr: f64,
}

/// ATR-based sizing and protective levels.
#[derive(Debug, Clone)]
pub struct RiskEngine {
    config: RiskConfig,
}

impl RiskEngine {
    pub fn new(config: RiskConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RiskConfig {
        &self.config
    }

    /// Stop and target around the entry price: long stops below and
    /// targets above, short mirrored.
    pub fn protective_levels(&self, side: PositionSide, entry: f64, atr: f64) -> (f64, f64) {
        let stop_distance = atr * self.config.sl_atr_multiplier;
        let target_distance = atr * self.config.tp_atr_multiplier;
        match side {
            PositionSide::Long => (entry - stop_distance, entry + target_distance),
            PositionSide::Short => (entry + stop_distance, entry - target_distance),
        }
    }

    /// Size so that a stop-out loses `risk_per_trade` of equity, then
    /// clamp to the utilization cap.
    pub fn position_size(&self, equity: f64, price: f64, atr: f64) -> Result<f64> {
        if !atr.is_finite() || atr <= 0.0 {
            return Err(BotError::SizingFailure(format!(
                "cannot size position with ATR {atr}"
            )));
        }
        if !price.is_finite() || price <= 0.0 {
            return Err(BotError::SizingFailure(format!(
                "cannot size position at price {price}"
            )));
        }

        let risk_capital = equity * self.config.risk_per_trade;
        let stop_distance = atr * self.config.sl_atr_multiplier;
        let size = risk_capital / stop_distance;
        let max_size = equity * self.config.max_utilization / price;
        Ok(size.min(max_size))
    }

    /// Build the full entry plan for a directional signal off the short
    /// timeframe's candles. `Hold` never reaches this point.
    pub fn plan_entry(
        &self,
        candles: &[Candle],
        signal: SignalType,
        equity: f64,
    ) -> Result<EntryPlan> {
        let side = match signal {
            SignalType::Buy => PositionSide::Long,
            SignalType::Sell => PositionSide::Short,
            SignalType::Hold => {
                return Err(BotError::SizingFailure(
                    "no entry plan for a hold signal".to_string(),
                ))
            }
        };

        let atr_value = atr(candles, self.config.atr_period).map_err(|e| match e {
            BotError::InsufficientData { required, got } => BotError::SizingFailure(format!(
                "not enough candles for ATR: need {required}, got {got}"
            )),
            other => other,
        })?;

        let entry = candles[candles.len() - 1].close;
        let size = self.position_size(equity, entry, atr_value)?;
        let (stop_loss, take_profit) = self.protective_levels(side, entry, atr_value);

        debug!(%side, size, stop_loss, take_profit, atr = atr_value, "entry plan");
        Ok(EntryPlan {
            side,
            size,
            stop_loss,
            take_profit,
            atr: atr_value,
        })
    }
}
