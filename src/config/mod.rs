use crate::models::Timeframe;
use crate::risk::RiskConfig;
use crate::{BotError, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

fn default_symbol() -> String {
    "BTC/USDT".to_string()
}
fn default_check_interval() -> u64 {
    60
}
fn default_output_dir() -> String {
    "trend_signals".to_string()
}
fn default_long_timeframe() -> Timeframe {
    Timeframe::D1
}
fn default_mid_timeframe() -> Timeframe {
    Timeframe::H4
}
fn default_short_timeframe() -> Timeframe {
    Timeframe::H1
}
fn default_candle_limit() -> usize {
    120
}
fn default_consolidation_lookback() -> usize {
    20
}

/// Top-level configuration, layered from an optional `trendbot.toml`
/// and `TRENDBOT_*` environment variables.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BotConfig {
    #[serde(default = "default_symbol")]
    pub symbol: String,
    #[serde(default = "default_check_interval")]
    pub check_interval_secs: u64,
    #[serde(default = "default_output_dir")]
    pub output_dir: String,
    #[serde(default = "default_long_timeframe")]
    pub long_timeframe: Timeframe,
    #[serde(default = "default_mid_timeframe")]
    pub mid_timeframe: Timeframe,
    #[serde(default = "default_short_timeframe")]
    pub short_timeframe: Timeframe,
    #[serde(default = "default_candle_limit")]
    pub candle_limit: usize,
    #[serde(default = "default_consolidation_lookback")]
    pub consolidation_lookback: usize,
    #[serde(default)]
    pub risk: RiskConfig,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            symbol: default_symbol(),
            check_interval_secs: default_check_interval(),
            output_dir: default_output_dir(),
            long_timeframe: default_long_timeframe(),
            mid_timeframe: default_mid_timeframe(),
            short_timeframe: default_short_timeframe(),
            candle_limit: default_candle_limit(),
            consolidation_lookback: default_consolidation_lookback(),
            risk: RiskConfig::default(),
        }
    }
}

impl BotConfig {
    /// Load from `trendbot.toml` (if present) with `TRENDBOT_*`
    /// environment overrides, e.g. `TRENDBOT_RISK__RISK_PER_TRADE=0.01`.
    pub fn load() -> Result<Self> {
        let settings = Config::builder()
            .add_source(File::with_name("trendbot").required(false))
            .add_source(Environment::with_prefix("TRENDBOT").separator("__"))
            .build()
            .map_err(|e| BotError::Other(anyhow::anyhow!("config error: {e}")))?;
        settings
            .try_deserialize()
            .map_err(|e| BotError::Other(anyhow::anyhow!("config error: {e}")))
    }
}
