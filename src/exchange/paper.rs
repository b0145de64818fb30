use crate::error::BotError;
use crate::exchange::{ExchangeClient, FillConfirmation, OrderSide, OrderStatus};
use crate::models::{Candle, Timeframe};
use crate::Result;
use async_trait::async_trait;
use chrono::{Duration, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Mutex;
use tracing::info;

struct Inner {
    rng: StdRng,
    last_price: f64,
    equity: f64,
    deny_trading: bool,
}

/// Simulated exchange for paper trading and tests. Candles follow a
/// seeded random walk around the last traded price, so runs with the
/// same seed reproduce the same market.
pub struct PaperExchange {
    inner: Mutex<Inner>,
}

impl PaperExchange {
    pub fn new(seed: u64, starting_equity: f64) -> Self {
        Self {
            inner: Mutex::new(Inner {
                rng: StdRng::seed_from_u64(seed),
                last_price: 65_000.0,
                equity: starting_equity,
                deny_trading: false,
            }),
        }
    }

    /// Make subsequent orders fail with a permission error, simulating
    /// API keys without trade rights.
    pub fn deny_trading(&self) {
        self.inner.lock().unwrap().deny_trading = true;
    }

    fn walk(rng: &mut StdRng, from: f64, drift: f64, volatility: f64) -> f64 {
        let step: f64 = rng.gen_range(-1.0..1.0);
        (from * (1.0 + drift + step * volatility)).max(1.0)
    }
}

#[async_trait]
impl ExchangeClient for PaperExchange {
    async fn fetch_ohlcv(&self, timeframe: Timeframe, limit: usize) -> Result<Vec<Candle>> {
        let mut inner = self.inner.lock().unwrap();
        let step = Duration::minutes(timeframe.minutes());
        let end = Utc::now();

        // Generate the window forward from a perturbed anchor so the
        // series ends at the new last traded price.
        let anchor = inner.last_price;
        let mut price = Self::walk(&mut inner.rng, anchor, 0.0, 0.02);
        let mut candles = Vec::with_capacity(limit);
        for i in 0..limit {
            let open = price;
            let close = Self::walk(&mut inner.rng, open, 0.0002, 0.005);
            let high = open.max(close) * (1.0 + inner.rng.gen_range(0.0..0.003));
            let low = open.min(close) * (1.0 - inner.rng.gen_range(0.0..0.003));
            let volume = inner.rng.gen_range(50.0..500.0);
            candles.push(Candle {
                timestamp: end - step * (limit - i) as i32,
                open,
                high,
                low,
                close,
                volume,
            });
            price = close;
        }
        inner.last_price = price;
        Ok(candles)
    }

    async fn fetch_equity(&self) -> Result<f64> {
        Ok(self.inner.lock().unwrap().equity)
    }

    async fn fetch_current_price(&self) -> Result<f64> {
        Ok(self.inner.lock().unwrap().last_price)
    }

    async fn place_market_order(&self, side: OrderSide, size: f64) -> Result<FillConfirmation> {
        let mut inner = self.inner.lock().unwrap();
        if inner.deny_trading {
            return Err(BotError::PermissionDenied(
                "api key lacks trading permission".to_string(),
            ));
        }
        let price = inner.last_price;
        info!(?side, size, price, "paper fill");
        Ok(FillConfirmation {
            price,
            size,
            status: OrderStatus::Filled,
        })
    }

    async fn close_position(&self, side: OrderSide, size: f64) -> Result<FillConfirmation> {
        self.place_market_order(side, size).await
    }
}
