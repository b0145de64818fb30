use crate::models::{CompositeSignal, SignalType, TradeRecord};
use tracing::info;

/// Outbound notification seam. The default sink is the log; a chat or
/// webhook notifier slots in behind the same trait.
pub trait Notifier: Send + Sync {
    fn notify(&self, title: &str, body: &str);
}

/// Notifier that writes through tracing.
#[derive(Debug, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, title: &str, body: &str) {
        info!(title, "{body}");
    }
}

/// Human-readable rendering of a composite signal.
pub fn format_signal_message(signal: &CompositeSignal) -> String {
    let mut lines = vec![
        format!("{} signal: {}", signal.symbol, signal.signal),
        format!(
            "trends: long {} / mid {} / short {}{}",
            signal.long_trend,
            signal.mid_trend,
            signal.short_trend,
            if signal.trend_aligned { " (aligned)" } else { "" }
        ),
        format!("market: {}", signal.market_state),
        format!(
            "advice: {} (confidence {}, ratio {:.0}%)",
            signal.advice,
            signal.confidence,
            signal.position_ratio * 100.0
        ),
        format!("price: {:.2}", signal.current_price),
    ];
    if signal.signal != SignalType::Hold {
        lines.push(format!(
            "size {:.6}, stop {:.2}, target {:.2}",
            signal.position_size, signal.stop_loss, signal.take_profit
        ));
    }
    lines.join("\n")
}

/// Human-readable rendering of a fill.
pub fn format_trade_message(trade: &TradeRecord) -> String {
    match (trade.pnl, trade.close_reason) {
        (Some(pnl), Some(reason)) => format!(
            "closed {} {:.6} @ {:.2} ({}), pnl {:+.2}",
            trade.side, trade.amount, trade.price, reason, pnl
        ),
        _ => format!(
            "opened {} {:.6} @ {:.2}, stop {:.2}, target {:.2}",
            trade.side,
            trade.amount,
            trade.price,
            trade.stop_loss.unwrap_or(0.0),
            trade.take_profit.unwrap_or(0.0)
        ),
    }
}
