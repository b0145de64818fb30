use crate::models::{Advice, Confidence, SignalType, TrendDirection};

/// Maps a raw signal plus the alignment flag to advice, confidence and
/// the advised fraction of capital. Fully-aligned signals get conviction
/// sizing, unaligned ones a scale-in toehold, holds nothing.
pub fn enhance(signal: SignalType, aligned: bool) -> (Advice, Confidence, f64) {
    match (signal, aligned) {
        (SignalType::Buy, true) => (Advice::StrongBuy, Confidence::High, 0.5),
        (SignalType::Buy, false) => (Advice::ScaleInBuy, Confidence::Medium, 0.2),
        (SignalType::Sell, true) => (Advice::StrongSell, Confidence::High, 0.5),
        (SignalType::Sell, false) => (Advice::ScaleInSell, Confidence::Medium, 0.2),
        (SignalType::Hold, _) => (Advice::Wait, Confidence::Low, 0.0),
    }
}

/// One-line description of the three-timeframe picture for operators
/// and notifications.
pub fn summarize(
    long: TrendDirection,
    mid: TrendDirection,
    short: TrendDirection,
) -> String {
    use TrendDirection::*;
    match (long, mid, short) {
        (Uptrend, Uptrend, Uptrend) => "strong rally, bull market".to_string(),
        (Downtrend, Downtrend, Downtrend) => "strong decline, bear market".to_string(),
        (Sideways, Sideways, Sideways) => "range-bound, no clear trend".to_string(),
        (Uptrend, Uptrend, _) => "longer horizons rising, short-term pullback".to_string(),
        (Downtrend, Downtrend, _) => "longer horizons falling, short-term bounce".to_string(),
        _ => "mixed trends, caution advised".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enhance_aligned_buy() {
        let (advice, confidence, ratio) = enhance(SignalType::Buy, true);
        assert_eq!(advice, Advice::StrongBuy);
        assert_eq!(confidence, Confidence::High);
        assert_eq!(ratio, 0.5);
    }

    #[test]
    fn test_enhance_unaligned_sell() {
        let (advice, confidence, ratio) = enhance(SignalType::Sell, false);
        assert_eq!(advice, Advice::ScaleInSell);
        assert_eq!(confidence, Confidence::Medium);
        assert_eq!(ratio, 0.2);
    }

    #[test]
    fn test_enhance_hold_ignores_alignment() {
        for aligned in [true, false] {
            let (advice, confidence, ratio) = enhance(SignalType::Hold, aligned);
            assert_eq!(advice, Advice::Wait);
            assert_eq!(confidence, Confidence::Low);
            assert_eq!(ratio, 0.0);
        }
    }

    #[test]
    fn test_summaries() {
        use TrendDirection::*;
        assert_eq!(summarize(Uptrend, Uptrend, Uptrend), "strong rally, bull market");
        assert_eq!(
            summarize(Uptrend, Uptrend, Downtrend),
            "longer horizons rising, short-term pullback"
        );
        assert_eq!(
            summarize(Uptrend, Sideways, Downtrend),
            "mixed trends, caution advised"
        );
    }
}
